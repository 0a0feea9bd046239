//! 解析、生成与打轴的选项。

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// TTML 解析选项
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[builder(setter(into, strip_option), default)]
#[serde(default)]
pub struct TtmlParsingOptions {
    /// 存在多种语言的翻译时，优先作为主翻译的语言。
    /// 为 `None` 或文档中不存在该语言时，取字典序第一个非 `und` 的语言。
    pub preferred_translation_lang: Option<String>,
    /// 存在多种语言的音译时，优先作为主音译（以及逐字音译来源）的语言。
    pub preferred_romanization_lang: Option<String>,
}

/// TTML 生成选项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[builder(setter(into), default)]
#[serde(default)]
pub struct TtmlGenerationOptions {
    /// 是否输出格式化（缩进）的 TTML 文件。
    pub format: bool,
}

impl Default for TtmlGenerationOptions {
    fn default() -> Self {
        Self { format: true }
    }
}

/// 计算按键判定时间的方式
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    EnumString,
    EnumIter,
    Display,
)]
#[strum(ascii_case_insensitive)]
pub enum JudgeMode {
    /// 以按下按键的时刻为准（仅在播放时扣除按住时长）
    #[default]
    FirstKeyDownTime,
    /// 以松开按键的时刻为准
    LastKeyUpTime,
    /// 以按下与松开的中点为准
    MiddleKeyTime,
    /// 旧版算法：按下时记录的播放位置减去按住时长，不考虑播放速率
    FirstKeyDownTimeLegacy,
}

/// 打轴选项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[builder(setter(into), default)]
#[serde(default)]
pub struct SyncOptions {
    /// 判定时间的计算方式。
    pub judge_mode: JudgeMode,
    /// 行首单元第一次按键只记录开始时间，第二次按键才结束它。
    pub smart_first_word: bool,
    /// 行末单元结束后不再给下一行打开始时间。
    pub smart_last_word: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            judge_mode: JudgeMode::FirstKeyDownTime,
            smart_first_word: false,
            smart_last_word: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_judge_mode_parsing() {
        assert_eq!(
            JudgeMode::from_str("middlekeytime").unwrap(),
            JudgeMode::MiddleKeyTime
        );
        assert_eq!(JudgeMode::LastKeyUpTime.to_string(), "LastKeyUpTime");
        assert!(JudgeMode::from_str("nope").is_err());
        assert_eq!(JudgeMode::iter().count(), 4);
    }

    #[test]
    fn test_builders_keep_defaults() {
        let sync = SyncOptionsBuilder::default()
            .smart_last_word(true)
            .build()
            .unwrap();
        assert!(sync.smart_last_word);
        assert!(!sync.smart_first_word);
        assert_eq!(sync.judge_mode, JudgeMode::FirstKeyDownTime);

        let parsing = TtmlParsingOptionsBuilder::default()
            .preferred_translation_lang("zh-Hans")
            .build()
            .unwrap();
        assert_eq!(parsing.preferred_translation_lang.as_deref(), Some("zh-Hans"));
        assert_eq!(parsing.preferred_romanization_lang, None);

        let generation = TtmlGenerationOptionsBuilder::default().build().unwrap();
        assert!(generation.format);
    }
}
