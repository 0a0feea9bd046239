//! 歌词行、音节与注音。

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::lang::LangMap;

/// 生成一个新的实体 ID。
pub fn new_entity_id() -> String {
    Uuid::new_v4().to_string()
}

/// 时间区间的起点或终点。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeBoundary {
    /// 开始时间
    Start,
    /// 结束时间
    End,
}

/// 附着在音节上的注音（如振假名），拥有独立的计时。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RubyWord {
    /// 注音文本
    pub word: String,
    /// 开始时间（毫秒）
    pub start_time: u64,
    /// 结束时间（毫秒）
    pub end_time: u64,
}

impl RubyWord {
    pub fn new(word: impl Into<String>, start_time: u64, end_time: u64) -> Self {
        Self {
            word: word.into(),
            start_time,
            end_time,
        }
    }
}

/// 逐字音译的一个片段，按 `(start_time, end_time)` 与音节对应。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RomanFragment {
    /// 开始时间（毫秒）
    pub start_time: u64,
    /// 结束时间（毫秒）
    pub end_time: u64,
    /// 音译文本
    pub text: String,
}

/// 一个音节。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LyricWord {
    /// 唯一 ID
    pub id: String,
    /// 音节文本
    pub word: String,
    /// 开始时间（毫秒）
    pub start_time: u64,
    /// 结束时间（毫秒）
    pub end_time: u64,
    /// 打轴时该音节额外吸收的按键次数
    pub empty_beat: u32,
    /// 是否为不雅用语
    pub obscene: bool,
    /// 音节的音译
    pub roman_word: String,
    /// 注音列表。存在时，音节自身的时间跨度恒等于所有注音的最小开始与最大结束。
    pub ruby: Option<Vec<RubyWord>>,
}

impl LyricWord {
    pub fn new(word: impl Into<String>, start_time: u64, end_time: u64) -> Self {
        Self {
            id: new_entity_id(),
            word: word.into(),
            start_time,
            end_time,
            ..Default::default()
        }
    }

    /// 文本为空或只含空白。
    pub fn is_blank(&self) -> bool {
        self.word.trim().is_empty()
    }

    /// 是否带有至少一个注音。
    pub fn has_ruby(&self) -> bool {
        self.ruby.as_ref().is_some_and(|ruby| !ruby.is_empty())
    }

    pub const fn set_time(&mut self, boundary: TimeBoundary, time: u64) {
        match boundary {
            TimeBoundary::Start => self.start_time = time,
            TimeBoundary::End => self.end_time = time,
        }
    }

    /// 根据注音重新计算音节的时间跨度。没有注音时不做任何修改。
    pub fn sync_span_from_ruby(&mut self) {
        let Some(ruby) = self.ruby.as_ref().filter(|ruby| !ruby.is_empty()) else {
            return;
        };
        if let Some(start) = ruby.iter().map(|r| r.start_time).min() {
            self.start_time = start;
        }
        if let Some(end) = ruby.iter().map(|r| r.end_time).max() {
            self.end_time = end;
        }
    }

    /// 在末尾追加一个注音。
    pub fn add_ruby(&mut self, ruby: RubyWord) {
        self.ruby.get_or_insert_with(Vec::new).push(ruby);
        self.sync_span_from_ruby();
    }

    /// 移除指定位置的注音。
    ///
    /// 移除最后一个注音后注音列表被清空为 `None`，音节保留当前的时间跨度。
    pub fn remove_ruby(&mut self, index: usize) -> Option<RubyWord> {
        let ruby = self.ruby.as_mut()?;
        if index >= ruby.len() {
            return None;
        }
        let removed = ruby.remove(index);
        if ruby.is_empty() {
            self.ruby = None;
        } else {
            self.sync_span_from_ruby();
        }
        Some(removed)
    }

    /// 把 `index` 处的注音与下一个注音合并。
    pub fn merge_ruby_with_next(&mut self, index: usize) -> bool {
        let Some(ruby) = self.ruby.as_mut() else {
            return false;
        };
        let Some(next_index) = index.checked_add(1).filter(|&next| next < ruby.len()) else {
            return false;
        };
        let next = ruby.remove(next_index);
        let current = &mut ruby[index];
        current.word.push_str(&next.word);
        current.start_time = current.start_time.min(next.start_time);
        current.end_time = current.end_time.max(next.end_time);
        self.sync_span_from_ruby();
        true
    }

    /// 修改一个注音的开始或结束时间。
    pub fn set_ruby_time(&mut self, index: usize, boundary: TimeBoundary, time: u64) -> bool {
        let Some(ruby) = self.ruby.as_mut().and_then(|ruby| ruby.get_mut(index)) else {
            return false;
        };
        match boundary {
            TimeBoundary::Start => ruby.start_time = time,
            TimeBoundary::End => ruby.end_time = time,
        }
        self.sync_span_from_ruby();
        true
    }
}

/// 一行歌词。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LyricLine {
    /// 唯一 ID
    pub id: String,
    /// 音节列表
    pub words: Vec<LyricWord>,
    /// 开始时间（毫秒）
    pub start_time: u64,
    /// 结束时间（毫秒）
    pub end_time: u64,
    /// 是否为背景人声行。背景行总是紧跟在它的主行之后。
    pub is_background: bool,
    /// 是否为对唱行
    pub is_duet: bool,
    /// 打轴时跳过此行
    pub ignore_sync: bool,
    /// 主语言翻译
    pub translated_lyric: String,
    /// 主语言音译
    pub roman_lyric: String,
    /// 按语言区分的翻译
    pub translated_lyric_by_lang: Option<LangMap<String>>,
    /// 按语言区分的音译
    pub roman_lyric_by_lang: Option<LangMap<String>>,
    /// 按语言区分的逐字音译片段
    pub word_romanization_by_lang: Option<LangMap<Vec<RomanFragment>>>,
    /// 引用的演唱者标签 ID
    pub vocal: Option<Vec<String>>,
}

impl LyricLine {
    pub fn new() -> Self {
        Self {
            id: new_entity_id(),
            ..Default::default()
        }
    }

    pub const fn set_time(&mut self, boundary: TimeBoundary, time: u64) {
        match boundary {
            TimeBoundary::Start => self.start_time = time,
            TimeBoundary::End => self.end_time = time,
        }
    }

    /// 由非空白音节推导出的时间跨度。
    pub fn derived_span(&self) -> Option<(u64, u64)> {
        let mut non_blank = self.words.iter().filter(|w| !w.is_blank());
        let first = non_blank.next()?;
        Some(non_blank.fold((first.start_time, first.end_time), |(start, end), w| {
            (start.min(w.start_time), end.max(w.end_time))
        }))
    }

    /// 此行所有注音和音节的 ID 都被清空后的副本。
    pub fn with_ids_cleared(&self) -> Self {
        let mut line = self.clone();
        line.id.clear();
        for word in &mut line.words {
            word.id.clear();
        }
        line
    }

    /// 忽略 ID 比较两行。
    pub fn eq_ignoring_ids(&self, other: &Self) -> bool {
        self.with_ids_cleared() == other.with_ids_cleared()
    }
}
