//! # TTML 解析器 - 阶段间状态
//!
//! 头部收集到的翻译、音译按行的引用键存放在 [`AuxTables`] 中，
//! 行解析时再与行内的辅助 span 合并求值。

use std::collections::HashMap;

use lyric_core::{
    LangMap, RomanFragment, TtmlParsingOptions, drop_shadowed_undetermined, primary_lang,
};

/// 辅助文本属于主行，还是同一引用键下的第 n 个背景行。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(super) enum AuxTrack {
    Main,
    Background(usize),
}

/// 一条带可选语言标签的辅助数据。
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct Tagged<V> {
    pub(super) lang: Option<String>,
    pub(super) value: V,
}

/// 某个引用键的某条轨道上收集到的辅助数据，按出现顺序保存。
#[derive(Debug, Clone, Default)]
pub(super) struct TrackAux {
    /// 不带计时的整行翻译
    pub(super) translations: Vec<Tagged<String>>,
    /// 带计时 span 的整行翻译，优先于不带计时的
    pub(super) timed_translations: Vec<Tagged<String>>,
    /// 整行音译
    pub(super) romanizations: Vec<Tagged<String>>,
    /// 逐字音译片段池
    pub(super) word_romanizations: Vec<Tagged<Vec<RomanFragment>>>,
}

/// 辅助文本的种类。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum AuxKind {
    Translation,
    Romanization,
}

impl TrackAux {
    /// 记录一段拆分后的辅助文本。
    ///
    /// 翻译含有计时 span 时整段作为带计时翻译；音译的直接文本和计时片段分别记录。
    pub(super) fn push(&mut self, kind: AuxKind, lang: Option<&str>, text: &AuxText) {
        let tagged = |value| Tagged {
            lang: lang.map(str::to_string),
            value,
        };
        match kind {
            AuxKind::Translation => {
                if !text.fragments.is_empty() {
                    if !text.full.is_empty() {
                        self.timed_translations.push(tagged(text.full.clone()));
                    }
                } else if !text.plain.is_empty() {
                    self.translations.push(tagged(text.plain.clone()));
                }
            }
            AuxKind::Romanization => {
                if !text.plain.is_empty() {
                    self.romanizations.push(tagged(text.plain.clone()));
                }
                if !text.fragments.is_empty() {
                    self.word_romanizations.push(Tagged {
                        lang: lang.map(str::to_string),
                        value: text.fragments.clone(),
                    });
                }
            }
        }
    }
}

/// 拆分后的 `<text>` 内容（或其中某个背景部分）。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(super) struct AuxText {
    /// 直接文本
    pub(super) plain: String,
    /// 直接文本与计时 span 文本按顺序拼接
    pub(super) full: String,
    /// 计时 span
    pub(super) fragments: Vec<RomanFragment>,
}

/// 一个 `<text>` 元素拆分成主行部分和各背景行部分。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(super) struct SplitAuxText {
    pub(super) main: AuxText,
    pub(super) backgrounds: Vec<AuxText>,
}

/// 按 `(引用键, 轨道)` 索引的辅助数据查找表。
#[derive(Debug, Default)]
pub(super) struct AuxTables {
    /// 文档中任何翻译或音译带有语言标签时为真，此时所有无标签的数据都被忽略
    pub(super) language_tagged: bool,
    entries: HashMap<(String, AuxTrack), TrackAux>,
}

/// 一行的辅助数据求值结果。
#[derive(Debug, Default)]
pub(super) struct ResolvedAux {
    pub(super) translated_lyric: String,
    pub(super) translated_lyric_by_lang: Option<LangMap<String>>,
    pub(super) roman_lyric: String,
    pub(super) roman_lyric_by_lang: Option<LangMap<String>>,
    pub(super) word_romanization_by_lang: Option<LangMap<Vec<RomanFragment>>>,
    /// 用于给音节匹配音译的片段池
    pub(super) roman_pool: Vec<RomanFragment>,
}

impl AuxTables {
    pub(super) fn new(language_tagged: bool) -> Self {
        Self {
            language_tagged,
            entries: HashMap::new(),
        }
    }

    pub(super) fn track_mut(&mut self, key: &str, track: AuxTrack) -> &mut TrackAux {
        self.entries.entry((key.to_string(), track)).or_default()
    }

    /// 合并头部数据与行内数据，求出一行的翻译和音译。
    ///
    /// 头部数据优先于行内数据；同一来源中带计时的翻译优先于不带计时的翻译。
    pub(super) fn resolve(
        &self,
        key: Option<&str>,
        track: AuxTrack,
        inline: &TrackAux,
        options: &TtmlParsingOptions,
    ) -> ResolvedAux {
        let head = key.and_then(|key| self.entries.get(&(key.to_string(), track)));
        let sources: Vec<&TrackAux> = head.into_iter().chain(std::iter::once(inline)).collect();
        let translation_lang = options.preferred_translation_lang.as_deref();
        let romanization_lang = options.preferred_romanization_lang.as_deref();

        let (translated_lyric, translated_lyric_by_lang) = resolve_text(
            sources
                .iter()
                .copied()
                .flat_map(|s| s.timed_translations.iter().chain(&s.translations)),
            self.language_tagged,
            translation_lang,
        );
        let (roman_lyric, roman_lyric_by_lang) = resolve_text(
            sources.iter().copied().flat_map(|s| s.romanizations.iter()),
            self.language_tagged,
            romanization_lang,
        );
        let (roman_pool, word_romanization_by_lang) = resolve_pool(
            sources
                .iter()
                .copied()
                .flat_map(|s| s.word_romanizations.iter()),
            self.language_tagged,
            romanization_lang,
        );

        ResolvedAux {
            translated_lyric,
            translated_lyric_by_lang,
            roman_lyric,
            roman_lyric_by_lang,
            word_romanization_by_lang,
            roman_pool,
        }
    }
}

/// 同一语言先到先得。无标签模式只取第一条非空的无标签数据。
fn resolve_text<'a>(
    entries: impl Iterator<Item = &'a Tagged<String>>,
    language_tagged: bool,
    preferred: Option<&str>,
) -> (String, Option<LangMap<String>>) {
    if !language_tagged {
        let primary = entries
            .filter(|entry| entry.lang.is_none())
            .map(|entry| entry.value.as_str())
            .find(|value| !value.is_empty())
            .unwrap_or_default()
            .to_string();
        return (primary, None);
    }

    let mut map = LangMap::new();
    for entry in entries {
        let Some(lang) = entry.lang.as_deref() else {
            continue;
        };
        if entry.value.is_empty() {
            continue;
        }
        map.entry(lang.to_string())
            .or_insert_with(|| entry.value.clone());
    }
    drop_shadowed_undetermined(&mut map);
    if map.is_empty() {
        return (String::new(), None);
    }

    let primary = primary_lang(&map, preferred)
        .and_then(|lang| map.get(lang))
        .cloned()
        .unwrap_or_default();
    (primary, Some(map))
}

/// 同一语言的片段池按出现顺序拼接。
fn resolve_pool<'a>(
    entries: impl Iterator<Item = &'a Tagged<Vec<RomanFragment>>>,
    language_tagged: bool,
    preferred: Option<&str>,
) -> (Vec<RomanFragment>, Option<LangMap<Vec<RomanFragment>>>) {
    if !language_tagged {
        let pool = entries
            .filter(|entry| entry.lang.is_none())
            .flat_map(|entry| entry.value.iter().cloned())
            .collect();
        return (pool, None);
    }

    let mut map: LangMap<Vec<RomanFragment>> = LangMap::new();
    for entry in entries {
        let Some(lang) = entry.lang.as_deref() else {
            continue;
        };
        if entry.value.is_empty() {
            continue;
        }
        map.entry(lang.to_string())
            .or_default()
            .extend(entry.value.iter().cloned());
    }
    drop_shadowed_undetermined(&mut map);
    if map.is_empty() {
        return (Vec::new(), None);
    }

    let pool = primary_lang(&map, preferred)
        .and_then(|lang| map.get(lang))
        .cloned()
        .unwrap_or_default();
    (pool, Some(map))
}
