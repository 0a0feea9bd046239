//! # TTML 生成器 - 工具函数
//!
//! 行分组、背景括号以及按语言取出翻译/音译的辅助函数。

use std::{borrow::Cow, collections::BTreeSet, sync::Arc};

use lyric_core::{LangMap, LyricLine, RomanFragment, UNDETERMINED_LANG};

/// 一个 `<p>` 元素：宿主行以及紧跟其后的背景行。
pub(super) struct LineGroup<'a> {
    pub key: String,
    pub host: &'a LyricLine,
    pub backgrounds: Vec<&'a LyricLine>,
}

/// 把行按 `<p>` 分组。
///
/// 每个非背景行开启一个新组，后续的背景行并入该组；
/// 没有宿主的背景行自成一组，由 `<p ttm:role="x-bg">` 表示。
pub(super) fn group_lines(lines: &[Arc<LyricLine>]) -> Vec<LineGroup<'_>> {
    let mut groups: Vec<LineGroup<'_>> = Vec::new();
    for line in lines {
        match groups.last_mut() {
            Some(group) if line.is_background => group.backgrounds.push(line),
            _ => groups.push(LineGroup {
                key: format!("L{}", groups.len() + 1),
                host: line,
                backgrounds: Vec::new(),
            }),
        }
    }
    groups
}

/// 给背景行的首尾音节加上括号。
pub(super) fn decorate_background_text(text: &str, is_first: bool, is_last: bool) -> Cow<'_, str> {
    match (is_first, is_last) {
        (false, false) => Cow::Borrowed(text),
        (true, false) => Cow::Owned(format!("({text}")),
        (false, true) => Cow::Owned(format!("{text})")),
        (true, true) => Cow::Owned(format!("({text})")),
    }
}

/// 行级文本辅助轨道。
#[derive(Clone, Copy)]
pub(super) enum TextField {
    Translation,
    Romanization,
}

impl TextField {
    fn parts(self, line: &LyricLine) -> (&str, Option<&LangMap<String>>) {
        match self {
            Self::Translation => (line.translated_lyric.as_str(), line.translated_lyric_by_lang.as_ref()),
            Self::Romanization => (line.roman_lyric.as_str(), line.roman_lyric_by_lang.as_ref()),
        }
    }
}

/// 文档中只要有一行带有按语言区分的数据，就按语言标记输出。
pub(super) fn is_language_tagged(lines: &[Arc<LyricLine>]) -> bool {
    lines.iter().any(|line| {
        line.translated_lyric_by_lang.is_some()
            || line.roman_lyric_by_lang.is_some()
            || line.word_romanization_by_lang.is_some()
    })
}

/// 取出一行在某语言下的文本。`lang` 为 `None` 表示不标记语言的文档。
///
/// 没有语言映射的行，其主文本归入 `und`。
pub(super) fn text_value<'a>(
    line: &'a LyricLine,
    field: TextField,
    lang: Option<&str>,
) -> Option<&'a str> {
    let (primary, by_lang) = field.parts(line);
    let value = match (lang, by_lang) {
        (None, _) | (Some(UNDETERMINED_LANG), None) => Some(primary),
        (Some(_), None) => None,
        (Some(lang), Some(map)) => map.get(lang).map(String::as_str),
    };
    value.filter(|text| !text.is_empty())
}

/// 取出一行在某语言下的逐字音译片段。
pub(super) fn fragments_value<'a>(
    line: &'a LyricLine,
    lang: Option<&str>,
) -> Option<Cow<'a, [RomanFragment]>> {
    match (lang, line.word_romanization_by_lang.as_ref()) {
        (None, _) | (Some(UNDETERMINED_LANG), None) => {
            fragments_from_words(line).map(Cow::Owned)
        }
        (Some(_), None) => None,
        (Some(lang), Some(map)) => map
            .get(lang)
            .filter(|fragments| !fragments.is_empty())
            .map(|fragments| Cow::Borrowed(fragments.as_slice())),
    }
}

/// 由音节上的 `roman_word` 组装片段。
///
/// 只要有一个非空白音节带音译，就为每个非空白音节都输出一个片段，
/// 以保证重新解析时按顺序匹配到同样的音节。
fn fragments_from_words(line: &LyricLine) -> Option<Vec<RomanFragment>> {
    let non_blank = || line.words.iter().filter(|word| !word.is_blank());
    if !non_blank().any(|word| !word.roman_word.is_empty()) {
        return None;
    }
    Some(
        non_blank()
            .map(|word| RomanFragment {
                start_time: word.start_time,
                end_time: word.end_time,
                text: word.roman_word.clone(),
            })
            .collect(),
    )
}

/// 某个行级文本轨道用到的所有语言。
pub(super) fn text_languages(lines: &[Arc<LyricLine>], field: TextField) -> BTreeSet<String> {
    let mut langs = BTreeSet::new();
    for line in lines {
        match field.parts(line) {
            (_, Some(map)) => langs.extend(map.keys().cloned()),
            (primary, None) if !primary.is_empty() => {
                langs.insert(UNDETERMINED_LANG.to_string());
            }
            _ => {}
        }
    }
    langs
}

/// 逐字音译用到的所有语言。
pub(super) fn fragment_languages(lines: &[Arc<LyricLine>]) -> BTreeSet<String> {
    let mut langs = BTreeSet::new();
    for line in lines {
        match &line.word_romanization_by_lang {
            Some(map) => langs.extend(map.keys().cloned()),
            None if fragments_from_words(line).is_some() => {
                langs.insert(UNDETERMINED_LANG.to_string());
            }
            None => {}
        }
    }
    langs
}

/// 对一组中的宿主行和背景行求值。
///
/// 末尾没有值的背景行被截掉；整组都没有值时返回 `None`。
pub(super) fn collect_group_values<'a, T>(
    group: &LineGroup<'a>,
    mut value: impl FnMut(&'a LyricLine) -> Option<T>,
) -> Option<(Option<T>, Vec<Option<T>>)> {
    let main = value(group.host);
    let mut backgrounds: Vec<Option<T>> = group.backgrounds.iter().map(|&line| value(line)).collect();
    while matches!(backgrounds.last(), Some(None)) {
        backgrounds.pop();
    }
    (main.is_some() || !backgrounds.is_empty()).then_some((main, backgrounds))
}
