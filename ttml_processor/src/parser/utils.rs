//! # TTML 解析器的工具函数
//!
//! 属性读取、背景文本的括号清理，以及辅助文本元素的拆分。

use lyric_core::RomanFragment;

use super::{
    constants::{ATTR_BEGIN, ATTR_END, ATTR_ROLE, ATTR_ROLE_ALIAS, ROLE_BACKGROUND, TAG_SPAN},
    state::{AuxText, SplitAuxText},
    tree::{XmlElement, XmlNode, is_formatting_whitespace},
};
use crate::utils::parse_timespan;

/// 元素的 `ttm:role`。
pub(super) fn role_of(element: &XmlElement) -> Option<&str> {
    element.attr(&[ATTR_ROLE, ATTR_ROLE_ALIAS])
}

/// 获取并解析为毫秒的时间戳属性值。解析失败时记录警告并视为不存在。
pub(super) fn get_time_attribute(
    element: &XmlElement,
    attr_names: &[&str],
    warnings: &mut Vec<String>,
) -> Option<u64> {
    let value = element.attr(attr_names)?;
    match parse_timespan(value) {
        Ok(ms) => Some(ms),
        Err(err) => {
            warnings.push(format!(
                "<{}> 的时间戳 '{value}' 解析失败 ({err})。该时间戳将被忽略。",
                element.name
            ));
            None
        }
    }
}

/// 一个 span 的计时属性状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum SpanTiming {
    /// 没有 begin 和 end
    Untimed,
    Timed { start: u64, end: u64 },
    /// 只有其中之一，或无法解析
    Malformed,
}

/// 同时读取 `begin` 和 `end`。
pub(super) fn get_timing(element: &XmlElement, warnings: &mut Vec<String>) -> SpanTiming {
    match (element.attr(&[ATTR_BEGIN]), element.attr(&[ATTR_END])) {
        (None, None) => SpanTiming::Untimed,
        (Some(_), Some(_)) => {
            let begin = get_time_attribute(element, &[ATTR_BEGIN], warnings);
            let end = get_time_attribute(element, &[ATTR_END], warnings);
            begin
                .zip(end)
                .map_or(SpanTiming::Malformed, |(start, end)| SpanTiming::Timed {
                    start,
                    end,
                })
        }
        _ => {
            warnings.push(format!(
                "<{}> 只有 begin 或 end 其中之一，已跳过。",
                element.name
            ));
            SpanTiming::Malformed
        }
    }
}

/// 解析布尔型的厂商属性。
pub(super) fn parse_flag(value: Option<&str>) -> bool {
    value.is_some_and(|v| {
        let v = v.trim();
        v.eq_ignore_ascii_case("true") || v == "1"
    })
}

/// 去掉背景文本两端各一个括号（半角或全角）。
pub(super) fn strip_background_parentheses(text: &str) -> &str {
    let trimmed = text.trim();
    let trimmed = trimmed.strip_prefix(['(', '（']).unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix([')', '）']).unwrap_or(trimmed);
    trimmed.trim()
}

/// 拆分一个辅助文本元素（`<text>` 或行内翻译/音译 span）。
///
/// 第 n 个 `x-bg` span 成为第 n 个背景部分；带计时的 span 成为片段；
/// 不带计时的 span 是透明的包装，其内容归入外层。
pub(super) fn split_aux_text(element: &XmlElement, warnings: &mut Vec<String>) -> SplitAuxText {
    let mut split = SplitAuxText::default();
    collect_aux_content(element, &mut split, None, warnings);

    split.main.plain = split.main.plain.trim().to_string();
    split.main.full = split.main.full.trim().to_string();
    for background in &mut split.backgrounds {
        background.plain = strip_background_parentheses(&background.plain).to_string();
        background.full = strip_background_parentheses(&background.full).to_string();
    }
    split
}

fn target_mut(split: &mut SplitAuxText, target: Option<usize>) -> &mut AuxText {
    match target.and_then(|index| split.backgrounds.get_mut(index)) {
        Some(background) => background,
        None => &mut split.main,
    }
}

fn collect_aux_content(
    element: &XmlElement,
    split: &mut SplitAuxText,
    target: Option<usize>,
    warnings: &mut Vec<String>,
) {
    for child in &element.children {
        match child {
            XmlNode::Text(text) => {
                if is_formatting_whitespace(text) {
                    continue;
                }
                let output = target_mut(split, target);
                output.plain.push_str(text);
                output.full.push_str(text);
            }
            XmlNode::Element(child) if child.local_name() == TAG_SPAN => {
                if role_of(child) == Some(ROLE_BACKGROUND) {
                    split.backgrounds.push(AuxText::default());
                    let index = split.backgrounds.len() - 1;
                    collect_aux_content(child, split, Some(index), warnings);
                    continue;
                }
                match get_timing(child, warnings) {
                    SpanTiming::Timed {
                        start: start_time,
                        end: end_time,
                    } => {
                        let text = child.text_content();
                        let output = target_mut(split, target);
                        output.full.push_str(&text);
                        output.fragments.push(RomanFragment {
                            start_time,
                            end_time,
                            text,
                        });
                    }
                    SpanTiming::Untimed => collect_aux_content(child, split, target, warnings),
                    SpanTiming::Malformed => {}
                }
            }
            XmlNode::Element(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::tree::build_tree;

    fn first_element(content: &str) -> XmlElement {
        let mut warnings = Vec::new();
        let root = build_tree(content, &mut warnings);
        root.child_elements().next().cloned().unwrap()
    }

    #[test]
    fn test_strip_background_parentheses() {
        assert_eq!(strip_background_parentheses("(hello)"), "hello");
        assert_eq!(strip_background_parentheses("（hello）"), "hello");
        assert_eq!(strip_background_parentheses(" ( hello world ) "), "hello world");
        assert_eq!(strip_background_parentheses("((double))"), "(double)");
        assert_eq!(strip_background_parentheses("(unmatched"), "unmatched");
        assert_eq!(strip_background_parentheses("no parentheses"), "no parentheses");
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag(Some("true")));
        assert!(parse_flag(Some(" TRUE ")));
        assert!(parse_flag(Some("1")));
        assert!(!parse_flag(Some("false")));
        assert!(!parse_flag(None));
    }

    #[test]
    fn test_split_aux_text_with_backgrounds() {
        let element = first_element(
            r#"<text for="L1">主翻译<span ttm:role="x-bg">(背景一)</span><span ttm:role="x-bg"></span><span ttm:role="x-bg">（背景三）</span></text>"#,
        );
        let mut warnings = Vec::new();
        let split = split_aux_text(&element, &mut warnings);
        assert_eq!(split.main.plain, "主翻译");
        assert_eq!(split.backgrounds.len(), 3);
        assert_eq!(split.backgrounds[0].plain, "背景一");
        assert_eq!(split.backgrounds[1].plain, "");
        assert_eq!(split.backgrounds[2].plain, "背景三");
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_split_aux_text_with_fragments() {
        let element = first_element(
            "<text for=\"L1\">\n  <span begin=\"00:00:01.000\" end=\"00:00:01.500\">ko</span><span begin=\"1.5s\" end=\"2s\">n</span>\n  <span begin=\"3s\">bad</span>\n  <span><span begin=\"2s\" end=\"3s\">ni</span></span>\n</text>",
        );
        let mut warnings = Vec::new();
        let split = split_aux_text(&element, &mut warnings);
        assert_eq!(split.main.plain, "");
        assert_eq!(split.main.full, "konni");
        let texts: Vec<&str> = split.main.fragments.iter().map(|f| f.text.as_str()).collect();
        assert_eq!(texts, ["ko", "n", "ni"]);
        assert_eq!(split.main.fragments[1].start_time, 1500);
        assert_eq!(warnings.len(), 1);
    }
}
