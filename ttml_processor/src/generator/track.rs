//! # TTML 生成器 - 音节渲染模块
//!
//! 把一行的音节渲染为 `<span>` 元素。带注音的音节写成 `tts:ruby` 容器，
//! 不带时间的空白音节直接写成文本。

use std::{borrow::Cow, io::Write};

use lyric_core::{LyricWord, RubyWord};
use quick_xml::{
    Writer,
    events::{BytesText, Event},
    writer::ElementWriter,
};

use super::utils::decorate_background_text;
use crate::{
    parser::constants::{
        ATTR_BEGIN, ATTR_EMPTY_BEAT, ATTR_END, ATTR_OBSCENE, ATTR_RUBY, RUBY_BASE,
        RUBY_CONTAINER, RUBY_TEXT, RUBY_TEXT_CONTAINER, TAG_SPAN,
    },
    utils::format_timestamp,
};

/// 写入一行的所有音节。背景行的首尾音节会加上括号。
pub(super) fn write_words<W: Write>(
    writer: &mut Writer<W>,
    words: &[LyricWord],
    is_background: bool,
) -> std::io::Result<()> {
    let last_index = words.len().saturating_sub(1);
    let mut previous_was_text = false;

    for (index, word) in words.iter().enumerate() {
        // 空音节放不下括号，括号单独写成文本，解析时作为独立音节被去掉
        let bare_brackets = is_background && word.word.is_empty();
        if bare_brackets && index == 0 {
            writer.write_event(Event::Text(BytesText::new("(")))?;
            previous_was_text = true;
        }

        let text = if is_background && !bare_brackets {
            decorate_background_text(&word.word, index == 0, index == last_index)
        } else {
            Cow::Borrowed(word.word.as_str())
        };

        // 相邻的两段文本会在解析时合并，所以第二段必须写成 span
        if !previous_was_text && can_write_as_text(word, &text) {
            writer.write_event(Event::Text(BytesText::new(&text)))?;
            previous_was_text = true;
            continue;
        }
        previous_was_text = false;

        match &word.ruby {
            Some(ruby) if !ruby.is_empty() => write_ruby_word(writer, word, &text, ruby)?,
            _ => {
                with_word_attributes(word_span(writer, word.start_time, word.end_time), word)
                    .write_text_content(BytesText::new(&text))?;
            }
        }

        if bare_brackets && index == last_index {
            writer.write_event(Event::Text(BytesText::new(")")))?;
            previous_was_text = true;
        }
    }
    Ok(())
}

/// 没有时间和任何附加属性的空白音节，可以不用 span 包装。
fn can_write_as_text(word: &LyricWord, text: &str) -> bool {
    !text.is_empty()
        && text.trim().is_empty()
        && !text.contains(['\n', '\r'])
        && word.start_time == 0
        && word.end_time == 0
        && word.empty_beat == 0
        && !word.obscene
        && word.roman_word.is_empty()
        && word.ruby.is_none()
}

fn word_span<W: Write>(writer: &mut Writer<W>, start: u64, end: u64) -> ElementWriter<'_, W> {
    writer
        .create_element(TAG_SPAN)
        .with_attribute((ATTR_BEGIN, format_timestamp(start).as_str()))
        .with_attribute((ATTR_END, format_timestamp(end).as_str()))
}

fn with_word_attributes<'a, W: Write>(
    mut builder: ElementWriter<'a, W>,
    word: &LyricWord,
) -> ElementWriter<'a, W> {
    if word.empty_beat > 0 {
        builder = builder.with_attribute((ATTR_EMPTY_BEAT, word.empty_beat.to_string().as_str()));
    }
    if word.obscene {
        builder = builder.with_attribute((ATTR_OBSCENE, "true"));
    }
    builder
}

/// ```xml
/// <span tts:ruby="container" begin=".." end="..">
///   <span tts:ruby="base">漢字</span>
///   <span tts:ruby="textContainer">
///     <span tts:ruby="text" begin=".." end="..">かん</span>
///   </span>
/// </span>
/// ```
fn write_ruby_word<W: Write>(
    writer: &mut Writer<W>,
    word: &LyricWord,
    text: &str,
    ruby: &[RubyWord],
) -> std::io::Result<()> {
    with_word_attributes(word_span(writer, word.start_time, word.end_time), word)
        .with_attribute((ATTR_RUBY, RUBY_CONTAINER))
        .write_inner_content(|writer| {
            writer
                .create_element(TAG_SPAN)
                .with_attribute((ATTR_RUBY, RUBY_BASE))
                .write_text_content(BytesText::new(text))?;
            writer
                .create_element(TAG_SPAN)
                .with_attribute((ATTR_RUBY, RUBY_TEXT_CONTAINER))
                .write_inner_content(|writer| {
                    for item in ruby {
                        word_span(writer, item.start_time, item.end_time)
                            .with_attribute((ATTR_RUBY, RUBY_TEXT))
                            .write_text_content(BytesText::new(&item.word))?;
                    }
                    Ok(())
                })?;
            Ok(())
        })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn render(words: &[LyricWord], is_background: bool) -> String {
        let mut buffer = Vec::new();
        let mut writer = Writer::new(Cursor::new(&mut buffer));
        write_words(&mut writer, words, is_background).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_blank_untimed_word_is_bare_text() {
        let words = [
            LyricWord::new("a", 0, 100),
            LyricWord::new(" ", 0, 0),
            LyricWord::new(" ", 0, 0),
            LyricWord::new("b", 100, 200),
        ];
        assert_eq!(
            render(&words, false),
            concat!(
                r#"<span begin="00:00:00.000" end="00:00:00.100">a</span>"#,
                " ",
                r#"<span begin="00:00:00.000" end="00:00:00.000"> </span>"#,
                r#"<span begin="00:00:00.100" end="00:00:00.200">b</span>"#,
            )
        );
    }

    #[test]
    fn test_background_words_are_parenthesized() {
        let words = [LyricWord::new("ooh", 0, 100), LyricWord::new("ah", 100, 200)];
        let output = render(&words, true);
        assert!(output.contains(">(ooh</span>"));
        assert!(output.contains(">ah)</span>"));
    }

    #[test]
    fn test_empty_background_boundary_words_get_bare_brackets() {
        let words = [LyricWord::new("", 2000, 3000)];
        assert_eq!(
            render(&words, true),
            r#"(<span begin="00:00:02.000" end="00:00:03.000"></span>)"#
        );

        let words = [
            LyricWord::new("", 2000, 2500),
            LyricWord::new("ah", 2500, 3000),
            LyricWord::new("", 3000, 3500),
        ];
        let output = render(&words, true);
        assert!(output.starts_with(r#"(<span begin="00:00:02.000" end="00:00:02.500"></span>"#));
        assert!(output.contains(">ah</span>"));
        assert!(output.ends_with("></span>)"));
    }

    #[test]
    fn test_word_attributes_and_escaping() {
        let mut word = LyricWord::new("<&>", 0, 100);
        word.empty_beat = 2;
        word.obscene = true;
        let output = render(&[word], false);
        assert!(output.contains(r#"amll:empty-beat="2""#));
        assert!(output.contains(r#"amll:obscene="true""#));
        assert!(output.contains("&lt;&amp;&gt;"));
    }

    #[test]
    fn test_ruby_word_structure() {
        let mut word = LyricWord::new("漢字", 0, 0);
        word.add_ruby(RubyWord::new("かん", 1000, 1200));
        word.add_ruby(RubyWord::new("じ", 1200, 1500));
        let output = render(&[word], false);
        assert!(output.starts_with(
            r#"<span begin="00:00:01.000" end="00:00:01.500" tts:ruby="container">"#
        ));
        assert!(output.contains(r#"<span tts:ruby="base">漢字</span>"#));
        assert!(output.contains(
            r#"<span begin="00:00:01.200" end="00:00:01.500" tts:ruby="text">じ</span>"#
        ));
    }
}
