//! # Timed Text Markup Language 歌词格式生成器
//!
//! 注意：该模块设计上仅用于生成 Apple Music 和 AMLL 使用的 TTML 歌词文件，
//! 无法用于生成通用的 TTML 字幕文件。
//!
//! 输出经 [`parse_ttml`](crate::parse_ttml) 解析后，除 ID 外与输入文档相同。

mod body;
mod head;
mod track;
mod utils;

use std::io::Cursor;

use lyric_core::{LyricDocument, TtmlError, TtmlGenerationOptions};
use quick_xml::Writer;
use tracing::debug;

use crate::parser::constants::{NS_AMLL, NS_ITUNES, NS_TTM, NS_TTML, NS_TTS};

/// TTML 生成的主入口函数。
///
/// # 参数
/// * `document` - 要输出的歌词文档。
/// * `options` - TTML 生成选项，控制是否缩进输出。
///
/// # Errors
///
/// 如果在生成 XML 或将结果转换为字符串时发生错误（例如 I/O 错误或 UTF-8 编码问题），
/// 则会返回 `TtmlError`。
pub fn generate_ttml(
    document: &LyricDocument,
    options: &TtmlGenerationOptions,
) -> Result<String, TtmlError> {
    let mut buffer = Vec::new();
    let indent_char = b' ';
    let indent_size = 2;

    // 决定是否输出格式化的 TTML
    let result = if options.format {
        let mut writer =
            Writer::new_with_indent(Cursor::new(&mut buffer), indent_char, indent_size);
        generate_ttml_inner(&mut writer, document)
    } else {
        let mut writer = Writer::new(Cursor::new(&mut buffer));
        generate_ttml_inner(&mut writer, document)
    };

    result?;

    debug!(lines = document.lines.len(), bytes = buffer.len(), "TTML 生成完成");
    String::from_utf8(buffer).map_err(TtmlError::FromUtf8)
}

/// TTML 生成的核心内部逻辑。
fn generate_ttml_inner<W: std::io::Write>(
    writer: &mut Writer<W>,
    document: &LyricDocument,
) -> Result<(), TtmlError> {
    let groups = utils::group_lines(&document.lines);

    // 属性排序以保证输出稳定
    let namespace_attrs = [
        ("xmlns", NS_TTML),
        ("xmlns:amll", NS_AMLL),
        ("xmlns:itunes", NS_ITUNES),
        ("xmlns:ttm", NS_TTM),
        ("xmlns:tts", NS_TTS),
    ];

    let mut element_writer = writer.create_element("tt");
    for (i, attr) in namespace_attrs.into_iter().enumerate() {
        if i > 0 {
            element_writer = element_writer.new_line();
        }
        element_writer = element_writer.with_attribute(attr);
    }
    element_writer = element_writer
        .new_line()
        .with_attribute(("itunes:timing", "Word"));

    element_writer.write_inner_content(|writer| {
        head::write_ttml_head(writer, document, &groups)?;
        body::write_ttml_body(writer, document, &groups)?;
        Ok(())
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use lyric_core::{LyricLine, LyricWord, MetadataMap, VocalTag};

    use super::*;
    use crate::parse_ttml;

    fn word(text: &str, start: u64, end: u64) -> LyricWord {
        LyricWord::new(text, start, end)
    }

    fn line(words: Vec<LyricWord>, start: u64, end: u64) -> LyricLine {
        LyricLine {
            words,
            start_time: start,
            end_time: end,
            ..LyricLine::new()
        }
    }

    fn compact() -> TtmlGenerationOptions {
        TtmlGenerationOptions { format: false }
    }

    #[test]
    fn test_empty_document() {
        let output = generate_ttml(&LyricDocument::default(), &compact()).unwrap();
        assert!(output.starts_with("<tt xmlns=\"http://www.w3.org/ns/ttml\""));
        assert!(output.contains("<body/>"));
        let parsed = parse_ttml(&output, &Default::default());
        assert!(parsed.document.lines.is_empty());
        assert!(parsed.warnings.is_empty());
    }

    #[test]
    fn test_background_lines_nest_in_host() {
        let mut background = line(vec![word("ooh", 1500, 2000)], 1500, 2000);
        background.is_background = true;
        let mut host = line(vec![word("main", 1000, 2000)], 1000, 2000);
        host.is_duet = true;
        background.is_duet = true;
        let document = LyricDocument::new(MetadataMap::new(), Vec::new(), vec![host, background]);

        let output = generate_ttml(&document, &compact()).unwrap();
        assert!(output.contains(r#"itunes:key="L1" ttm:agent="v2""#));
        assert!(output.contains(r#"<span ttm:role="x-bg" begin="00:00:01.500" end="00:00:02.000">"#));
        assert!(output.contains(">(ooh)</span>"));
        assert!(output.contains(r#"<ttm:agent type="person" xml:id="v2"/>"#));

        let parsed = parse_ttml(&output, &Default::default());
        assert!(parsed.document.eq_ignoring_ids(&document));
    }

    #[test]
    fn test_background_line_with_empty_boundary_words_round_trips() {
        let host = line(vec![word("main", 1000, 2000)], 1000, 3000);
        let mut lone = line(vec![word("", 2000, 3000)], 2000, 3000);
        lone.is_background = true;
        let second_host = line(vec![word("next", 4000, 5000)], 4000, 6000);
        let mut framed = line(
            vec![word("", 5000, 5200), word("mid", 5200, 5800), word("", 5800, 6000)],
            5000,
            6000,
        );
        framed.is_background = true;
        let document = LyricDocument::new(
            MetadataMap::new(),
            Vec::new(),
            vec![host, lone, second_host, framed],
        );

        for options in [compact(), TtmlGenerationOptions::default()] {
            let output = generate_ttml(&document, &options).unwrap();
            let reparsed = parse_ttml(&output, &Default::default());
            assert!(reparsed.warnings.is_empty(), "{:?}", reparsed.warnings);
            assert!(reparsed.document.eq_ignoring_ids(&document), "{output}");
        }
    }

    #[test]
    fn test_metadata_and_aux_tracks_round_trip() {
        let mut metadata = MetadataMap::new();
        metadata.add("title", "Song & Dance");
        metadata.add("songwriter", "Someone");
        metadata.add("songwriter", "Another");
        let vocal_tags = vec![VocalTag {
            id: "lead".to_string(),
            name: "Lead".to_string(),
        }];

        let mut first = line(vec![word("は", 0, 500), word("ろ", 500, 1000)], 0, 1000);
        first.translated_lyric = "你好".to_string();
        first.roman_lyric = "ha ro".to_string();
        first.words[0].roman_word = "ha".to_string();
        first.words[1].roman_word = "ro".to_string();
        first.vocal = Some(vec!["lead".to_string()]);
        let mut second = line(vec![word("x", 1000, 2000)], 1000, 2000);
        second.ignore_sync = true;

        let document = LyricDocument::new(metadata, vocal_tags, vec![first, second]);
        let output = generate_ttml(&document, &compact()).unwrap();
        assert!(output.contains("<songwriter>Someone</songwriter>"));
        assert!(output.contains(r#"<text for="L1">你好</text>"#));
        assert!(!output.contains("xml:lang"));

        let parsed = parse_ttml(&output, &Default::default());
        assert!(parsed.warnings.is_empty());
        assert!(parsed.document.eq_ignoring_ids(&document));
    }

    #[test]
    fn test_formatted_and_compact_output_decode_identically() {
        let mut first = line(vec![word("a", 0, 100), LyricWord::new(" ", 0, 0), word("b", 100, 200)], 0, 200);
        first.translated_lyric = "甲乙".to_string();
        let document = LyricDocument::new(MetadataMap::new(), Vec::new(), vec![first]);

        let formatted = generate_ttml(&document, &TtmlGenerationOptions::default()).unwrap();
        let compact_output = generate_ttml(&document, &compact()).unwrap();
        assert_ne!(formatted, compact_output);

        let a = parse_ttml(&formatted, &Default::default()).document;
        let b = parse_ttml(&compact_output, &Default::default()).document;
        assert!(a.eq_ignoring_ids(&document));
        assert!(b.eq_ignoring_ids(&document));
    }
}
