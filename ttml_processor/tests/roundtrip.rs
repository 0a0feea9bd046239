use lyric_core::{
    LyricDocument, TtmlGenerationOptions, TtmlParsingOptions, TtmlParsingOptionsBuilder,
};
use ttml_processor::{generate_ttml, parse_ttml};

const REAL_WORLD: &str = include_str!("test_data/real_world.ttml");
const MULTILANG: &str = include_str!("test_data/multilang.ttml");

fn decode(content: &str) -> LyricDocument {
    let parsed = parse_ttml(content, &TtmlParsingOptions::default());
    assert!(parsed.warnings.is_empty(), "{:?}", parsed.warnings);
    parsed.document
}

fn assert_round_trip(document: &LyricDocument) {
    for format in [true, false] {
        let options = TtmlGenerationOptions { format };
        let generated = generate_ttml(document, &options).unwrap();
        let reparsed = decode(&generated);
        assert!(
            reparsed.eq_ignoring_ids(document),
            "format = {format}\n{generated}"
        );

        let regenerated = generate_ttml(&reparsed, &options).unwrap();
        assert_eq!(generated, regenerated);
    }
}

#[test]
fn test_real_world_decodes() {
    let document = decode(REAL_WORLD);
    let lines = &document.lines;
    assert_eq!(lines.len(), 4);

    let first = &lines[0];
    assert_eq!((first.start_time, first.end_time), (10_000, 13_000));
    assert_eq!(first.vocal, Some(vec!["a".to_string()]));
    assert_eq!(first.translated_lyric, "星光闪耀的夜晚");
    assert_eq!(first.roman_lyric, "hoshi ga hikaru yoru");
    let texts: Vec<&str> = first.words.iter().map(|w| w.word.as_str()).collect();
    assert_eq!(texts, ["星", "が", "光る", "夜"]);
    let ruby = first.words[0].ruby.as_ref().unwrap();
    assert_eq!(ruby.len(), 2);
    assert_eq!((first.words[0].start_time, first.words[0].end_time), (10_000, 10_800));
    let romans: Vec<&str> = first.words.iter().map(|w| w.roman_word.as_str()).collect();
    assert_eq!(romans, ["hoshi", "ga", "hikaru", "yoru"]);

    let background = &lines[1];
    assert!(background.is_background);
    assert!(!background.is_duet);
    assert_eq!((background.start_time, background.end_time), (12_500, 13_500));
    let texts: Vec<&str> = background.words.iter().map(|w| w.word.as_str()).collect();
    assert_eq!(texts, ["ah", " ", "ah"]);
    assert_eq!(background.translated_lyric, "啊啊");

    let duet = &lines[2];
    assert!(duet.is_duet);
    assert_eq!(duet.words[0].empty_beat, 1);
    assert!(duet.words[2].obscene);
    assert_eq!(duet.translated_lyric, "闪耀吧");

    assert!(lines[3].ignore_sync);

    let metadata = &document.metadata;
    assert_eq!(
        metadata.get_multiple_values("artists"),
        Some(&vec!["Singer A".to_string(), "Singer B".to_string()])
    );
    assert_eq!(
        metadata.get_single_value("songwriter").map(String::as_str),
        Some("Writer One")
    );
    assert_eq!(document.vocal_tags.len(), 2);
}

#[test]
fn test_real_world_round_trip() {
    assert_round_trip(&decode(REAL_WORLD));
}

#[test]
fn test_multilang_decodes() {
    let document = decode(MULTILANG);
    let first = &document.lines[0];
    let translations = first.translated_lyric_by_lang.as_ref().unwrap();
    assert_eq!(translations.len(), 2);
    assert_eq!(first.translated_lyric, "Hello, world");
    assert!(first.roman_lyric_by_lang.is_none());
    assert_eq!(first.words[1].roman_word, "nichiwa");
    assert!(first.word_romanization_by_lang.as_ref().unwrap().contains_key("ja-Latn"));

    let second = &document.lines[1];
    assert_eq!(second.translated_lyric, "再见");
    assert!(second.word_romanization_by_lang.is_none());
}

#[test]
fn test_multilang_preferred_language() {
    let options = TtmlParsingOptionsBuilder::default()
        .preferred_translation_lang("zh-Hans")
        .build()
        .unwrap();
    let parsed = parse_ttml(MULTILANG, &options);
    assert_eq!(parsed.document.lines[0].translated_lyric, "你好，世界");
}

#[test]
fn test_multilang_round_trip() {
    let document = decode(MULTILANG);
    let generated = generate_ttml(&document, &TtmlGenerationOptions::default()).unwrap();
    assert!(generated.contains(r#"xml:lang="ja-Latn""#));
    assert!(generated.contains(r#"xml:lang="zh-Hans""#));
    assert_round_trip(&document);
}
