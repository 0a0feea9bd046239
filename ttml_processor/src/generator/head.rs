//! # TTML 生成器 - Head 处理模块
//!
//! 该模块负责生成 TTML 文件的 `<head>` 部分，包括演唱者、元数据、演唱者标签，
//! 以及 `<iTunesMetadata>` 中按 `itunes:key` 关联的翻译和音译。

use std::{borrow::Cow, io::Write};

use lyric_core::{LyricDocument, RomanFragment, TtmlError};
use quick_xml::{
    Writer,
    events::{BytesText, Event},
};

use super::utils::{
    LineGroup, TextField, collect_group_values, fragment_languages, fragments_value,
    is_language_tagged, text_languages, text_value,
};
use crate::{
    parser::constants::{
        AGENT_TYPE_PERSON, ATTR_BEGIN, ATTR_END, ATTR_FOR, ATTR_ID, ATTR_KEY, ATTR_NAME,
        ATTR_ROLE, ATTR_TYPE, ATTR_VALUE, ATTR_XML_ID, ATTR_XML_LANG, DEFAULT_MAIN_AGENT_ID,
        DUET_AGENT_ID, NS_ITUNES, ROLE_BACKGROUND, SONGWRITER_KEY, TAG_HEAD, TAG_SONGWRITER,
        TAG_SPAN, TAG_TEXT, TAG_TRANSLATION, TAG_TRANSLITERATION,
    },
    utils::format_timestamp,
};

type FragmentValue<'a> = Cow<'a, [RomanFragment]>;

/// 一个 `<text for="...">` 条目：宿主行的值，以及按顺序对应背景行的值。
struct Entry<'a, T> {
    key: &'a str,
    main: Option<T>,
    backgrounds: Vec<Option<T>>,
}

/// 一个 `<translation>` 或 `<transliteration>` 块。
struct AuxBlock<'a> {
    lang: Option<String>,
    texts: Vec<Entry<'a, &'a str>>,
    fragments: Vec<Entry<'a, FragmentValue<'a>>>,
}

impl AuxBlock<'_> {
    const fn is_empty(&self) -> bool {
        self.texts.is_empty() && self.fragments.is_empty()
    }
}

pub(super) fn write_ttml_head<W: Write>(
    writer: &mut Writer<W>,
    document: &LyricDocument,
    groups: &[LineGroup<'_>],
) -> Result<(), TtmlError> {
    let tagged = is_language_tagged(&document.lines);
    let translations = collect_translation_blocks(document, groups, tagged);
    let transliterations = collect_transliteration_blocks(document, groups, tagged);
    let songwriters = document
        .metadata
        .get_multiple_values(SONGWRITER_KEY)
        .map(Vec::as_slice)
        .unwrap_or_default();

    writer
        .create_element(TAG_HEAD)
        .write_inner_content(|writer| {
            writer
                .create_element("metadata")
                .write_inner_content(|writer| {
                    write_agents(writer, document)?;
                    write_amll_metadata(writer, document)?;

                    if !songwriters.is_empty()
                        || !translations.is_empty()
                        || !transliterations.is_empty()
                    {
                        writer
                            .create_element("iTunesMetadata")
                            .with_attribute(("xmlns", NS_ITUNES))
                            .write_inner_content(|writer| {
                                write_songwriters(writer, songwriters)?;
                                write_aux_blocks(
                                    writer,
                                    "translations",
                                    TAG_TRANSLATION,
                                    &translations,
                                )?;
                                write_aux_blocks(
                                    writer,
                                    "transliterations",
                                    TAG_TRANSLITERATION,
                                    &transliterations,
                                )?;
                                Ok(())
                            })?;
                    }
                    Ok(())
                })?;
            Ok(())
        })?;
    Ok(())
}

/// 写入 `<ttm:agent>` 元素。存在对唱行时额外声明对唱演唱者。
fn write_agents<W: Write>(
    writer: &mut Writer<W>,
    document: &LyricDocument,
) -> std::io::Result<()> {
    let mut agents = vec![DEFAULT_MAIN_AGENT_ID];
    if document.lines.iter().any(|line| line.is_duet) {
        agents.push(DUET_AGENT_ID);
    }
    for agent in agents {
        writer
            .create_element("ttm:agent")
            .with_attribute((ATTR_TYPE, AGENT_TYPE_PERSON))
            .with_attribute((ATTR_XML_ID, agent))
            .write_empty()?;
    }
    Ok(())
}

/// 写入 `<amll:meta>` 和 `<amll:vocal-tag>` 元素。词作者写在 `<iTunesMetadata>` 中。
fn write_amll_metadata<W: Write>(
    writer: &mut Writer<W>,
    document: &LyricDocument,
) -> std::io::Result<()> {
    for (key, values) in document.metadata.iter() {
        if key == SONGWRITER_KEY {
            continue;
        }
        for value in values {
            writer
                .create_element("amll:meta")
                .with_attribute((ATTR_KEY, key.as_str()))
                .with_attribute((ATTR_VALUE, value.as_str()))
                .write_empty()?;
        }
    }

    for tag in document.vocal_tags.iter() {
        writer
            .create_element("amll:vocal-tag")
            .with_attribute((ATTR_ID, tag.id.as_str()))
            .with_attribute((ATTR_NAME, tag.name.as_str()))
            .write_empty()?;
    }
    Ok(())
}

fn write_songwriters<W: Write>(writer: &mut Writer<W>, songwriters: &[String]) -> std::io::Result<()> {
    if songwriters.is_empty() {
        return Ok(());
    }
    writer
        .create_element("songwriters")
        .write_inner_content(|writer| {
            for name in songwriters {
                writer
                    .create_element(TAG_SONGWRITER)
                    .write_text_content(BytesText::new(name))?;
            }
            Ok(())
        })?;
    Ok(())
}

/// 文档按语言标记时每种语言一个块，否则只有一个不带 `xml:lang` 的块。
fn languages_for(tagged: bool, langs: impl IntoIterator<Item = String>) -> Vec<Option<String>> {
    if tagged {
        langs.into_iter().map(Some).collect()
    } else {
        vec![None]
    }
}

fn collect_translation_blocks<'a>(
    document: &'a LyricDocument,
    groups: &'a [LineGroup<'a>],
    tagged: bool,
) -> Vec<AuxBlock<'a>> {
    languages_for(tagged, text_languages(&document.lines, TextField::Translation))
        .into_iter()
        .map(|lang| {
            let texts = text_entries(groups, TextField::Translation, lang.as_deref());
            AuxBlock {
                lang,
                texts,
                fragments: Vec::new(),
            }
        })
        .filter(|block| !block.is_empty())
        .collect()
}

fn collect_transliteration_blocks<'a>(
    document: &'a LyricDocument,
    groups: &'a [LineGroup<'a>],
    tagged: bool,
) -> Vec<AuxBlock<'a>> {
    let mut langs = text_languages(&document.lines, TextField::Romanization);
    langs.extend(fragment_languages(&document.lines));

    languages_for(tagged, langs)
        .into_iter()
        .map(|lang| {
            let texts = text_entries(groups, TextField::Romanization, lang.as_deref());
            let fragments = groups
                .iter()
                .filter_map(|group| {
                    collect_group_values(group, |line| fragments_value(line, lang.as_deref())).map(
                        |(main, backgrounds)| Entry {
                            key: group.key.as_str(),
                            main,
                            backgrounds,
                        },
                    )
                })
                .collect();
            AuxBlock {
                lang,
                texts,
                fragments,
            }
        })
        .filter(|block| !block.is_empty())
        .collect()
}

fn text_entries<'a>(
    groups: &'a [LineGroup<'a>],
    field: TextField,
    lang: Option<&str>,
) -> Vec<Entry<'a, &'a str>> {
    groups
        .iter()
        .filter_map(|group| {
            collect_group_values(group, |line| text_value(line, field, lang)).map(
                |(main, backgrounds)| Entry {
                    key: group.key.as_str(),
                    main,
                    backgrounds,
                },
            )
        })
        .collect()
}

fn write_aux_blocks<W: Write>(
    writer: &mut Writer<W>,
    container_tag: &str,
    item_tag: &str,
    blocks: &[AuxBlock<'_>],
) -> std::io::Result<()> {
    if blocks.is_empty() {
        return Ok(());
    }
    writer
        .create_element(container_tag)
        .write_inner_content(|writer| {
            for block in blocks {
                let mut item = writer.create_element(item_tag);
                if item_tag == TAG_TRANSLATION {
                    item = item.with_attribute((ATTR_TYPE, "subtitle"));
                }
                if let Some(lang) = &block.lang {
                    item = item.with_attribute((ATTR_XML_LANG, lang.as_str()));
                }
                item.write_inner_content(|writer| {
                    for entry in &block.texts {
                        write_text_entry(writer, entry)?;
                    }
                    for entry in &block.fragments {
                        write_fragment_entry(writer, entry)?;
                    }
                    Ok(())
                })?;
            }
            Ok(())
        })?;
    Ok(())
}

/// `<text for="L1">主文本<span ttm:role="x-bg">(背景文本)</span></text>`
fn write_text_entry<W: Write>(writer: &mut Writer<W>, entry: &Entry<'_, &str>) -> std::io::Result<()> {
    writer
        .create_element(TAG_TEXT)
        .with_attribute((ATTR_FOR, entry.key))
        .write_inner_content(|writer| {
            if let Some(main) = entry.main {
                writer.write_event(Event::Text(BytesText::new(main)))?;
            }
            for background in &entry.backgrounds {
                let span = writer
                    .create_element(TAG_SPAN)
                    .with_attribute((ATTR_ROLE, ROLE_BACKGROUND));
                match background {
                    Some(text) => {
                        span.write_text_content(BytesText::new(&format!("({text})")))?;
                    }
                    None => {
                        span.write_empty()?;
                    }
                }
            }
            Ok(())
        })?;
    Ok(())
}

/// 逐字音译条目，每个片段一个带时间的 `<span>`。
fn write_fragment_entry<W: Write>(
    writer: &mut Writer<W>,
    entry: &Entry<'_, FragmentValue<'_>>,
) -> std::io::Result<()> {
    writer
        .create_element(TAG_TEXT)
        .with_attribute((ATTR_FOR, entry.key))
        .write_inner_content(|writer| {
            if let Some(main) = &entry.main {
                write_fragments(writer, main)?;
            }
            for background in &entry.backgrounds {
                let span = writer
                    .create_element(TAG_SPAN)
                    .with_attribute((ATTR_ROLE, ROLE_BACKGROUND));
                match background {
                    Some(fragments) => {
                        span.write_inner_content(|writer| write_fragments(writer, fragments))?;
                    }
                    None => {
                        span.write_empty()?;
                    }
                }
            }
            Ok(())
        })?;
    Ok(())
}

fn write_fragments<W: Write>(writer: &mut Writer<W>, fragments: &[RomanFragment]) -> std::io::Result<()> {
    for fragment in fragments {
        writer
            .create_element(TAG_SPAN)
            .with_attribute((ATTR_BEGIN, format_timestamp(fragment.start_time).as_str()))
            .with_attribute((ATTR_END, format_timestamp(fragment.end_time).as_str()))
            .write_text_content(BytesText::new(&fragment.text))?;
    }
    Ok(())
}
