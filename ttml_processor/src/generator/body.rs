//! # TTML 生成器 - Body 处理模块
//!
//! 该模块负责生成 TTML 文件的 `<body>` 部分。每组行写成一个 `<p>`，
//! 组内的背景行写成 `<p>` 末尾的 `<span ttm:role="x-bg">`。

use std::io::Write;

use lyric_core::{LyricDocument, LyricLine, TtmlError};
use quick_xml::{Writer, writer::ElementWriter};

use super::{track::write_words, utils::LineGroup};
use crate::{
    parser::constants::{
        ATTR_AGENT, ATTR_BEGIN, ATTR_END, ATTR_IGNORE_SYNC, ATTR_ITUNES_KEY, ATTR_ROLE, ATTR_VOCAL,
        DEFAULT_MAIN_AGENT_ID, DUET_AGENT_ID, ROLE_BACKGROUND, TAG_BODY, TAG_P, TAG_SPAN,
    },
    utils::format_timestamp,
};

/// 写入 `<body>`，包含一个覆盖所有行的 `<div>`。
pub(super) fn write_ttml_body<W: Write>(
    writer: &mut Writer<W>,
    document: &LyricDocument,
    groups: &[LineGroup<'_>],
) -> Result<(), TtmlError> {
    let duration = document.duration();
    let mut body_builder = writer.create_element(TAG_BODY);
    if duration > 0 {
        body_builder = body_builder.with_attribute(("dur", format_timestamp(duration).as_str()));
    }

    if groups.is_empty() {
        body_builder.write_empty()?;
        return Ok(());
    }

    let div_start = document
        .lines
        .iter()
        .map(|line| line.start_time)
        .min()
        .unwrap_or(0);

    body_builder.write_inner_content(|writer| {
        writer
            .create_element("div")
            .with_attribute((ATTR_BEGIN, format_timestamp(div_start).as_str()))
            .with_attribute((ATTR_END, format_timestamp(duration).as_str()))
            .write_inner_content(|writer| {
                for group in groups {
                    write_p_element(writer, group)?;
                }
                Ok(())
            })?;
        Ok(())
    })?;
    Ok(())
}

fn write_p_element<W: Write>(writer: &mut Writer<W>, group: &LineGroup<'_>) -> std::io::Result<()> {
    let host = group.host;
    let agent = if host.is_duet {
        DUET_AGENT_ID
    } else {
        DEFAULT_MAIN_AGENT_ID
    };

    let mut p_builder = with_line_attributes(
        writer
            .create_element(TAG_P)
            .with_attribute((ATTR_BEGIN, format_timestamp(host.start_time).as_str()))
            .with_attribute((ATTR_END, format_timestamp(host.end_time).as_str()))
            .with_attribute((ATTR_ITUNES_KEY, group.key.as_str()))
            .with_attribute((ATTR_AGENT, agent)),
        host,
    );
    if host.is_background {
        p_builder = p_builder.with_attribute((ATTR_ROLE, ROLE_BACKGROUND));
    }

    p_builder.write_inner_content(|writer| {
        write_words(writer, &host.words, host.is_background)?;
        for background in &group.backgrounds {
            with_line_attributes(
                writer
                    .create_element(TAG_SPAN)
                    .with_attribute((ATTR_ROLE, ROLE_BACKGROUND))
                    .with_attribute((ATTR_BEGIN, format_timestamp(background.start_time).as_str()))
                    .with_attribute((ATTR_END, format_timestamp(background.end_time).as_str())),
                background,
            )
            .write_inner_content(|writer| write_words(writer, &background.words, true))?;
        }
        Ok(())
    })?;
    Ok(())
}

/// 行级的可选属性：演唱者标签与跳过打轴标记。
fn with_line_attributes<'a, W: Write>(
    mut builder: ElementWriter<'a, W>,
    line: &LyricLine,
) -> ElementWriter<'a, W> {
    if let Some(vocal) = line.vocal.as_ref().filter(|ids| !ids.is_empty()) {
        builder = builder.with_attribute((ATTR_VOCAL, vocal.join(" ").as_str()));
    }
    if line.ignore_sync {
        builder = builder.with_attribute((ATTR_IGNORE_SYNC, "true"));
    }
    builder
}
