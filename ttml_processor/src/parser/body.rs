//! # TTML 解析器 - 正文处理
//!
//! 深度优先遍历 `<p>` 元素构建歌词行。嵌套的背景 span 会被递归解析为独立的行，
//! 并紧跟在宿主行之后输出。

use lyric_core::{LyricLine, LyricWord, RomanFragment, RubyWord, TtmlParsingOptions};
use tracing::trace;

use super::{
    constants::{
        ATTR_AGENT, ATTR_AGENT_ALIAS, ATTR_BEGIN, ATTR_EMPTY_BEAT, ATTR_END, ATTR_IGNORE_SYNC,
        ATTR_ITUNES_KEY, ATTR_OBSCENE, ATTR_RUBY, ATTR_VOCAL, ROLE_BACKGROUND, ROLE_ROMANIZATION,
        ROLE_TRANSLATION, RUBY_BASE, RUBY_CONTAINER, RUBY_TEXT, TAG_HEAD, TAG_P, TAG_SPAN,
    },
    metadata::lang_of,
    state::{AuxKind, AuxTables, AuxTrack, TrackAux},
    tree::{XmlElement, XmlNode, is_formatting_whitespace},
    utils::{SpanTiming, get_time_attribute, get_timing, parse_flag, role_of, split_aux_text},
};

/// 正文解析需要的文档级信息。
pub(super) struct BodyContext<'a> {
    pub(super) tables: &'a AuxTables,
    pub(super) main_agent_id: &'a str,
    pub(super) options: &'a TtmlParsingOptions,
}

/// 从宿主行传递给背景行的信息。
#[derive(Debug, Clone)]
struct LineFrame {
    key: Option<String>,
    is_duet: bool,
    is_background: bool,
    track: AuxTrack,
}

/// 解析过程中的音节，`timed` 表示时间来自 span 自身。
#[derive(Debug)]
struct PendingWord {
    word: LyricWord,
    timed: bool,
}

/// 一行中直接收集到的内容。
#[derive(Debug, Default)]
struct LineContent<'a> {
    words: Vec<PendingWord>,
    backgrounds: Vec<&'a XmlElement>,
    inline: TrackAux,
}

/// 遍历文档，按输出顺序返回所有行。
pub(super) fn collect_lines(
    root: &XmlElement,
    ctx: &BodyContext,
    warnings: &mut Vec<String>,
) -> Vec<LyricLine> {
    let mut lines = Vec::new();
    visit_for_lines(root, ctx, &mut lines, warnings);
    lines
}

fn visit_for_lines(
    element: &XmlElement,
    ctx: &BodyContext,
    lines: &mut Vec<LyricLine>,
    warnings: &mut Vec<String>,
) {
    for child in element.child_elements() {
        match child.local_name() {
            TAG_HEAD => {}
            TAG_P => handle_p_element(child, ctx, lines, warnings),
            _ => visit_for_lines(child, ctx, lines, warnings),
        }
    }
}

fn handle_p_element(
    p: &XmlElement,
    ctx: &BodyContext,
    lines: &mut Vec<LyricLine>,
    warnings: &mut Vec<String>,
) {
    let key = p
        .attr(&[ATTR_ITUNES_KEY])
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_string);
    let is_duet = p
        .attr(&[ATTR_AGENT, ATTR_AGENT_ALIAS])
        .map(str::trim)
        .is_some_and(|agent| agent != ctx.main_agent_id);

    let frame = LineFrame {
        key,
        is_duet,
        is_background: role_of(p) == Some(ROLE_BACKGROUND),
        track: AuxTrack::Main,
    };
    let mut background_count = 0;
    parse_line_element(p, &frame, ctx, &mut background_count, lines, warnings);
}

/// 解析一行，随后按顺序解析它的背景行。
fn parse_line_element(
    element: &XmlElement,
    frame: &LineFrame,
    ctx: &BodyContext,
    background_count: &mut usize,
    lines: &mut Vec<LyricLine>,
    warnings: &mut Vec<String>,
) {
    let mut content = LineContent::default();
    collect_line_content(element, &mut content, warnings);

    let mut pending = content.words;
    if frame.is_background {
        strip_background_word_parentheses(&mut pending);
    }

    let mut line = LyricLine::new();
    line.is_background = frame.is_background;
    line.is_duet = frame.is_duet;
    line.ignore_sync = parse_flag(element.attr(&[ATTR_IGNORE_SYNC]));
    line.vocal = parse_vocal_ids(element.attr(&[ATTR_VOCAL]));

    let derived = derive_span(&pending);
    line.start_time = get_time_attribute(element, &[ATTR_BEGIN], warnings)
        .or(derived.map(|(start, _)| start))
        .unwrap_or(0);
    line.end_time = get_time_attribute(element, &[ATTR_END], warnings)
        .or(derived.map(|(_, end)| end))
        .unwrap_or(0);

    // 不带计时的非空白文本沿用行的时间
    let (line_start, line_end) = (line.start_time, line.end_time);
    line.words = pending
        .into_iter()
        .map(|PendingWord { mut word, timed }| {
            if !timed && !word.is_blank() {
                word.start_time = line_start;
                word.end_time = line_end;
            }
            word
        })
        .collect();

    let resolved = ctx.tables.resolve(
        frame.key.as_deref(),
        frame.track,
        &content.inline,
        ctx.options,
    );
    line.translated_lyric = resolved.translated_lyric;
    line.translated_lyric_by_lang = resolved.translated_lyric_by_lang;
    line.roman_lyric = resolved.roman_lyric;
    line.roman_lyric_by_lang = resolved.roman_lyric_by_lang;
    line.word_romanization_by_lang = resolved.word_romanization_by_lang;
    assign_word_romanization(&mut line.words, resolved.roman_pool);

    lines.push(line);

    for background in content.backgrounds {
        let background_frame = LineFrame {
            key: frame.key.clone(),
            is_duet: frame.is_duet,
            is_background: true,
            track: AuxTrack::Background(*background_count),
        };
        *background_count += 1;
        parse_line_element(
            background,
            &background_frame,
            ctx,
            background_count,
            lines,
            warnings,
        );
    }
}

fn collect_line_content<'a>(
    element: &'a XmlElement,
    content: &mut LineContent<'a>,
    warnings: &mut Vec<String>,
) {
    for child in &element.children {
        match child {
            XmlNode::Text(text) => {
                if is_formatting_whitespace(text) {
                    continue;
                }
                content.words.push(PendingWord {
                    word: LyricWord::new(text.as_str(), 0, 0),
                    timed: false,
                });
            }
            XmlNode::Element(span) if span.local_name() == TAG_SPAN => {
                collect_span(span, content, warnings);
            }
            XmlNode::Element(_) => {}
        }
    }
}

fn collect_span<'a>(span: &'a XmlElement, content: &mut LineContent<'a>, warnings: &mut Vec<String>) {
    match role_of(span) {
        Some(ROLE_BACKGROUND) => {
            content.backgrounds.push(span);
            return;
        }
        Some(role @ (ROLE_TRANSLATION | ROLE_ROMANIZATION)) => {
            let kind = if role == ROLE_TRANSLATION {
                AuxKind::Translation
            } else {
                AuxKind::Romanization
            };
            let split = split_aux_text(span, warnings);
            content.inline.push(kind, lang_of(span), &split.main);
            return;
        }
        _ => {}
    }

    if span.attr(&[ATTR_RUBY]) == Some(RUBY_CONTAINER) {
        content.words.push(parse_ruby_container(span, warnings));
        return;
    }

    match get_timing(span, warnings) {
        SpanTiming::Timed { start, end } => {
            let mut word = LyricWord::new(span.text_content(), start, end);
            apply_word_attributes(span, &mut word, warnings);
            content.words.push(PendingWord { word, timed: true });
        }
        SpanTiming::Untimed => collect_line_content(span, content, warnings),
        SpanTiming::Malformed => {}
    }
}

fn parse_ruby_container(container: &XmlElement, warnings: &mut Vec<String>) -> PendingWord {
    let base = container
        .descendants()
        .find(|element| element.attr(&[ATTR_RUBY]) == Some(RUBY_BASE))
        .map_or_else(|| direct_text(container), XmlElement::text_content);

    let mut rubies = Vec::new();
    for ruby in container
        .descendants()
        .filter(|element| element.attr(&[ATTR_RUBY]) == Some(RUBY_TEXT))
    {
        match get_timing(ruby, warnings) {
            SpanTiming::Timed { start, end } => {
                rubies.push(RubyWord::new(ruby.text_content(), start, end));
            }
            SpanTiming::Untimed => {
                warnings.push(format!("注音 '{}' 缺少计时，已忽略。", ruby.text_content()));
            }
            SpanTiming::Malformed => {}
        }
    }

    let mut word = LyricWord::new(base, 0, 0);
    apply_word_attributes(container, &mut word, warnings);

    let timed = if rubies.is_empty() {
        match get_timing(container, warnings) {
            SpanTiming::Timed { start, end } => {
                word.start_time = start;
                word.end_time = end;
                true
            }
            SpanTiming::Untimed | SpanTiming::Malformed => false,
        }
    } else {
        word.ruby = Some(rubies);
        word.sync_span_from_ruby();
        true
    };

    PendingWord { word, timed }
}

fn direct_text(element: &XmlElement) -> String {
    element
        .children
        .iter()
        .filter_map(|child| match child {
            XmlNode::Text(text) if !is_formatting_whitespace(text) => Some(text.as_str()),
            _ => None,
        })
        .collect()
}

fn apply_word_attributes(span: &XmlElement, word: &mut LyricWord, warnings: &mut Vec<String>) {
    if let Some(value) = span.attr(&[ATTR_EMPTY_BEAT]) {
        match value.trim().parse::<u32>() {
            Ok(count) => word.empty_beat = count,
            Err(err) => warnings.push(format!("空拍数 '{value}' 无效 ({err})，已忽略。")),
        }
    }
    word.obscene = parse_flag(span.attr(&[ATTR_OBSCENE]));
}

fn parse_vocal_ids(value: Option<&str>) -> Option<Vec<String>> {
    let ids: Vec<String> = value?
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect();
    (!ids.is_empty()).then_some(ids)
}

/// 由带计时的非空白音节推导行的时间跨度。
fn derive_span(words: &[PendingWord]) -> Option<(u64, u64)> {
    words
        .iter()
        .filter(|pending| pending.timed && !pending.word.is_blank())
        .map(|pending| (pending.word.start_time, pending.word.end_time))
        .reduce(|(start, end), (s, e)| (start.min(s), end.max(e)))
}

/// 去掉背景行首音节开头和末音节结尾的一个括号，变空的音节直接丢弃。
fn strip_background_word_parentheses(words: &mut Vec<PendingWord>) {
    if let Some(first) = words.first_mut()
        && let Some(rest) = first.word.word.strip_prefix(['(', '（'])
    {
        first.word.word = rest.to_string();
        if first.word.word.is_empty() {
            words.remove(0);
        }
    }
    if let Some(last) = words.last_mut()
        && let Some(rest) = last.word.word.strip_suffix([')', '）'])
    {
        last.word.word = rest.to_string();
        if last.word.word.is_empty() {
            words.pop();
        }
    }
}

/// 按 `(start_time, end_time)` 精确匹配，把片段分配给非空白音节。
///
/// 每个音节取池中第一个匹配的片段，用过的片段从池中移除。
fn assign_word_romanization(words: &mut [LyricWord], mut pool: Vec<RomanFragment>) {
    for word in words.iter_mut().filter(|word| !word.is_blank()) {
        if let Some(position) = pool.iter().position(|fragment| {
            fragment.start_time == word.start_time && fragment.end_time == word.end_time
        }) {
            word.roman_word = pool.remove(position).text;
        }
    }
    if !pool.is_empty() {
        trace!("{} 个逐字音译片段没有匹配的音节，已丢弃", pool.len());
    }
}
