//! 回放按键记录。
//!
//! 按键记录是一个 JSON 数组，每一项是一次按键和按键时的播放位置：
//!
//! ```json
//! [
//!   { "action": "next", "time_ms": 1200.0 },
//!   { "action": "next", "time_ms": 1650.0, "down_time_offset": 30.0 }
//! ]
//! ```

use lyric_core::{LyricDocument, SyncOptions, TtmlError};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::sync::{DocumentStore, KeyEvent, ManualClock, MemoryDocumentStore, SyncEngine};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplayAction {
    Start,
    Next,
    End,
    NextUnit,
    PrevUnit,
    NextLine,
    PrevLine,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayEvent {
    pub action: ReplayAction,
    /// 按键时的播放位置（毫秒）
    pub time_ms: f64,
    #[serde(default)]
    pub down_time_offset: f64,
}

/// 回放结果
#[derive(Debug, Clone)]
pub struct ReplayOutcome {
    pub document: LyricDocument,
    /// 被引擎拒绝（无法确定目标）的按键数量
    pub rejected: usize,
    /// 提交到文档的修改次数
    pub revisions: u64,
}

/// 读取 JSON 格式的按键记录。
pub fn parse_events(json: &str) -> Result<Vec<ReplayEvent>, TtmlError> {
    Ok(serde_json::from_str(json)?)
}

/// 从文档的第一个可同步单元开始，依次回放按键。
pub fn replay(document: LyricDocument, options: SyncOptions, events: &[ReplayEvent]) -> ReplayOutcome {
    let mut store = MemoryDocumentStore::new(document);
    let mut engine = SyncEngine::new(options);
    let clock = ManualClock::default();

    if !engine.select_first(store.get()) {
        warn!("文档中没有可同步的单元。");
    }

    let mut rejected = 0;
    for event in events {
        clock.set_time_ms(event.time_ms);
        let key = KeyEvent::new(event.down_time_offset).with_clock_time_at_key_down(event.time_ms);
        let accepted = match event.action {
            ReplayAction::Start => engine.mark_start(&mut store, &clock, &key),
            ReplayAction::Next => engine.mark_next(&mut store, &clock, &key),
            ReplayAction::End => engine.mark_end(&mut store, &clock, &key),
            ReplayAction::NextUnit => engine.next_unit(store.get(), &clock, false),
            ReplayAction::PrevUnit => engine.prev_unit(store.get(), &clock, false),
            ReplayAction::NextLine => engine.next_line(store.get()),
            ReplayAction::PrevLine => engine.prev_line(store.get()),
        };
        if !accepted {
            rejected += 1;
        }
    }

    info!(
        events = events.len(),
        rejected,
        revisions = store.revision(),
        "按键回放完成"
    );
    let revisions = store.revision();
    ReplayOutcome {
        document: store.into_document(),
        rejected,
        revisions,
    }
}

#[cfg(test)]
mod tests {
    use lyric_core::{LyricLine, LyricWord, MetadataMap};

    use super::*;

    #[test]
    fn test_replay_events_from_json() {
        let mut line = LyricLine::new();
        line.words = vec![LyricWord::new("a", 0, 0), LyricWord::new("b", 0, 0)];
        let document = LyricDocument::new(MetadataMap::new(), Vec::new(), vec![line]);

        let events = parse_events(
            r#"[
                {"action": "start", "time_ms": 1000},
                {"action": "next", "time_ms": 1500.7},
                {"action": "next", "time_ms": 2100, "down_time_offset": 100},
                {"action": "next_line", "time_ms": 2200}
            ]"#,
        )
        .unwrap();

        let outcome = replay(document, SyncOptions::default(), &events);
        let line = &outcome.document.lines[0];
        assert_eq!((line.words[0].start_time, line.words[0].end_time), (1000, 1500));
        assert_eq!((line.words[1].start_time, line.words[1].end_time), (1500, 2000));
        assert_eq!((line.start_time, line.end_time), (1000, 2000));
        assert_eq!(outcome.revisions, 3);
        assert_eq!(outcome.rejected, 1);
    }

    #[test]
    fn test_invalid_events_are_rejected() {
        assert!(matches!(parse_events(r#"[{"action": "jump"}]"#), Err(TtmlError::Json(_))));
        assert!(parse_events("[]").unwrap().is_empty());
    }
}
