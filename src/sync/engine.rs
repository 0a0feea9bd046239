//! 打轴引擎。
//!
//! 引擎只持有会话状态；文档通过 [`DocumentStore`] 读取，每个操作最多提交一次。
//! 所有操作在无法确定目标（没有选中、没有下一个单元等）时返回 `false`，不做任何修改。

use lyric_core::{LyricDocument, LyricLine, SyncOptions, SyncUnit, TimeBoundary, synchronizable_units};
use tracing::{debug, trace};

use super::{
    clock::AudioClock,
    judge::{KeyEvent, judge_time},
    session::{SyncCursor, SyncSession},
    store::DocumentStore,
};

/// 一次时间戳写入。
#[derive(Debug, Clone)]
struct Stamp {
    line_index: usize,
    target: StampTarget,
    boundary: TimeBoundary,
    time: u64,
}

#[derive(Debug, Clone, Copy)]
enum StampTarget {
    Line,
    Word(usize),
    Ruby { word_index: usize, ruby_index: usize },
}

impl StampTarget {
    const fn of_unit(unit: &SyncUnit) -> Self {
        match unit.ruby_index {
            Some(ruby_index) => Self::Ruby {
                word_index: unit.word_index,
                ruby_index,
            },
            None => Self::Word(unit.word_index),
        }
    }
}

/// 光标在文档中的位置。
struct Position {
    line_index: usize,
    units: Vec<SyncUnit>,
    unit_index: usize,
}

impl Position {
    fn unit(&self) -> &SyncUnit {
        &self.units[self.unit_index]
    }

    const fn is_first(&self) -> bool {
        self.unit_index == 0
    }

    const fn is_last(&self) -> bool {
        self.unit_index + 1 == self.units.len()
    }
}

/// 打轴引擎。
#[derive(Debug, Clone, Default)]
pub struct SyncEngine {
    options: SyncOptions,
    session: SyncSession,
}

impl SyncEngine {
    pub fn new(options: SyncOptions) -> Self {
        Self {
            options,
            session: SyncSession::default(),
        }
    }

    /// 从保存的会话继续。
    pub const fn resume(options: SyncOptions, session: SyncSession) -> Self {
        Self { options, session }
    }

    pub const fn options(&self) -> &SyncOptions {
        &self.options
    }

    pub const fn session(&self) -> &SyncSession {
        &self.session
    }

    pub fn into_session(self) -> SyncSession {
        self.session
    }

    /// 选中一行。`unit_id` 为 `None` 时选中该行第一个可同步单元。
    pub fn select(&mut self, document: &LyricDocument, line_id: &str, unit_id: Option<&str>) -> bool {
        let Some(line) = document.line(line_id) else {
            return false;
        };
        let units = synchronizable_units(line);
        let unit_id = match unit_id {
            Some(id) if units.iter().any(|unit| unit.id == id) => Some(id.to_string()),
            Some(_) => return false,
            None => units.first().map(|unit| unit.id.clone()),
        };
        self.move_cursor(SyncCursor::new(line_id, unit_id));
        true
    }

    /// 选中文档中第一个可同步单元。
    pub fn select_first(&mut self, document: &LyricDocument) -> bool {
        match first_unit_from(document, 0) {
            Some((line_index, unit)) => {
                let line_id = document.lines[line_index].id.clone();
                self.move_cursor(SyncCursor::new(line_id, Some(unit.id)));
                true
            }
            None => false,
        }
    }

    /// 给当前单元打上开始时间。
    pub fn mark_start<S, C>(&mut self, store: &mut S, clock: &C, event: &KeyEvent) -> bool
    where
        S: DocumentStore,
        C: AudioClock + ?Sized,
    {
        let Some(position) = self.position(store.get()) else {
            return false;
        };
        let time = judge_time(self.options.judge_mode, clock, event);
        let unit = position.unit();

        if self.options.smart_first_word && position.is_first() {
            self.session.smart_first_word_active_id = Some(unit.id.clone());
        }
        debug!(unit = %unit.id, time, "标记开始时间");
        commit(store, start_stamps(position.line_index, unit, position.is_first(), time))
    }

    /// 主打轴键：结束当前单元并开始下一个单元。
    pub fn mark_next<S, C>(&mut self, store: &mut S, clock: &C, event: &KeyEvent) -> bool
    where
        S: DocumentStore,
        C: AudioClock + ?Sized,
    {
        let document = store.get();
        let Some(position) = self.position(document) else {
            return false;
        };
        let time = judge_time(self.options.judge_mode, clock, event);
        let unit = position.unit();
        let line_index = position.line_index;

        if self.options.smart_first_word
            && position.is_first()
            && self.session.smart_first_word_active_id.as_deref() != Some(unit.id.as_str())
        {
            self.session.smart_first_word_active_id = Some(unit.id.clone());
            debug!(unit = %unit.id, time, "智能行首：重新标记开始时间");
            return commit(store, start_stamps(line_index, unit, true, time));
        }

        if !unit.is_ruby() {
            let empty_beat = document.lines[line_index].words[unit.word_index].empty_beat;
            if self.session.empty_beat_count < empty_beat {
                self.session.empty_beat_count += 1;
                trace!(
                    unit = %unit.id,
                    count = self.session.empty_beat_count,
                    empty_beat,
                    "空拍"
                );
                return true;
            }
        }

        let mut stamps = end_stamps(line_index, unit, position.is_last(), time);
        let next = next_unit_after(document, line_index, Some(position.unit_index));

        if self.options.smart_last_word && position.is_last() {
            debug!(unit = %unit.id, time, "智能行尾：结束本行");
        } else if let Some((next_line_index, next_unit)) = &next {
            let is_first_of_line = *next_line_index != line_index;
            stamps.extend(start_stamps(*next_line_index, next_unit, is_first_of_line, time));
            debug!(unit = %unit.id, next = %next_unit.id, time, "标记并前进");
        } else {
            debug!(unit = %unit.id, time, "标记最后一个单元");
        }

        let committed = commit(store, stamps);
        if let Some((next_line_index, next_unit)) = next {
            self.advance_to(store.get(), next_line_index, next_unit);
        } else {
            self.session.empty_beat_count = 0;
        }
        committed
    }

    /// 只结束当前单元，然后前进，不给下一个单元打开始时间。
    pub fn mark_end<S, C>(&mut self, store: &mut S, clock: &C, event: &KeyEvent) -> bool
    where
        S: DocumentStore,
        C: AudioClock + ?Sized,
    {
        let document = store.get();
        let Some(position) = self.position(document) else {
            return false;
        };
        let time = judge_time(self.options.judge_mode, clock, event);
        let unit = position.unit();
        let next = next_unit_after(document, position.line_index, Some(position.unit_index));
        debug!(unit = %unit.id, time, "标记结束时间");

        let committed = commit(
            store,
            end_stamps(position.line_index, unit, position.is_last(), time),
        );
        if let Some((next_line_index, next_unit)) = next {
            self.advance_to(store.get(), next_line_index, next_unit);
        }
        committed
    }

    /// 选中下一个可同步单元，可以跨行。
    pub fn next_unit<C: AudioClock + ?Sized>(
        &mut self,
        document: &LyricDocument,
        clock: &C,
        seek: bool,
    ) -> bool {
        let Some((line_index, unit_index)) = self.cursor_indices(document) else {
            return false;
        };
        let Some((target_line, unit)) = next_unit_after(document, line_index, unit_index) else {
            return false;
        };
        if seek {
            seek_to(clock, unit.start_time);
        }
        self.advance_to(document, target_line, unit);
        true
    }

    /// 选中上一个可同步单元，可以跨行。
    pub fn prev_unit<C: AudioClock + ?Sized>(
        &mut self,
        document: &LyricDocument,
        clock: &C,
        seek: bool,
    ) -> bool {
        let Some((line_index, unit_index)) = self.cursor_indices(document) else {
            return false;
        };
        let Some((target_line, unit)) = prev_unit_before(document, line_index, unit_index) else {
            return false;
        };
        if seek {
            seek_to(clock, unit.start_time);
        }
        self.advance_to(document, target_line, unit);
        true
    }

    /// 选中下一行的第一个可同步单元；该行没有可同步单元时只选中行。
    pub fn next_line(&mut self, document: &LyricDocument) -> bool {
        let Some((line_index, _)) = self.cursor_indices(document) else {
            return false;
        };
        self.select_line_at(document, line_index + 1)
    }

    /// 选中上一行的第一个可同步单元；该行没有可同步单元时只选中行。
    pub fn prev_line(&mut self, document: &LyricDocument) -> bool {
        let Some((line_index, _)) = self.cursor_indices(document) else {
            return false;
        };
        line_index
            .checked_sub(1)
            .is_some_and(|index| self.select_line_at(document, index))
    }

    /// 跳到当前行第一个可同步单元，并让播放位置跟过去。
    pub fn go_to_line_first_unit<C: AudioClock + ?Sized>(
        &mut self,
        document: &LyricDocument,
        clock: &C,
    ) -> bool {
        self.jump_within_line(document, clock, |units| units.first())
    }

    /// 跳到当前行最后一个可同步单元，并让播放位置跟过去。
    pub fn go_to_line_last_unit<C: AudioClock + ?Sized>(
        &mut self,
        document: &LyricDocument,
        clock: &C,
    ) -> bool {
        self.jump_within_line(document, clock, |units| units.last())
    }

    fn jump_within_line<C: AudioClock + ?Sized>(
        &mut self,
        document: &LyricDocument,
        clock: &C,
        pick: impl FnOnce(&[SyncUnit]) -> Option<&SyncUnit>,
    ) -> bool {
        let Some((line_index, _)) = self.cursor_indices(document) else {
            return false;
        };
        let units = synchronizable_units(&document.lines[line_index]);
        let Some(unit) = pick(units.as_slice()) else {
            return false;
        };
        seek_to(clock, unit.start_time);
        self.advance_to(document, line_index, unit.clone());
        true
    }

    fn select_line_at(&mut self, document: &LyricDocument, line_index: usize) -> bool {
        let Some(line) = document.lines.get(line_index) else {
            return false;
        };
        let unit_id = synchronizable_units(line).into_iter().next().map(|unit| unit.id);
        debug!(line = %line.id, unit = ?unit_id, "选中行");
        self.move_cursor(SyncCursor::new(line.id.clone(), unit_id));
        true
    }

    fn advance_to(&mut self, document: &LyricDocument, line_index: usize, unit: SyncUnit) {
        let line_id = document.lines[line_index].id.clone();
        self.move_cursor(SyncCursor::new(line_id, Some(unit.id)));
    }

    fn move_cursor(&mut self, cursor: SyncCursor) {
        self.session.cursor = Some(cursor);
        self.session.empty_beat_count = 0;
    }

    /// 光标所在行的位置，以及选中单元在行内的位置。
    fn cursor_indices(&self, document: &LyricDocument) -> Option<(usize, Option<usize>)> {
        let cursor = self.session.cursor.as_ref()?;
        let line_index = document.line_index(&cursor.line_id)?;
        let unit_index = cursor.unit_id.as_deref().and_then(|unit_id| {
            synchronizable_units(&document.lines[line_index])
                .iter()
                .position(|unit| unit.id == unit_id)
        });
        Some((line_index, unit_index))
    }

    fn position(&self, document: &LyricDocument) -> Option<Position> {
        let cursor = self.session.cursor.as_ref()?;
        let line_index = document.line_index(&cursor.line_id)?;
        let unit_id = cursor.unit_id.as_deref()?;
        let units = synchronizable_units(&document.lines[line_index]);
        let unit_index = units.iter().position(|unit| unit.id == unit_id)?;
        Some(Position {
            line_index,
            units,
            unit_index,
        })
    }
}

fn start_stamps(line_index: usize, unit: &SyncUnit, is_first: bool, time: u64) -> Vec<Stamp> {
    boundary_stamps(line_index, unit, is_first, TimeBoundary::Start, time)
}

fn end_stamps(line_index: usize, unit: &SyncUnit, is_last: bool, time: u64) -> Vec<Stamp> {
    boundary_stamps(line_index, unit, is_last, TimeBoundary::End, time)
}

fn boundary_stamps(
    line_index: usize,
    unit: &SyncUnit,
    include_line: bool,
    boundary: TimeBoundary,
    time: u64,
) -> Vec<Stamp> {
    let mut stamps = vec![Stamp {
        line_index,
        target: StampTarget::of_unit(unit),
        boundary,
        time,
    }];
    if include_line {
        stamps.push(Stamp {
            line_index,
            target: StampTarget::Line,
            boundary,
            time,
        });
    }
    stamps
}

/// 在一次提交中写入所有时间戳。只有被改动的行会被复制。
fn commit<S: DocumentStore>(store: &mut S, stamps: Vec<Stamp>) -> bool {
    if stamps.is_empty() {
        return false;
    }
    store.set(|document| {
        let mut next = document.clone();
        for stamp in &stamps {
            next.update_line(stamp.line_index, |line| apply_stamp(line, stamp));
        }
        next
    });
    true
}

fn apply_stamp(line: &mut LyricLine, stamp: &Stamp) {
    match stamp.target {
        StampTarget::Line => line.set_time(stamp.boundary, stamp.time),
        StampTarget::Word(word_index) => {
            if let Some(word) = line.words.get_mut(word_index) {
                word.set_time(stamp.boundary, stamp.time);
            }
        }
        StampTarget::Ruby {
            word_index,
            ruby_index,
        } => {
            if let Some(word) = line.words.get_mut(word_index) {
                word.set_ruby_time(ruby_index, stamp.boundary, stamp.time);
            }
        }
    }
}

fn seek_to<C: AudioClock + ?Sized>(clock: &C, time_ms: u64) {
    #[allow(clippy::cast_precision_loss)]
    clock.seek(time_ms as f64 / 1000.0);
}

/// 从 `line_index` 行开始（含）的第一个可同步单元。
fn first_unit_from(document: &LyricDocument, line_index: usize) -> Option<(usize, SyncUnit)> {
    document
        .lines
        .iter()
        .enumerate()
        .skip(line_index)
        .find_map(|(index, line)| {
            synchronizable_units(line)
                .into_iter()
                .next()
                .map(|unit| (index, unit))
        })
}

/// 当前单元之后的可同步单元。`unit_index` 为 `None` 表示行被选中但没有选中单元。
fn next_unit_after(
    document: &LyricDocument,
    line_index: usize,
    unit_index: Option<usize>,
) -> Option<(usize, SyncUnit)> {
    let line = document.lines.get(line_index)?;
    let next_in_line = unit_index.map_or(0, |index| index + 1);
    if let Some(unit) = synchronizable_units(line).into_iter().nth(next_in_line) {
        return Some((line_index, unit));
    }
    first_unit_from(document, line_index + 1)
}

/// 当前单元之前的可同步单元。
fn prev_unit_before(
    document: &LyricDocument,
    line_index: usize,
    unit_index: Option<usize>,
) -> Option<(usize, SyncUnit)> {
    if let Some(index) = unit_index.and_then(|index| index.checked_sub(1)) {
        let unit = synchronizable_units(&document.lines[line_index]).into_iter().nth(index)?;
        return Some((line_index, unit));
    }
    document.lines[..line_index]
        .iter()
        .enumerate()
        .rev()
        .find_map(|(index, line)| synchronizable_units(line).pop().map(|unit| (index, unit)))
}
