//! 按键判定时间。

use lyric_core::JudgeMode;
use serde::{Deserialize, Serialize};

use super::clock::AudioClock;

/// 一次按键。
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyEvent {
    /// 按键被处理时已经按住的时长（毫秒）
    pub down_time_offset: f64,
    /// 按下时的播放位置（毫秒），旧版判定方式使用
    pub clock_time_at_key_down: Option<f64>,
}

impl KeyEvent {
    pub const fn new(down_time_offset: f64) -> Self {
        Self {
            down_time_offset,
            clock_time_at_key_down: None,
        }
    }

    #[must_use]
    pub const fn with_clock_time_at_key_down(mut self, time_ms: f64) -> Self {
        self.clock_time_at_key_down = Some(time_ms);
        self
    }
}

/// 根据判定方式计算一次按键对应的时间戳（毫秒）。结果向下取整且不小于 0。
pub fn judge_time<C: AudioClock + ?Sized>(mode: JudgeMode, clock: &C, event: &KeyEvent) -> u64 {
    let now = clock.current_time_ms();
    let raw = match mode {
        JudgeMode::FirstKeyDownTime if clock.is_playing() => {
            event.down_time_offset.mul_add(-clock.playback_rate(), now)
        }
        JudgeMode::FirstKeyDownTime | JudgeMode::LastKeyUpTime => now,
        JudgeMode::MiddleKeyTime => (event.down_time_offset / 2.0).mul_add(-clock.playback_rate(), now),
        JudgeMode::FirstKeyDownTimeLegacy => {
            event.clock_time_at_key_down.unwrap_or(now) - event.down_time_offset
        }
    };
    clamp_to_ms(raw)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn clamp_to_ms(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.floor() as u64
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::clock::ManualClock;

    #[test]
    fn test_first_key_down_scales_by_rate_while_playing() {
        let clock = ManualClock::new(5000.0);
        clock.set_playback_rate(2.0);
        let event = KeyEvent::new(100.0);
        assert_eq!(judge_time(JudgeMode::FirstKeyDownTime, &clock, &event), 4800);

        clock.set_playing(false);
        assert_eq!(judge_time(JudgeMode::FirstKeyDownTime, &clock, &event), 5000);
    }

    #[test]
    fn test_other_modes() {
        let clock = ManualClock::new(5000.5);
        let event = KeyEvent::new(100.0).with_clock_time_at_key_down(4000.0);
        assert_eq!(judge_time(JudgeMode::LastKeyUpTime, &clock, &event), 5000);
        assert_eq!(judge_time(JudgeMode::MiddleKeyTime, &clock, &event), 4950);
        assert_eq!(judge_time(JudgeMode::FirstKeyDownTimeLegacy, &clock, &event), 3900);

        let without_key_down = KeyEvent::new(100.0);
        assert_eq!(
            judge_time(JudgeMode::FirstKeyDownTimeLegacy, &clock, &without_key_down),
            4900
        );
    }

    #[test]
    fn test_judge_time_is_clamped_to_zero() {
        let clock = ManualClock::new(50.0);
        let event = KeyEvent::new(200.0);
        assert_eq!(judge_time(JudgeMode::FirstKeyDownTime, &clock, &event), 0);
        assert_eq!(judge_time(JudgeMode::MiddleKeyTime, &clock, &event), 0);
        assert_eq!(judge_time(JudgeMode::FirstKeyDownTimeLegacy, &clock, &event), 0);

        clock.set_time_ms(f64::NAN);
        assert_eq!(judge_time(JudgeMode::LastKeyUpTime, &clock, &event), 0);
    }
}
