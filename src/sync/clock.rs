//! 打轴时读取的播放时钟。

use std::cell::Cell;

/// 音频播放位置的只读视图，外加一个不等待结果的跳转操作。
pub trait AudioClock {
    /// 当前播放位置（毫秒）
    fn current_time_ms(&self) -> f64;
    /// 是否正在播放
    fn is_playing(&self) -> bool;
    /// 播放速率，1.0 为原速
    fn playback_rate(&self) -> f64;
    /// 跳转到指定位置（秒）
    fn seek(&self, time_seconds: f64);
}

/// 手动推进的时钟，用于回放按键记录和测试。
#[derive(Debug)]
pub struct ManualClock {
    time_ms: Cell<f64>,
    playing: Cell<bool>,
    rate: Cell<f64>,
}

impl ManualClock {
    pub const fn new(time_ms: f64) -> Self {
        Self {
            time_ms: Cell::new(time_ms),
            playing: Cell::new(true),
            rate: Cell::new(1.0),
        }
    }

    pub fn set_time_ms(&self, time_ms: f64) {
        self.time_ms.set(time_ms);
    }

    pub fn set_playing(&self, playing: bool) {
        self.playing.set(playing);
    }

    pub fn set_playback_rate(&self, rate: f64) {
        self.rate.set(rate);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl AudioClock for ManualClock {
    fn current_time_ms(&self) -> f64 {
        self.time_ms.get()
    }

    fn is_playing(&self) -> bool {
        self.playing.get()
    }

    fn playback_rate(&self) -> f64 {
        self.rate.get()
    }

    fn seek(&self, time_seconds: f64) {
        self.time_ms.set(time_seconds * 1000.0);
    }
}
