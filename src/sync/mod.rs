//! # 打轴引擎
//!
//! 把带时间的按键事件转换为对文档的写时复制修改。
//!
//! - [`AudioClock`] 提供播放位置、播放状态、速率和跳转。
//! - [`DocumentStore`] 保存文档快照，引擎的每个操作最多提交一次。
//! - [`SyncSession`] 是可序列化的会话状态：光标、空拍计数和智能行首记录。

mod clock;
mod engine;
mod judge;
mod session;
mod store;

pub use clock::{AudioClock, ManualClock};
pub use engine::SyncEngine;
pub use judge::{KeyEvent, judge_time};
pub use session::{SyncCursor, SyncSession};
pub use store::{DocumentStore, MemoryDocumentStore};
