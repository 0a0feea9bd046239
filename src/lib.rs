//! # lyric_sync
//!
//! 逐字歌词打轴工具的应用层：打轴引擎、配置文件和日志初始化。
//! 文档模型在 [`lyric_core`]，TTML 的解析与生成在 [`ttml_processor`]。

pub mod config;
pub mod logger;
pub mod replay;
pub mod sync;

pub use config::{AppConfig, LogOptions};
pub use sync::{
    AudioClock, DocumentStore, KeyEvent, ManualClock, MemoryDocumentStore, SyncCursor, SyncEngine,
    SyncSession,
};
