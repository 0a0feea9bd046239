//! 逐字同步歌词的核心类型。
//!
//! 包含歌词文档模型、可同步单元解析器、错误类型以及解析、生成、打轴的选项。

pub mod config;
pub mod error;
pub mod model;
pub mod units;

pub use config::*;
pub use error::*;
pub use model::document::*;
pub use model::lang::*;
pub use model::line::*;
pub use model::metadata::*;
pub use units::*;
