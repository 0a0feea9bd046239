//! 歌词文档模型。

pub mod document;
pub mod lang;
pub mod line;
pub mod metadata;
