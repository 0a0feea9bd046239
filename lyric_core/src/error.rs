use std::io;

use quick_xml::Error as QuickXmlErrorMain;
use thiserror::Error;

/// 定义歌词解析、生成和配置处理过程中可能发生的各种错误。
#[derive(Error, Debug)]
pub enum TtmlError {
    /// XML 生成错误，通常来自 `quick-xml` 库。
    #[error("生成 XML 错误: {0}")]
    Xml(#[from] QuickXmlErrorMain),
    /// 无效的时间格式字符串。
    #[error("无效的时间格式: {0}")]
    InvalidTime(String),
    /// 文件读写等IO错误。
    #[error("IO 错误: {0}")]
    Io(#[from] io::Error),
    /// 从字节序列转换为 UTF-8 字符串失败。
    #[error("UTF-8 转换错误: {0}")]
    FromUtf8(#[from] std::string::FromUtf8Error),
    /// 配置文件反序列化失败。
    #[error("解析配置文件失败: {0}")]
    ConfigParse(#[from] toml::de::Error),
    /// 配置序列化失败。
    #[error("序列化配置失败: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
    /// JSON 序列化失败。
    #[error("JSON 序列化失败: {0}")]
    Json(#[from] serde_json::Error),
    /// 日志系统初始化失败。
    #[error("初始化日志失败: {0}")]
    Logger(String),
    /// 内部逻辑错误或未明确分类的错误。
    #[error("错误: {0}")]
    Internal(String),
}

impl From<TtmlError> for io::Error {
    fn from(err: TtmlError) -> Self {
        match err {
            TtmlError::Io(io_err) => io_err,
            other => Self::other(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_passes_through() {
        let original = io::Error::new(io::ErrorKind::NotFound, "缺失");
        let converted: io::Error = TtmlError::Io(original).into();
        assert_eq!(converted.kind(), io::ErrorKind::NotFound);

        let converted: io::Error = TtmlError::InvalidTime("x".into()).into();
        assert_eq!(converted.kind(), io::ErrorKind::Other);
        assert!(converted.to_string().contains("无效的时间格式"));
    }
}
