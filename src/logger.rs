//! 日志初始化。

use std::path::PathBuf;

use lyric_core::TtmlError;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{AppConfig, LogOptions};

const LOG_FILE_PREFIX: &str = "lyric_sync.log";

/// 日志文件所在目录。
pub fn log_dir() -> PathBuf {
    AppConfig::project_dirs().map_or_else(
        || PathBuf::from("logs"),
        |dirs| dirs.data_local_dir().join("logs"),
    )
}

/// 安装全局日志订阅者：输出到标准错误，可选地按天滚动写入日志文件。
///
/// `RUST_LOG` 优先于配置中的过滤规则。返回的 guard 需要保持到程序退出，
/// 否则缓冲中的文件日志会丢失。
///
/// # Errors
///
/// 过滤规则无效，或全局订阅者已经被设置时返回 [`TtmlError::Logger`]。
pub fn init_logger(options: &LogOptions) -> Result<Option<WorkerGuard>, TtmlError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&options.level))
        .map_err(|e| TtmlError::Logger(format!("无效的日志过滤规则 '{}': {e}", options.level)))?;

    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    let (file_layer, guard) = if options.log_to_file {
        let appender = tracing_appender::rolling::daily(log_dir(), LOG_FILE_PREFIX);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        (
            Some(fmt::layer().with_ansi(false).with_writer(writer)),
            Some(guard),
        )
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| TtmlError::Logger(e.to_string()))?;

    Ok(guard)
}
