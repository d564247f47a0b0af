//! 可观测性模块
//!
//! 结构化日志初始化。配置了日志目录时额外输出滚动文件日志。

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::config::LoggingConfig;

/// 初始化 tracing 订阅器
///
/// 返回的 guard 必须在进程生命周期内持有，否则文件日志会丢尾。
pub fn init_tracing(config: &LoggingConfig) -> Option<WorkerGuard> {
    let level = if config.level.is_empty() {
        "info"
    } else {
        config.level.as_str()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match &config.log_dir {
        Some(log_dir) => {
            let file_appender = tracing_appender::rolling::daily(log_dir, "mnemos.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer())
                .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
                .init();

            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer())
                .init();

            None
        }
    }
}
