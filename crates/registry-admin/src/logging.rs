//! 日志初始化
//!
//! 根据配置安装全局 `tracing` 订阅器，`RUST_LOG` 优先于配置中的级别。
//! 日志写到标准错误，标准输出留给命令响应。

use crate::config::{LogFormat, LoggingConfig};
use anyhow::Result;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::EnvFilter;

/// 构造日志过滤器
pub fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    EnvFilter::try_new(&config.level)
        .map_err(|e| anyhow::anyhow!("Invalid log level '{}': {}", config.level, e))
}

/// 初始化全局日志
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = build_filter(config)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let result = match config.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
    };

    result.map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;
    tracing::debug!("Logging initialized with level {} ({:?})", config.level, config.format);
    Ok(())
}

/// 在全局日志就绪前为当前线程安装临时订阅器
///
/// 加载配置期间的日志由它输出；返回的守卫被丢弃后失效
pub fn bootstrap_logging(level: Option<&str>) -> DefaultGuard {
    let filter = level
        .and_then(|level| EnvFilter::try_new(level).ok())
        .unwrap_or_else(|| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .finish();
    tracing::subscriber::set_default(subscriber)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filter_from_config() {
        let config = LoggingConfig {
            level: "debug,registry_engine=trace".to_string(),
            format: LogFormat::Compact,
        };
        assert!(build_filter(&config).is_ok());
    }

    #[test]
    fn test_bootstrap_logging_is_scoped() {
        {
            let _guard = bootstrap_logging(Some("warn"));
            assert!(tracing::enabled!(tracing::Level::WARN));
            assert!(!tracing::enabled!(tracing::Level::INFO));
        }

        // 非法级别回退到 info
        let _guard = bootstrap_logging(Some("registry=verbose"));
        assert!(tracing::enabled!(tracing::Level::INFO));
        assert!(!tracing::enabled!(tracing::Level::DEBUG));
    }

    #[test]
    fn test_second_init_fails() {
        let config = LoggingConfig::default();
        // 首次初始化可能已被其他测试抢先
        let _ = init_logging(&config);
        assert!(init_logging(&config).is_err());
    }
}
