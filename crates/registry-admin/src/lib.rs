//! # 登记系统管理模块
//!
//! 提供配置管理和日志初始化等运维功能

pub mod config;
pub mod logging;

pub use config::{
    ConfigManager, ConfigValidator, EventsConfig, LedgerConfig, LogFormat, LoggingConfig,
    OpeningBalance, RegistryConfig, RegistrySection,
};
pub use logging::{bootstrap_logging, init_logging};
