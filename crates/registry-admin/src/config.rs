//! 配置管理
//!
//! 从可选的配置文件与 `REGISTRY_` 前缀的环境变量加载配置，并在使用前校验

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};

/// 配置管理器
#[derive(Debug)]
pub struct ConfigManager {
    /// 配置数据
    config: Arc<RwLock<RegistryConfig>>,
    /// 配置文件路径
    config_path: Option<String>,
    /// 配置验证器
    validator: ConfigValidator,
}

/// 登记系统完整配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// 登记表配置
    pub registry: RegistrySection,
    /// 事件配置
    pub events: EventsConfig,
    /// 账本配置
    pub ledger: LedgerConfig,
    /// 日志配置
    pub logging: LoggingConfig,
}

/// 登记表配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrySection {
    /// 实例名称
    pub name: String,
}

/// 事件配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventsConfig {
    /// 启用事件分发
    pub enabled: bool,
    /// 事件来源标识
    pub source: String,
    /// 以日志形式输出事件
    pub log_events: bool,
}

/// 账本配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// 初始余额
    pub opening_balances: Vec<OpeningBalance>,
}

/// 单个身份的初始余额
///
/// 身份放在值里而不是表键里，`config` 会把键转成小写
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningBalance {
    /// 持有者身份，按原样比较
    pub identity: String,
    /// 金额
    pub amount: u64,
}

/// 日志配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别（EnvFilter 语法）
    pub level: String,
    /// 日志格式
    pub format: LogFormat,
}

/// 日志格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Compact,
    Json,
}

/// 配置验证器
#[derive(Debug)]
pub struct ConfigValidator {
    /// 验证规则
    validation_rules: Vec<ValidationRule>,
}

/// 验证规则
#[derive(Debug)]
struct ValidationRule {
    /// 字段路径
    field_path: &'static str,
    /// 验证函数
    validator: fn(&RegistryConfig) -> Result<()>,
}

impl ConfigManager {
    /// 创建新的配置管理器
    pub fn new(config_path: Option<&str>) -> Result<Self> {
        let config = Self::load_config(config_path)?;
        let validator = ConfigValidator::new();
        validator.validate(&config)?;

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            config_path: config_path.map(str::to_string),
            validator,
        })
    }

    /// 从文件和环境变量加载配置
    pub fn load_config(config_path: Option<&str>) -> Result<RegistryConfig> {
        let mut builder = Config::builder();
        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path));
        }

        let settings = builder
            .add_source(
                Environment::with_prefix("REGISTRY")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .context("Failed to build configuration")?;

        let config: RegistryConfig = settings
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        match config_path {
            Some(path) => info!("Configuration loaded successfully from: {}", path),
            None => info!("Configuration loaded from defaults and environment"),
        }
        Ok(config)
    }

    /// 获取配置
    pub async fn get_config(&self) -> RegistryConfig {
        self.config.read().await.clone()
    }

    /// 更新配置
    pub async fn update_config(&self, new_config: RegistryConfig) -> Result<()> {
        self.validator.validate(&new_config)?;

        *self.config.write().await = new_config;

        info!("Configuration updated successfully");
        Ok(())
    }

    /// 重新加载配置
    pub async fn reload_config(&self) -> Result<()> {
        let new_config = Self::load_config(self.config_path.as_deref())?;
        self.update_config(new_config).await
    }

    /// 以TOML格式保存配置
    pub async fn save_to(&self, path: &str) -> Result<()> {
        let config_str = {
            let config = self.config.read().await;
            toml::to_string_pretty(&*config).context("Failed to serialize configuration")?
        };

        tokio::fs::write(path, config_str)
            .await
            .context("Failed to write configuration file")?;

        info!("Configuration saved to: {}", path);
        Ok(())
    }
}

impl ConfigValidator {
    /// 创建新的配置验证器
    pub fn new() -> Self {
        let validation_rules = vec![
            ValidationRule {
                field_path: "registry.name",
                validator: |config| {
                    if config.registry.name.trim().is_empty() {
                        Err(anyhow::anyhow!("Registry name cannot be empty"))
                    } else {
                        Ok(())
                    }
                },
            },
            ValidationRule {
                field_path: "events.source",
                validator: |config| {
                    if config.events.enabled && config.events.source.is_empty() {
                        Err(anyhow::anyhow!("Event source cannot be empty when events are enabled"))
                    } else {
                        Ok(())
                    }
                },
            },
            ValidationRule {
                field_path: "ledger.opening_balances",
                validator: |config| {
                    if config
                        .ledger
                        .opening_balances
                        .iter()
                        .any(|balance| balance.identity.is_empty())
                    {
                        Err(anyhow::anyhow!("Opening balance identity cannot be empty"))
                    } else {
                        Ok(())
                    }
                },
            },
            ValidationRule {
                field_path: "logging.level",
                validator: |config| {
                    tracing_subscriber::EnvFilter::try_new(&config.logging.level)
                        .map(|_| ())
                        .map_err(|e| anyhow::anyhow!("Invalid log level '{}': {}", config.logging.level, e))
                },
            },
        ];

        Self { validation_rules }
    }

    /// 验证配置
    pub fn validate(&self, config: &RegistryConfig) -> Result<()> {
        for rule in &self.validation_rules {
            if let Err(e) = (rule.validator)(config) {
                error!("Configuration validation failed for {}: {}", rule.field_path, e);
                return Err(anyhow::anyhow!("Invalid {}: {}", rule.field_path, e));
            }
        }

        Ok(())
    }
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for RegistrySection {
    fn default() -> Self {
        Self {
            name: "treatment-registry".to_string(),
        }
    }
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            source: "treatment-registry".to_string(),
            log_events: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
        }
    }
}
