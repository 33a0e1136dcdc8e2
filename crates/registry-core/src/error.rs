//! 错误定义模块

use crate::ledger::TransferError;
use thiserror::Error;

/// 登记系统统一错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("权限错误: {0}")]
    Unauthorized(String),

    #[error("参数错误: {0}")]
    InvalidArgument(String),

    #[error("资源已存在: {0}")]
    AlreadyExists(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("转账失败: {0}")]
    TransferFailed(#[from] TransferError),
}

impl RegistryError {
    /// 稳定的错误类别名称，供外部适配器使用
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "unauthorized",
            Self::InvalidArgument(_) => "invalid_argument",
            Self::AlreadyExists(_) => "already_exists",
            Self::NotFound(_) => "not_found",
            Self::TransferFailed(_) => "transfer_failed",
        }
    }
}

/// 登记系统统一结果类型
pub type Result<T> = std::result::Result<T, RegistryError>;
