//! 价值转移协作者接口

use crate::models::Identity;
use thiserror::Error;

/// 转账错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("余额不足: 需要 {required}, 可用 {available}")]
    InsufficientFunds { required: u64, available: u64 },

    #[error("无效收款方: {0}")]
    InvalidRecipient(String),

    #[error("账本不可用: {0}")]
    Unavailable(String),
}

/// 外部支付/账本服务
///
/// 同步调用；失败时不得产生任何余额变化。
pub trait ValueTransfer: Send + Sync {
    fn transfer(&self, from: &Identity, to: &Identity, amount: u64) -> Result<(), TransferError>;
}
