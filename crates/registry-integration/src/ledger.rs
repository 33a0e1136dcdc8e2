//! 内存账本
//!
//! `ValueTransfer` 的进程内实现，按身份保存余额。转账在一次加锁内完成，失败时余额不变。

use registry_core::{Identity, TransferError, ValueTransfer};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

/// 内存账本
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    balances: Mutex<HashMap<Identity, u64>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以初始余额创建账本
    pub fn with_balances<I, K>(balances: I) -> Self
    where
        I: IntoIterator<Item = (K, u64)>,
        K: Into<Identity>,
    {
        let balances = balances
            .into_iter()
            .map(|(identity, amount)| (identity.into(), amount))
            .collect();
        Self {
            balances: Mutex::new(balances),
        }
    }

    /// 存入资金
    pub fn deposit(&self, identity: &Identity, amount: u64) {
        let mut balances = self.lock();
        let balance = balances.entry(identity.clone()).or_insert(0);
        *balance = balance.saturating_add(amount);
        info!("Deposited {} to {}, balance {}", amount, identity, balance);
    }

    /// 查询余额，未知身份为0
    pub fn balance(&self, identity: &Identity) -> u64 {
        self.lock().get(identity).copied().unwrap_or(0)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Identity, u64>> {
        // 锁内操作不会中途 panic，中毒后数据仍然一致
        self.balances.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ValueTransfer for InMemoryLedger {
    fn transfer(&self, from: &Identity, to: &Identity, amount: u64) -> Result<(), TransferError> {
        if to.is_unset() {
            return Err(TransferError::InvalidRecipient(to.to_string()));
        }
        if amount == 0 {
            debug!("Zero-value transfer from {} to {}", from, to);
            return Ok(());
        }

        let mut balances = self.lock();
        let available = balances.get(from).copied().unwrap_or(0);
        if available < amount {
            return Err(TransferError::InsufficientFunds {
                required: amount,
                available,
            });
        }

        let receiver_balance = balances.get(to).copied().unwrap_or(0);
        if from != to {
            balances.insert(from.clone(), available - amount);
            balances.insert(to.clone(), receiver_balance.saturating_add(amount));
        }

        info!("Transferred {} from {} to {}", amount, from, to);
        Ok(())
    }
}
