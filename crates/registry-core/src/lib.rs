//! # Registry Core
//!
//! 治疗登记系统的核心模块，提供基础数据结构、错误定义、事件定义和外部协作者接口。

pub mod error;
pub mod events;
pub mod ledger;
pub mod models;
pub mod utils;

pub use error::{RegistryError, Result};
pub use events::{EventSink, NoopEventSink, RegistryEvent};
pub use ledger::{TransferError, ValueTransfer};
pub use models::*;
