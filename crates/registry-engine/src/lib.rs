//! # 治疗登记引擎
//!
//! 提供登记表的变更与聚合功能，包括：
//! - 稀疏表存储：稠密递增ID，零值读取语义
//! - 所有者访问控制：每个变更操作入口处校验调用者身份
//! - 评分聚合：增量维护从业者星级
//! - 共享句柄：串行化写入、一致快照读取

pub mod access;
pub mod rating;
pub mod registry;
pub mod shared;
pub mod store;

// 重新导出主要类型
pub use registry::Registry;
pub use shared::SharedRegistry;
pub use store::{DenseKey, SparseTable};
