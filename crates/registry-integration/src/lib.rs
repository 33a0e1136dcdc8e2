//! # 登记系统集成模块
//!
//! 提供登记核心所依赖的外部协作者实现：
//! - 事件总线：通道接收端 + 异步分发器，将事件投递给订阅者
//! - 内存账本：患者向从业者付款的价值转移实现

pub mod event_bus;
pub mod ledger;

pub use event_bus::{
    event_channel, ChannelEventSink, EventDispatcher, EventEnvelope, EventSubscriber,
    MemorySubscriber, TracingSubscriber,
};
pub use ledger::InMemoryLedger;
