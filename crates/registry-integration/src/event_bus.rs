//! 事件总线
//!
//! 登记表同步地把事件写入无界通道，分发器在独立任务中异步投递给所有订阅者：
//! - 写入失败只记录日志，不影响登记操作
//! - 订阅者失败只记录日志，不影响其他订阅者

use anyhow::Result;
use registry_core::{EventSink, RegistryEvent};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// 带元数据的事件
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub id: Uuid,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub source: String,
    pub event: RegistryEvent,
}

impl EventEnvelope {
    pub fn new(source: impl Into<String>, event: RegistryEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: chrono::Utc::now(),
            source: source.into(),
            event,
        }
    }
}

/// 事件订阅者特征
#[async_trait::async_trait]
pub trait EventSubscriber: Send + Sync {
    /// 订阅者名称，用于日志
    fn name(&self) -> &str;

    /// 处理单个事件
    async fn handle(&self, envelope: &EventEnvelope) -> Result<()>;
}

/// 写入通道的事件接收端
#[derive(Debug, Clone)]
pub struct ChannelEventSink {
    sender: mpsc::UnboundedSender<EventEnvelope>,
    source: String,
}

impl EventSink for ChannelEventSink {
    fn publish(&self, event: &RegistryEvent) {
        let envelope = EventEnvelope::new(self.source.clone(), event.clone());
        if let Err(e) = self.sender.send(envelope) {
            warn!("Dropping event {}: dispatcher closed ({})", event.kind(), e);
        }
    }
}

/// 事件分发器
pub struct EventDispatcher {
    receiver: mpsc::UnboundedReceiver<EventEnvelope>,
    subscribers: Vec<Arc<dyn EventSubscriber>>,
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("subscribers", &self.subscribers.iter().map(|s| s.name()).collect::<Vec<_>>())
            .finish()
    }
}

/// 创建一对相连的接收端与分发器
pub fn event_channel(source: impl Into<String>) -> (ChannelEventSink, EventDispatcher) {
    let (sender, receiver) = mpsc::unbounded_channel();
    let sink = ChannelEventSink {
        sender,
        source: source.into(),
    };
    let dispatcher = EventDispatcher {
        receiver,
        subscribers: Vec::new(),
    };
    (sink, dispatcher)
}

impl EventDispatcher {
    /// 添加订阅者
    pub fn subscribe(&mut self, subscriber: Arc<dyn EventSubscriber>) {
        info!("Added event subscriber: {}", subscriber.name());
        self.subscribers.push(subscriber);
    }

    /// 持续分发，直到所有接收端被丢弃；返回已分发的事件数
    pub async fn run(self) -> u64 {
        let Self {
            mut receiver,
            subscribers,
        } = self;

        let mut dispatched = 0;
        while let Some(envelope) = receiver.recv().await {
            dispatch(&subscribers, &envelope).await;
            dispatched += 1;
        }

        debug!("Event channel closed after {} events", dispatched);
        dispatched
    }

    /// 在后台任务中运行
    pub fn spawn(self) -> JoinHandle<u64> {
        tokio::spawn(self.run())
    }
}

async fn dispatch(subscribers: &[Arc<dyn EventSubscriber>], envelope: &EventEnvelope) {
    debug!("Dispatching event {} ({})", envelope.id, envelope.event.kind());

    for subscriber in subscribers {
        if let Err(e) = subscriber.handle(envelope).await {
            error!(
                "Subscriber {} failed to handle event {}: {}",
                subscriber.name(),
                envelope.id,
                e
            );
        }
    }
}

/// 将事件以结构化日志输出的订阅者
#[derive(Debug, Default)]
pub struct TracingSubscriber;

#[async_trait::async_trait]
impl EventSubscriber for TracingSubscriber {
    fn name(&self) -> &str {
        "tracing"
    }

    async fn handle(&self, envelope: &EventEnvelope) -> Result<()> {
        let payload = serde_json::to_string(&envelope.event)?;
        info!(
            event_id = %envelope.id,
            kind = envelope.event.kind(),
            source = %envelope.source,
            payload = %payload,
            "registry event"
        );
        Ok(())
    }
}

/// 在内存中保存事件的订阅者
#[derive(Debug, Default)]
pub struct MemorySubscriber {
    envelopes: RwLock<Vec<EventEnvelope>>,
}

impl MemorySubscriber {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn envelopes(&self) -> Vec<EventEnvelope> {
        self.envelopes.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.envelopes.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.envelopes.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl EventSubscriber for MemorySubscriber {
    fn name(&self) -> &str {
        "memory"
    }

    async fn handle(&self, envelope: &EventEnvelope) -> Result<()> {
        self.envelopes.write().await.push(envelope.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use registry_core::{Identity, PatientId};

    struct FailingSubscriber;

    #[async_trait::async_trait]
    impl EventSubscriber for FailingSubscriber {
        fn name(&self) -> &str {
            "failing"
        }

        async fn handle(&self, _envelope: &EventEnvelope) -> Result<()> {
            Err(anyhow::anyhow!("indexer unavailable"))
        }
    }

    fn patient_event(id: u64) -> RegistryEvent {
        RegistryEvent::PatientRegistered {
            patient_id: PatientId(id),
            identity: Identity::from("0xalice"),
            name: "Alice".to_string(),
        }
    }

    #[tokio::test]
    async fn test_events_reach_subscribers_in_order() {
        let (sink, mut dispatcher) = event_channel("registry-test");
        let memory = Arc::new(MemorySubscriber::new());
        dispatcher.subscribe(Arc::new(FailingSubscriber));
        dispatcher.subscribe(Arc::new(TracingSubscriber));
        dispatcher.subscribe(memory.clone());

        let handle = dispatcher.spawn();
        for id in 1..=3 {
            sink.publish(&patient_event(id));
        }
        drop(sink);

        assert_eq!(handle.await.unwrap(), 3);

        let envelopes = memory.envelopes().await;
        assert_eq!(envelopes.len(), 3);
        assert_eq!(envelopes[2].event, patient_event(3));
        assert!(envelopes.iter().all(|e| e.source == "registry-test"));
    }

    #[tokio::test]
    async fn test_publish_after_dispatcher_dropped_is_silent() {
        let (sink, dispatcher) = event_channel("registry-test");
        drop(dispatcher);

        // 不应 panic
        sink.publish(&patient_event(1));
    }
}
