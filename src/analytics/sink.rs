use super::EventDraft;

/// 页面浏览计数 Sink（聚合模式）
#[async_trait::async_trait]
pub trait ViewCountSink: Send + Sync {
    async fn flush_view_counts(&self, updates: Vec<(i64, u64)>) -> anyhow::Result<()>;
}

/// 事件日志 Sink
#[async_trait::async_trait]
pub trait EventSink: Send + Sync {
    /// 记录单条事件
    async fn log_event(&self, event: EventDraft) -> anyhow::Result<()>;

    /// 批量记录事件
    async fn log_events_batch(&self, events: Vec<EventDraft>) -> anyhow::Result<()>;
}

pub struct StdoutSink;

#[async_trait::async_trait]
impl ViewCountSink for StdoutSink {
    async fn flush_view_counts(&self, updates: Vec<(i64, u64)>) -> anyhow::Result<()> {
        println!("Flushing view counts: {:?}", updates);
        Ok(())
    }
}

#[async_trait::async_trait]
impl EventSink for StdoutSink {
    async fn log_event(&self, event: EventDraft) -> anyhow::Result<()> {
        println!("Event log: {:?}", event);
        Ok(())
    }

    async fn log_events_batch(&self, events: Vec<EventDraft>) -> anyhow::Result<()> {
        println!("Event logs batch: {} entries", events.len());
        for event in &events {
            println!("  - {:?}", event);
        }
        Ok(())
    }
}
