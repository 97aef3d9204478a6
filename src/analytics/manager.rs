use dashmap::DashMap;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use tokio::time::{Duration, sleep};
use tracing::debug;

use super::global::get_event_recorder;
use super::{EventDraft, EventSink, ViewCountSink};
use crate::storage::models::EventType;

// 全局缓冲区：页面浏览计数聚合
pub static VIEW_BUFFER: Lazy<DashMap<i64, u64>> = Lazy::new(DashMap::new);

// 全局缓冲区：完整事件行
pub static EVENT_BUFFER: Lazy<Mutex<Vec<EventDraft>>> = Lazy::new(|| Mutex::new(Vec::new()));

// 全局刷盘锁，防止并发 flush
pub static FLUSH_LOCK: AtomicBool = AtomicBool::new(false);

/// 事件缓冲管理器
///
/// 入队是同步无阻塞的；后台任务按固定间隔刷盘，缓冲超过容量时
/// 额外触发一次提前刷盘。刷盘失败只记日志，事件按策略丢弃，
/// 追踪永远不反馈失败给用户路径。
pub struct EventRecorder {
    event_sink: Arc<dyn EventSink>,
    view_sink: Arc<dyn ViewCountSink>,
    flush_interval: Duration,
    buffer_capacity: usize,
}

impl EventRecorder {
    pub fn new(
        event_sink: Arc<dyn EventSink>,
        view_sink: Arc<dyn ViewCountSink>,
        flush_interval: Duration,
        buffer_capacity: usize,
    ) -> Self {
        Self {
            event_sink,
            view_sink,
            flush_interval,
            buffer_capacity,
        }
    }

    /// 入队一条事件（线程安全，无阻塞）
    pub fn record(&self, event: EventDraft) {
        // view 事件同时进入页面计数聚合
        if event.event_type == EventType::View
            && let Some(page_id) = event.page_id
        {
            *VIEW_BUFFER.entry(page_id).or_insert(0) += 1;
        }

        let over_capacity = {
            let mut buffer = EVENT_BUFFER.lock();
            buffer.push(event);
            buffer.len() >= self.buffer_capacity
        };

        // 容量压力下提前刷盘（后台任务之外的一次性补充）
        if over_capacity
            && !FLUSH_LOCK.load(Ordering::Relaxed)
            && let Some(recorder) = get_event_recorder()
        {
            let recorder = Arc::clone(recorder);
            tokio::spawn(async move {
                recorder.flush().await;
            });
        }
    }

    /// 启动后台刷盘任务（作为异步方法运行）
    pub async fn start_background_task(&self) {
        loop {
            sleep(self.flush_interval).await;

            debug!("EventRecorder: Triggering flush to storage");
            self.flush_inner().await;
        }
    }

    pub async fn flush(&self) {
        debug!("EventRecorder: Manual flush triggered");
        self.flush_inner().await;
    }

    async fn flush_inner(&self) {
        if FLUSH_LOCK.swap(true, Ordering::SeqCst) {
            debug!("EventRecorder: flush already in progress, skipping");
            return;
        }

        // 1. 事件行
        let events = {
            let mut buffer = EVENT_BUFFER.lock();
            std::mem::take(&mut *buffer)
        };

        if !events.is_empty() {
            let count = events.len();
            if let Err(e) = self.event_sink.log_events_batch(events).await {
                // 按策略丢弃：追踪失败不重试、不上抛
                debug!("EventRecorder: log_events_batch failed ({} events): {}", count, e);
            }
        }

        // 2. 页面浏览计数
        let updates = VIEW_BUFFER
            .iter()
            .map(|entry| (*entry.key(), *entry.value()))
            .collect::<Vec<_>>();

        if !updates.is_empty() {
            VIEW_BUFFER.clear();

            if let Err(e) = self.view_sink.flush_view_counts(updates).await {
                debug!("EventRecorder: flush_view_counts failed: {}", e);
            }
        }

        FLUSH_LOCK.store(false, Ordering::SeqCst);
        debug!("EventRecorder: flush completed");
    }
}
