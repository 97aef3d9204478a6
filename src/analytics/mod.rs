pub mod global;
pub mod manager;
pub mod retention;
pub mod sink;

pub use manager::EventRecorder;
pub use retention::RetentionTask;
pub use sink::{EventSink, StdoutSink, ViewCountSink};

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::storage::models::EventType;

/// 待写入的追踪事件
///
/// 来源字段（ip / referrer / UA 解析结果）一律取自请求头，
/// 不信任请求体里的自述信息。
#[derive(Debug, Clone)]
pub struct EventDraft {
    pub page_id: Option<i64>,
    pub block_id: Option<i64>,
    pub shortlink_id: Option<String>,
    pub event_type: EventType,
    pub timestamp: DateTime<Utc>,
    pub ip_address: Option<String>,
    pub referrer: Option<String>,
    pub source: Option<String>,
    pub browser: Option<String>,
    pub os: Option<String>,
    pub device_type: Option<String>,
    pub metadata: Option<Value>,
}

impl EventDraft {
    pub fn new(event_type: EventType) -> Self {
        Self {
            page_id: None,
            block_id: None,
            shortlink_id: None,
            event_type,
            timestamp: Utc::now(),
            ip_address: None,
            referrer: None,
            source: None,
            browser: None,
            os: None,
            device_type: None,
            metadata: None,
        }
    }

    /// 页面浏览事件
    pub fn page_view(page_id: i64) -> Self {
        let mut draft = Self::new(EventType::View);
        draft.page_id = Some(page_id);
        draft
    }

    /// 事件必须至少指向一个目标
    pub fn has_target(&self) -> bool {
        self.page_id.is_some() || self.block_id.is_some() || self.shortlink_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_target() {
        let draft = EventDraft::new(EventType::Click);
        assert!(!draft.has_target());

        let mut draft = EventDraft::new(EventType::Click);
        draft.shortlink_id = Some("abc123".to_string());
        assert!(draft.has_target());

        assert!(EventDraft::page_view(1).has_target());
    }
}
