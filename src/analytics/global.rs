use std::sync::{Arc, OnceLock};
use tracing::trace;

use super::manager::EventRecorder;

pub static GLOBAL_EVENT_RECORDER: OnceLock<Arc<EventRecorder>> = OnceLock::new();

/// 初始化全局事件记录器（只允许初始化一次）
pub fn set_global_event_recorder(recorder: Arc<EventRecorder>) {
    if GLOBAL_EVENT_RECORDER.set(recorder).is_err() {
        panic!("GLOBAL_EVENT_RECORDER has already been set");
    }
}

/// 获取全局事件记录器
pub fn get_event_recorder() -> Option<&'static Arc<EventRecorder>> {
    match GLOBAL_EVENT_RECORDER.get() {
        Some(recorder) => Some(recorder),
        None => {
            trace!("GLOBAL_EVENT_RECORDER has not been initialized yet");
            None
        }
    }
}
