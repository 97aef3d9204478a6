//! 数据清理任务
//!
//! 负责清理过期的追踪事件，防止数据库无限增长。
//!
//! 页面删除不级联到事件（弱引用设计），孤儿事件同样由
//! 这里的保留策略兜底清理。

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};
use tracing::{error, info};

use crate::config::get_config;
use crate::storage::SeaOrmStorage;

/// 清理报告
#[derive(Debug, Default)]
pub struct CleanupReport {
    /// 删除的事件数量
    pub events_deleted: u64,
}

/// 数据清理任务
pub struct RetentionTask {
    storage: Arc<SeaOrmStorage>,
    /// 事件保留天数
    retention_days: u64,
    /// 每次删除批量大小
    batch_size: u64,
}

impl RetentionTask {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        let config = get_config();

        Self {
            storage,
            retention_days: config.analytics.retention_days,
            batch_size: 10000,
        }
    }

    /// 运行一次完整的清理流程
    pub async fn run_cleanup(&self) -> anyhow::Result<CleanupReport> {
        let cutoff = Utc::now() - Duration::days(self.retention_days as i64);

        let events_deleted = self
            .storage
            .purge_events_before(cutoff, self.batch_size)
            .await?;

        info!(
            "Analytics cleanup completed: {} events removed (cutoff: {})",
            events_deleted,
            cutoff.to_rfc3339()
        );

        Ok(CleanupReport { events_deleted })
    }

    /// 启动后台清理任务
    ///
    /// 每隔指定时间运行一次清理
    pub fn spawn_background_task(self: Arc<Self>, interval_hours: u64) {
        tokio::spawn(async move {
            let interval = StdDuration::from_secs(interval_hours * 60 * 60);

            // 首次运行延迟 5 分钟
            tokio::time::sleep(StdDuration::from_secs(300)).await;

            loop {
                if let Err(e) = self.run_cleanup().await {
                    error!("Analytics cleanup task failed: {}", e);
                }

                tokio::time::sleep(interval).await;
            }
        });

        info!(
            "Analytics cleanup background task started (interval: {} hours)",
            interval_hours
        );
    }
}
