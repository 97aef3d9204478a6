//! 分析统计查询
//!
//! 提供页面维度的统计功能：
//! - 事件趋势（按小时/日/周/月分组）
//! - 热门块排行
//! - 来源统计
//! - 设备分布
//! - 原始事件导出（CSV）
//!
//! 查询走原始事件表，内存侧聚合；单次扫描有行数上限保护。

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::errors::{LinkfolioError, Result};
use crate::storage::SeaOrmStorage;
use crate::storage::models::{AnalyticsEvent, EventType};

/// 输出目录常量
const TS_EXPORT_PATH: &str = "../editor-panel/src/services/types.generated.ts";

/// 单次统计查询最多扫描的事件行数
const MAX_SCAN_ROWS: u64 = 100_000;

/// 分组方式
#[derive(Debug, Clone, Copy, Deserialize, Serialize, TS, Default)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    Hour,
    #[default]
    Day,
    Week,
    Month,
}

// ============ 响应结构 ============

/// 页面统计摘要
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct PageSummary {
    pub total_events: u64,
    pub total_views: u64,
    pub total_clicks: u64,
}

/// 事件趋势数据
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct TrendData {
    /// 时间标签
    pub labels: Vec<String>,
    /// 事件数
    pub values: Vec<u64>,
}

/// 热门块
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct TopBlock {
    pub block_id: i64,
    pub clicks: u64,
}

/// 来源统计
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct SourceStats {
    pub source: String,
    pub count: u64,
    pub percentage: f64,
}

/// 设备分布
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct DeviceStats {
    pub device_type: String,
    pub count: u64,
}

pub struct AnalyticsService;

impl AnalyticsService {
    /// 解析日期范围，两端都有效才使用，否则回退到默认 30 天
    pub fn parse_date_range(
        start: Option<&str>,
        end: Option<&str>,
    ) -> (DateTime<Utc>, DateTime<Utc>) {
        if let (Some(s), Some(e)) = (start, end)
            && let (Some(start), Some(end)) = (Self::parse_date(s), Self::parse_date(e))
            && start <= end
        {
            return (start, end);
        }
        Self::default_date_range()
    }

    fn parse_date(s: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
            .or_else(|| {
                chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
                    .map(|dt| dt.and_utc())
            })
    }

    fn default_date_range() -> (DateTime<Utc>, DateTime<Utc>) {
        let end = Utc::now();
        let start = end - Duration::days(30);
        (start, end)
    }

    /// 时间桶标签
    pub fn bucket_label(dt: &DateTime<Utc>, group_by: GroupBy) -> String {
        match group_by {
            GroupBy::Hour => dt.format("%Y-%m-%d %H:00").to_string(),
            GroupBy::Day => dt.format("%Y-%m-%d").to_string(),
            GroupBy::Week => dt.format("%G-W%V").to_string(),
            GroupBy::Month => dt.format("%Y-%m").to_string(),
        }
    }

    /// 页面统计摘要
    pub async fn summary(
        storage: &SeaOrmStorage,
        page_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<PageSummary> {
        let total_events = storage.count_events(page_id, start, end, None).await?;
        let total_views = storage
            .count_events(page_id, start, end, Some(EventType::View))
            .await?;
        let total_clicks = storage
            .count_events(page_id, start, end, Some(EventType::Click))
            .await?;

        Ok(PageSummary {
            total_events,
            total_views,
            total_clicks,
        })
    }

    /// 事件趋势（按时间桶聚合）
    pub async fn trend(
        storage: &SeaOrmStorage,
        page_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        group_by: GroupBy,
        event_type: Option<EventType>,
    ) -> Result<TrendData> {
        let events = storage
            .events_for_page(page_id, start, end, MAX_SCAN_ROWS)
            .await?;

        let mut buckets: BTreeMap<String, u64> = BTreeMap::new();
        for event in events {
            if let Some(et) = event_type
                && event.event_type != et
            {
                continue;
            }
            *buckets
                .entry(Self::bucket_label(&event.created_at, group_by))
                .or_insert(0) += 1;
        }

        let (labels, values) = buckets.into_iter().unzip();
        Ok(TrendData { labels, values })
    }

    /// 热门块排行（按 click 事件计数）
    pub async fn top_blocks(
        storage: &SeaOrmStorage,
        page_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<TopBlock>> {
        let events = storage
            .events_for_page(page_id, start, end, MAX_SCAN_ROWS)
            .await?;

        let mut counts: BTreeMap<i64, u64> = BTreeMap::new();
        for event in events {
            if event.event_type == EventType::Click
                && let Some(block_id) = event.block_id
            {
                *counts.entry(block_id).or_insert(0) += 1;
            }
        }

        let mut ranked: Vec<TopBlock> = counts
            .into_iter()
            .map(|(block_id, clicks)| TopBlock { block_id, clicks })
            .collect();
        ranked.sort_by(|a, b| b.clicks.cmp(&a.clicks).then(a.block_id.cmp(&b.block_id)));
        ranked.truncate(limit);
        Ok(ranked)
    }

    /// 来源统计（含占比）
    pub async fn sources(
        storage: &SeaOrmStorage,
        page_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<SourceStats>> {
        let events = storage
            .events_for_page(page_id, start, end, MAX_SCAN_ROWS)
            .await?;

        let total = events.len() as u64;
        let mut counts: BTreeMap<String, u64> = BTreeMap::new();
        for event in events {
            let source = event.source.unwrap_or_else(|| "direct".to_string());
            *counts.entry(source).or_insert(0) += 1;
        }

        let mut ranked: Vec<SourceStats> = counts
            .into_iter()
            .map(|(source, count)| SourceStats {
                source,
                count,
                percentage: if total > 0 {
                    (count as f64 / total as f64) * 100.0
                } else {
                    0.0
                },
            })
            .collect();
        ranked.sort_by(|a, b| b.count.cmp(&a.count).then(a.source.cmp(&b.source)));
        ranked.truncate(limit);
        Ok(ranked)
    }

    /// 设备分布
    pub async fn devices(
        storage: &SeaOrmStorage,
        page_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<DeviceStats>> {
        let events = storage
            .events_for_page(page_id, start, end, MAX_SCAN_ROWS)
            .await?;

        let mut counts: BTreeMap<String, u64> = BTreeMap::new();
        for event in events {
            let device = event.device_type.unwrap_or_else(|| "unknown".to_string());
            *counts.entry(device).or_insert(0) += 1;
        }

        let mut ranked: Vec<DeviceStats> = counts
            .into_iter()
            .map(|(device_type, count)| DeviceStats { device_type, count })
            .collect();
        ranked.sort_by(|a, b| b.count.cmp(&a.count).then(a.device_type.cmp(&b.device_type)));
        Ok(ranked)
    }

    /// 导出原始事件为 CSV
    pub async fn export_csv(
        storage: &SeaOrmStorage,
        page_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<String> {
        let events = storage
            .events_for_page(page_id, start, end, MAX_SCAN_ROWS)
            .await?;

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record([
                "id",
                "event_type",
                "page_id",
                "block_id",
                "shortlink_id",
                "ip_address",
                "referrer",
                "source",
                "browser",
                "os",
                "device_type",
                "created_at",
            ])
            .map_err(|e| LinkfolioError::serialization(e.to_string()))?;

        for event in events {
            Self::write_event_row(&mut writer, &event)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| LinkfolioError::serialization(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| LinkfolioError::serialization(e.to_string()))
    }

    fn write_event_row(
        writer: &mut csv::Writer<Vec<u8>>,
        event: &AnalyticsEvent,
    ) -> Result<()> {
        writer
            .write_record([
                event.id.to_string(),
                event.event_type.to_string(),
                event.page_id.map(|v| v.to_string()).unwrap_or_default(),
                event.block_id.map(|v| v.to_string()).unwrap_or_default(),
                event.shortlink_id.clone().unwrap_or_default(),
                event.ip_address.clone().unwrap_or_default(),
                event.referrer.clone().unwrap_or_default(),
                event.source.clone().unwrap_or_default(),
                event.browser.clone().unwrap_or_default(),
                event.os.clone().unwrap_or_default(),
                event.device_type.clone().unwrap_or_default(),
                event.created_at.to_rfc3339(),
            ])
            .map_err(|e| LinkfolioError::serialization(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_range_defaults() {
        let (start, end) = AnalyticsService::parse_date_range(None, None);
        let diff = (end - start).num_days();
        assert!((29..=31).contains(&diff));
    }

    #[test]
    fn test_parse_date_range_rfc3339() {
        let (start, end) = AnalyticsService::parse_date_range(
            Some("2026-01-01T00:00:00Z"),
            Some("2026-01-31T23:59:59Z"),
        );
        assert_eq!(start.date_naive().to_string(), "2026-01-01");
        assert_eq!(end.date_naive().to_string(), "2026-01-31");
    }

    #[test]
    fn test_parse_date_range_yyyy_mm_dd() {
        let (start, end) =
            AnalyticsService::parse_date_range(Some("2026-06-01"), Some("2026-06-30"));
        assert_eq!(start.date_naive().to_string(), "2026-06-01");
        assert_eq!(end.date_naive().to_string(), "2026-06-30");
    }

    #[test]
    fn test_parse_date_range_inverted_falls_back() {
        // start > end 回退默认
        let (start, end) =
            AnalyticsService::parse_date_range(Some("2026-06-30"), Some("2026-06-01"));
        let diff = (end - start).num_days();
        assert!((29..=31).contains(&diff));
    }

    #[test]
    fn test_bucket_labels() {
        let dt = "2026-03-05T14:30:00Z".parse::<DateTime<Utc>>().unwrap();
        assert_eq!(
            AnalyticsService::bucket_label(&dt, GroupBy::Hour),
            "2026-03-05 14:00"
        );
        assert_eq!(
            AnalyticsService::bucket_label(&dt, GroupBy::Day),
            "2026-03-05"
        );
        assert_eq!(
            AnalyticsService::bucket_label(&dt, GroupBy::Month),
            "2026-03"
        );
    }
}
