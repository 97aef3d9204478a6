//! Analytics event operations for SeaOrmStorage
//!
//! 事件写入走 sink trait（缓冲管理器批量调用），查询侧给
//! AnalyticsService 提供原始行和计数。

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::sea_query::Expr;
use sea_orm::ExprTrait;
use sea_orm::{
    ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};
use tracing::debug;

use super::SeaOrmStorage;
use super::converters::model_to_event;
use crate::analytics::{EventDraft, EventSink, ViewCountSink};
use crate::errors::Result;
use crate::storage::models::{AnalyticsEvent, EventType};
use migration::entities::{analytics_event, page};

fn draft_to_active_model(draft: EventDraft) -> analytics_event::ActiveModel {
    analytics_event::ActiveModel {
        page_id: Set(draft.page_id),
        block_id: Set(draft.block_id),
        shortlink_id: Set(draft.shortlink_id),
        event_type: Set(draft.event_type.to_string()),
        ip_address: Set(draft.ip_address),
        referrer: Set(draft.referrer),
        source: Set(draft.source),
        browser: Set(draft.browser),
        os: Set(draft.os),
        device_type: Set(draft.device_type),
        metadata: Set(draft.metadata),
        created_at: Set(draft.timestamp),
        ..Default::default()
    }
}

#[async_trait]
impl EventSink for SeaOrmStorage {
    async fn log_event(&self, event: EventDraft) -> anyhow::Result<()> {
        analytics_event::Entity::insert(draft_to_active_model(event))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn log_events_batch(&self, events: Vec<EventDraft>) -> anyhow::Result<()> {
        if events.is_empty() {
            return Ok(());
        }

        let count = events.len();
        let models: Vec<analytics_event::ActiveModel> =
            events.into_iter().map(draft_to_active_model).collect();

        analytics_event::Entity::insert_many(models)
            .exec(&self.db)
            .await?;

        debug!("Flushed {} analytics events", count);
        Ok(())
    }
}

#[async_trait]
impl ViewCountSink for SeaOrmStorage {
    async fn flush_view_counts(&self, updates: Vec<(i64, u64)>) -> anyhow::Result<()> {
        for (page_id, count) in updates {
            page::Entity::update_many()
                .col_expr(
                    page::Column::ViewCount,
                    Expr::col(page::Column::ViewCount).add(count as i64),
                )
                .filter(page::Column::Id.eq(page_id))
                .exec(&self.db)
                .await?;
        }
        Ok(())
    }
}

impl SeaOrmStorage {
    pub fn as_event_sink(self: &Arc<Self>) -> Arc<dyn EventSink> {
        Arc::clone(self) as Arc<dyn EventSink>
    }

    pub fn as_view_count_sink(self: &Arc<Self>) -> Arc<dyn ViewCountSink> {
        Arc::clone(self) as Arc<dyn ViewCountSink>
    }

    /// 单页事件计数（可按事件类型过滤）
    pub async fn count_events(
        &self,
        page_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        event_type: Option<EventType>,
    ) -> Result<u64> {
        let mut query = analytics_event::Entity::find()
            .filter(analytics_event::Column::PageId.eq(page_id))
            .filter(analytics_event::Column::CreatedAt.gte(start))
            .filter(analytics_event::Column::CreatedAt.lte(end));

        if let Some(et) = event_type {
            query = query.filter(analytics_event::Column::EventType.eq(et.to_string()));
        }

        Ok(query.count(&self.db).await?)
    }

    /// 单页时间范围内的事件（时间升序，带上限保护）
    pub async fn events_for_page(
        &self,
        page_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: u64,
    ) -> Result<Vec<AnalyticsEvent>> {
        let models = analytics_event::Entity::find()
            .filter(analytics_event::Column::PageId.eq(page_id))
            .filter(analytics_event::Column::CreatedAt.gte(start))
            .filter(analytics_event::Column::CreatedAt.lte(end))
            .order_by_asc(analytics_event::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().filter_map(model_to_event).collect())
    }

    /// 删除 cutoff 之前的事件（分批删除避免长事务）
    pub async fn purge_events_before(
        &self,
        cutoff: DateTime<Utc>,
        batch_size: u64,
    ) -> Result<u64> {
        let mut total_deleted = 0u64;

        loop {
            let ids_to_delete: Vec<i64> = analytics_event::Entity::find()
                .select_only()
                .column(analytics_event::Column::Id)
                .filter(analytics_event::Column::CreatedAt.lt(cutoff))
                .order_by_asc(analytics_event::Column::Id)
                .limit(batch_size)
                .into_tuple()
                .all(&self.db)
                .await?;

            if ids_to_delete.is_empty() {
                break;
            }

            let deleted = analytics_event::Entity::delete_many()
                .filter(analytics_event::Column::Id.is_in(ids_to_delete))
                .exec(&self.db)
                .await?
                .rows_affected;

            total_deleted += deleted;

            if deleted < batch_size {
                break;
            }

            // 批次之间让出，避免对数据库造成过大压力
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        }

        Ok(total_deleted)
    }
}
