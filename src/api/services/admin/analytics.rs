//! Analytics API 端点
//!
//! 提供页面维度的统计查询：
//! - 汇总 + 趋势 + 热门块 + 来源（组合响应）
//! - 设备分布
//! - 原始事件 CSV 导出

use actix_web::{HttpRequest, HttpResponse, Responder, Result as ActixResult, web};
use serde::Serialize;
use std::sync::Arc;
use tracing::error;
use ts_rs::TS;

use crate::services::analytics::{
    AnalyticsService, DeviceStats, PageSummary, SourceStats, TopBlock, TrendData,
};
use crate::storage::SeaOrmStorage;

use super::helpers::{error_from_linkfolio, success_response};
use super::page_crud::{auth_context, owned_page};
use super::types::{AnalyticsQuery, TS_EXPORT_PATH};

/// 单页统计组合响应
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct PageAnalyticsResponse {
    pub page_id: i64,
    pub summary: PageSummary,
    pub trend: TrendData,
    pub top_blocks: Vec<TopBlock>,
    pub sources: Vec<SourceStats>,
}

/// 设备分布响应
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct DeviceAnalyticsResponse {
    pub page_id: i64,
    pub devices: Vec<DeviceStats>,
}

/// 单页统计
pub async fn get_page_analytics(
    req: HttpRequest,
    page_id: web::Path<i64>,
    query: web::Query<AnalyticsQuery>,
    storage: web::Data<Arc<SeaOrmStorage>>,
) -> ActixResult<impl Responder> {
    let auth = match auth_context(&req) {
        Ok(auth) => auth,
        Err(resp) => return Ok(resp),
    };

    let page = match owned_page(&storage, auth, *page_id).await {
        Ok(page) => page,
        Err(resp) => return Ok(resp),
    };

    let (start, end) = AnalyticsService::parse_date_range(
        query.start_date.as_deref(),
        query.end_date.as_deref(),
    );
    let group_by = query.group_by.unwrap_or_default();
    let limit = query.limit.unwrap_or(10).clamp(1, 100) as usize;

    let result = async {
        let summary = AnalyticsService::summary(&storage, page.id, start, end).await?;
        let trend =
            AnalyticsService::trend(&storage, page.id, start, end, group_by, None).await?;
        let top_blocks =
            AnalyticsService::top_blocks(&storage, page.id, start, end, limit).await?;
        let sources = AnalyticsService::sources(&storage, page.id, start, end, limit).await?;

        Ok::<_, crate::errors::LinkfolioError>(PageAnalyticsResponse {
            page_id: page.id,
            summary,
            trend,
            top_blocks,
            sources,
        })
    }
    .await;

    match result {
        Ok(resp) => Ok(success_response(resp)),
        Err(e) => {
            error!("Admin API: analytics query failed - {}: {}", page_id, e);
            Ok(error_from_linkfolio(&e))
        }
    }
}

/// 单页设备分布
pub async fn get_page_device_stats(
    req: HttpRequest,
    page_id: web::Path<i64>,
    query: web::Query<AnalyticsQuery>,
    storage: web::Data<Arc<SeaOrmStorage>>,
) -> ActixResult<impl Responder> {
    let auth = match auth_context(&req) {
        Ok(auth) => auth,
        Err(resp) => return Ok(resp),
    };

    let page = match owned_page(&storage, auth, *page_id).await {
        Ok(page) => page,
        Err(resp) => return Ok(resp),
    };

    let (start, end) = AnalyticsService::parse_date_range(
        query.start_date.as_deref(),
        query.end_date.as_deref(),
    );

    match AnalyticsService::devices(&storage, page.id, start, end).await {
        Ok(devices) => Ok(success_response(DeviceAnalyticsResponse {
            page_id: page.id,
            devices,
        })),
        Err(e) => {
            error!("Admin API: device stats failed - {}: {}", page_id, e);
            Ok(error_from_linkfolio(&e))
        }
    }
}

/// 导出原始事件 CSV
pub async fn export_page_events(
    req: HttpRequest,
    page_id: web::Path<i64>,
    query: web::Query<AnalyticsQuery>,
    storage: web::Data<Arc<SeaOrmStorage>>,
) -> ActixResult<impl Responder> {
    let auth = match auth_context(&req) {
        Ok(auth) => auth,
        Err(resp) => return Ok(resp),
    };

    let page = match owned_page(&storage, auth, *page_id).await {
        Ok(page) => page,
        Err(resp) => return Ok(resp),
    };

    let (start, end) = AnalyticsService::parse_date_range(
        query.start_date.as_deref(),
        query.end_date.as_deref(),
    );

    match AnalyticsService::export_csv(&storage, page.id, start, end).await {
        Ok(csv) => {
            let filename = format!("events_{}.csv", page.slug);
            Ok(HttpResponse::Ok()
                .insert_header(("Content-Type", "text/csv; charset=utf-8"))
                .insert_header((
                    "Content-Disposition",
                    format!("attachment; filename=\"{}\"", filename),
                ))
                .body(csv))
        }
        Err(e) => {
            error!("Admin API: event export failed - {}: {}", page_id, e);
            Ok(error_from_linkfolio(&e))
        }
    }
}
