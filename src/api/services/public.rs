//! 公开页服务
//!
//! 渲染前按固定顺序过三道门：加载失败 / 不存在 → not found，
//! 存在但未发布 → unavailable（与 not found 区分），全部通过
//! 才返回可见块列表。浏览事件在 Ready 之后发出，每次加载一次，
//! 写入是 fire-and-forget，失败不影响响应。

use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, trace};
use ts_rs::TS;

use crate::analytics::EventDraft;
use crate::analytics::global::get_event_recorder;
use crate::api::services::admin::{ErrorCode, error_response, success_response};
use crate::cache::{CacheResult, PageCache};
use crate::errors::Result;
use crate::services::renderer::{
    FetchState, PublicPageView, RenderGate, ViewTracker, evaluate_gate,
};
use crate::storage::models::Block;
use crate::storage::{PageStore, SeaOrmStorage};
use crate::utils::{derive_source, extract_client_ip, parse_user_agent};

const TS_EXPORT_PATH: &str = "../editor-panel/src/services/types.generated.ts";

/// 公开页响应（只含公开字段）
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct PublicPageResponse {
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub blocks: Vec<PublicBlockResponse>,
}

/// 公开块响应
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct PublicBlockResponse {
    pub id: i64,
    pub block_type: String,
    pub position: i32,
    #[ts(type = "any")]
    pub config: Value,
}

fn public_block(block: &Block) -> Result<PublicBlockResponse> {
    Ok(PublicBlockResponse {
        id: block.id,
        block_type: block.kind().to_string(),
        position: block.position,
        config: block.config.config_value()?,
    })
}

fn view_to_response(view: &PublicPageView) -> Result<PublicPageResponse> {
    let blocks = view
        .blocks
        .iter()
        .map(public_block)
        .collect::<Result<Vec<_>>>()?;

    Ok(PublicPageResponse {
        title: view.page.title.clone(),
        slug: view.page.slug.clone(),
        description: view.page.description.clone(),
        blocks,
    })
}

pub struct PublicService {}

impl PublicService {
    /// GET /p/{slug}
    pub async fn get_public_page(
        req: HttpRequest,
        slug: web::Path<String>,
        storage: web::Data<Arc<SeaOrmStorage>>,
        cache: web::Data<Arc<PageCache>>,
    ) -> impl Responder {
        let slug = slug.into_inner();

        match cache.get(&slug).await {
            CacheResult::Found(view) => {
                Self::track_view(&req, &view);
                Self::render_response(&view)
            }
            CacheResult::NotFound => {
                debug!("Public page negative cache hit: {}", slug);
                Self::not_found_response()
            }
            CacheResult::Miss => {
                trace!("Public page cache miss: {}", slug);
                Self::load_and_render(&req, &slug, &storage, &cache).await
            }
        }
    }

    async fn load_and_render(
        req: &HttpRequest,
        slug: &str,
        storage: &SeaOrmStorage,
        cache: &PageCache,
    ) -> HttpResponse {
        let fetch_state = match storage.get_page_by_slug(slug).await {
            Ok(page) => FetchState::Loaded(page),
            Err(e) => {
                error!("Public page lookup failed for {}: {}", slug, e);
                FetchState::Failed
            }
        };

        match evaluate_gate(&fetch_state) {
            RenderGate::Loading => {
                // 服务端加载是同步完成的，这个门只在 Failed/Loaded 之外出现
                Self::not_found_response()
            }
            RenderGate::NotFound => {
                if matches!(fetch_state, FetchState::Loaded(None)) {
                    cache.mark_not_found(slug).await;
                }
                Self::not_found_response()
            }
            RenderGate::Unavailable => {
                // 未发布状态不进负缓存：发布开关要立即生效
                debug!("Public page unavailable (unpublished): {}", slug);
                Self::unavailable_response()
            }
            RenderGate::Ready => {
                let FetchState::Loaded(Some(page)) = fetch_state else {
                    return Self::not_found_response();
                };

                let blocks = match storage.list_blocks(page.id).await {
                    Ok(blocks) => blocks,
                    Err(e) => {
                        error!("Public page block load failed for {}: {}", slug, e);
                        return Self::error_response();
                    }
                };

                let view = Arc::new(PublicPageView::render(page, &blocks));
                cache.insert(slug, Arc::clone(&view)).await;

                Self::track_view(req, &view);
                Self::render_response(&view)
            }
        }
    }

    /// 浏览事件：每次页面加载只发一次，入队后不关心结果
    fn track_view(req: &HttpRequest, view: &PublicPageView) {
        let tracker = ViewTracker::new();
        if !tracker.try_mark() {
            return;
        }

        let Some(recorder) = get_event_recorder() else {
            trace!("View event dropped: recorder not initialized");
            return;
        };

        let mut draft = EventDraft::page_view(view.page.id);
        draft.ip_address = extract_client_ip(req);
        draft.referrer = req
            .headers()
            .get("Referer")
            .and_then(|h| h.to_str().ok())
            .map(String::from);
        draft.source = Some(derive_source(
            Some(req.query_string()),
            draft.referrer.as_deref(),
        ));

        if let Some(ua) = req
            .headers()
            .get("User-Agent")
            .and_then(|h| h.to_str().ok())
        {
            let device = parse_user_agent(ua);
            draft.browser = device.browser;
            draft.os = device.os;
            draft.device_type = device.device_type;
        }

        recorder.record(draft);
    }

    fn render_response(view: &PublicPageView) -> HttpResponse {
        match view_to_response(view) {
            Ok(resp) => success_response(resp),
            Err(e) => {
                error!("Public page serialization failed: {}", e);
                Self::error_response()
            }
        }
    }

    #[inline]
    fn not_found_response() -> HttpResponse {
        error_response(StatusCode::NOT_FOUND, ErrorCode::PageNotFound, "Page not found")
    }

    /// 未发布状态，与 not found 区分
    #[inline]
    fn unavailable_response() -> HttpResponse {
        error_response(
            StatusCode::FORBIDDEN,
            ErrorCode::PageUnavailable,
            "This page is not available",
        )
    }

    #[inline]
    fn error_response() -> HttpResponse {
        error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::InternalServerError,
            "Internal Server Error",
        )
    }
}
