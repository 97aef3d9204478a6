//! 事件追踪端点
//!
//! POST /api/track：单次调用一条事件。event_type 必须在固定
//! 集合内，且至少要有一个目标 id。来源字段（ip / UA / referrer）
//! 一律取自请求头，请求体里的同名信息不被采信。
//!
//! 这里是单条直写：校验失败 4xx，落库失败 5xx。页面浏览的
//! fire-and-forget 路径走缓冲记录器，不经过这里。

use actix_governor::Governor;
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, Responder, Result as ActixResult, web};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, error};
use ts_rs::TS;

use crate::analytics::{EventDraft, EventSink};
use crate::api::services::admin::auth::PeerIpKeyExtractor;
use crate::api::services::admin::{ErrorCode, error_response, success_response};
use crate::storage::SeaOrmStorage;
use crate::storage::models::EventType;
use crate::utils::{derive_source, extract_client_ip, parse_user_agent};

const TS_EXPORT_PATH: &str = "../editor-panel/src/services/types.generated.ts";

/// 追踪请求体
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct TrackEventRequest {
    pub page_id: Option<i64>,
    pub block_id: Option<i64>,
    pub shortlink_id: Option<String>,
    pub event_type: String,
    #[ts(type = "any | null")]
    pub metadata: Option<Value>,
}

/// 追踪确认响应
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct TrackAckResponse {
    pub recorded: bool,
}

/// 创建追踪端点限流器：每秒补充 1 个令牌，突发最多 30 次请求
pub fn track_rate_limiter()
-> Governor<PeerIpKeyExtractor, governor::middleware::NoOpMiddleware> {
    use actix_governor::GovernorConfigBuilder;

    let config = GovernorConfigBuilder::default()
        .seconds_per_request(1)
        .burst_size(30)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .expect("Invalid rate limit config");

    Governor::new(&config)
}

pub struct TrackService {}

impl TrackService {
    /// POST /api/track
    pub async fn track_event(
        req: HttpRequest,
        body: web::Json<TrackEventRequest>,
        storage: web::Data<Arc<SeaOrmStorage>>,
    ) -> ActixResult<impl Responder> {
        // 事件类型必须在固定集合内
        let event_type = match EventType::from_str(&body.event_type) {
            Ok(event_type) => event_type,
            Err(_) => {
                debug!("Track API: invalid event type rejected: {}", body.event_type);
                return Ok(error_response(
                    StatusCode::BAD_REQUEST,
                    ErrorCode::EventInvalidType,
                    "event_type must be one of: view, click, purchase, submit, download",
                ));
            }
        };

        let mut draft = EventDraft::new(event_type);
        draft.page_id = body.page_id;
        draft.block_id = body.block_id;
        draft.shortlink_id = body.shortlink_id.clone();
        draft.metadata = body.metadata.clone();

        // 至少一个目标 id
        if !draft.has_target() {
            debug!("Track API: event without target rejected");
            return Ok(error_response(
                StatusCode::BAD_REQUEST,
                ErrorCode::EventMissingTarget,
                "At least one of page_id, block_id, shortlink_id is required",
            ));
        }

        // 来源字段从请求头提取，防止伪造
        draft.ip_address = extract_client_ip(&req);
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

        match storage.log_event(draft).await {
            Ok(()) => Ok(success_response(TrackAckResponse { recorded: true })),
            Err(e) => {
                error!("Track API: event insert failed: {}", e);
                Ok(error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::InternalServerError,
                    "Failed to record event",
                ))
            }
        }
    }
}
