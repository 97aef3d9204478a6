//! 健康检查服务

use actix_web::{HttpResponse, Responder, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::error;

use crate::storage::SeaOrmStorage;

/// 程序启动时间（用于 uptime 计算）
#[derive(Clone, Debug)]
pub struct AppStartTime {
    pub start_datetime: DateTime<Utc>,
}

/// 存储健康检查状态
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct HealthStorageCheck {
    pub status: String,
    pub backend: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// 健康检查项容器
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct HealthChecks {
    pub storage: HealthStorageCheck,
}

/// 健康检查响应
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub uptime: u64,
    pub checks: HealthChecks,
    pub response_time_ms: u64,
}

pub struct HealthService {}

impl HealthService {
    pub async fn health_check(
        storage: web::Data<Arc<SeaOrmStorage>>,
        start_time: web::Data<AppStartTime>,
    ) -> impl Responder {
        let started = Instant::now();

        let storage_check = match storage.get_db().ping().await {
            Ok(()) => HealthStorageCheck {
                status: "ok".to_string(),
                backend: storage.backend_name().to_string(),
                error: None,
            },
            Err(e) => {
                error!("Health check: storage ping failed: {}", e);
                HealthStorageCheck {
                    status: "error".to_string(),
                    backend: storage.backend_name().to_string(),
                    error: Some(e.to_string()),
                }
            }
        };

        let healthy = storage_check.status == "ok";
        let now = Utc::now();
        let response = HealthResponse {
            status: if healthy { "ok" } else { "degraded" }.to_string(),
            timestamp: now.to_rfc3339(),
            uptime: (now - start_time.start_datetime).num_seconds().max(0) as u64,
            checks: HealthChecks {
                storage: storage_check,
            },
            response_time_ms: started.elapsed().as_millis() as u64,
        };

        if healthy {
            HttpResponse::Ok().json(response)
        } else {
            HttpResponse::ServiceUnavailable().json(response)
        }
    }
}
