//! 统一 API 错误码定义

use serde_repr::{Deserialize_repr, Serialize_repr};
use ts_rs::TS;

use super::types::TS_EXPORT_PATH;

use crate::errors::LinkfolioError;

/// API 错误码枚举
///
/// 使用 serde_repr 序列化为数字，ts-rs 自动生成 TypeScript 类型。
/// 按千位分域：
/// - 0: 成功
/// - 1000-1099: 通用错误
/// - 2000-2099: 认证错误
/// - 3000-3099: 页面错误
/// - 4000-4099: 块错误
/// - 5000-5099: 事件/统计错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[ts(rename = "ErrorCode")]
#[ts(repr(enum))]
#[repr(i32)]
pub enum ErrorCode {
    // 成功
    Success = 0,

    // 通用错误 1000-1099
    BadRequest = 1000,
    Unauthorized = 1001,
    NotFound = 1004,
    InternalServerError = 1005,
    RateLimitExceeded = 1020,
    ServiceUnavailable = 1030,

    // 认证错误 2000-2099
    AuthFailed = 2000,
    TokenExpired = 2001,
    TokenInvalid = 2002,

    // 页面错误 3000-3099
    PageNotFound = 3000,
    SlugAlreadyExists = 3001,
    PageInvalidSlug = 3002,
    PageUnavailable = 3003,

    // 块错误 4000-4099
    BlockNotFound = 4000,
    BlockInvalidConfig = 4001,
    BlockTypeImmutable = 4002,
    PlanUpgradeRequired = 4003,

    // 事件/统计错误 5000-5099
    EventInvalidType = 5000,
    EventMissingTarget = 5001,
    AnalyticsQueryFailed = 5002,
    AnalyticsExportFailed = 5003,
}

impl From<LinkfolioError> for ErrorCode {
    fn from(err: LinkfolioError) -> Self {
        match err {
            LinkfolioError::Validation(_) => ErrorCode::BadRequest,
            LinkfolioError::NotFound(_) => ErrorCode::NotFound,
            LinkfolioError::SlugConflict(_) => ErrorCode::SlugAlreadyExists,
            LinkfolioError::PlanRequired(_) => ErrorCode::PlanUpgradeRequired,
            LinkfolioError::Unauthorized(_) => ErrorCode::Unauthorized,
            _ => ErrorCode::InternalServerError,
        }
    }
}
