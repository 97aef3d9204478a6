//! Admin API 认证相关端点

use actix_governor::{Governor, GovernorConfigBuilder, KeyExtractor, SimpleKeyExtractionError};
use actix_web::dev::ServiceRequest;
use actix_web::http::StatusCode;
use actix_web::{HttpMessage, HttpRequest, HttpResponse, Responder, Result as ActixResult, web};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::api::jwt::get_jwt_service;
use crate::api::middleware::AuthContext;
use crate::config::get_config;
use crate::storage::{PageStore, SeaOrmStorage};
use crate::utils::ip::is_trusted_proxy;
use crate::utils::verify_password;

use super::error_code::ErrorCode;
use super::helpers::{CookieBuilder, error_response, success_response};
use super::types::{AccountResponse, AuthSuccessResponse, LoginCredentials, MessageResponse};

/// 基于 IP 地址的限流 key 提取器（安全版）
///
/// 策略：
/// - 默认使用连接 IP（peer_addr），无法被伪造
/// - 如果连接来自配置的可信代理，则使用 X-Forwarded-For
#[derive(Clone, Copy)]
pub struct PeerIpKeyExtractor;

impl KeyExtractor for PeerIpKeyExtractor {
    type Key = String;
    type KeyExtractionError = SimpleKeyExtractionError<&'static str>;

    fn extract(&self, req: &ServiceRequest) -> Result<Self::Key, Self::KeyExtractionError> {
        let conn_info = req.connection_info();

        // 获取连接 IP（TCP peer address，无法伪造）
        let peer_ip = conn_info
            .peer_addr()
            .ok_or_else(|| SimpleKeyExtractionError::new("Unable to extract peer IP"))?;

        let config = get_config();
        let trusted_proxies = &config.server.trusted_proxies;

        if !trusted_proxies.is_empty() && is_trusted_proxy(peer_ip, trusted_proxies) {
            // 来自可信代理，使用 X-Forwarded-For
            let real_ip = conn_info.realip_remote_addr().unwrap_or(peer_ip);
            debug!("Rate limit key from trusted proxy: {}", real_ip);
            Ok(real_ip.to_string())
        } else {
            Ok(peer_ip.to_string())
        }
    }
}

/// 创建登录限流器
///
/// 配置：每秒补充 1 个令牌，突发最多 5 次请求
/// 超限返回 HTTP 429 Too Many Requests
pub fn login_rate_limiter()
-> Governor<PeerIpKeyExtractor, governor::middleware::NoOpMiddleware> {
    let config = GovernorConfigBuilder::default()
        .seconds_per_request(1)
        .burst_size(5)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .expect("Invalid rate limit config");

    debug!("Login rate limiter created: 1 req/s, burst 5");
    Governor::new(&config)
}

/// 创建 token 刷新限流器
pub fn refresh_rate_limiter()
-> Governor<PeerIpKeyExtractor, governor::middleware::NoOpMiddleware> {
    let config = GovernorConfigBuilder::default()
        .seconds_per_request(2)
        .burst_size(10)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .expect("Invalid rate limit config");

    Governor::new(&config)
}

fn issue_token_response(account_id: i64) -> HttpResponse {
    let jwt_service = get_jwt_service();

    let access_token = match jwt_service.generate_access_token(account_id) {
        Ok(token) => token,
        Err(e) => {
            error!("Admin API: failed to generate access token: {}", e);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::InternalServerError,
                "Failed to generate token",
            );
        }
    };

    let refresh_token = match jwt_service.generate_refresh_token(account_id) {
        Ok(token) => token,
        Err(e) => {
            error!("Admin API: failed to generate refresh token: {}", e);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::InternalServerError,
                "Failed to generate token",
            );
        }
    };

    let cookie_builder = CookieBuilder::from_config();
    let access_cookie = cookie_builder.build_access_cookie(access_token);
    let refresh_cookie = cookie_builder.build_refresh_cookie(refresh_token);

    HttpResponse::Ok()
        .cookie(access_cookie)
        .cookie(refresh_cookie)
        .append_header(("Content-Type", "application/json; charset=utf-8"))
        .json(crate::api::services::admin::ApiResponse {
            code: ErrorCode::Success as i32,
            message: "OK".to_string(),
            data: Some(AuthSuccessResponse {
                message: "Login successful".to_string(),
                expires_in: cookie_builder.access_token_minutes() * 60,
            }),
        })
}

/// 登录：邮箱 + 密码换取 token
pub async fn login(
    _req: HttpRequest,
    login_body: web::Json<LoginCredentials>,
    storage: web::Data<Arc<SeaOrmStorage>>,
) -> ActixResult<impl Responder> {
    let account = match storage.find_account_by_email(&login_body.email).await {
        Ok(Some(account)) => account,
        Ok(None) => {
            info!("Admin API: login failed - unknown email");
            return Ok(error_response(
                StatusCode::UNAUTHORIZED,
                ErrorCode::AuthFailed,
                "Invalid email or password",
            ));
        }
        Err(e) => {
            error!("Admin API: login lookup failed: {}", e);
            return Ok(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::InternalServerError,
                "Authentication error",
            ));
        }
    };

    let password_valid = match verify_password(&login_body.password, &account.password_hash) {
        Ok(valid) => valid,
        Err(e) => {
            error!("Admin API: password verification error: {}", e);
            return Ok(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::InternalServerError,
                "Authentication error",
            ));
        }
    };

    if !password_valid {
        // 与未知邮箱同样的提示，避免枚举
        info!("Admin API: login failed - wrong password for {}", account.id);
        return Ok(error_response(
            StatusCode::UNAUTHORIZED,
            ErrorCode::AuthFailed,
            "Invalid email or password",
        ));
    }

    info!("Admin API: login successful for account {}", account.id);
    Ok(issue_token_response(account.id))
}

/// 刷新 token（滑动过期）
pub async fn refresh_token(req: HttpRequest) -> ActixResult<impl Responder> {
    let cookie_builder = CookieBuilder::from_config();

    let refresh_token = match req.cookie(cookie_builder.refresh_cookie_name()) {
        Some(cookie) => cookie.value().to_string(),
        None => {
            warn!("Admin API: refresh token not found in cookie");
            return Ok(error_response(
                StatusCode::UNAUTHORIZED,
                ErrorCode::TokenInvalid,
                "Refresh token not found",
            ));
        }
    };

    let jwt_service = get_jwt_service();
    let claims = match jwt_service.validate_refresh_token(&refresh_token) {
        Ok(claims) => claims,
        Err(e) => {
            warn!("Admin API: invalid refresh token: {}", e);
            return Ok(error_response(
                StatusCode::UNAUTHORIZED,
                ErrorCode::TokenInvalid,
                "Invalid refresh token",
            ));
        }
    };

    let Some(account_id) = claims.account_id() else {
        warn!("Admin API: refresh token carries malformed subject");
        return Ok(error_response(
            StatusCode::UNAUTHORIZED,
            ErrorCode::TokenInvalid,
            "Invalid refresh token",
        ));
    };

    info!("Admin API: token refresh successful for account {}", account_id);
    Ok(issue_token_response(account_id))
}

/// 登出：清除 cookie
pub async fn logout(_req: HttpRequest) -> ActixResult<impl Responder> {
    let cookie_builder = CookieBuilder::from_config();

    Ok(HttpResponse::Ok()
        .cookie(cookie_builder.build_expired_access_cookie())
        .cookie(cookie_builder.build_expired_refresh_cookie())
        .append_header(("Content-Type", "application/json; charset=utf-8"))
        .json(crate::api::services::admin::ApiResponse {
            code: ErrorCode::Success as i32,
            message: "OK".to_string(),
            data: Some(MessageResponse {
                message: "Logged out".to_string(),
            }),
        }))
}

/// 当前账户信息
pub async fn me(
    req: HttpRequest,
    storage: web::Data<Arc<SeaOrmStorage>>,
) -> ActixResult<impl Responder> {
    let Some(auth) = req.extensions().get::<AuthContext>().copied() else {
        return Ok(error_response(
            StatusCode::UNAUTHORIZED,
            ErrorCode::Unauthorized,
            "Unauthorized",
        ));
    };

    match storage.get_account(auth.account_id).await {
        Ok(Some(account)) => Ok(success_response(AccountResponse {
            id: account.id,
            email: account.email,
            plan_tier: account.plan_tier.to_string(),
            created_at: account.created_at.to_rfc3339(),
        })),
        Ok(None) => Ok(error_response(
            StatusCode::UNAUTHORIZED,
            ErrorCode::Unauthorized,
            "Account no longer exists",
        )),
        Err(e) => {
            error!("Admin API: account lookup failed: {}", e);
            Ok(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::InternalServerError,
                "Account lookup failed",
            ))
        }
    }
}
