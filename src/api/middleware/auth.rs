//! 管理 API 认证中间件
//!
//! 支持两种认证方式：
//! - Bearer Token（API 调用方）
//! - Cookie（编辑器前端）
//!
//! 验证通过后把账户 id 写入请求扩展，下游 handler 据此做
//! 归属和订阅等级判断。

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::{Method, header::CONTENT_TYPE},
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use tracing::{info, trace};

use crate::api::constants;
use crate::api::jwt::get_jwt_service;
use crate::api::services::admin::{ApiResponse, ErrorCode};

/// 认证上下文：验证通过的账户 id
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuthContext {
    pub account_id: i64,
}

/// Owner authentication middleware
#[derive(Clone)]
pub struct OwnerAuth;

impl<S, B> Transform<S, ServiceRequest> for OwnerAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = OwnerAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(OwnerAuthMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct OwnerAuthMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> OwnerAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    /// Handle OPTIONS requests for CORS preflight
    fn handle_options_request(req: ServiceRequest) -> ServiceResponse<EitherBody<B>> {
        req.into_response(
            HttpResponse::NoContent()
                .insert_header((CONTENT_TYPE, "text/plain; charset=utf-8"))
                .finish()
                .map_into_right_body(),
        )
    }

    /// Handle unauthorized requests
    fn handle_unauthorized(req: ServiceRequest) -> ServiceResponse<EitherBody<B>> {
        info!("Owner authentication failed - invalid or missing token");
        req.into_response(
            HttpResponse::Unauthorized()
                .insert_header((CONTENT_TYPE, "application/json; charset=utf-8"))
                .json(ApiResponse::<()> {
                    code: ErrorCode::Unauthorized as i32,
                    message: "Unauthorized: Invalid or missing token".to_string(),
                    data: None,
                })
                .map_into_right_body(),
        )
    }

    /// 从 Authorization header 提取 Bearer token
    fn extract_bearer_token(req: &ServiceRequest) -> Option<String> {
        req.headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.strip_prefix("Bearer "))
            .map(|s| s.to_string())
    }

    /// 验证 token，返回账户 id
    fn validate_token(token: &str) -> Option<i64> {
        let jwt_service = get_jwt_service();
        match jwt_service.validate_access_token(token) {
            Ok(claims) => {
                trace!("Access token validation successful");
                claims.account_id()
            }
            Err(e) => {
                info!("Access token validation failed: {}", e);
                None
            }
        }
    }

    /// 按优先级认证：Bearer → Cookie
    fn authenticate(req: &ServiceRequest) -> Option<i64> {
        if let Some(token) = Self::extract_bearer_token(req)
            && let Some(account_id) = Self::validate_token(&token)
        {
            return Some(account_id);
        }

        if let Some(cookie) = req.cookie(constants::ACCESS_COOKIE_NAME)
            && let Some(account_id) = Self::validate_token(cookie.value())
        {
            return Some(account_id);
        }

        None
    }

    /// 认证端点直接放行（login/refresh 自带校验，logout 无需校验）
    fn is_auth_endpoint(req: &ServiceRequest) -> bool {
        let path = req.path();
        path.ends_with("/v1/auth/login")
            || path.ends_with("/v1/auth/refresh")
            || path.ends_with("/v1/auth/logout")
    }
}

impl<S, B> Service<ServiceRequest> for OwnerAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // CORS 预检直接放行
        if req.method() == Method::OPTIONS {
            return Box::pin(async move { Ok(Self::handle_options_request(req)) });
        }

        // 认证端点放行，由 handler 自行校验
        if Self::is_auth_endpoint(&req) {
            trace!("Auth endpoint accessed - bypassing authentication");
            let service = Rc::clone(&self.service);
            return Box::pin(async move {
                let res = service.call(req).await?;
                Ok(res.map_into_left_body())
            });
        }

        match Self::authenticate(&req) {
            Some(account_id) => {
                req.extensions_mut().insert(AuthContext { account_id });
                let service = Rc::clone(&self.service);
                Box::pin(async move {
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                })
            }
            None => Box::pin(async move { Ok(Self::handle_unauthorized(req)) }),
        }
    }
}
