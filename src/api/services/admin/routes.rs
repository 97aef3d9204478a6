//! Admin API 路由配置
//!
//! 将 /v1 下的路由按功能模块拆分，提高可读性和可维护性。

use actix_web::web;

use super::analytics::{export_page_events, get_page_analytics, get_page_device_stats};
use super::auth::{login, login_rate_limiter, logout, me, refresh_rate_limiter, refresh_token};
use super::block_crud::{
    delete_block, get_block, get_blocks, post_block, put_block, put_block_visibility,
};
use super::page_crud::{
    delete_page, get_page, get_pages, post_page, publish_page, put_page,
};

/// 页面管理路由 `/pages`
///
/// 包含：
/// - GET /pages - 当前账户的所有页面
/// - POST /pages - 创建页面
/// - GET /pages/{id} - 获取单个页面
/// - PUT /pages/{id} - 部分更新
/// - PUT /pages/{id}/publish - 发布开关（独立保存路径）
/// - DELETE /pages/{id} - 删除页面
/// - GET /pages/{id}/blocks - 块列表（编辑视图）
/// - POST /pages/{id}/blocks - 创建块
/// - GET /pages/{id}/analytics - 单页统计
/// - GET /pages/{id}/analytics/devices - 设备分布
/// - GET /pages/{id}/analytics/export - CSV 导出
pub fn pages_routes() -> actix_web::Scope {
    web::scope("/pages")
        .route("", web::get().to(get_pages))
        .route("", web::post().to(post_page))
        // Analytics（必须在 /{id} 之前注册更长的路径）
        .route(
            "/{id}/analytics/devices",
            web::get().to(get_page_device_stats),
        )
        .route("/{id}/analytics/export", web::get().to(export_page_events))
        .route("/{id}/analytics", web::get().to(get_page_analytics))
        // Blocks
        .route("/{id}/blocks", web::get().to(get_blocks))
        .route("/{id}/blocks", web::post().to(post_block))
        // Publish toggle
        .route("/{id}/publish", web::put().to(publish_page))
        // Single page operations
        .route("/{id}", web::get().to(get_page))
        .route("/{id}", web::put().to(put_page))
        .route("/{id}", web::delete().to(delete_page))
}

/// 块管理路由 `/blocks`
///
/// 包含：
/// - GET /blocks/{id} - 获取单个块
/// - PUT /blocks/{id} - 更新配置（类型不可变）
/// - PUT /blocks/{id}/visibility - 可见性开关
/// - DELETE /blocks/{id} - 删除块
pub fn blocks_routes() -> actix_web::Scope {
    web::scope("/blocks")
        .route("/{id}/visibility", web::put().to(put_block_visibility))
        .route("/{id}", web::get().to(get_block))
        .route("/{id}", web::put().to(put_block))
        .route("/{id}", web::delete().to(delete_block))
}

/// 认证路由 `/auth`
///
/// 包含：
/// - POST /auth/login - 登录（带限流）
/// - POST /auth/refresh - 刷新 token（带限流）
/// - POST /auth/logout - 登出
/// - GET /auth/me - 当前账户
pub fn auth_routes() -> actix_web::Scope {
    web::scope("/auth")
        .route("/login", web::post().to(login).wrap(login_rate_limiter()))
        .route(
            "/refresh",
            web::post().to(refresh_token).wrap(refresh_rate_limiter()),
        )
        .route("/logout", web::post().to(logout))
        .route("/me", web::get().to(me))
}

/// Admin API v1 路由
///
/// 组合所有子模块路由
pub fn admin_v1_routes() -> actix_web::Scope {
    web::scope("/v1")
        .service(pages_routes())
        .service(blocks_routes())
        .service(auth_routes())
}
