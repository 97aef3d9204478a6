//! Admin API 服务模块
//!
//! 该模块包含管理 API 的所有端点，包括：
//! - 认证（登录、登出、token 刷新）
//! - 页面 CRUD 操作
//! - 块 CRUD 操作（含订阅等级门槛）
//! - 分析统计

pub mod analytics;
pub mod auth;
mod block_crud;
pub mod error_code;
mod helpers;
mod page_crud;
pub mod routes;
mod types;

// 重新导出类型
pub use types::*;

// 重新导出帮助函数
pub use helpers::{
    api_result, created_response, error_from_linkfolio, error_response, success_response,
};

// 重新导出错误码
pub use error_code::ErrorCode;

// 重新导出认证端点
pub use auth::{login, logout, me, refresh_token};

// 重新导出页面 CRUD 端点
pub use page_crud::{delete_page, get_page, get_pages, post_page, publish_page, put_page};

// 重新导出块 CRUD 端点
pub use block_crud::{
    delete_block, get_block, get_blocks, post_block, put_block, put_block_visibility,
};

// 重新导出统计端点
pub use analytics::{export_page_events, get_page_analytics, get_page_device_stats};
