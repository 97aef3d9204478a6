//! API 模块常量定义
//!
//! 包含认证、Cookie 等相关的硬编码常量。

/// Access Token Cookie 名称
pub const ACCESS_COOKIE_NAME: &str = "linkfolio_access";

/// Refresh Token Cookie 名称
pub const REFRESH_COOKIE_NAME: &str = "linkfolio_refresh";
