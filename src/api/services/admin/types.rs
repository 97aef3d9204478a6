//! Admin API 类型定义

use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

use crate::errors::Result;
use crate::storage::models::{Block, Page};

/// 输出目录常量
pub const TS_EXPORT_PATH: &str = "../editor-panel/src/services/types.generated.ts";

/// 统一响应包裹
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub message: String,
    pub data: Option<T>,
}

#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct AuthSuccessResponse {
    pub message: String,
    /// Access token 有效期（秒）
    pub expires_in: u64,
}

#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct AccountResponse {
    pub id: i64,
    pub email: String,
    pub plan_tier: String,
    pub created_at: String,
}

// ============ 页面类型 ============

#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct CreatePageRequest {
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct UpdatePageRequest {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct PublishRequest {
    pub is_published: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct PageResponse {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub is_published: bool,
    pub view_count: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Page> for PageResponse {
    fn from(page: Page) -> Self {
        Self {
            id: page.id,
            title: page.title,
            slug: page.slug,
            description: page.description,
            is_published: page.is_published,
            view_count: page.view_count,
            created_at: page.created_at.to_rfc3339(),
            updated_at: page.updated_at.to_rfc3339(),
        }
    }
}

// ============ 块类型 ============

#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct CreateBlockRequest {
    pub block_type: String,
    /// 省略时使用该类型的默认配置
    #[ts(type = "any | null")]
    pub config: Option<Value>,
    pub is_visible: Option<bool>,
}

#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct UpdateBlockRequest {
    #[ts(type = "any")]
    pub config: Value,
}

#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct VisibilityRequest {
    pub is_visible: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct BlockResponse {
    pub id: i64,
    pub page_id: i64,
    pub block_type: String,
    pub position: i32,
    #[ts(type = "any")]
    pub config: Value,
    pub is_visible: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl BlockResponse {
    pub fn from_block(block: Block) -> Result<Self> {
        Ok(Self {
            id: block.id,
            page_id: block.page_id,
            block_type: block.kind().to_string(),
            position: block.position,
            config: block.config.config_value()?,
            is_visible: block.is_visible,
            created_at: block.created_at.to_rfc3339(),
            updated_at: block.updated_at.to_rfc3339(),
        })
    }
}

// ============ 统计查询 ============

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct AnalyticsQuery {
    /// 开始日期 (ISO 8601 或 YYYY-MM-DD)
    pub start_date: Option<String>,
    /// 结束日期
    pub end_date: Option<String>,
    /// 分组方式
    pub group_by: Option<crate::services::GroupBy>,
    /// 返回数量限制
    pub limit: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::analytics::{
        DeviceStats, GroupBy, PageSummary, SourceStats, TopBlock, TrendData,
    };

    #[test]
    fn export_typescript_types() {
        // 运行此测试会自动生成 TypeScript 类型文件
        // cargo test export_typescript_types -- --nocapture

        LoginCredentials::export_all(&ts_rs::Config::default()).expect("Failed to export LoginCredentials");
        AuthSuccessResponse::export_all(&ts_rs::Config::default()).expect("Failed to export AuthSuccessResponse");
        MessageResponse::export_all(&ts_rs::Config::default()).expect("Failed to export MessageResponse");
        AccountResponse::export_all(&ts_rs::Config::default()).expect("Failed to export AccountResponse");

        CreatePageRequest::export_all(&ts_rs::Config::default()).expect("Failed to export CreatePageRequest");
        UpdatePageRequest::export_all(&ts_rs::Config::default()).expect("Failed to export UpdatePageRequest");
        PublishRequest::export_all(&ts_rs::Config::default()).expect("Failed to export PublishRequest");
        PageResponse::export_all(&ts_rs::Config::default()).expect("Failed to export PageResponse");

        CreateBlockRequest::export_all(&ts_rs::Config::default()).expect("Failed to export CreateBlockRequest");
        UpdateBlockRequest::export_all(&ts_rs::Config::default()).expect("Failed to export UpdateBlockRequest");
        VisibilityRequest::export_all(&ts_rs::Config::default()).expect("Failed to export VisibilityRequest");
        BlockResponse::export_all(&ts_rs::Config::default()).expect("Failed to export BlockResponse");

        AnalyticsQuery::export_all(&ts_rs::Config::default()).expect("Failed to export AnalyticsQuery");
        GroupBy::export_all(&ts_rs::Config::default()).expect("Failed to export GroupBy");
        PageSummary::export_all(&ts_rs::Config::default()).expect("Failed to export PageSummary");
        TrendData::export_all(&ts_rs::Config::default()).expect("Failed to export TrendData");
        TopBlock::export_all(&ts_rs::Config::default()).expect("Failed to export TopBlock");
        SourceStats::export_all(&ts_rs::Config::default()).expect("Failed to export SourceStats");
        DeviceStats::export_all(&ts_rs::Config::default()).expect("Failed to export DeviceStats");

        println!("TypeScript types exported to {}", TS_EXPORT_PATH);
    }
}
