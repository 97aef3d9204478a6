pub mod backend;
pub mod models;

use std::sync::Arc;

use async_trait::async_trait;

pub use backend::SeaOrmStorage;
pub use models::{
    Account, AnalyticsEvent, Block, BlockConfig, BlockDraft, BlockKind, EventType, Page, PageDraft,
    PageUpdate, PlanTier,
};

use crate::errors::Result;

/// 页面存储接口
///
/// 显式的仓库接口：调用方持有注入的 trait 对象，
/// 缓存失效由调用方在变更后显式触发，不依赖隐式全局状态。
#[async_trait]
pub trait PageStore: Send + Sync {
    // ---- accounts ----
    async fn create_account(
        &self,
        email: &str,
        password_hash: &str,
        plan_tier: PlanTier,
    ) -> Result<Account>;
    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>>;
    async fn get_account(&self, id: i64) -> Result<Option<Account>>;

    // ---- pages ----
    async fn create_page(&self, draft: PageDraft) -> Result<Page>;
    async fn get_page(&self, id: i64) -> Result<Option<Page>>;
    async fn get_page_by_slug(&self, slug: &str) -> Result<Option<Page>>;
    async fn list_pages(&self, account_id: i64) -> Result<Vec<Page>>;
    async fn update_page(&self, id: i64, update: PageUpdate) -> Result<Page>;
    /// 发布开关：独立于整表更新的单字段快速路径
    async fn set_published(&self, id: i64, is_published: bool) -> Result<Page>;
    async fn delete_page(&self, id: i64) -> Result<()>;

    // ---- blocks ----
    async fn list_blocks(&self, page_id: i64) -> Result<Vec<Block>>;
    async fn get_block(&self, id: i64) -> Result<Option<Block>>;
    async fn create_block(&self, draft: BlockDraft) -> Result<Block>;
    async fn update_block_config(&self, id: i64, config: BlockConfig) -> Result<Block>;
    async fn set_block_visible(&self, id: i64, is_visible: bool) -> Result<Block>;
    async fn delete_block(&self, id: i64) -> Result<()>;
}

pub struct StorageFactory;

impl StorageFactory {
    /// 根据配置的数据库 URL 创建存储后端
    pub async fn create() -> Result<Arc<SeaOrmStorage>> {
        let config = crate::config::get_config();
        let database_url = &config.database.database_url;
        let backend_name = backend::infer_backend_from_url(database_url)?;

        let storage = SeaOrmStorage::new(database_url, &backend_name).await?;
        Ok(Arc::new(storage))
    }
}
