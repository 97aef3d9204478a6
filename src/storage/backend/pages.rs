//! Page / block operations for SeaOrmStorage
//!
//! PageStore trait 的 SeaORM 实现。块查询统一按 (position, id)
//! 升序返回，平局落到创建顺序。

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use tracing::info;

use super::SeaOrmStorage;
use super::converters::{block_to_active_model, model_to_block, model_to_page};
use crate::errors::{LinkfolioError, Result};
use crate::storage::models::{
    Account, Block, BlockConfig, BlockDraft, Page, PageDraft, PageUpdate, PlanTier,
};
use crate::storage::PageStore;
use migration::entities::{block, page};

#[async_trait]
impl PageStore for SeaOrmStorage {
    async fn create_account(
        &self,
        email: &str,
        password_hash: &str,
        plan_tier: PlanTier,
    ) -> Result<Account> {
        self.insert_account(email, password_hash, plan_tier).await
    }

    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        self.account_by_email(email).await
    }

    async fn get_account(&self, id: i64) -> Result<Option<Account>> {
        self.account_by_id(id).await
    }

    async fn create_page(&self, draft: PageDraft) -> Result<Page> {
        if let Some(existing) = self.get_page_by_slug(&draft.slug).await? {
            return Err(LinkfolioError::slug_conflict(format!(
                "Slug already taken: {} (page {})",
                draft.slug, existing.id
            )));
        }

        let now = Utc::now();
        let model = page::ActiveModel {
            account_id: Set(draft.account_id),
            title: Set(draft.title),
            slug: Set(draft.slug),
            description: Set(draft.description),
            is_published: Set(false),
            view_count: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        info!("Page created: {} (slug: {})", model.id, model.slug);
        Ok(model_to_page(model))
    }

    async fn get_page(&self, id: i64) -> Result<Option<Page>> {
        let model = page::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(model_to_page))
    }

    async fn get_page_by_slug(&self, slug: &str) -> Result<Option<Page>> {
        let model = page::Entity::find()
            .filter(page::Column::Slug.eq(slug))
            .one(&self.db)
            .await?;
        Ok(model.map(model_to_page))
    }

    async fn list_pages(&self, account_id: i64) -> Result<Vec<Page>> {
        let models = page::Entity::find()
            .filter(page::Column::AccountId.eq(account_id))
            .order_by_asc(page::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(model_to_page).collect())
    }

    async fn update_page(&self, id: i64, update: PageUpdate) -> Result<Page> {
        let model = page::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| LinkfolioError::not_found(format!("Page not found: {}", id)))?;

        // slug 变更时检查唯一性
        if let Some(ref new_slug) = update.slug
            && new_slug != &model.slug
            && self.get_page_by_slug(new_slug).await?.is_some()
        {
            return Err(LinkfolioError::slug_conflict(format!(
                "Slug already taken: {}",
                new_slug
            )));
        }

        let mut active: page::ActiveModel = model.into();
        if let Some(title) = update.title {
            active.title = Set(title);
        }
        if let Some(slug) = update.slug {
            active.slug = Set(slug);
        }
        if let Some(description) = update.description {
            active.description = Set(Some(description));
        }
        active.updated_at = Set(Utc::now());

        let model = active.update(&self.db).await?;
        info!("Page updated: {}", model.id);
        Ok(model_to_page(model))
    }

    async fn set_published(&self, id: i64, is_published: bool) -> Result<Page> {
        let model = page::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| LinkfolioError::not_found(format!("Page not found: {}", id)))?;

        let mut active: page::ActiveModel = model.into();
        active.is_published = Set(is_published);
        active.updated_at = Set(Utc::now());

        let model = active.update(&self.db).await?;
        info!(
            "Page {} {}",
            model.id,
            if is_published {
                "published"
            } else {
                "unpublished"
            }
        );
        Ok(model_to_page(model))
    }

    async fn delete_page(&self, id: i64) -> Result<()> {
        // blocks 由外键级联删除；analytics 事件保留（弱引用 + 保留策略）
        let result = page::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(LinkfolioError::not_found(format!("Page not found: {}", id)));
        }

        info!("Page deleted: {}", id);
        Ok(())
    }

    async fn list_blocks(&self, page_id: i64) -> Result<Vec<Block>> {
        let models = block::Entity::find()
            .filter(block::Column::PageId.eq(page_id))
            .order_by_asc(block::Column::Position)
            .order_by_asc(block::Column::Id)
            .all(&self.db)
            .await?;

        models.into_iter().map(model_to_block).collect()
    }

    async fn get_block(&self, id: i64) -> Result<Option<Block>> {
        let model = block::Entity::find_by_id(id).one(&self.db).await?;
        model.map(model_to_block).transpose()
    }

    async fn create_block(&self, draft: BlockDraft) -> Result<Block> {
        draft.config.validate()?;

        // 宿主页必须存在
        let page_exists = page::Entity::find_by_id(draft.page_id)
            .one(&self.db)
            .await?
            .is_some();
        if !page_exists {
            return Err(LinkfolioError::not_found(format!(
                "Page not found: {}",
                draft.page_id
            )));
        }

        let model = block_to_active_model(
            draft.page_id,
            draft.position,
            &draft.config,
            draft.is_visible,
            Utc::now(),
        )?
        .insert(&self.db)
        .await?;

        info!(
            "Block created: {} (type: {}, page: {}, position: {})",
            model.id, model.block_type, model.page_id, model.position
        );
        model_to_block(model)
    }

    async fn update_block_config(&self, id: i64, config: BlockConfig) -> Result<Block> {
        config.validate()?;

        let model = block::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| LinkfolioError::not_found(format!("Block not found: {}", id)))?;

        // 配置更新不允许改变块类型
        if model.block_type != config.kind().to_string() {
            return Err(LinkfolioError::validation(format!(
                "Block type is immutable: stored '{}', got '{}'",
                model.block_type,
                config.kind()
            )));
        }

        let mut active: block::ActiveModel = model.into();
        active.config = Set(config.config_value()?);
        active.updated_at = Set(Utc::now());

        let model = active.update(&self.db).await?;
        info!("Block updated: {}", model.id);
        model_to_block(model)
    }

    async fn set_block_visible(&self, id: i64, is_visible: bool) -> Result<Block> {
        let model = block::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| LinkfolioError::not_found(format!("Block not found: {}", id)))?;

        let mut active: block::ActiveModel = model.into();
        active.is_visible = Set(is_visible);
        active.updated_at = Set(Utc::now());

        let model = active.update(&self.db).await?;
        model_to_block(model)
    }

    async fn delete_block(&self, id: i64) -> Result<()> {
        let result = block::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(LinkfolioError::not_found(format!(
                "Block not found: {}",
                id
            )));
        }

        info!("Block deleted: {}", id);
        Ok(())
    }
}
