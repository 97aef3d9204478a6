//! Account operations for SeaOrmStorage

use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter};
use tracing::info;

use super::SeaOrmStorage;
use super::converters::model_to_account;
use crate::errors::{LinkfolioError, Result};
use crate::storage::models::{Account, PlanTier};
use migration::entities::account;

impl SeaOrmStorage {
    pub(super) async fn insert_account(
        &self,
        email: &str,
        password_hash: &str,
        plan_tier: PlanTier,
    ) -> Result<Account> {
        let existing = account::Entity::find()
            .filter(account::Column::Email.eq(email))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(LinkfolioError::validation(format!(
                "Email already registered: {}",
                email
            )));
        }

        let model = account::ActiveModel {
            email: Set(email.to_string()),
            password_hash: Set(password_hash.to_string()),
            plan_tier: Set(plan_tier.to_string()),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        info!("Account created: {} ({})", model.email, model.plan_tier);
        Ok(model_to_account(model))
    }

    pub(super) async fn account_by_email(&self, email: &str) -> Result<Option<Account>> {
        let model = account::Entity::find()
            .filter(account::Column::Email.eq(email))
            .one(&self.db)
            .await?;
        Ok(model.map(model_to_account))
    }

    pub(super) async fn account_by_id(&self, id: i64) -> Result<Option<Account>> {
        let model = account::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(model_to_account))
    }
}
