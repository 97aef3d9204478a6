//! Sea-ORM Model 与领域模型的转换

use std::str::FromStr;

use crate::errors::Result;
use crate::storage::models::{
    Account, AnalyticsEvent, Block, BlockConfig, EventType, Page, PlanTier,
};
use migration::entities::{account, analytics_event, block, page};

pub fn model_to_account(model: account::Model) -> Account {
    Account {
        id: model.id,
        email: model.email,
        password_hash: model.password_hash,
        // 未知等级按 free 处理，宁可少给权限
        plan_tier: PlanTier::from_str(&model.plan_tier).unwrap_or(PlanTier::Free),
        created_at: model.created_at,
    }
}

pub fn model_to_page(model: page::Model) -> Page {
    Page {
        id: model.id,
        account_id: model.account_id,
        title: model.title,
        slug: model.slug,
        description: model.description,
        is_published: model.is_published,
        view_count: model.view_count.max(0),
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

/// 将块行还原为领域模型，config 载荷与 block_type 校验在此完成
pub fn model_to_block(model: block::Model) -> Result<Block> {
    let config = BlockConfig::from_parts(&model.block_type, model.config)?;
    Ok(Block {
        id: model.id,
        page_id: model.page_id,
        position: model.position,
        config,
        is_visible: model.is_visible,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

/// 将块领域模型转换为 ActiveModel（用于插入）
pub fn block_to_active_model(
    page_id: i64,
    position: i32,
    config: &BlockConfig,
    is_visible: bool,
    now: chrono::DateTime<chrono::Utc>,
) -> Result<block::ActiveModel> {
    use sea_orm::ActiveValue::Set;

    Ok(block::ActiveModel {
        page_id: Set(page_id),
        block_type: Set(config.kind().to_string()),
        position: Set(position),
        config: Set(config.config_value()?),
        is_visible: Set(is_visible),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    })
}

pub fn model_to_event(model: analytics_event::Model) -> Option<AnalyticsEvent> {
    // 类型列损坏的行直接跳过，查询端不因单行脏数据失败
    let event_type = EventType::from_str(&model.event_type).ok()?;
    Some(AnalyticsEvent {
        id: model.id,
        page_id: model.page_id,
        block_id: model.block_id,
        shortlink_id: model.shortlink_id,
        event_type,
        ip_address: model.ip_address,
        referrer: model.referrer,
        source: model.source,
        browser: model.browser,
        os: model.os,
        device_type: model.device_type,
        metadata: model.metadata,
        created_at: model.created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    #[test]
    fn test_model_to_block_roundtrip() {
        let model = block::Model {
            id: 7,
            page_id: 1,
            block_type: "link".to_string(),
            position: 3,
            config: json!({"label": "Docs", "url": "https://example.com/docs"}),
            is_visible: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let blk = model_to_block(model).unwrap();
        assert_eq!(blk.id, 7);
        assert_eq!(blk.position, 3);
        assert_eq!(blk.kind().to_string(), "link");
    }

    #[test]
    fn test_model_to_block_mismatched_config() {
        let model = block::Model {
            id: 8,
            page_id: 1,
            block_type: "image".to_string(),
            position: 1,
            config: json!({"label": "not an image"}),
            is_visible: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert!(model_to_block(model).is_err());
    }

    #[test]
    fn test_model_to_event_skips_bad_type() {
        let model = analytics_event::Model {
            id: 1,
            page_id: Some(1),
            block_id: None,
            shortlink_id: None,
            event_type: "hover".to_string(),
            ip_address: None,
            referrer: None,
            source: None,
            browser: None,
            os: None,
            device_type: None,
            metadata: None,
            created_at: Utc::now(),
        };

        assert!(model_to_event(model).is_none());
    }

    #[test]
    fn test_model_to_account_unknown_tier_is_free() {
        let model = account::Model {
            id: 1,
            email: "a@b.c".to_string(),
            password_hash: "x".to_string(),
            plan_tier: "enterprise".to_string(),
            created_at: Utc::now(),
        };

        assert_eq!(model_to_account(model).plan_tier, PlanTier::Free);
    }
}
