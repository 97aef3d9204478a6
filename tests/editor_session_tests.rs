//! EditorSession 集成测试（真实 SQLite 存储）
//!
//! 状态机的纯逻辑在单元测试里覆盖，这里验证会话驱动真实
//! 存储时的端到端行为：保存落库、冲突失败后编辑保留、
//! 发布开关独立路径。

use std::sync::{Arc, Once};

use tempfile::TempDir;

use linkfolio::config::{AppConfig, init_config_with};
use linkfolio::services::{EditorSession, SessionState};
use linkfolio::storage::backend::SeaOrmStorage;
use linkfolio::storage::models::{PageDraft, PlanTier};
use linkfolio::storage::PageStore;

static INIT: Once = Once::new();

fn init_static_config() {
    INIT.call_once(|| {
        init_config_with(AppConfig::default());
    });
}

async fn create_temp_storage() -> (Arc<SeaOrmStorage>, TempDir) {
    init_static_config();
    let td = TempDir::new().unwrap();
    let p = td.path().join("editor_test.db");
    let u = format!("sqlite://{}?mode=rwc", p.display());
    let s = SeaOrmStorage::new(&u, "sqlite").await.unwrap();
    (Arc::new(s), td)
}

async fn seed_page(storage: &SeaOrmStorage, slug: &str) -> i64 {
    let account = storage
        .create_account(
            &format!("{}@example.com", slug),
            "$argon2id$fake",
            PlanTier::Free,
        )
        .await
        .unwrap();
    storage
        .create_page(PageDraft {
            account_id: account.id,
            title: "Draft".to_string(),
            slug: slug.to_string(),
            description: None,
        })
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn test_save_persists_edits() {
    let (storage, _td) = create_temp_storage().await;
    let page_id = seed_page(&storage, "editor").await;

    let mut session = EditorSession::new(Arc::clone(&storage) as Arc<dyn PageStore>, page_id);
    session.edit_title("Edited Title");
    session.edit_description("Edited description");
    assert_eq!(session.state(), SessionState::Dirty);

    let saved = session.save().await.unwrap().unwrap();
    assert_eq!(saved.title, "Edited Title");
    assert_eq!(session.state(), SessionState::Clean);

    let reloaded = storage.get_page(page_id).await.unwrap().unwrap();
    assert_eq!(reloaded.title, "Edited Title");
    assert_eq!(reloaded.description.as_deref(), Some("Edited description"));
}

#[tokio::test]
async fn test_failed_save_keeps_edits_for_resubmit() {
    let (storage, _td) = create_temp_storage().await;
    let page_id = seed_page(&storage, "conflict-a").await;
    seed_page(&storage, "conflict-b").await;

    let mut session = EditorSession::new(Arc::clone(&storage) as Arc<dyn PageStore>, page_id);
    // 改成已被占用的 slug，保存会失败
    session.edit_slug("conflict-b");
    session.edit_title("Survivor");

    let result = session.save().await;
    assert!(result.is_err());
    assert_eq!(session.state(), SessionState::Dirty);

    // 改回可用的 slug 后重新提交成功，标题编辑没有丢
    session.edit_slug("conflict-c");
    let saved = session.save().await.unwrap().unwrap();
    assert_eq!(saved.slug, "conflict-c");
    assert_eq!(saved.title, "Survivor");
    assert_eq!(session.state(), SessionState::Clean);
}

#[tokio::test]
async fn test_publish_toggle_skips_dirty_flow() {
    let (storage, _td) = create_temp_storage().await;
    let page_id = seed_page(&storage, "independent").await;

    let mut session = EditorSession::new(Arc::clone(&storage) as Arc<dyn PageStore>, page_id);
    session.edit_title("Unsaved");

    // 发布开关立即落库
    let page = session.set_published(true).await.unwrap();
    assert!(page.is_published);
    assert_eq!(session.state(), SessionState::Dirty);

    // 数据库里标题仍是旧值：publish 路径不带上表单编辑
    let reloaded = storage.get_page(page_id).await.unwrap().unwrap();
    assert!(reloaded.is_published);
    assert_eq!(reloaded.title, "Draft");
}
