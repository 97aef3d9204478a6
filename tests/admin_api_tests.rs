//! Admin API 集成测试
//!
//! 用 actix 测试服务覆盖认证、页面/块 CRUD、默认配置、
//! position 计算和订阅等级门槛。

use std::sync::{Arc, Once};

use actix_web::{App, test, web};
use serde_json::{Value, json};
use tempfile::TempDir;

use linkfolio::api::jwt::get_jwt_service;
use linkfolio::api::middleware::OwnerAuth;
use linkfolio::api::services::admin::routes::{blocks_routes, pages_routes};
use linkfolio::api::services::admin::{login, logout, me, refresh_token};
use linkfolio::cache::PageCache;
use linkfolio::config::{AppConfig, init_config_with};
use linkfolio::storage::backend::SeaOrmStorage;
use linkfolio::storage::models::PlanTier;
use linkfolio::storage::PageStore;
use linkfolio::utils::hash_password;

// =============================================================================
// 全局初始化
// =============================================================================

static INIT: Once = Once::new();

fn init_static_config() {
    INIT.call_once(|| {
        init_config_with(AppConfig::default());
    });
}

async fn create_temp_storage() -> (Arc<SeaOrmStorage>, TempDir) {
    init_static_config();
    let td = TempDir::new().unwrap();
    let p = td.path().join("admin_api_test.db");
    let u = format!("sqlite://{}?mode=rwc", p.display());
    let s = SeaOrmStorage::new(&u, "sqlite").await.unwrap();
    (Arc::new(s), td)
}

async fn create_account(storage: &SeaOrmStorage, email: &str, tier: PlanTier) -> (i64, String) {
    let hash = hash_password("secret-password").unwrap();
    let account = storage.create_account(email, &hash, tier).await.unwrap();
    let token = get_jwt_service()
        .generate_access_token(account.id)
        .unwrap();
    (account.id, token)
}

/// 测试用路由：与生产相同的组合，但认证端点不挂限流器
/// （TestRequest 没有 peer IP，限流 key 提取会失败）
fn test_admin_v1_routes() -> actix_web::Scope {
    web::scope("/v1")
        .service(pages_routes())
        .service(blocks_routes())
        .service(
            web::scope("/auth")
                .route("/login", web::post().to(login))
                .route("/refresh", web::post().to(refresh_token))
                .route("/logout", web::post().to(logout))
                .route("/me", web::get().to(me)),
        )
}

macro_rules! init_app {
    ($storage:expr, $cache:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(Arc::clone(&$storage)))
                .app_data(web::Data::new(Arc::clone(&$cache)))
                .service(
                    web::scope("/api/admin")
                        .wrap(OwnerAuth)
                        .service(test_admin_v1_routes()),
                ),
        )
        .await
    };
}

fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}

// =============================================================================
// 认证
// =============================================================================

#[actix_rt::test]
async fn test_unauthorized_without_token() {
    let (storage, _td) = create_temp_storage().await;
    let cache = Arc::new(PageCache::new());
    let app = init_app!(storage, cache);

    let req = test::TestRequest::get().uri("/api/admin/v1/pages").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_rt::test]
async fn test_login_flow() {
    let (storage, _td) = create_temp_storage().await;
    let cache = Arc::new(PageCache::new());
    let (_, _token) = create_account(&storage, "login@example.com", PlanTier::Free).await;
    let app = init_app!(storage, cache);

    // 错误密码
    let req = test::TestRequest::post()
        .uri("/api/admin/v1/auth/login")
        .set_json(json!({"email": "login@example.com", "password": "wrong"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);

    // 正确密码，拿到 cookie
    let req = test::TestRequest::post()
        .uri("/api/admin/v1/auth/login")
        .set_json(json!({"email": "login@example.com", "password": "secret-password"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let cookies: Vec<_> = resp.response().cookies().collect();
    assert!(cookies.iter().any(|c| c.name() == "linkfolio_access"));
    assert!(cookies.iter().any(|c| c.name() == "linkfolio_refresh"));
}

#[actix_rt::test]
async fn test_me_endpoint() {
    let (storage, _td) = create_temp_storage().await;
    let cache = Arc::new(PageCache::new());
    let (_, token) = create_account(&storage, "me@example.com", PlanTier::Pro).await;
    let app = init_app!(storage, cache);

    let (name, value) = bearer(&token);
    let req = test::TestRequest::get()
        .uri("/api/admin/v1/auth/me")
        .insert_header((name, value))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["email"], "me@example.com");
    assert_eq!(body["data"]["plan_tier"], "pro");
}

// =============================================================================
// 页面 CRUD
// =============================================================================

#[actix_rt::test]
async fn test_page_crud_flow() {
    let (storage, _td) = create_temp_storage().await;
    let cache = Arc::new(PageCache::new());
    let (_, token) = create_account(&storage, "pages@example.com", PlanTier::Free).await;
    let app = init_app!(storage, cache);
    let (name, value) = bearer(&token);

    // 创建
    let req = test::TestRequest::post()
        .uri("/api/admin/v1/pages")
        .insert_header((name, value.clone()))
        .set_json(json!({"title": "My Links", "slug": "my-links"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);
    let body: Value = test::read_body_json(resp).await;
    let page_id = body["data"]["id"].as_i64().unwrap();
    assert_eq!(body["data"]["is_published"], false);

    // 非法 slug
    let req = test::TestRequest::post()
        .uri("/api/admin/v1/pages")
        .insert_header((name, value.clone()))
        .set_json(json!({"title": "Bad", "slug": "Not A Slug"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    // slug 冲突
    let req = test::TestRequest::post()
        .uri("/api/admin/v1/pages")
        .insert_header((name, value.clone()))
        .set_json(json!({"title": "Dup", "slug": "my-links"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 409);

    // 部分更新
    let req = test::TestRequest::put()
        .uri(&format!("/api/admin/v1/pages/{}", page_id))
        .insert_header((name, value.clone()))
        .set_json(json!({"title": "Renamed"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["title"], "Renamed");
    assert_eq!(body["data"]["slug"], "my-links");

    // 发布开关
    let req = test::TestRequest::put()
        .uri(&format!("/api/admin/v1/pages/{}/publish", page_id))
        .insert_header((name, value.clone()))
        .set_json(json!({"is_published": true}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["is_published"], true);

    // 删除
    let req = test::TestRequest::delete()
        .uri(&format!("/api/admin/v1/pages/{}", page_id))
        .insert_header((name, value.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let req = test::TestRequest::get()
        .uri(&format!("/api/admin/v1/pages/{}", page_id))
        .insert_header((name, value))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}

#[actix_rt::test]
async fn test_page_ownership_isolated() {
    let (storage, _td) = create_temp_storage().await;
    let cache = Arc::new(PageCache::new());
    let (_, owner_token) = create_account(&storage, "owner@example.com", PlanTier::Free).await;
    let (_, other_token) = create_account(&storage, "other@example.com", PlanTier::Free).await;
    let app = init_app!(storage, cache);

    let (name, value) = bearer(&owner_token);
    let req = test::TestRequest::post()
        .uri("/api/admin/v1/pages")
        .insert_header((name, value))
        .set_json(json!({"title": "Mine", "slug": "mine"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: Value = test::read_body_json(resp).await;
    let page_id = body["data"]["id"].as_i64().unwrap();

    // 别人的 token 看不到这个页面
    let (name, value) = bearer(&other_token);
    let req = test::TestRequest::get()
        .uri(&format!("/api/admin/v1/pages/{}", page_id))
        .insert_header((name, value))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}

// =============================================================================
// 块 CRUD 与订阅门槛
// =============================================================================

macro_rules! create_page_via_api {
    ($app:expr, $token:expr, $slug:expr) => {{
        let req = test::TestRequest::post()
            .uri("/api/admin/v1/pages")
            .insert_header(("Authorization", format!("Bearer {}", $token)))
            .set_json(json!({"title": "Blocks", "slug": $slug}))
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), 201);
        let body: Value = test::read_body_json(resp).await;
        body["data"]["id"].as_i64().unwrap()
    }};
}

#[actix_rt::test]
async fn test_block_creation_defaults_and_position() {
    let (storage, _td) = create_temp_storage().await;
    let cache = Arc::new(PageCache::new());
    let (_, token) = create_account(&storage, "blocks@example.com", PlanTier::Free).await;
    let app = init_app!(storage, cache);
    let page_id = create_page_via_api!(app, token, "blocks-page");
    let (name, value) = bearer(&token);

    // 第一个块：link 类型，默认配置，position 1
    let req = test::TestRequest::post()
        .uri(&format!("/api/admin/v1/pages/{}/blocks", page_id))
        .insert_header((name, value.clone()))
        .set_json(json!({"block_type": "link"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["position"], 1);
    assert_eq!(body["data"]["config"]["label"], "New Link");
    assert_eq!(body["data"]["config"]["url"], "https://example.com");

    // 第二个块 position 2
    let req = test::TestRequest::post()
        .uri(&format!("/api/admin/v1/pages/{}/blocks", page_id))
        .insert_header((name, value.clone()))
        .set_json(json!({"block_type": "button"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["position"], 2);
    assert_eq!(body["data"]["config"]["style"], "primary");

    // 未识别类型：空配置
    let req = test::TestRequest::post()
        .uri(&format!("/api/admin/v1/pages/{}/blocks", page_id))
        .insert_header((name, value.clone()))
        .set_json(json!({"block_type": "countdown"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["config"], json!({}));
    assert_eq!(body["data"]["position"], 3);

    // 列表按 position 升序
    let req = test::TestRequest::get()
        .uri(&format!("/api/admin/v1/pages/{}/blocks", page_id))
        .insert_header((name, value))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: Value = test::read_body_json(resp).await;
    let positions: Vec<i64> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["position"].as_i64().unwrap())
        .collect();
    assert_eq!(positions, vec![1, 2, 3]);
}

#[actix_rt::test]
async fn test_premium_block_gated_by_plan() {
    let (storage, _td) = create_temp_storage().await;
    let cache = Arc::new(PageCache::new());
    let (_, free_token) = create_account(&storage, "free@example.com", PlanTier::Free).await;
    let (_, pro_token) = create_account(&storage, "pro@example.com", PlanTier::Pro).await;
    let app = init_app!(storage, cache);

    // free 账户：402 + 独立错误码
    let page_id = create_page_via_api!(app, free_token, "free-page");
    let req = test::TestRequest::post()
        .uri(&format!("/api/admin/v1/pages/{}/blocks", page_id))
        .insert_header(("Authorization", format!("Bearer {}", free_token)))
        .set_json(json!({"block_type": "contact_block"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 402);
    let body: Value = test::read_body_json(resp).await;
    // PlanUpgradeRequired = 4003，前端据此展示升级提示
    assert_eq!(body["code"], 4003);

    // pro 账户可以创建
    let page_id = create_page_via_api!(app, pro_token, "pro-page");
    let req = test::TestRequest::post()
        .uri(&format!("/api/admin/v1/pages/{}/blocks", page_id))
        .insert_header(("Authorization", format!("Bearer {}", pro_token)))
        .set_json(json!({"block_type": "contact_block"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["config"]["phone"], "");
    assert_eq!(body["data"]["config"]["whatsapp_prefilled"], "");
}

#[actix_rt::test]
async fn test_block_update_and_visibility() {
    let (storage, _td) = create_temp_storage().await;
    let cache = Arc::new(PageCache::new());
    let (_, token) = create_account(&storage, "upd@example.com", PlanTier::Free).await;
    let app = init_app!(storage, cache);
    let page_id = create_page_via_api!(app, token, "upd-page");
    let (name, value) = bearer(&token);

    let req = test::TestRequest::post()
        .uri(&format!("/api/admin/v1/pages/{}/blocks", page_id))
        .insert_header((name, value.clone()))
        .set_json(json!({"block_type": "text"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: Value = test::read_body_json(resp).await;
    let block_id = body["data"]["id"].as_i64().unwrap();

    // 合法配置更新
    let req = test::TestRequest::put()
        .uri(&format!("/api/admin/v1/blocks/{}", block_id))
        .insert_header((name, value.clone()))
        .set_json(json!({"config": {"content": "Hello", "align": "left"}}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["config"]["content"], "Hello");

    // 配置与类型不匹配 → 400
    let req = test::TestRequest::put()
        .uri(&format!("/api/admin/v1/blocks/{}", block_id))
        .insert_header((name, value.clone()))
        .set_json(json!({"config": {"label": "x", "url": "https://example.com"}}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    // 可见性开关
    let req = test::TestRequest::put()
        .uri(&format!("/api/admin/v1/blocks/{}/visibility", block_id))
        .insert_header((name, value.clone()))
        .set_json(json!({"is_visible": false}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["is_visible"], false);

    // 删除
    let req = test::TestRequest::delete()
        .uri(&format!("/api/admin/v1/blocks/{}", block_id))
        .insert_header((name, value))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
}
