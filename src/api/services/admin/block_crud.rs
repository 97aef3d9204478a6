//! Admin API 块 CRUD 操作
//!
//! 创建语义：
//! - position = max(现有 position, 0) + 1
//! - 未提供 config 时使用该类型的默认配置
//! - 付费类型对 free 账户返回独立的升级错误（402），
//!   与通用失败区分，前端据此展示升级提示

use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, Responder, Result as ActixResult, web};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{error, info, trace};

use crate::cache::PageCache;
use crate::config::get_config;
use crate::services::{next_position, render_editor_blocks};
use crate::storage::models::{Block, BlockConfig, BlockDraft, BlockKind, PlanTier};
use crate::storage::{PageStore, SeaOrmStorage};

use super::error_code::ErrorCode;
use super::helpers::{created_response, error_from_linkfolio, error_response, success_response};
use super::page_crud::{auth_context, owned_page};
use super::types::{BlockResponse, CreateBlockRequest, UpdateBlockRequest, VisibilityRequest};

fn block_response(block: Block) -> HttpResponse {
    match BlockResponse::from_block(block) {
        Ok(resp) => success_response(resp),
        Err(e) => error_from_linkfolio(&e),
    }
}

/// 取属于当前账户的块（连带宿主页归属检查）
async fn owned_block(
    storage: &SeaOrmStorage,
    req: &HttpRequest,
    block_id: i64,
) -> Result<Block, HttpResponse> {
    let auth = auth_context(req)?;

    let block = match storage.get_block(block_id).await {
        Ok(Some(block)) => block,
        Ok(None) => {
            return Err(error_response(
                StatusCode::NOT_FOUND,
                ErrorCode::BlockNotFound,
                "Block not found",
            ));
        }
        Err(e) => {
            error!("Admin API: block lookup failed - {}: {}", block_id, e);
            return Err(error_from_linkfolio(&e));
        }
    };

    owned_page(storage, auth, block.page_id).await.map_err(|_| {
        error_response(
            StatusCode::NOT_FOUND,
            ErrorCode::BlockNotFound,
            "Block not found",
        )
    })?;

    Ok(block)
}

/// 获取页面的块列表（编辑视图：全部块，position 升序）
pub async fn get_blocks(
    req: HttpRequest,
    page_id: web::Path<i64>,
    storage: web::Data<Arc<SeaOrmStorage>>,
) -> ActixResult<impl Responder> {
    let auth = match auth_context(&req) {
        Ok(auth) => auth,
        Err(resp) => return Ok(resp),
    };

    if let Err(resp) = owned_page(&storage, auth, *page_id).await {
        return Ok(resp);
    }

    match storage.list_blocks(*page_id).await {
        Ok(blocks) => {
            trace!(
                "Admin API: listing {} blocks for page {}",
                blocks.len(),
                page_id
            );
            // 编辑视图：不过滤可见性，内存侧再排一次保证顺序与后端无关
            let responses: Result<Vec<BlockResponse>, _> = render_editor_blocks(&blocks)
                .into_iter()
                .map(BlockResponse::from_block)
                .collect();
            match responses {
                Ok(list) => Ok(success_response(list)),
                Err(e) => Ok(error_from_linkfolio(&e)),
            }
        }
        Err(e) => {
            error!("Admin API: failed to list blocks - {}: {}", page_id, e);
            Ok(error_from_linkfolio(&e))
        }
    }
}

/// 创建新块
pub async fn post_block(
    req: HttpRequest,
    page_id: web::Path<i64>,
    body: web::Json<CreateBlockRequest>,
    storage: web::Data<Arc<SeaOrmStorage>>,
    cache: web::Data<Arc<PageCache>>,
) -> ActixResult<impl Responder> {
    let auth = match auth_context(&req) {
        Ok(auth) => auth,
        Err(resp) => return Ok(resp),
    };

    let page = match owned_page(&storage, auth, *page_id).await {
        Ok(page) => page,
        Err(resp) => return Ok(resp),
    };

    info!(
        "Admin API: create block request - type: {}, page: {}",
        body.block_type, page.id
    );

    // 订阅等级门槛：付费类型对 free 账户返回独立错误
    let premium_types = &get_config().features.premium_block_types;
    if premium_types.iter().any(|t| t == &body.block_type) {
        let account = match storage.get_account(auth.account_id).await {
            Ok(Some(account)) => account,
            Ok(None) => {
                return Ok(error_response(
                    StatusCode::UNAUTHORIZED,
                    ErrorCode::Unauthorized,
                    "Account no longer exists",
                ));
            }
            Err(e) => {
                error!("Admin API: account lookup failed: {}", e);
                return Ok(error_from_linkfolio(&e));
            }
        };

        if account.plan_tier == PlanTier::Free {
            info!(
                "Admin API: block type {} denied for free account {}",
                body.block_type, account.id
            );
            return Ok(error_response(
                StatusCode::PAYMENT_REQUIRED,
                ErrorCode::PlanUpgradeRequired,
                "This block type requires a paid plan",
            ));
        }
    }

    // 未识别的类型落入 Other 变体，空配置
    let kind = BlockKind::from_str(&body.block_type).unwrap_or(BlockKind::Other(String::new()));

    let config = match body.config.clone() {
        Some(value) => match BlockConfig::from_parts(&body.block_type, value) {
            Ok(config) => config,
            Err(e) => {
                error!("Admin API: invalid block config: {}", e);
                return Ok(error_response(
                    StatusCode::BAD_REQUEST,
                    ErrorCode::BlockInvalidConfig,
                    e.message(),
                ));
            }
        },
        None => BlockConfig::default_for(&kind),
    };

    // position = max(现有 position, 0) + 1
    let existing = match storage.list_blocks(page.id).await {
        Ok(blocks) => blocks,
        Err(e) => {
            error!("Admin API: failed to load blocks for {}: {}", page.id, e);
            return Ok(error_from_linkfolio(&e));
        }
    };
    let position = next_position(&existing);

    let draft = BlockDraft {
        page_id: page.id,
        position,
        config,
        is_visible: body.is_visible.unwrap_or(true),
    };

    match storage.create_block(draft).await {
        Ok(block) => {
            cache.remove(&page.slug).await;
            info!(
                "Admin API: block created - {} at position {}",
                block.id, block.position
            );
            match BlockResponse::from_block(block) {
                Ok(resp) => Ok(created_response(resp)),
                Err(e) => Ok(error_from_linkfolio(&e)),
            }
        }
        Err(e) => {
            error!("Admin API: failed to create block: {}", e);
            Ok(error_from_linkfolio(&e))
        }
    }
}

/// 获取单个块
pub async fn get_block(
    req: HttpRequest,
    block_id: web::Path<i64>,
    storage: web::Data<Arc<SeaOrmStorage>>,
) -> ActixResult<impl Responder> {
    match owned_block(&storage, &req, *block_id).await {
        Ok(block) => Ok(block_response(block)),
        Err(resp) => Ok(resp),
    }
}

/// 更新块配置（类型不可变）
pub async fn put_block(
    req: HttpRequest,
    block_id: web::Path<i64>,
    body: web::Json<UpdateBlockRequest>,
    storage: web::Data<Arc<SeaOrmStorage>>,
    cache: web::Data<Arc<PageCache>>,
) -> ActixResult<impl Responder> {
    let block = match owned_block(&storage, &req, *block_id).await {
        Ok(block) => block,
        Err(resp) => return Ok(resp),
    };

    let kind = block.kind();
    let config = match BlockConfig::from_parts(kind.as_str(), body.config.clone()) {
        Ok(config) => config,
        Err(e) => {
            error!("Admin API: invalid block config: {}", e);
            return Ok(error_response(
                StatusCode::BAD_REQUEST,
                ErrorCode::BlockInvalidConfig,
                e.message(),
            ));
        }
    };

    match storage.update_block_config(*block_id, config).await {
        Ok(updated) => {
            invalidate_page_slug(&storage, &cache, updated.page_id).await;
            info!("Admin API: block updated - {}", updated.id);
            Ok(block_response(updated))
        }
        Err(e) => {
            error!("Admin API: failed to update block - {}: {}", block_id, e);
            Ok(error_from_linkfolio(&e))
        }
    }
}

/// 可见性开关
pub async fn put_block_visibility(
    req: HttpRequest,
    block_id: web::Path<i64>,
    body: web::Json<VisibilityRequest>,
    storage: web::Data<Arc<SeaOrmStorage>>,
    cache: web::Data<Arc<PageCache>>,
) -> ActixResult<impl Responder> {
    if let Err(resp) = owned_block(&storage, &req, *block_id).await {
        return Ok(resp);
    }

    match storage.set_block_visible(*block_id, body.is_visible).await {
        Ok(updated) => {
            invalidate_page_slug(&storage, &cache, updated.page_id).await;
            Ok(block_response(updated))
        }
        Err(e) => {
            error!(
                "Admin API: failed to toggle block visibility - {}: {}",
                block_id, e
            );
            Ok(error_from_linkfolio(&e))
        }
    }
}

/// 删除块
pub async fn delete_block(
    req: HttpRequest,
    block_id: web::Path<i64>,
    storage: web::Data<Arc<SeaOrmStorage>>,
    cache: web::Data<Arc<PageCache>>,
) -> ActixResult<impl Responder> {
    let block = match owned_block(&storage, &req, *block_id).await {
        Ok(block) => block,
        Err(resp) => return Ok(resp),
    };

    match storage.delete_block(*block_id).await {
        Ok(()) => {
            invalidate_page_slug(&storage, &cache, block.page_id).await;
            info!("Admin API: block deleted - {}", block_id);
            Ok(success_response(serde_json::json!({
                "message": "Block deleted successfully"
            })))
        }
        Err(e) => {
            error!("Admin API: failed to delete block - {}: {}", block_id, e);
            Ok(error_from_linkfolio(&e))
        }
    }
}

/// 块变更后失效宿主页的公开缓存
async fn invalidate_page_slug(storage: &SeaOrmStorage, cache: &PageCache, page_id: i64) {
    if let Ok(Some(page)) = storage.get_page(page_id).await {
        cache.remove(&page.slug).await;
    }
}
