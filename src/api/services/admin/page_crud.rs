//! Admin API 页面 CRUD 操作

use actix_web::http::StatusCode;
use actix_web::{HttpMessage, HttpRequest, HttpResponse, Responder, Result as ActixResult, web};
use std::sync::Arc;
use tracing::{error, info, trace};

use crate::api::middleware::AuthContext;
use crate::cache::PageCache;
use crate::storage::models::{Page, PageDraft, PageUpdate};
use crate::storage::{PageStore, SeaOrmStorage};
use crate::utils::is_valid_slug;

use super::error_code::ErrorCode;
use super::helpers::{created_response, error_from_linkfolio, error_response, success_response};
use super::types::{CreatePageRequest, PageResponse, PublishRequest, UpdatePageRequest};

/// 从请求扩展取认证上下文
pub(super) fn auth_context(req: &HttpRequest) -> Result<AuthContext, HttpResponse> {
    req.extensions().get::<AuthContext>().copied().ok_or_else(|| {
        error_response(
            StatusCode::UNAUTHORIZED,
            ErrorCode::Unauthorized,
            "Unauthorized",
        )
    })
}

/// 取属于当前账户的页面；不存在或属别人都返回 404，不泄露存在性
pub(super) async fn owned_page(
    storage: &SeaOrmStorage,
    auth: AuthContext,
    page_id: i64,
) -> Result<Page, HttpResponse> {
    match storage.get_page(page_id).await {
        Ok(Some(page)) if page.account_id == auth.account_id => Ok(page),
        Ok(_) => Err(error_response(
            StatusCode::NOT_FOUND,
            ErrorCode::PageNotFound,
            "Page not found",
        )),
        Err(e) => {
            error!("Admin API: page lookup failed - {}: {}", page_id, e);
            Err(error_from_linkfolio(&e))
        }
    }
}

/// 获取当前账户的所有页面
pub async fn get_pages(
    req: HttpRequest,
    storage: web::Data<Arc<SeaOrmStorage>>,
) -> ActixResult<impl Responder> {
    let auth = match auth_context(&req) {
        Ok(auth) => auth,
        Err(resp) => return Ok(resp),
    };

    trace!("Admin API: list pages for account {}", auth.account_id);

    match storage.list_pages(auth.account_id).await {
        Ok(pages) => {
            let pages: Vec<PageResponse> = pages.into_iter().map(PageResponse::from).collect();
            Ok(success_response(pages))
        }
        Err(e) => {
            error!("Admin API: failed to list pages: {}", e);
            Ok(error_from_linkfolio(&e))
        }
    }
}

/// 创建新页面
pub async fn post_page(
    req: HttpRequest,
    body: web::Json<CreatePageRequest>,
    storage: web::Data<Arc<SeaOrmStorage>>,
) -> ActixResult<impl Responder> {
    let auth = match auth_context(&req) {
        Ok(auth) => auth,
        Err(resp) => return Ok(resp),
    };

    info!(
        "Admin API: create page request - slug: {}, account: {}",
        body.slug, auth.account_id
    );

    if body.title.trim().is_empty() {
        return Ok(error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::BadRequest,
            "Title must not be empty",
        ));
    }

    if !is_valid_slug(&body.slug) {
        error!("Admin API: invalid slug - {}", body.slug);
        return Ok(error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::PageInvalidSlug,
            "Slug must be 1-64 lowercase letters, digits or hyphens",
        ));
    }

    let draft = PageDraft {
        account_id: auth.account_id,
        title: body.title.clone(),
        slug: body.slug.clone(),
        description: body.description.clone(),
    };

    match storage.create_page(draft).await {
        Ok(page) => {
            info!("Admin API: page created - {} ({})", page.id, page.slug);
            Ok(created_response(PageResponse::from(page)))
        }
        Err(e) => {
            error!("Admin API: failed to create page - {}: {}", body.slug, e);
            Ok(error_from_linkfolio(&e))
        }
    }
}

/// 获取单个页面
pub async fn get_page(
    req: HttpRequest,
    page_id: web::Path<i64>,
    storage: web::Data<Arc<SeaOrmStorage>>,
) -> ActixResult<impl Responder> {
    let auth = match auth_context(&req) {
        Ok(auth) => auth,
        Err(resp) => return Ok(resp),
    };

    match owned_page(&storage, auth, *page_id).await {
        Ok(page) => Ok(success_response(PageResponse::from(page))),
        Err(resp) => Ok(resp),
    }
}

/// 部分更新页面
pub async fn put_page(
    req: HttpRequest,
    page_id: web::Path<i64>,
    body: web::Json<UpdatePageRequest>,
    storage: web::Data<Arc<SeaOrmStorage>>,
    cache: web::Data<Arc<PageCache>>,
) -> ActixResult<impl Responder> {
    let auth = match auth_context(&req) {
        Ok(auth) => auth,
        Err(resp) => return Ok(resp),
    };

    let existing = match owned_page(&storage, auth, *page_id).await {
        Ok(page) => page,
        Err(resp) => return Ok(resp),
    };

    if let Some(ref slug) = body.slug
        && !is_valid_slug(slug)
    {
        return Ok(error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::PageInvalidSlug,
            "Slug must be 1-64 lowercase letters, digits or hyphens",
        ));
    }

    let update = PageUpdate {
        title: body.title.clone(),
        slug: body.slug.clone(),
        description: body.description.clone(),
    };

    if update.is_empty() {
        return Ok(error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::BadRequest,
            "No fields to update",
        ));
    }

    match storage.update_page(*page_id, update).await {
        Ok(page) => {
            // 新旧 slug 都失效，防止改名后旧地址命中陈旧视图
            cache.remove(&existing.slug).await;
            cache.remove(&page.slug).await;
            info!("Admin API: page updated - {}", page.id);
            Ok(success_response(PageResponse::from(page)))
        }
        Err(e) => {
            error!("Admin API: failed to update page - {}: {}", page_id, e);
            Ok(error_from_linkfolio(&e))
        }
    }
}

/// 发布开关：独立于整表更新的单字段快速路径
pub async fn publish_page(
    req: HttpRequest,
    page_id: web::Path<i64>,
    body: web::Json<PublishRequest>,
    storage: web::Data<Arc<SeaOrmStorage>>,
    cache: web::Data<Arc<PageCache>>,
) -> ActixResult<impl Responder> {
    let auth = match auth_context(&req) {
        Ok(auth) => auth,
        Err(resp) => return Ok(resp),
    };

    if let Err(resp) = owned_page(&storage, auth, *page_id).await {
        return Ok(resp);
    }

    match storage.set_published(*page_id, body.is_published).await {
        Ok(page) => {
            cache.remove(&page.slug).await;
            Ok(success_response(PageResponse::from(page)))
        }
        Err(e) => {
            error!("Admin API: failed to toggle publish - {}: {}", page_id, e);
            Ok(error_from_linkfolio(&e))
        }
    }
}

/// 删除页面
pub async fn delete_page(
    req: HttpRequest,
    page_id: web::Path<i64>,
    storage: web::Data<Arc<SeaOrmStorage>>,
    cache: web::Data<Arc<PageCache>>,
) -> ActixResult<impl Responder> {
    let auth = match auth_context(&req) {
        Ok(auth) => auth,
        Err(resp) => return Ok(resp),
    };

    let existing = match owned_page(&storage, auth, *page_id).await {
        Ok(page) => page,
        Err(resp) => return Ok(resp),
    };

    match storage.delete_page(*page_id).await {
        Ok(()) => {
            cache.remove(&existing.slug).await;
            info!("Admin API: page deleted - {}", page_id);
            Ok(success_response(serde_json::json!({
                "message": "Page deleted successfully"
            })))
        }
        Err(e) => {
            error!("Admin API: failed to delete page - {}: {}", page_id, e);
            Ok(error_from_linkfolio(&e))
        }
    }
}
