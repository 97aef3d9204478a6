//! 公开页对象缓存
//!
//! slug → 渲染视图的读穿缓存，带未命中负缓存。
//! 变更后由调用方显式失效，缓存本身不订阅任何事件。

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tracing::debug;

use crate::services::renderer::PublicPageView;

/// 缓存查询结果
pub enum CacheResult {
    /// 命中：已渲染的公开页
    Found(Arc<PublicPageView>),
    /// 命中负缓存：slug 确认不存在或不可见
    NotFound,
    /// 未命中
    Miss,
}

#[derive(Clone)]
enum CacheEntry {
    Page(Arc<PublicPageView>),
    Negative,
}

pub struct PageCache {
    inner: Cache<String, CacheEntry>,
}

impl PageCache {
    pub fn new() -> Self {
        let config = crate::config::get_config();
        let inner = Cache::builder()
            .max_capacity(config.cache.max_capacity)
            .time_to_live(Duration::from_secs(config.cache.default_ttl))
            .build();

        debug!(
            "PageCache initialized with max capacity: {}, TTL: {}s",
            config.cache.max_capacity, config.cache.default_ttl
        );
        Self { inner }
    }

    pub async fn get(&self, slug: &str) -> CacheResult {
        match self.inner.get(slug).await {
            Some(CacheEntry::Page(view)) => CacheResult::Found(view),
            Some(CacheEntry::Negative) => CacheResult::NotFound,
            None => CacheResult::Miss,
        }
    }

    pub async fn insert(&self, slug: &str, view: Arc<PublicPageView>) {
        self.inner
            .insert(slug.to_string(), CacheEntry::Page(view))
            .await;
    }

    /// 负缓存：slug 不存在或页面未发布
    pub async fn mark_not_found(&self, slug: &str) {
        self.inner
            .insert(slug.to_string(), CacheEntry::Negative)
            .await;
    }

    pub async fn remove(&self, slug: &str) {
        self.inner.invalidate(slug).await;
    }

    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }
}
