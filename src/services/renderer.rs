//! 公开页渲染管线
//!
//! 渲染前按固定顺序过三道门：
//! (a) 数据未加载 → Loading
//! (b) 获取失败或页面不存在 → NotFound
//! (c) 页面存在但未发布 → Unavailable（与 NotFound 区分）
//! 全部通过才渲染块列表。
//!
//! 浏览事件每次页面加载只发一次，由 ViewTracker 防止重复渲染
//! 造成的重复上报。

use std::sync::atomic::{AtomicBool, Ordering};

use crate::services::ordering::{sort_for_editor, sort_for_public};
use crate::storage::models::{Block, Page};

/// 页面数据的获取状态
#[derive(Debug, Clone)]
pub enum FetchState {
    /// 请求未返回
    Pending,
    /// 请求失败
    Failed,
    /// 请求完成：None 表示页面不存在
    Loaded(Option<Page>),
}

/// 渲染门结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderGate {
    Loading,
    NotFound,
    /// 页面存在但未发布
    Unavailable,
    Ready,
}

/// 依次评估三道渲染门
pub fn evaluate_gate(state: &FetchState) -> RenderGate {
    match state {
        FetchState::Pending => RenderGate::Loading,
        FetchState::Failed => RenderGate::NotFound,
        FetchState::Loaded(None) => RenderGate::NotFound,
        FetchState::Loaded(Some(page)) => {
            if page.is_published {
                RenderGate::Ready
            } else {
                RenderGate::Unavailable
            }
        }
    }
}

/// 公开页渲染视图：页面元信息 + 可见块（公开顺序）
#[derive(Debug, Clone)]
pub struct PublicPageView {
    pub page: Page,
    pub blocks: Vec<Block>,
}

impl PublicPageView {
    /// 过滤 + 排序，输入不被修改
    pub fn render(page: Page, blocks: &[Block]) -> Self {
        Self {
            blocks: sort_for_public(blocks),
            page,
        }
    }
}

/// 编辑视图顺序：不过滤可见性
pub fn render_editor_blocks(blocks: &[Block]) -> Vec<Block> {
    sort_for_editor(blocks)
}

/// 每次页面加载只允许上报一次浏览事件
#[derive(Debug, Default)]
pub struct ViewTracker {
    tracked: AtomicBool,
}

impl ViewTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// 首次调用返回 true，之后一律 false
    pub fn try_mark(&self) -> bool {
        !self.tracked.swap(true, Ordering::SeqCst)
    }

    pub fn is_tracked(&self) -> bool {
        self.tracked.load(Ordering::SeqCst)
    }
}
