//! 编辑会话状态机
//!
//! clean → dirty → saving → clean（成功）/ dirty（失败，编辑保留）。
//!
//! 选中块的切换不影响 dirty/clean；发布开关是独立的即时保存
//! 路径，不经过 dirty 流程。保存失败后不自动重试，由用户手动
//! 重新提交。

use std::sync::Arc;

use tracing::{debug, warn};

use crate::errors::Result;
use crate::storage::models::{Page, PageUpdate};
use crate::storage::PageStore;

/// 会话状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// 无待保存编辑
    #[default]
    Clean,
    /// 有待保存编辑，可提交
    Dirty,
    /// 保存请求在途，提交入口挂起
    Saving,
}

/// 单个页面的编辑会话
pub struct EditorSession {
    store: Arc<dyn PageStore>,
    page_id: i64,
    state: SessionState,
    selected_block: Option<i64>,
    /// 累积的未保存编辑
    pending: PageUpdate,
}

impl EditorSession {
    pub fn new(store: Arc<dyn PageStore>, page_id: i64) -> Self {
        Self {
            store,
            page_id,
            state: SessionState::Clean,
            selected_block: None,
            pending: PageUpdate::default(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn page_id(&self) -> i64 {
        self.page_id
    }

    pub fn selected_block(&self) -> Option<i64> {
        self.selected_block
    }

    /// 选中另一个块：不改变 dirty/clean 状态
    pub fn select_block(&mut self, block_id: Option<i64>) {
        self.selected_block = block_id;
    }

    pub fn edit_title(&mut self, title: impl Into<String>) {
        self.pending.title = Some(title.into());
        self.mark_dirty();
    }

    pub fn edit_slug(&mut self, slug: impl Into<String>) {
        self.pending.slug = Some(slug.into());
        self.mark_dirty();
    }

    pub fn edit_description(&mut self, description: impl Into<String>) {
        self.pending.description = Some(description.into());
        self.mark_dirty();
    }

    fn mark_dirty(&mut self) {
        // 保存在途时新编辑继续累积，状态在保存结束后结算
        if self.state != SessionState::Saving {
            self.state = SessionState::Dirty;
        }
    }

    /// 提交累积的编辑
    ///
    /// 返回 Ok(None) 表示没有可保存的内容（clean 或已在保存中）。
    /// 失败时编辑合并回待保存集，状态回到 dirty，错误原样上抛。
    pub async fn save(&mut self) -> Result<Option<Page>> {
        if self.state != SessionState::Dirty {
            debug!(
                "EditorSession: save skipped, state is {:?} (page {})",
                self.state, self.page_id
            );
            return Ok(None);
        }

        self.state = SessionState::Saving;
        let in_flight = std::mem::take(&mut self.pending);

        match self.store.update_page(self.page_id, in_flight.clone()).await {
            Ok(page) => {
                // 保存期间可能有新编辑进来
                self.state = if self.pending.is_empty() {
                    SessionState::Clean
                } else {
                    SessionState::Dirty
                };
                Ok(Some(page))
            }
            Err(e) => {
                warn!(
                    "EditorSession: save failed for page {}: {}",
                    self.page_id, e
                );
                // 在途编辑合并回去，保存期间的新编辑优先
                if self.pending.title.is_none() {
                    self.pending.title = in_flight.title;
                }
                if self.pending.slug.is_none() {
                    self.pending.slug = in_flight.slug;
                }
                if self.pending.description.is_none() {
                    self.pending.description = in_flight.description;
                }
                self.state = SessionState::Dirty;
                Err(e)
            }
        }
    }

    /// 发布开关：独立于 dirty 流程的单字段即时保存
    pub async fn set_published(&self, is_published: bool) -> Result<Page> {
        self.store.set_published(self.page_id, is_published).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use crate::errors::LinkfolioError;
    use crate::storage::models::{
        Account, Block, BlockConfig, BlockDraft, PageDraft, PlanTier,
    };

    /// 保存失败可注入的内存桩
    struct StubStore {
        fail_update: AtomicBool,
        published: AtomicBool,
    }

    impl StubStore {
        fn new() -> Self {
            Self {
                fail_update: AtomicBool::new(false),
                published: AtomicBool::new(false),
            }
        }

        fn page(&self) -> Page {
            Page {
                id: 1,
                account_id: 1,
                title: "Test".to_string(),
                slug: "test".to_string(),
                description: None,
                is_published: self.published.load(Ordering::SeqCst),
                view_count: 0,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            }
        }
    }

    #[async_trait]
    impl PageStore for StubStore {
        async fn create_account(
            &self,
            _email: &str,
            _password_hash: &str,
            _plan_tier: PlanTier,
        ) -> Result<Account> {
            unimplemented!()
        }
        async fn find_account_by_email(&self, _email: &str) -> Result<Option<Account>> {
            unimplemented!()
        }
        async fn get_account(&self, _id: i64) -> Result<Option<Account>> {
            unimplemented!()
        }
        async fn create_page(&self, _draft: PageDraft) -> Result<Page> {
            unimplemented!()
        }
        async fn get_page(&self, _id: i64) -> Result<Option<Page>> {
            Ok(Some(self.page()))
        }
        async fn get_page_by_slug(&self, _slug: &str) -> Result<Option<Page>> {
            unimplemented!()
        }
        async fn list_pages(&self, _account_id: i64) -> Result<Vec<Page>> {
            unimplemented!()
        }
        async fn update_page(&self, _id: i64, _update: PageUpdate) -> Result<Page> {
            if self.fail_update.load(Ordering::SeqCst) {
                return Err(LinkfolioError::database_operation("injected failure"));
            }
            Ok(self.page())
        }
        async fn set_published(&self, _id: i64, is_published: bool) -> Result<Page> {
            self.published.store(is_published, Ordering::SeqCst);
            Ok(self.page())
        }
        async fn delete_page(&self, _id: i64) -> Result<()> {
            unimplemented!()
        }
        async fn list_blocks(&self, _page_id: i64) -> Result<Vec<Block>> {
            unimplemented!()
        }
        async fn get_block(&self, _id: i64) -> Result<Option<Block>> {
            unimplemented!()
        }
        async fn create_block(&self, _draft: BlockDraft) -> Result<Block> {
            unimplemented!()
        }
        async fn update_block_config(&self, _id: i64, _config: BlockConfig) -> Result<Block> {
            unimplemented!()
        }
        async fn set_block_visible(&self, _id: i64, _is_visible: bool) -> Result<Block> {
            unimplemented!()
        }
        async fn delete_block(&self, _id: i64) -> Result<()> {
            unimplemented!()
        }
    }

    #[tokio::test]
    async fn test_clean_to_dirty_to_clean() {
        let store = Arc::new(StubStore::new());
        let mut session = EditorSession::new(store, 1);
        assert_eq!(session.state(), SessionState::Clean);

        session.edit_title("New Title");
        assert_eq!(session.state(), SessionState::Dirty);

        let saved = session.save().await.unwrap();
        assert!(saved.is_some());
        assert_eq!(session.state(), SessionState::Clean);
    }

    #[tokio::test]
    async fn test_save_on_clean_is_noop() {
        let store = Arc::new(StubStore::new());
        let mut session = EditorSession::new(store, 1);

        let saved = session.save().await.unwrap();
        assert!(saved.is_none());
        assert_eq!(session.state(), SessionState::Clean);
    }

    #[tokio::test]
    async fn test_failed_save_preserves_edits() {
        let store = Arc::new(StubStore::new());
        store.fail_update.store(true, Ordering::SeqCst);

        let mut session = EditorSession::new(Arc::clone(&store) as Arc<dyn PageStore>, 1);
        session.edit_title("Kept Title");
        session.edit_slug("kept-slug");

        let result = session.save().await;
        assert!(result.is_err());
        assert_eq!(session.state(), SessionState::Dirty);

        // 编辑保留，修复后可重新提交
        store.fail_update.store(false, Ordering::SeqCst);
        let saved = session.save().await.unwrap();
        assert!(saved.is_some());
        assert_eq!(session.state(), SessionState::Clean);
    }

    #[tokio::test]
    async fn test_select_block_does_not_touch_state() {
        let store = Arc::new(StubStore::new());
        let mut session = EditorSession::new(store, 1);

        session.select_block(Some(42));
        assert_eq!(session.state(), SessionState::Clean);
        assert_eq!(session.selected_block(), Some(42));

        session.edit_title("x");
        session.select_block(None);
        assert_eq!(session.state(), SessionState::Dirty);
    }

    #[tokio::test]
    async fn test_publish_toggle_is_independent() {
        let store = Arc::new(StubStore::new());
        let mut session = EditorSession::new(Arc::clone(&store) as Arc<dyn PageStore>, 1);

        session.edit_title("unsaved");
        assert_eq!(session.state(), SessionState::Dirty);

        // 发布开关即时生效，不影响未保存的编辑
        let page = session.set_published(true).await.unwrap();
        assert!(page.is_published);
        assert_eq!(session.state(), SessionState::Dirty);
    }
}
