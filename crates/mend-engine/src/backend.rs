use async_trait::async_trait;
pub use mend_common::error::BackendError;
use mend_common::protocol::{AxNode, ContextId, ElementHandle, ElementQuery, NavigationResult};
use std::time::Duration;

/// The browser-automation boundary. The engine never reimplements browser
/// behavior; it calls these capabilities and decides what to do when they
/// fail.
///
/// Implementations serve queries lazily: a query may match zero, one, or
/// many elements, and matching is re-evaluated against live page state at
/// call time.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Navigate the given context and wait for the page to settle, bounded
    /// by `timeout`.
    async fn navigate(
        &mut self,
        context: ContextId,
        url: &str,
        timeout: Duration,
    ) -> Result<NavigationResult, BackendError>;

    async fn go_back(&mut self, context: ContextId) -> Result<NavigationResult, BackendError>;

    async fn go_forward(&mut self, context: ContextId) -> Result<NavigationResult, BackendError>;

    /// Wait until the first match of `query` is visible, bounded by
    /// `timeout`. `Ok(None)` means nothing became visible inside the window.
    async fn find_first_visible(
        &mut self,
        context: ContextId,
        query: &ElementQuery,
        timeout: Duration,
    ) -> Result<Option<ElementHandle>, BackendError>;

    /// Number of elements currently matching `query`, visible or not.
    async fn count_matches(
        &mut self,
        context: ContextId,
        query: &ElementQuery,
    ) -> Result<usize, BackendError>;

    async fn click(
        &mut self,
        handle: &ElementHandle,
        double: bool,
        timeout: Duration,
    ) -> Result<(), BackendError>;

    async fn hover(&mut self, handle: &ElementHandle, timeout: Duration)
    -> Result<(), BackendError>;

    async fn fill(
        &mut self,
        handle: &ElementHandle,
        text: &str,
        timeout: Duration,
    ) -> Result<(), BackendError>;

    async fn select_option(
        &mut self,
        handle: &ElementHandle,
        value: &str,
        timeout: Duration,
    ) -> Result<(), BackendError>;

    async fn set_checked(
        &mut self,
        handle: &ElementHandle,
        checked: bool,
        timeout: Duration,
    ) -> Result<(), BackendError>;

    async fn scroll_into_view(
        &mut self,
        handle: &ElementHandle,
        timeout: Duration,
    ) -> Result<(), BackendError>;

    /// Wait until the element is visible; `Ok(false)` on timeout.
    async fn wait_visible(
        &mut self,
        handle: &ElementHandle,
        timeout: Duration,
    ) -> Result<bool, BackendError>;

    async fn text_content(
        &mut self,
        handle: &ElementHandle,
        timeout: Duration,
    ) -> Result<String, BackendError>;

    async fn press_key(
        &mut self,
        context: ContextId,
        key: &str,
        modifiers: &[String],
    ) -> Result<(), BackendError>;

    /// Snapshot of the context's accessibility tree.
    async fn accessibility_snapshot(&mut self, context: ContextId)
    -> Result<AxNode, BackendError>;

    /// All currently open browsing contexts, oldest first.
    async fn contexts(&mut self) -> Result<Vec<ContextId>, BackendError>;

    async fn page_url(&mut self, context: ContextId) -> Result<String, BackendError>;

    /// Capture a screenshot of the context's viewport.
    async fn screenshot(&mut self, _context: ContextId) -> Result<Vec<u8>, BackendError> {
        Err(BackendError::NotSupported("screenshot".into()))
    }
}
