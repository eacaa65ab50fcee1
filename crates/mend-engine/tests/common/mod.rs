#![allow(dead_code)]

use async_trait::async_trait;
use mend_engine::artifact::{ArtifactError, ArtifactSink};
use mend_engine::backend::{Backend, BackendError};
use mend_engine::completion::{CompletionClient, CompletionError};
use mend_engine::protocol::{
    AxNode, ContextId, ElementHandle, ElementQuery, NavigationResult,
};
use mend_engine::scenario::{ExecutionRecord, Step, StepStatus};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct MockElement {
    pub role: Option<String>,
    pub name: Option<String>,
    pub label: Option<String>,
    pub text: Option<String>,
    pub placeholder: Option<String>,
    pub testid: Option<String>,
    pub selector: Option<String>,
    pub visible: bool,
    /// Actions against this element fail as not-interactable.
    pub broken: bool,
    /// Clicking this element opens a new browsing context.
    pub opens_context: bool,
}

impl MockElement {
    pub fn role_name(role: &str, name: &str) -> Self {
        Self {
            role: Some(role.into()),
            name: Some(name.into()),
            visible: true,
            ..Self::default()
        }
    }

    pub fn text(text: &str) -> Self {
        Self {
            text: Some(text.into()),
            visible: true,
            ..Self::default()
        }
    }

    pub fn labeled(label: &str) -> Self {
        Self {
            label: Some(label.into()),
            visible: true,
            ..Self::default()
        }
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_selector(mut self, selector: &str) -> Self {
        self.selector = Some(selector.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn opens_context(mut self) -> Self {
        self.opens_context = true;
        self
    }

    fn matches(&self, query: &ElementQuery) -> bool {
        match query {
            ElementQuery::RoleAndName { role, name } => {
                self.role.as_deref() == Some(role) && self.name.as_deref() == Some(name)
            }
            ElementQuery::Role { role } => self.role.as_deref() == Some(role),
            ElementQuery::Label { label } => self.label.as_deref() == Some(label),
            ElementQuery::Text { text } => {
                self.text.as_deref().is_some_and(|t| t.contains(text))
            }
            ElementQuery::Placeholder { placeholder } => {
                self.placeholder.as_deref() == Some(placeholder)
            }
            ElementQuery::TestId { testid } => self.testid.as_deref() == Some(testid),
            ElementQuery::Selector { selector } => self.selector.as_deref() == Some(selector),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockPage {
    pub url: String,
    pub elements: Vec<MockElement>,
    pub ax: AxNode,
}

impl MockPage {
    pub fn with_elements(elements: Vec<MockElement>) -> Self {
        Self {
            elements,
            ..Self::default()
        }
    }

    pub fn with_ax(mut self, ax: AxNode) -> Self {
        self.ax = ax;
        self
    }
}

/// Scripted backend: pages are fixed element lists, queries resolve
/// immediately, and every call is logged for assertions.
#[derive(Debug, Default)]
pub struct MockBackend {
    pub pages: Vec<MockPage>,
    /// `(context, query)` per find_first_visible call, in order.
    pub queries: Vec<(u32, ElementQuery)>,
    /// Human-readable action log, e.g. `click:0:2`.
    pub actions: Vec<String>,
    pub snapshot_calls: usize,
    pub fail_navigation: bool,
    /// Page pushed when an `opens_context` element is clicked.
    pub spawn_on_open: Option<MockPage>,
}

impl MockBackend {
    pub fn single_page(page: MockPage) -> Self {
        Self {
            pages: vec![page],
            ..Self::default()
        }
    }

    fn page(&self, context: ContextId) -> Result<&MockPage, BackendError> {
        self.pages
            .get(context.0 as usize)
            .ok_or(BackendError::ContextClosed)
    }

    fn element(&self, handle: &ElementHandle) -> Result<&MockElement, BackendError> {
        self.page(handle.context)?
            .elements
            .get(handle.id as usize)
            .ok_or_else(|| BackendError::StaleHandle(format!("element {}", handle.id)))
    }

    fn act(&mut self, verb: &str, handle: &ElementHandle) -> Result<(), BackendError> {
        let element = self.element(handle)?.clone();
        if element.broken {
            return Err(BackendError::NotInteractable(format!(
                "element {}",
                handle.id
            )));
        }
        self.actions
            .push(format!("{verb}:{}:{}", handle.context.0, handle.id));
        if verb == "click" && element.opens_context {
            let spawned = self.spawn_on_open.take().unwrap_or_default();
            self.pages.push(spawned);
        }
        Ok(())
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn navigate(
        &mut self,
        context: ContextId,
        url: &str,
        _timeout: Duration,
    ) -> Result<NavigationResult, BackendError> {
        if self.fail_navigation {
            return Err(BackendError::Navigation("net::ERR_CONNECTION_REFUSED".into()));
        }
        let page = self
            .pages
            .get_mut(context.0 as usize)
            .ok_or(BackendError::ContextClosed)?;
        page.url = url.to_string();
        self.actions.push(format!("navigate:{}:{url}", context.0));
        Ok(NavigationResult {
            url: url.to_string(),
            title: String::new(),
            status: 200,
        })
    }

    async fn go_back(&mut self, context: ContextId) -> Result<NavigationResult, BackendError> {
        let url = self.page(context)?.url.clone();
        self.actions.push(format!("back:{}", context.0));
        Ok(NavigationResult {
            url,
            title: String::new(),
            status: 200,
        })
    }

    async fn go_forward(&mut self, context: ContextId) -> Result<NavigationResult, BackendError> {
        let url = self.page(context)?.url.clone();
        self.actions.push(format!("forward:{}", context.0));
        Ok(NavigationResult {
            url,
            title: String::new(),
            status: 200,
        })
    }

    async fn find_first_visible(
        &mut self,
        context: ContextId,
        query: &ElementQuery,
        _timeout: Duration,
    ) -> Result<Option<ElementHandle>, BackendError> {
        self.queries.push((context.0, query.clone()));
        let page = self.page(context)?;
        Ok(page
            .elements
            .iter()
            .position(|e| e.visible && e.matches(query))
            .map(|idx| ElementHandle {
                context,
                id: idx as u64,
            }))
    }

    async fn count_matches(
        &mut self,
        context: ContextId,
        query: &ElementQuery,
    ) -> Result<usize, BackendError> {
        let page = self.page(context)?;
        Ok(page.elements.iter().filter(|e| e.matches(query)).count())
    }

    async fn click(
        &mut self,
        handle: &ElementHandle,
        double: bool,
        _timeout: Duration,
    ) -> Result<(), BackendError> {
        self.act(if double { "double_click" } else { "click" }, handle)
    }

    async fn hover(
        &mut self,
        handle: &ElementHandle,
        _timeout: Duration,
    ) -> Result<(), BackendError> {
        self.act("hover", handle)
    }

    async fn fill(
        &mut self,
        handle: &ElementHandle,
        text: &str,
        _timeout: Duration,
    ) -> Result<(), BackendError> {
        let verb = format!("fill[{text}]");
        self.act(&verb, handle)
    }

    async fn select_option(
        &mut self,
        handle: &ElementHandle,
        value: &str,
        _timeout: Duration,
    ) -> Result<(), BackendError> {
        let verb = format!("select[{value}]");
        self.act(&verb, handle)
    }

    async fn set_checked(
        &mut self,
        handle: &ElementHandle,
        checked: bool,
        _timeout: Duration,
    ) -> Result<(), BackendError> {
        let verb = if checked { "check" } else { "uncheck" };
        self.act(verb, handle)
    }

    async fn scroll_into_view(
        &mut self,
        handle: &ElementHandle,
        _timeout: Duration,
    ) -> Result<(), BackendError> {
        self.act("scroll", handle)
    }

    async fn wait_visible(
        &mut self,
        handle: &ElementHandle,
        _timeout: Duration,
    ) -> Result<bool, BackendError> {
        Ok(self.element(handle)?.visible)
    }

    async fn text_content(
        &mut self,
        handle: &ElementHandle,
        _timeout: Duration,
    ) -> Result<String, BackendError> {
        Ok(self.element(handle)?.text.clone().unwrap_or_default())
    }

    async fn press_key(
        &mut self,
        context: ContextId,
        key: &str,
        _modifiers: &[String],
    ) -> Result<(), BackendError> {
        self.actions.push(format!("press:{}:{key}", context.0));
        Ok(())
    }

    async fn accessibility_snapshot(
        &mut self,
        context: ContextId,
    ) -> Result<AxNode, BackendError> {
        self.snapshot_calls += 1;
        Ok(self.page(context)?.ax.clone())
    }

    async fn contexts(&mut self) -> Result<Vec<ContextId>, BackendError> {
        Ok((0..self.pages.len() as u32).map(ContextId).collect())
    }

    async fn page_url(&mut self, context: ContextId) -> Result<String, BackendError> {
        Ok(self.page(context)?.url.clone())
    }

    async fn screenshot(&mut self, _context: ContextId) -> Result<Vec<u8>, BackendError> {
        Ok(vec![0xAB])
    }
}

/// Sink that remembers everything it is handed.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub captures: Vec<(u32, StepStatus)>,
    pub records: Vec<ExecutionRecord>,
}

#[async_trait]
impl ArtifactSink for RecordingSink {
    async fn capture(
        &mut self,
        step: &Step,
        status: StepStatus,
        _screenshot: Option<Vec<u8>>,
    ) -> Result<Option<String>, ArtifactError> {
        let sid = step.id.unwrap_or_default();
        self.captures.push((sid, status));
        Ok(Some(format!("step_{sid}.png")))
    }

    async fn record(&mut self, record: &ExecutionRecord) -> Result<(), ArtifactError> {
        self.records.push(record.clone());
        Ok(())
    }
}

/// Completion client that always answers with a fixed reply.
#[derive(Debug, Default)]
pub struct ScriptedCompletion {
    pub reply: String,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedCompletion {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            prompts: Mutex::new(vec![]),
        }
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionClient for ScriptedCompletion {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(self.reply.clone())
    }
}
