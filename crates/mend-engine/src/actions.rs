//! Single-step action dispatch, shared by the execution loop and the
//! escalation controller.

use crate::backend::Backend;
use crate::config::EngineConfig;
use crate::resolution::{ResolveError, StrategyResolver};
use mend_common::error::BackendError;
use mend_common::protocol::ContextId;
use mend_common::scenario::{Action, IntentTarget, Step};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StepError {
    /// No resolution strategy matched within its window.
    #[error(transparent)]
    NotResolved(#[from] ResolveError),

    /// Element found but the action itself errored (detached, not
    /// interactable, ...).
    #[error("action failed: {0}")]
    ActionFailed(String),

    #[error("assertion failed: {0}")]
    AssertionFailed(String),

    #[error("step is missing a value: {0}")]
    MissingValue(&'static str),

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Run one step's action against `context`.
///
/// `target` overrides the step's own target when present; healing passes
/// substituted targets through here without touching the step itself.
pub async fn perform<B>(
    step: &Step,
    target: Option<&IntentTarget>,
    context: ContextId,
    resolver: &StrategyResolver,
    config: &EngineConfig,
    backend: &mut B,
) -> Result<(), StepError>
where
    B: Backend + ?Sized,
{
    let timeout = config.action_timeout();

    match step.action {
        Action::Navigate => {
            let raw = step
                .value_str()
                .ok_or(StepError::MissingValue("navigate requires a url"))?;
            let parsed = url::Url::parse(raw)
                .map_err(|e| StepError::InvalidUrl(format!("{raw}: {e}")))?;
            backend
                .navigate(context, parsed.as_str(), config.navigation_timeout())
                .await?;
            Ok(())
        }
        Action::Wait => {
            let ms = step.value_u64().unwrap_or(1_500);
            tokio::time::sleep(std::time::Duration::from_millis(ms)).await;
            Ok(())
        }
        Action::GoBack => {
            backend.go_back(context).await?;
            Ok(())
        }
        Action::GoForward => {
            backend.go_forward(context).await?;
            Ok(())
        }
        Action::PressKey => {
            let key = step
                .value_str()
                .ok_or(StepError::MissingValue("press-key requires a key"))?;
            backend.press_key(context, key, &[]).await?;
            Ok(())
        }
        _ => {
            let effective = target.or(step.target.as_ref()).cloned().unwrap_or_default();
            let handle = resolver.resolve(&effective, context, backend).await?;

            match step.action {
                Action::Click => backend.click(&handle, false, timeout).await.map_err(failed),
                Action::DoubleClick => backend.click(&handle, true, timeout).await.map_err(failed),
                Action::Hover => backend.hover(&handle, timeout).await.map_err(failed),
                Action::Fill => {
                    let text = step
                        .value_str()
                        .ok_or(StepError::MissingValue("fill requires text"))?;
                    backend.fill(&handle, text, timeout).await.map_err(failed)
                }
                Action::SelectOption => {
                    let value = step
                        .value_str()
                        .ok_or(StepError::MissingValue("select-option requires a value"))?;
                    backend
                        .select_option(&handle, value, timeout)
                        .await
                        .map_err(failed)
                }
                Action::Check => backend
                    .set_checked(&handle, true, timeout)
                    .await
                    .map_err(failed),
                Action::ScrollIntoView => backend
                    .scroll_into_view(&handle, timeout)
                    .await
                    .map_err(failed),
                Action::AssertVisible => {
                    if backend.wait_visible(&handle, timeout).await? {
                        Ok(())
                    } else {
                        Err(StepError::AssertionFailed(format!(
                            "element not visible: {}",
                            effective.brief()
                        )))
                    }
                }
                Action::AssertText => {
                    let expected = step
                        .value_str()
                        .ok_or(StepError::MissingValue("assert-text requires expected text"))?;
                    let actual = backend.text_content(&handle, timeout).await?;
                    if actual.contains(expected) {
                        Ok(())
                    } else {
                        Err(StepError::AssertionFailed(format!(
                            "expected text '{expected}', element shows '{actual}'"
                        )))
                    }
                }
                // Handled by the outer match before resolution.
                Action::Navigate
                | Action::Wait
                | Action::GoBack
                | Action::GoForward
                | Action::PressKey => Ok(()),
            }
        }
    }
}

/// Element found but the action itself errored.
fn failed(e: BackendError) -> StepError {
    StepError::ActionFailed(e.to_string())
}
