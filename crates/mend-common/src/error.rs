use thiserror::Error;

/// Errors raised by browser-automation backends.
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    #[error("backend not launched")]
    NotLaunched,

    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("element handle is stale: {0}")]
    StaleHandle(String),

    #[error("element not interactable: {0}")]
    NotInteractable(String),

    #[error("timed out after {0}ms")]
    Timeout(u64),

    #[error("browsing context is closed")]
    ContextClosed,

    #[error("operation not supported: {0}")]
    NotSupported(String),

    #[error("{0}")]
    Other(String),
}
