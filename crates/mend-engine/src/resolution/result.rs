use thiserror::Error;

/// Raised when every strategy in the chain was tried without producing a
/// visible match.
#[derive(Debug, Clone, Error)]
#[error("target not resolved: {target}: {reason}")]
pub struct ResolveError {
    /// Brief of the target that failed to resolve.
    pub target: String,
    pub reason: String,
    /// Strategy names tried, in order. Empty for targets with no usable
    /// attributes.
    pub attempted: Vec<String>,
}
