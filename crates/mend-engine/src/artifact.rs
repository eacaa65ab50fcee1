//! Evidence and record sink boundary. Storage layout is the sink's
//! business; the engine only says "capture now".

use async_trait::async_trait;
use mend_common::scenario::{ExecutionRecord, Step, StepStatus};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("artifact sink failed: {0}")]
pub struct ArtifactError(pub String);

#[async_trait]
pub trait ArtifactSink: Send + Sync {
    /// Persist a screenshot for `step` and return a reference usable in
    /// reports. `None` when the sink produced no evidence.
    async fn capture(
        &mut self,
        step: &Step,
        status: StepStatus,
        screenshot: Option<Vec<u8>>,
    ) -> Result<Option<String>, ArtifactError>;

    /// Consume one finished execution record.
    async fn record(&mut self, record: &ExecutionRecord) -> Result<(), ArtifactError>;
}

/// Sink that discards everything. Useful for tests and dry runs.
#[derive(Debug, Default)]
pub struct NullSink;

#[async_trait]
impl ArtifactSink for NullSink {
    async fn capture(
        &mut self,
        _step: &Step,
        _status: StepStatus,
        _screenshot: Option<Vec<u8>>,
    ) -> Result<Option<String>, ArtifactError> {
        Ok(None)
    }

    async fn record(&mut self, _record: &ExecutionRecord) -> Result<(), ArtifactError> {
        Ok(())
    }
}
