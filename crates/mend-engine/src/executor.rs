//! Scenario execution loop.
//!
//! Steps run strictly in order, single-threaded: every page operation
//! suspends the loop until it completes or times out, and healing
//! sub-stages never run concurrently, so UI state can settle between
//! attempts. The loop owns the active browsing context and follows the
//! newest one whenever a step opens a tab or window as a side effect.

use crate::actions;
use crate::artifact::ArtifactSink;
use crate::backend::Backend;
use crate::completion::CompletionClient;
use crate::config::EngineConfig;
use crate::healing::{HealOutcome, Healer};
use crate::resolution::StrategyResolver;
use mend_common::protocol::ContextId;
use mend_common::scenario::{ExecutionRecord, HealStage, Scenario, StepStatus};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecutorError {
    /// Unrecoverable step failure outside the healable action classes.
    #[error("step {step} failed: {reason}")]
    StepFailed { step: u32, reason: String },

    /// The escalation controller spent its full attempt budget.
    #[error("recovery exhausted at step {step}: {last_error}")]
    RecoveryExhausted { step: u32, last_error: String },
}

/// Why the run stopped.
#[derive(Debug)]
pub enum RunOutcome {
    Passed,
    /// The scenario was aborted after the first unrecovered failure; no
    /// later steps ran.
    Aborted { step: u32, error: ExecutorError },
}

/// Everything a run produced. Records and target mutations survive failure;
/// nothing is discarded on error.
#[derive(Debug)]
pub struct ScenarioReport {
    pub records: Vec<ExecutionRecord>,
    /// The executed scenario, reflecting every target substitution made by
    /// successful heals. Identical to the input when no healing occurred.
    pub healed: Scenario,
    pub outcome: RunOutcome,
}

impl ScenarioReport {
    pub fn passed(&self) -> bool {
        matches!(self.outcome, RunOutcome::Passed)
    }
}

pub struct ScenarioRunner {
    config: EngineConfig,
    resolver: StrategyResolver,
    healer: Healer,
    active: ContextId,
}

impl ScenarioRunner {
    pub fn new(config: EngineConfig, initial_context: ContextId) -> Self {
        Self {
            resolver: StrategyResolver::new(config.clone()),
            healer: Healer::new(config.clone()),
            config,
            active: initial_context,
        }
    }

    /// Browsing context the next step will resolve against.
    pub fn active_context(&self) -> ContextId {
        self.active
    }

    pub async fn execute<B>(
        &mut self,
        scenario: Scenario,
        backend: &mut B,
        completion: Option<&dyn CompletionClient>,
        sink: &mut dyn ArtifactSink,
    ) -> ScenarioReport
    where
        B: Backend + ?Sized,
    {
        let mut healed = scenario;
        let mut records = Vec::new();
        let mut outcome = RunOutcome::Passed;

        // Stable ids up front so healing logs and records agree.
        for (idx, step) in healed.steps.iter_mut().enumerate() {
            if step.id.is_none() {
                step.id = Some(idx as u32 + 1);
            }
        }

        for step in &mut healed.steps {
            let sid = step.id.unwrap_or_default();
            tracing::info!(step = sid, action = %step.action, description = %step.description, "step start");

            let contexts_before = backend.contexts().await.ok().map(|c| c.len());

            let mut heal_stage = HealStage::None;
            let mut status = StepStatus::Pass;
            let mut failure = None;

            if let Err(e) =
                actions::perform(step, None, self.active, &self.resolver, &self.config, backend)
                    .await
            {
                tracing::warn!(step = sid, error = %e, "step failed");

                if step.action.is_healable() {
                    match self
                        .healer
                        .heal(
                            step,
                            e.to_string(),
                            self.active,
                            &self.resolver,
                            backend,
                            completion,
                        )
                        .await
                    {
                        HealOutcome::Recovered {
                            stage,
                            attempt,
                            target,
                            fallback_targets,
                        } => {
                            tracing::info!(step = sid, stage = %stage, attempt, "step recovered");
                            heal_stage = stage;
                            step.target = Some(target);
                            if let Some(fallbacks) = fallback_targets {
                                step.fallback_targets = fallbacks;
                            }
                        }
                        HealOutcome::Exhausted { last_error } => {
                            heal_stage = HealStage::HealFailed;
                            status = StepStatus::Fail;
                            failure = Some(ExecutorError::RecoveryExhausted {
                                step: sid,
                                last_error,
                            });
                        }
                    }
                } else {
                    status = StepStatus::Fail;
                    failure = Some(ExecutorError::StepFailed {
                        step: sid,
                        reason: e.to_string(),
                    });
                }
            }

            // One evidence artifact per step, pass or fail.
            let screenshot = backend.screenshot(self.active).await.ok();
            let evidence = match sink.capture(step, status, screenshot).await {
                Ok(reference) => reference,
                Err(e) => {
                    tracing::warn!(step = sid, error = %e, "evidence capture failed");
                    None
                }
            };

            let record = ExecutionRecord {
                step: sid,
                action: step.action,
                description: step.description.clone(),
                heal_stage,
                status,
                evidence,
            };
            if let Err(e) = sink.record(&record).await {
                tracing::warn!(step = sid, error = %e, "record sink failed");
            }
            records.push(record);

            if let Some(error) = failure {
                tracing::error!(step = sid, error = %error, "aborting scenario");
                outcome = RunOutcome::Aborted { step: sid, error };
                break;
            }

            // A step can open a new tab or window; the newest context
            // becomes active for everything that follows. The old one is
            // abandoned, not closed, since it may still be wanted for
            // traces.
            if let Some(before) = contexts_before
                && let Ok(contexts) = backend.contexts().await
                && contexts.len() > before
                && let Some(newest) = contexts.last()
            {
                tracing::info!(previous = self.active.0, newest = newest.0, "context switch");
                self.active = *newest;
            }
        }

        ScenarioReport {
            records,
            healed,
            outcome,
        }
    }
}
