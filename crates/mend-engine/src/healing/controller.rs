//! Bounded-retry escalation.
//!
//! Entered only after a primary resolution-or-action failure on a healable
//! action. Each attempt runs up to three ordered sub-stages, short-
//! circuiting on the first that executes the action successfully:
//! scenario-declared fallback, best-ranked accessibility candidate, model
//! proposal. Sub-stage errors update the carried error text and fall
//! through; only a spent attempt budget is reported upward.
//!
//! The controller never mutates the step. It hands the winning target back
//! in [`HealOutcome::Recovered`] and the execution loop writes it into the
//! scenario, so the restoration invariant on failure holds by construction.

use crate::actions;
use crate::backend::Backend;
use crate::completion::CompletionClient;
use crate::config::EngineConfig;
use crate::healing::{candidates, proposer};
use crate::resolution::StrategyResolver;
use mend_common::protocol::ContextId;
use mend_common::scenario::{HealStage, IntentTarget, Step};

/// Outcome of one escalation run.
#[derive(Debug)]
pub enum HealOutcome {
    Recovered {
        stage: HealStage,
        /// Attempt number the winning sub-stage ran in, 1-based.
        attempt: u32,
        target: IntentTarget,
        /// Present only when the model proposed fresh fallbacks.
        fallback_targets: Option<Vec<IntentTarget>>,
    },
    /// The attempt budget is spent; the step keeps its original target.
    Exhausted { last_error: String },
}

pub struct Healer {
    config: EngineConfig,
}

impl Healer {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub async fn heal<B>(
        &self,
        step: &Step,
        first_error: String,
        context: ContextId,
        resolver: &StrategyResolver,
        backend: &mut B,
        completion: Option<&dyn CompletionClient>,
    ) -> HealOutcome
    where
        B: Backend + ?Sized,
    {
        let original = step.target.clone().unwrap_or_default();
        let query = original.query_text().unwrap_or_default().to_string();
        let mut last_error = first_error;

        for attempt in 1..=self.config.max_heal_attempts {
            tracing::info!(
                step = step.id.unwrap_or_default(),
                attempt,
                budget = self.config.max_heal_attempts,
                "healing attempt"
            );

            // Sub-stage 1: declared fallback for this attempt.
            if let Some(fallback) = step.fallback_targets.get(attempt as usize - 1) {
                tracing::debug!(substitute = %fallback.brief(), "trying declared fallback");
                match actions::perform(step, Some(fallback), context, resolver, &self.config, backend)
                    .await
                {
                    Ok(()) => {
                        return HealOutcome::Recovered {
                            stage: HealStage::Fallback(attempt),
                            attempt,
                            target: fallback.clone(),
                            fallback_targets: None,
                        };
                    }
                    Err(e) => {
                        last_error = e.to_string();
                        tracing::warn!(error = %last_error, "fallback failed");
                    }
                }
            }

            // Sub-stage 2: best-ranked accessibility candidate.
            match self
                .try_candidate(step, &original, &query, context, resolver, backend)
                .await
            {
                Ok(Some(target)) => {
                    return HealOutcome::Recovered {
                        stage: HealStage::CandidateSearch,
                        attempt,
                        target,
                        fallback_targets: None,
                    };
                }
                Ok(None) => {}
                Err(e) => {
                    last_error = e;
                    tracing::warn!(error = %last_error, "candidate search failed");
                }
            }

            // Sub-stage 3: model proposal, only when healing mode is on and
            // a completion client is wired.
            if self.config.healing_enabled
                && let Some(client) = completion
            {
                match self
                    .try_model(
                        step, &original, &query, &last_error, context, resolver, backend, client,
                    )
                    .await
                {
                    Ok((target, fallbacks)) => {
                        return HealOutcome::Recovered {
                            stage: HealStage::ModelHeal,
                            attempt,
                            target,
                            fallback_targets: Some(fallbacks),
                        };
                    }
                    Err(e) => {
                        last_error = e;
                        tracing::warn!(error = %last_error, "model heal failed");
                    }
                }
            }
        }

        tracing::warn!(
            step = step.id.unwrap_or_default(),
            "healing budget exhausted"
        );
        HealOutcome::Exhausted { last_error }
    }

    /// `Ok(None)` means no candidate cleared the confidence threshold;
    /// this sub-stage simply has nothing to offer and escalation moves on.
    async fn try_candidate<B>(
        &self,
        step: &Step,
        original: &IntentTarget,
        query: &str,
        context: ContextId,
        resolver: &StrategyResolver,
        backend: &mut B,
    ) -> Result<Option<IntentTarget>, String>
    where
        B: Backend + ?Sized,
    {
        let snapshot = backend
            .accessibility_snapshot(context)
            .await
            .map_err(|e| e.to_string())?;
        let pool = candidates::filter_for_action(step.action, candidates::collect(&snapshot));
        let ranked = candidates::rank(query, original.role.as_deref(), &pool);

        let Some(top) = ranked.first() else {
            return Ok(None);
        };
        if top.score <= self.config.min_candidate_score {
            tracing::debug!(score = top.score, name = %top.name, "top candidate below threshold");
            return Ok(None);
        }

        let target = IntentTarget::from_role_name(&top.role, &top.name);
        tracing::debug!(substitute = %target.brief(), score = top.score, "trying ranked candidate");
        match actions::perform(step, Some(&target), context, resolver, &self.config, backend).await
        {
            Ok(()) => Ok(Some(target)),
            Err(e) => Err(e.to_string()),
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn try_model<B>(
        &self,
        step: &Step,
        original: &IntentTarget,
        query: &str,
        last_error: &str,
        context: ContextId,
        resolver: &StrategyResolver,
        backend: &mut B,
        client: &dyn CompletionClient,
    ) -> Result<(IntentTarget, Vec<IntentTarget>), String>
    where
        B: Backend + ?Sized,
    {
        // Re-collect against the current page state; the failing sub-stages
        // above may have changed it.
        let snapshot = backend
            .accessibility_snapshot(context)
            .await
            .map_err(|e| e.to_string())?;
        let pool = candidates::filter_for_action(step.action, candidates::collect(&snapshot));
        let ranked = candidates::rank(query, original.role.as_deref(), &pool);
        let page_url = backend.page_url(context).await.unwrap_or_default();

        let prompt = proposer::build_heal_prompt(
            step.action,
            original,
            last_error,
            &page_url,
            &ranked,
            self.config.candidate_top_n,
        );
        let reply = client.complete(&prompt).await.map_err(|e| e.to_string())?;
        let proposal = proposer::parse_proposal(&reply).map_err(|e| e.to_string())?;

        let target = proposal.target.unwrap_or_else(|| original.clone());
        tracing::debug!(substitute = %target.brief(), "trying model proposal");
        match actions::perform(step, Some(&target), context, resolver, &self.config, backend).await
        {
            Ok(()) => Ok((target, proposal.fallback_targets)),
            Err(e) => Err(e.to_string()),
        }
    }
}
