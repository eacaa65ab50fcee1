//! Sequential fast-fail resolution.
//!
//! Strategies run in a fixed priority order, each bounded by the fast-fail
//! window. The resolver returns on the first strategy whose first match is
//! visible inside that window; it never waits out the full action timeout
//! on a strategy unlikely to succeed. Whether to retry or heal after a miss
//! is the caller's decision.

use super::result::ResolveError;
use super::strategy;
use crate::backend::Backend;
use crate::config::EngineConfig;
use mend_common::protocol::{ContextId, ElementHandle, ElementQuery};
use mend_common::scenario::IntentTarget;

pub struct StrategyResolver {
    config: EngineConfig,
}

impl StrategyResolver {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Resolve an intent target to a live element handle.
    ///
    /// Multi-match results collapse to the first visible element. Backend
    /// errors on an individual strategy count as a miss for that strategy;
    /// the chain moves on.
    pub async fn resolve<B>(
        &self,
        target: &IntentTarget,
        context: ContextId,
        backend: &mut B,
    ) -> Result<ElementHandle, ResolveError>
    where
        B: Backend + ?Sized,
    {
        if target.is_empty() {
            return Err(ResolveError {
                target: target.brief(),
                reason: "target has no usable attributes".into(),
                attempted: vec![],
            });
        }

        let window = self.config.fast_timeout();
        let mut attempted = Vec::new();

        for strategy in strategy::plan(target) {
            attempted.push(strategy.name.to_string());
            match backend
                .find_first_visible(context, &strategy.query, window)
                .await
            {
                Ok(Some(handle)) => {
                    tracing::debug!(strategy = strategy.name, "target resolved");
                    return Ok(handle);
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::debug!(strategy = strategy.name, error = %e, "strategy errored");
                }
            }

            // Lone-element relaxation: a role+name miss still resolves when
            // the page holds exactly one element of that role.
            if let ElementQuery::RoleAndName { role, .. } = &strategy.query {
                let role_query = ElementQuery::Role { role: role.clone() };
                if let Ok(1) = backend.count_matches(context, &role_query).await {
                    attempted.push("role_only".to_string());
                    if let Ok(Some(handle)) = backend
                        .find_first_visible(context, &role_query, window)
                        .await
                    {
                        tracing::debug!(role = %role, "resolved lone element by role");
                        return Ok(handle);
                    }
                }
            }
        }

        Err(ResolveError {
            target: target.brief(),
            reason: "no strategy produced a visible match".into(),
            attempted,
        })
    }
}
