//! Model-assisted target proposal, the third healing sub-stage.
//!
//! The completion service replies with free-form text expected to contain
//! one JSON object; prose and code fences around it are tolerated and only
//! the outermost `{...}` span is parsed.

use mend_common::protocol::RankedCandidate;
use mend_common::scenario::{Action, IntentTarget};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProposalError {
    #[error("reply contains no JSON object")]
    NoJson,
    #[error("malformed proposal: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Replacement target, and optionally fresh fallbacks, proposed by the
/// completion service.
#[derive(Debug, Clone, Deserialize)]
pub struct HealProposal {
    pub target: Option<IntentTarget>,
    #[serde(default)]
    pub fallback_targets: Vec<IntentTarget>,
}

/// Build the structured recovery request for the completion service.
pub fn build_heal_prompt(
    action: Action,
    failed_target: &IntentTarget,
    error_text: &str,
    page_url: &str,
    ranked: &[RankedCandidate],
    top_n: usize,
) -> String {
    let top: Vec<&RankedCandidate> = ranked.iter().take(top_n).collect();
    let candidates_json =
        serde_json::to_string_pretty(&top).unwrap_or_else(|_| "[]".to_string());
    let failed_json =
        serde_json::to_string(failed_target).unwrap_or_else(|_| "{}".to_string());

    format!(
        r#"[Self-Healing Request]
Propose an executable replacement target and fallback_targets for the failed step below, as JSON.

[Action]
{action}

[Failed Target]
{failed_json}

[Error]
{error_text}

[URL]
{page_url}

[Candidate Elements]
{candidates_json}

[Output Rules]
1. Output exactly one JSON object and nothing else.
2. Express the target through role+name, label, or text.
3. Include at least two fallback_targets.
4. Avoid guessing raw selectors.

[Output Schema]
{{
  "target": {{"role": "...", "name": "..."}},
  "fallback_targets": [
    {{"role": "...", "name": "..."}},
    {{"text": "..."}}
  ]
}}"#
    )
}

/// Extract the outermost `{ ... }` span from a possibly chatty reply.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

pub fn parse_proposal(reply: &str) -> Result<HealProposal, ProposalError> {
    let json = extract_json_object(reply).ok_or(ProposalError::NoJson)?;
    Ok(serde_json::from_str(json)?)
}
