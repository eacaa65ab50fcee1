//! Accessibility-tree candidate harvesting and similarity ranking.
//!
//! Candidates are ephemeral: recomputed on every healing attempt against
//! the live snapshot, never persisted across steps.

use mend_common::protocol::{AxNode, Candidate, RankedCandidate};
use mend_common::scenario::Action;
use std::collections::HashSet;

/// Substring containment between query and candidate name guarantees at
/// least this score.
pub const SUBSTRING_FLOOR: f64 = 0.85;

/// Added when a candidate's role equals the original target's role.
pub const ROLE_BONUS: f64 = 0.10;

const CLICKABLE_ROLES: &[&str] = &["button", "link", "menuitem", "tab", "checkbox", "radio"];
const FILLABLE_ROLES: &[&str] = &["textbox", "searchbox", "combobox"];

/// Walk the accessibility snapshot depth-first, keeping nodes with both a
/// role and a name, de-duplicated by `(role, name)` in first-seen order.
pub fn collect(snapshot: &AxNode) -> Vec<Candidate> {
    let mut out = Vec::new();
    let mut seen = HashSet::new();
    walk(snapshot, &mut out, &mut seen);
    out
}

fn walk(node: &AxNode, out: &mut Vec<Candidate>, seen: &mut HashSet<(String, String)>) {
    if !node.role.is_empty()
        && !node.name.is_empty()
        && seen.insert((node.role.clone(), node.name.clone()))
    {
        out.push(Candidate {
            role: node.role.clone(),
            name: node.name.clone(),
        });
    }
    for child in &node.children {
        walk(child, out, seen);
    }
}

/// Restrict candidates to roles that can plausibly receive `action`.
/// Actions without a role restriction pass everything through.
pub fn filter_for_action(action: Action, candidates: Vec<Candidate>) -> Vec<Candidate> {
    let allowed: &[&str] = match action {
        Action::Click | Action::DoubleClick => CLICKABLE_ROLES,
        Action::Fill => FILLABLE_ROLES,
        _ => return candidates,
    };
    candidates
        .into_iter()
        .filter(|c| allowed.contains(&c.role.as_str()))
        .collect()
}

/// Score candidates against the original query, descending. The sort is
/// stable, so ties keep tree-walk order.
pub fn rank(query: &str, preferred_role: Option<&str>, candidates: &[Candidate]) -> Vec<RankedCandidate> {
    let mut ranked: Vec<RankedCandidate> = candidates
        .iter()
        .map(|c| {
            let mut score = similarity(query, &c.name);
            if contains_either_way(query, &c.name) {
                score = score.max(SUBSTRING_FLOOR);
            }
            if preferred_role.is_some_and(|role| role == c.role) {
                score += ROLE_BONUS;
            }
            RankedCandidate {
                role: c.role.clone(),
                name: c.name.clone(),
                score,
            }
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked
}

/// Case-insensitive normalized similarity in `[0, 1]`.
fn similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    strsim::normalized_levenshtein(&a.to_lowercase(), &b.to_lowercase())
}

fn contains_either_way(query: &str, name: &str) -> bool {
    if query.is_empty() || name.is_empty() {
        return false;
    }
    let q = query.to_lowercase();
    let n = name.to_lowercase();
    q.contains(&n) || n.contains(&q)
}
