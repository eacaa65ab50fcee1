//! Wire-level types exchanged with browser-automation backends.

use serde::{Deserialize, Serialize};

/// Identifies one browsing context (page, tab, or window) owned by the
/// backend. New contexts may appear as a side effect of an action, e.g. a
/// link opening a new tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContextId(pub u32);

/// Opaque handle to an element located by the backend. Valid for the page
/// state it was resolved against; actions on a detached element fail with
/// a backend error rather than silently re-resolving.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementHandle {
    pub context: ContextId,
    pub id: u64,
}

/// One lookup shape a backend knows how to evaluate. Queries are lazy and
/// possibly multi-match; callers take the first visible element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ElementQuery {
    RoleAndName { role: String, name: String },
    Role { role: String },
    /// Form-label association: the control wired to a `<label>` with this text.
    Label { label: String },
    /// Partial visible-text match.
    Text { text: String },
    Placeholder { placeholder: String },
    TestId { testid: String },
    /// Raw CSS/XPath selector, the escape hatch.
    Selector { selector: String },
}

/// Node of an accessibility snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AxNode {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<AxNode>,
}

impl AxNode {
    pub fn new(role: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            name: name.into(),
            children: vec![],
        }
    }

    pub fn with_children(mut self, children: Vec<AxNode>) -> Self {
        self.children = children;
        self
    }
}

/// `(role, name)` pair harvested from the accessibility tree during healing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub role: String,
    pub name: String,
}

/// A candidate with its similarity score against the healing query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCandidate {
    pub role: String,
    pub name: String,
    pub score: f64,
}

#[derive(Debug, Clone)]
pub struct NavigationResult {
    pub url: String,
    pub title: String,
    pub status: u16,
}
