//! Scenario data model: intent targets, steps, and execution records.
//!
//! Scenarios arrive fully formed as a JSON step list (generation from
//! natural-language requirements happens upstream). A step's target may be
//! written either as a bare string or as a structured object; both collapse
//! into [`IntentTarget`] at parse time, so nothing downstream branches on
//! the raw shape.

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScenarioError {
    /// The step names an action outside the fixed vocabulary. Always fatal,
    /// never healed.
    #[error("unsupported action: {0}")]
    UnsupportedAction(String),

    #[error("invalid scenario: {0}")]
    Parse(#[from] serde_json::Error),
}

/// The fixed action vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    Navigate,
    Click,
    DoubleClick,
    Hover,
    Fill,
    SelectOption,
    Check,
    PressKey,
    ScrollIntoView,
    AssertVisible,
    AssertText,
    Wait,
    GoBack,
    GoForward,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Navigate => "navigate",
            Action::Click => "click",
            Action::DoubleClick => "double-click",
            Action::Hover => "hover",
            Action::Fill => "fill",
            Action::SelectOption => "select-option",
            Action::Check => "check",
            Action::PressKey => "press-key",
            Action::ScrollIntoView => "scroll-into-view",
            Action::AssertVisible => "assert-visible",
            Action::AssertText => "assert-text",
            Action::Wait => "wait",
            Action::GoBack => "go-back",
            Action::GoForward => "go-forward",
        }
    }

    /// Whether this action resolves an element target before executing.
    pub fn takes_target(self) -> bool {
        matches!(
            self,
            Action::Click
                | Action::DoubleClick
                | Action::Hover
                | Action::Fill
                | Action::SelectOption
                | Action::Check
                | Action::ScrollIntoView
                | Action::AssertVisible
                | Action::AssertText
        )
    }

    /// Actions whose failures may enter the escalation controller.
    /// Navigation and wait failures are fatal to the scenario instead.
    pub fn is_healable(self) -> bool {
        matches!(
            self,
            Action::Click
                | Action::DoubleClick
                | Action::Hover
                | Action::Fill
                | Action::SelectOption
                | Action::Check
                | Action::AssertVisible
                | Action::AssertText
        )
    }

    pub fn is_navigation(self) -> bool {
        matches!(self, Action::Navigate | Action::GoBack | Action::GoForward)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = ScenarioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "navigate" => Ok(Action::Navigate),
            "click" => Ok(Action::Click),
            "double-click" => Ok(Action::DoubleClick),
            "hover" => Ok(Action::Hover),
            "fill" => Ok(Action::Fill),
            "select-option" => Ok(Action::SelectOption),
            "check" => Ok(Action::Check),
            "press-key" => Ok(Action::PressKey),
            "scroll-into-view" => Ok(Action::ScrollIntoView),
            "assert-visible" => Ok(Action::AssertVisible),
            "assert-text" => Ok(Action::AssertText),
            "wait" => Ok(Action::Wait),
            "go-back" => Ok(Action::GoBack),
            "go-forward" => Ok(Action::GoForward),
            other => Err(ScenarioError::UnsupportedAction(other.to_string())),
        }
    }
}

/// Attribute-based description of which element a step refers to.
///
/// Field order matches the resolver's strategy priority: semantic
/// attributes that survive UI refactors first, the raw selector last.
/// A target with every field empty can never resolve.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentTarget {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Accessible name, paired with `role`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Text of the `<label>` associated with a form control.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Visible text, matched partially.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// `data-testid` attribute value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub testid: Option<String>,
    /// Raw CSS/XPath selector, the escape hatch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
}

impl IntentTarget {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn from_role_name(role: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            role: Some(role.into()),
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        let populated = |s: &Option<String>| s.as_deref().is_some_and(|v| !v.is_empty());
        !(populated(&self.role)
            || populated(&self.name)
            || populated(&self.label)
            || populated(&self.text)
            || populated(&self.placeholder)
            || populated(&self.testid)
            || populated(&self.selector))
    }

    /// Text used as the healing query, in `name` > `text` > `label`
    /// precedence.
    pub fn query_text(&self) -> Option<&str> {
        self.name
            .as_deref()
            .or(self.text.as_deref())
            .or(self.label.as_deref())
            .filter(|s| !s.is_empty())
    }

    /// One-line summary for logs and error messages.
    pub fn brief(&self) -> String {
        let mut parts = Vec::new();
        let mut push = |key: &str, value: &Option<String>| {
            if let Some(v) = value {
                parts.push(format!("{key}={v}"));
            }
        };
        push("role", &self.role);
        push("name", &self.name);
        push("label", &self.label);
        push("text", &self.text);
        push("placeholder", &self.placeholder);
        push("testid", &self.testid);
        push("selector", &self.selector);
        if parts.is_empty() {
            "<empty>".to_string()
        } else {
            parts.join(", ")
        }
    }
}

/// Duck-typed target payload as authored: a bare string or a structured
/// object. Normalized into [`IntentTarget`] once, at parse time.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum TargetSpec {
    Text(String),
    Intent(IntentTarget),
}

impl From<TargetSpec> for IntentTarget {
    fn from(spec: TargetSpec) -> Self {
        match spec {
            // A bare string means "the element showing this text".
            TargetSpec::Text(text) => IntentTarget::from_text(text),
            TargetSpec::Intent(target) => target,
        }
    }
}

/// One scenario instruction.
#[derive(Debug, Clone, Serialize)]
pub struct Step {
    /// Stable 1-based id; assigned by the executor when absent.
    #[serde(rename = "step", skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    pub action: Action,
    /// Action-specific payload: url for navigate, text for fill, key for
    /// press-key, milliseconds for wait, expected text for assert-text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<IntentTarget>,
    /// Alternate targets declared at authoring time, tried in order by the
    /// first healing sub-stage.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fallback_targets: Vec<IntentTarget>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl Step {
    pub fn new(action: Action) -> Self {
        Self {
            id: None,
            action,
            value: None,
            target: None,
            fallback_targets: vec![],
            description: String::new(),
        }
    }

    pub fn with_value(mut self, value: impl Into<serde_json::Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_target(mut self, target: IntentTarget) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_fallbacks(mut self, fallbacks: Vec<IntentTarget>) -> Self {
        self.fallback_targets = fallbacks;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn value_str(&self) -> Option<&str> {
        self.value.as_ref().and_then(|v| v.as_str())
    }

    pub fn value_u64(&self) -> Option<u64> {
        self.value.as_ref().and_then(|v| v.as_u64())
    }
}

#[derive(Debug, Deserialize)]
struct RawStep {
    #[serde(default)]
    step: Option<u32>,
    action: String,
    #[serde(default)]
    value: Option<serde_json::Value>,
    #[serde(default)]
    target: Option<TargetSpec>,
    #[serde(default)]
    fallback_targets: Vec<TargetSpec>,
    #[serde(default)]
    description: String,
}

impl TryFrom<RawStep> for Step {
    type Error = ScenarioError;

    fn try_from(raw: RawStep) -> Result<Self, Self::Error> {
        Ok(Step {
            id: raw.step,
            action: raw.action.parse()?,
            value: raw.value,
            target: raw.target.map(IntentTarget::from),
            fallback_targets: raw
                .fallback_targets
                .into_iter()
                .map(IntentTarget::from)
                .collect(),
            description: raw.description,
        })
    }
}

/// Ordered list of steps. Serializes as a bare JSON array.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Scenario {
    pub steps: Vec<Step>,
}

impl Scenario {
    pub fn from_steps(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    /// Parse a scenario from its JSON step list, normalizing duck-typed
    /// targets and validating the action vocabulary.
    pub fn from_json(text: &str) -> Result<Self, ScenarioError> {
        let raw: Vec<RawStep> = serde_json::from_str(text)?;
        let steps = raw
            .into_iter()
            .map(Step::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { steps })
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Which recovery path, if any, a step went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealStage {
    None,
    /// Declared fallback target at the given 1-based attempt index.
    Fallback(u32),
    CandidateSearch,
    ModelHeal,
    HealFailed,
}

impl fmt::Display for HealStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealStage::None => f.write_str("none"),
            HealStage::Fallback(n) => write!(f, "fallback_{n}"),
            HealStage::CandidateSearch => f.write_str("candidate_search"),
            HealStage::ModelHeal => f.write_str("model_heal"),
            HealStage::HealFailed => f.write_str("heal_failed"),
        }
    }
}

impl Serialize for HealStage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StepStatus {
    #[serde(rename = "PASS")]
    Pass,
    #[serde(rename = "FAIL")]
    Fail,
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepStatus::Pass => f.write_str("PASS"),
            StepStatus::Fail => f.write_str("FAIL"),
        }
    }
}

/// One row per executed step, append-only. Consumed by reporting.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionRecord {
    pub step: u32,
    pub action: Action,
    pub description: String,
    pub heal_stage: HealStage,
    pub status: StepStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence: Option<String>,
}
