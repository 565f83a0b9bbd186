//! Transitions between activities

use serde::{Deserialize, Serialize};

/// Directed edge between two activities
///
/// A transition without a condition (or with an empty one) is a default
/// transition and is followed when the completed activity does not choose
/// its successors itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkflowTransition {
    /// Source activity ID
    pub from: String,

    /// Target activity ID
    pub to: String,

    /// Optional condition selecting this transition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

impl WorkflowTransition {
    /// Create a default transition
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            condition: None,
        }
    }

    /// Create a conditional transition
    pub fn conditional(
        from: impl Into<String>,
        to: impl Into<String>,
        condition: impl Into<String>,
    ) -> Self {
        Self::new(from, to).with_condition(condition)
    }

    /// Set the condition
    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    /// Whether this is a default (unconditional) transition
    pub fn is_default(&self) -> bool {
        self.condition.as_deref().map_or(true, str::is_empty)
    }

    /// Whether this transition carries `condition`
    ///
    /// The empty string matches default transitions.
    pub fn matches_condition(&self, condition: &str) -> bool {
        self.condition.as_deref().unwrap_or_default() == condition
    }
}
