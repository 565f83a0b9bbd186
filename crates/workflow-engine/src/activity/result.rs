//! Activity outcome

use serde::{Deserialize, Serialize};

use super::Activity;
use crate::workflow::{WorkflowDefinition, WorkflowError};

/// Outcome of completing one activity
///
/// `next_activities == None` means the engine follows the default
/// (condition-less) outbound transitions. An explicit list must only name
/// activities reachable through an outbound transition of the completed
/// activity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowActivityResult {
    /// Whether the activity completed
    pub successful: bool,

    /// Optional result payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,

    /// Successor activity IDs chosen by the activity itself
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_activities: Option<Vec<String>>,
}

impl WorkflowActivityResult {
    /// Create a result with the given success flag
    pub fn new(successful: bool) -> Self {
        Self {
            successful,
            result: None,
            next_activities: None,
        }
    }

    /// Successful result following the default transitions
    pub fn succeeded() -> Self {
        Self::new(true)
    }

    /// Unsuccessful result; the token stays pending
    pub fn failed() -> Self {
        Self::new(false)
    }

    /// Attach a result payload
    pub fn with_result(mut self, result: serde_json::Value) -> Self {
        self.result = Some(result);
        self
    }

    /// Set the successor activities explicitly
    pub fn with_next_activities<I, S>(mut self, next_activities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.next_activities = Some(next_activities.into_iter().map(Into::into).collect());
        self
    }

    /// Build a result whose successors are the targets of all outbound
    /// transitions of `activity` carrying `condition`
    ///
    /// # Errors
    ///
    /// - [`WorkflowError::UnknownCondition`] if no outbound transition carries
    ///   the condition
    /// - [`WorkflowError::IllegalFanOut`] if several do and `activity` is not
    ///   a fork
    pub fn create_by_transition_condition(
        successful: bool,
        result: Option<serde_json::Value>,
        condition: &str,
        definition: &WorkflowDefinition,
        activity: &dyn Activity,
    ) -> Result<Self, WorkflowError> {
        let next_activities: Vec<String> = definition
            .get_outbound_transitions(activity.id())
            .into_iter()
            .filter(|t| t.matches_condition(condition))
            .map(|t| t.to.clone())
            .collect();

        if next_activities.is_empty() {
            return Err(WorkflowError::UnknownCondition {
                activity_id: activity.id().to_string(),
                condition: condition.to_string(),
            });
        }

        if next_activities.len() > 1 && !activity.kind().is_fork() {
            return Err(WorkflowError::IllegalFanOut {
                activity_id: activity.id().to_string(),
                successors: next_activities,
            });
        }

        Ok(Self {
            successful,
            result,
            next_activities: Some(next_activities),
        })
    }
}
