//! Workflow error type

use crate::activity::ActivityError;
use crate::engine::RegistryError;

/// Errors raised by definitions, instances and activities
///
/// Configuration errors (unknown activities, dangling conditions, illegal
/// fan-out or successors) mean the definition and the activity logic disagree;
/// they are never retried. Business failures are not errors: they are reported
/// through an unsuccessful [`WorkflowActivityResult`](crate::activity::WorkflowActivityResult).
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// No activity with this ID
    #[error("activity not found: {0}")]
    ActivityNotFound(String),

    /// More than one activity shares this ID
    #[error("activity id is not unique: {0}")]
    DuplicateActivityId(String),

    /// Activity with an empty ID
    #[error("activity id must not be empty")]
    EmptyActivityId,

    /// Transition endpoint that is not part of the definition
    #[error("transition {from} -> {to} references unknown activity {missing}")]
    DanglingTransition {
        from: String,
        to: String,
        missing: String,
    },

    /// No outbound transition carries the requested condition
    #[error("activity {activity_id} has no outbound transition with condition {condition:?}")]
    UnknownCondition {
        activity_id: String,
        condition: String,
    },

    /// A non-fork activity produced more than one successor
    #[error(
        "activity {activity_id} is not a fork but produced multiple successors: {}",
        successors.join(", ")
    )]
    IllegalFanOut {
        activity_id: String,
        successors: Vec<String>,
    },

    /// A successor that is not the target of any outbound transition
    #[error("activity {activity_id} has no transition to successor {successor}")]
    IllegalSuccessor {
        activity_id: String,
        successor: String,
    },

    /// Too many pass-through activities completed in one chain
    #[error("activity chain exceeded maximum depth of {0}")]
    ChainDepthExceeded(usize),

    /// Data type name reserved by the engine
    #[error("data type {0} is reserved by the engine")]
    ReservedDataType(String),

    /// Stored data does not match the requested Rust type
    #[error("data of type {data_type} in group {group} has a different Rust type")]
    DataTypeMismatch { data_type: String, group: String },

    /// Completion chain was cancelled
    #[error("completion of activity {0} was cancelled")]
    Cancelled(String),

    /// Activity implementation error
    #[error("activity error: {0}")]
    Activity(#[from] ActivityError),

    /// Registry error
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl WorkflowError {
    /// Whether this error indicates a broken definition or activity contract
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::ActivityNotFound(_)
                | Self::DuplicateActivityId(_)
                | Self::EmptyActivityId
                | Self::DanglingTransition { .. }
                | Self::UnknownCondition { .. }
                | Self::IllegalFanOut { .. }
                | Self::IllegalSuccessor { .. }
                | Self::ChainDepthExceeded(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fan_out_message_names_successors() {
        let error = WorkflowError::IllegalFanOut {
            activity_id: "a".to_string(),
            successors: vec!["b".to_string(), "c".to_string()],
        };

        assert_eq!(
            error.to_string(),
            "activity a is not a fork but produced multiple successors: b, c"
        );
        assert!(error.is_configuration_error());
    }

    #[test]
    fn test_activity_error_is_not_configuration_error() {
        let error: WorkflowError = ActivityError::new("boom").into();

        assert_eq!(error.to_string(), "activity error: boom");
        assert!(!error.is_configuration_error());
        assert!(!WorkflowError::Cancelled("a".into()).is_configuration_error());
    }
}
