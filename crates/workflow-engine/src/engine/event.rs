//! Instance notifications

use serde::{Deserialize, Serialize};

/// Notifications broadcast by a [`WorkflowInstance`](super::WorkflowInstance)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InstanceEvent {
    /// An activity's `complete` returned
    ActivityCompleted {
        activity_id: String,
        successful: bool,
    },

    /// The set of pending activities changed
    ///
    /// Raised at most once per completion call, and only when the set differs
    /// from the previously announced one.
    CurrentActivitiesChanged {
        previous: Vec<String>,
        current: Vec<String>,
    },
}

impl InstanceEvent {
    /// Get the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::ActivityCompleted { .. } => "activity_completed",
            Self::CurrentActivitiesChanged { .. } => "current_activities_changed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = InstanceEvent::CurrentActivitiesChanged {
            previous: vec!["a".to_string()],
            current: vec!["b".to_string()],
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], event.event_type());
        assert_eq!(json["current"], serde_json::json!(["b"]));

        let parsed: InstanceEvent = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, event);
    }
}
