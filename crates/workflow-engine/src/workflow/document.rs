//! Serialized form of a workflow definition

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{WorkflowError, WorkflowTransition};
use crate::activity::Activity;
use crate::engine::ActivityRegistry;

/// Declarative document describing a workflow definition
///
/// ```json
/// {
///   "start_activity_id": "a",
///   "activities": [{ "type": "empty", "id": "a" }, { "type": "automatic", "id": "b" }],
///   "transitions": [{ "from": "a", "to": "b" }]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDocument {
    /// ID of the activity holding the initial token
    pub start_activity_id: String,

    /// Activities in declaration order
    pub activities: Vec<ActivityNode>,

    /// Transitions in declaration order
    #[serde(default)]
    pub transitions: Vec<WorkflowTransition>,
}

/// One polymorphic activity entry, discriminated by `type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityNode {
    /// Registered activity type
    #[serde(rename = "type")]
    pub activity_type: String,

    /// Activity properties (including its `id`)
    #[serde(flatten)]
    pub properties: Map<String, Value>,
}

impl ActivityNode {
    /// Describe an activity
    ///
    /// The activity must serialize to an object without a `type` key, which
    /// is taken by the discriminator.
    pub fn from_activity(activity: &dyn Activity) -> Result<Self, WorkflowError> {
        let properties = match activity.to_value()? {
            Value::Object(properties) => properties,
            other => {
                return Err(serialization_error(format!(
                    "activity {} must serialize to an object, got {}",
                    activity.id(),
                    other
                )))
            }
        };

        if properties.contains_key("type") {
            return Err(serialization_error(format!(
                "activity {} has a property named \"type\"",
                activity.id()
            )));
        }

        Ok(Self {
            activity_type: activity.activity_type().to_string(),
            properties,
        })
    }

    /// Build the activity through the registry
    pub fn into_activity(self, registry: &ActivityRegistry) -> Result<Arc<dyn Activity>, WorkflowError> {
        Ok(registry.create(&self.activity_type, Value::Object(self.properties))?)
    }
}

fn serialization_error(message: String) -> WorkflowError {
    WorkflowError::Serialization(<serde_json::Error as serde::ser::Error>::custom(message))
}
