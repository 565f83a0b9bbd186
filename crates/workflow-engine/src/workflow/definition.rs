//! Workflow definition: the static activity graph

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use super::{ActivityNode, WorkflowDocument, WorkflowError, WorkflowTransition};
use crate::activity::Activity;
use crate::engine::{ActivityRegistry, InstanceConfig, WorkflowInstance};

/// A workflow definition is the static graph a workflow instance runs on
///
/// It owns the activities, the transitions between them and the ID of the
/// start activity. Definitions are validated on construction and are not
/// mutated afterwards; instances share them through an `Arc`.
///
/// # Example
///
/// ```ignore
/// use workflow_engine::prelude::*;
///
/// let definition = Arc::new(WorkflowDefinition::new(
///     "submit",
///     vec![
///         Arc::new(EmptyActivity::new("submit")),
///         Arc::new(EmptyActivity::new("review")),
///     ],
///     vec![WorkflowTransition::new("submit", "review")],
/// )?);
///
/// let mut instance = definition.create_instance();
/// instance.complete("submit", None, &CancellationToken::new()).await?;
/// assert_eq!(instance.current_activity_ids(), ["review"]);
/// ```
#[derive(Debug)]
pub struct WorkflowDefinition {
    start_activity_id: String,
    activities: Vec<Arc<dyn Activity>>,
    transitions: Vec<WorkflowTransition>,
}

impl WorkflowDefinition {
    /// Create a definition
    ///
    /// # Errors
    ///
    /// Fails if an activity ID is empty or not unique, if the start activity
    /// is missing, or if a transition references an unknown activity.
    pub fn new(
        start_activity_id: impl Into<String>,
        activities: Vec<Arc<dyn Activity>>,
        transitions: Vec<WorkflowTransition>,
    ) -> Result<Self, WorkflowError> {
        let definition = Self {
            start_activity_id: start_activity_id.into(),
            activities,
            transitions,
        };
        definition.validate()?;
        Ok(definition)
    }

    fn validate(&self) -> Result<(), WorkflowError> {
        let mut seen = HashSet::new();
        for activity in &self.activities {
            if activity.id().is_empty() {
                return Err(WorkflowError::EmptyActivityId);
            }
            if !seen.insert(activity.id()) {
                return Err(WorkflowError::DuplicateActivityId(activity.id().to_string()));
            }
        }

        if !seen.contains(self.start_activity_id.as_str()) {
            return Err(WorkflowError::ActivityNotFound(
                self.start_activity_id.clone(),
            ));
        }

        for transition in &self.transitions {
            for endpoint in [&transition.from, &transition.to] {
                if !seen.contains(endpoint.as_str()) {
                    return Err(WorkflowError::DanglingTransition {
                        from: transition.from.clone(),
                        to: transition.to.clone(),
                        missing: endpoint.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    /// ID of the activity holding the initial token
    pub fn start_activity_id(&self) -> &str {
        &self.start_activity_id
    }

    /// The start activity
    pub fn start_activity(&self) -> Result<&Arc<dyn Activity>, WorkflowError> {
        self.get_activity_by_id(&self.start_activity_id)
    }

    /// All activities in declaration order
    pub fn activities(&self) -> &[Arc<dyn Activity>] {
        &self.activities
    }

    /// All transitions in declaration order
    pub fn transitions(&self) -> &[WorkflowTransition] {
        &self.transitions
    }

    /// Whether an activity with this ID exists
    pub fn contains_activity(&self, id: &str) -> bool {
        self.activities.iter().any(|a| a.id() == id)
    }

    /// Look up an activity by ID
    ///
    /// # Errors
    ///
    /// [`WorkflowError::ActivityNotFound`] if no activity has this ID,
    /// [`WorkflowError::DuplicateActivityId`] if more than one has.
    pub fn get_activity_by_id(&self, id: &str) -> Result<&Arc<dyn Activity>, WorkflowError> {
        let mut matches = self.activities.iter().filter(|a| a.id() == id);
        let activity = matches
            .next()
            .ok_or_else(|| WorkflowError::ActivityNotFound(id.to_string()))?;
        if matches.next().is_some() {
            return Err(WorkflowError::DuplicateActivityId(id.to_string()));
        }
        Ok(activity)
    }

    /// Transitions leaving `id`, in declaration order
    pub fn get_outbound_transitions(&self, id: &str) -> Vec<&WorkflowTransition> {
        self.transitions.iter().filter(|t| t.from == id).collect()
    }

    /// Transitions entering `id`, in declaration order
    pub fn get_inbound_transitions(&self, id: &str) -> Vec<&WorkflowTransition> {
        self.transitions.iter().filter(|t| t.to == id).collect()
    }

    /// Targets of the default outbound transitions of `id`, in declaration order
    pub fn get_default_outbound_activity_ids(&self, id: &str) -> Vec<String> {
        self.transitions
            .iter()
            .filter(|t| t.from == id && t.is_default())
            .map(|t| t.to.clone())
            .collect()
    }

    /// Create an instance holding a single token on the start activity
    pub fn create_instance(self: &Arc<Self>) -> WorkflowInstance {
        WorkflowInstance::new(Arc::clone(self))
    }

    /// Create an instance with custom config
    pub fn create_instance_with_config(self: &Arc<Self>, config: InstanceConfig) -> WorkflowInstance {
        WorkflowInstance::with_config(Arc::clone(self), config)
    }

    /// Describe this definition as a document
    pub fn to_document(&self) -> Result<WorkflowDocument, WorkflowError> {
        let activities = self
            .activities
            .iter()
            .map(|a| ActivityNode::from_activity(a.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(WorkflowDocument {
            start_activity_id: self.start_activity_id.clone(),
            activities,
            transitions: self.transitions.clone(),
        })
    }

    /// Build a definition from a document
    ///
    /// Activity types are resolved through `registry`.
    pub fn from_document(
        document: WorkflowDocument,
        registry: &ActivityRegistry,
    ) -> Result<Self, WorkflowError> {
        let activities = document
            .activities
            .into_iter()
            .map(|node| node.into_activity(registry))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            start_activity_id = %document.start_activity_id,
            activities = activities.len(),
            transitions = document.transitions.len(),
            "loaded workflow definition"
        );

        Self::new(document.start_activity_id, activities, document.transitions)
    }

    /// Serialize to the JSON document format
    pub fn to_json(&self) -> Result<String, WorkflowError> {
        Ok(serde_json::to_string(&self.to_document()?)?)
    }

    /// Serialize to the JSON document format, pretty-printed
    pub fn to_json_pretty(&self) -> Result<String, WorkflowError> {
        Ok(serde_json::to_string_pretty(&self.to_document()?)?)
    }

    /// Deserialize from the JSON document format
    pub fn from_json(json: &str, registry: &ActivityRegistry) -> Result<Self, WorkflowError> {
        let document: WorkflowDocument = serde_json::from_str(json)?;
        Self::from_document(document, registry)
    }
}
