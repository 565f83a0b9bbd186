//! Workflow instance: the runtime cursor over a definition
//!
//! The `WorkflowInstance` is responsible for:
//! - Tracking the pending activity tokens
//! - Completing activities and advancing tokens along transitions
//! - Chaining activities that ask to run immediately
//! - Announcing changes of the pending activity set

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use super::{InstanceConfig, InstanceEvent, WorkflowInstanceState};
use crate::activity::{Activity, ActivityArgs, ActivityKind, WorkflowActivityResult};
use crate::data::{JoinArrivals, WorkflowDataProvider};
use crate::workflow::{WorkflowDefinition, WorkflowError};

/// Workflow instance
///
/// An instance holds a set of tokens, the IDs of activities waiting to be
/// completed, plus the activity data of its groups. A fresh instance holds a
/// single token on the start activity. Tokens move only through
/// [`complete`](Self::complete); forks create several tokens, dead ends
/// consume them. The instance is finished when no token is left.
///
/// `complete` takes `&mut self`, so one caller drives an instance at a time.
///
/// # Example
///
/// ```ignore
/// use workflow_engine::prelude::*;
///
/// let mut instance = definition.create_instance();
/// let mut events = instance.subscribe();
///
/// let cancel = CancellationToken::new();
/// let result = instance
///     .complete("review", Some(json!({ "approved": true })), &cancel)
///     .await?;
///
/// if result.successful {
///     println!("now pending: {:?}", instance.current_activity_ids());
/// }
/// ```
#[derive(Debug)]
pub struct WorkflowInstance {
    definition: Arc<WorkflowDefinition>,
    current_activity_ids: Vec<String>,
    notified_activity_ids: Vec<String>,
    data: WorkflowDataProvider,
    events: broadcast::Sender<InstanceEvent>,
    config: InstanceConfig,
}

impl WorkflowInstance {
    /// Create an instance holding a token on the start activity
    pub fn new(definition: Arc<WorkflowDefinition>) -> Self {
        Self::with_config(definition, InstanceConfig::default())
    }

    /// Create an instance with custom config
    pub fn with_config(definition: Arc<WorkflowDefinition>, config: InstanceConfig) -> Self {
        let start = definition.start_activity_id().to_string();
        Self::from_parts(definition, vec![start], WorkflowDataProvider::new(), config)
    }

    fn from_parts(
        definition: Arc<WorkflowDefinition>,
        current_activity_ids: Vec<String>,
        data: WorkflowDataProvider,
        config: InstanceConfig,
    ) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        Self {
            definition,
            notified_activity_ids: current_activity_ids.clone(),
            current_activity_ids,
            data,
            events,
            config,
        }
    }

    /// Restore an instance from persisted state
    ///
    /// # Errors
    ///
    /// [`WorkflowError::ActivityNotFound`] if a persisted token names an
    /// activity the definition does not contain.
    pub fn from_state(
        definition: Arc<WorkflowDefinition>,
        state: WorkflowInstanceState,
    ) -> Result<Self, WorkflowError> {
        Self::from_state_with_config(definition, state, InstanceConfig::default())
    }

    /// Restore an instance from persisted state with custom config
    pub fn from_state_with_config(
        definition: Arc<WorkflowDefinition>,
        state: WorkflowInstanceState,
        config: InstanceConfig,
    ) -> Result<Self, WorkflowError> {
        let mut current = Vec::with_capacity(state.current_activity_ids.len());
        for id in state.current_activity_ids {
            definition.get_activity_by_id(&id)?;
            if !current.contains(&id) {
                current.push(id);
            }
        }

        debug!(current = ?current, data = state.data.len(), "restored workflow instance");

        Ok(Self::from_parts(
            definition,
            current,
            WorkflowDataProvider::from_entries(state.data),
            config,
        ))
    }

    /// Restore an instance from its JSON state
    pub fn from_json(definition: Arc<WorkflowDefinition>, json: &str) -> Result<Self, WorkflowError> {
        let state: WorkflowInstanceState = serde_json::from_str(json)?;
        Self::from_state(definition, state)
    }

    /// Snapshot of the persistable state
    pub fn to_state(&self) -> Result<WorkflowInstanceState, WorkflowError> {
        Ok(WorkflowInstanceState {
            current_activity_ids: self.current_activity_ids.clone(),
            data: self.data.entries()?,
        })
    }

    /// Serialize the persistable state to JSON
    pub fn to_json(&self) -> Result<String, WorkflowError> {
        Ok(serde_json::to_string(&self.to_state()?)?)
    }

    /// The definition this instance runs on
    pub fn definition(&self) -> &Arc<WorkflowDefinition> {
        &self.definition
    }

    /// Activity data of this instance
    pub fn data(&self) -> &WorkflowDataProvider {
        &self.data
    }

    /// Instance configuration
    pub fn config(&self) -> &InstanceConfig {
        &self.config
    }

    /// IDs of the pending activities
    pub fn current_activity_ids(&self) -> &[String] {
        &self.current_activity_ids
    }

    /// Whether `activity_id` holds a token
    pub fn contains(&self, activity_id: &str) -> bool {
        self.current_activity_ids.iter().any(|id| id == activity_id)
    }

    /// The pending activities
    pub fn current_activities(&self) -> Result<Vec<Arc<dyn Activity>>, WorkflowError> {
        self.current_activity_ids
            .iter()
            .map(|id| self.definition.get_activity_by_id(id).map(Arc::clone))
            .collect()
    }

    /// The first pending activity, if any
    pub fn next_activity(&self) -> Result<Option<Arc<dyn Activity>>, WorkflowError> {
        self.current_activity_ids
            .first()
            .map(|id| self.definition.get_activity_by_id(id).map(Arc::clone))
            .transpose()
    }

    /// Whether no token is left
    pub fn is_finished(&self) -> bool {
        self.current_activity_ids.is_empty()
    }

    /// Subscribe to instance notifications
    pub fn subscribe(&self) -> broadcast::Receiver<InstanceEvent> {
        self.events.subscribe()
    }

    /// Complete a pending activity
    ///
    /// Completing an activity that holds no token is a no-op returning an
    /// unsuccessful result. An unsuccessful activity result leaves the token
    /// pending. On success the token moves to the successors chosen by the
    /// activity, or along the default transitions; successors whose `prepare`
    /// asks to run immediately are completed depth first before this call
    /// returns.
    ///
    /// # Errors
    ///
    /// Configuration errors ([`WorkflowError::IllegalFanOut`],
    /// [`WorkflowError::IllegalSuccessor`], ...), errors raised by activities and
    /// [`WorkflowError::Cancelled`]. Tokens already moved are not rolled back.
    #[instrument(skip(self, input, cancel))]
    pub async fn complete(
        &mut self,
        activity_id: &str,
        input: Option<serde_json::Value>,
        cancel: &CancellationToken,
    ) -> Result<WorkflowActivityResult, WorkflowError> {
        let outcome = self
            .complete_chained(activity_id.to_string(), input, cancel.clone(), 0)
            .await;

        self.notify_current_activities_changed();
        outcome
    }

    fn complete_chained(
        &mut self,
        activity_id: String,
        input: Option<serde_json::Value>,
        cancel: CancellationToken,
        depth: usize,
    ) -> BoxFuture<'_, Result<WorkflowActivityResult, WorkflowError>> {
        async move {
            if !self.contains(&activity_id) {
                debug!(%activity_id, "activity holds no token, ignoring completion");
                return Ok(WorkflowActivityResult::failed());
            }

            if depth > self.config.max_chain_depth {
                return Err(WorkflowError::ChainDepthExceeded(self.config.max_chain_depth));
            }

            if cancel.is_cancelled() {
                return Err(WorkflowError::Cancelled(activity_id));
            }

            let definition = Arc::clone(&self.definition);
            let activity = Arc::clone(definition.get_activity_by_id(&activity_id)?);
            let outbound = definition.get_outbound_transitions(&activity_id);

            let args = ActivityArgs::new(activity_id.clone(), input).with_chain_depth(depth);
            let result = activity.complete(self, &definition, &args, &cancel).await?;

            let _ = self.events.send(InstanceEvent::ActivityCompleted {
                activity_id: activity_id.clone(),
                successful: result.successful,
            });

            if !result.successful {
                debug!(%activity_id, "activity did not complete, token stays pending");
                return Ok(result);
            }

            let next_ids = match &result.next_activities {
                Some(ids) => ids.clone(),
                None => definition.get_default_outbound_activity_ids(&activity_id),
            };

            if next_ids.len() > 1 && !activity.kind().is_fork() {
                return Err(WorkflowError::IllegalFanOut {
                    activity_id,
                    successors: next_ids,
                });
            }

            self.current_activity_ids.retain(|id| *id != activity_id);

            // Dead ends accept any successor; otherwise each needs a transition
            if !outbound.is_empty() {
                if let Some(successor) = next_ids
                    .iter()
                    .find(|id| !outbound.iter().any(|t| &t.to == *id))
                {
                    return Err(WorkflowError::IllegalSuccessor {
                        activity_id,
                        successor: successor.clone(),
                    });
                }
            }

            debug!(%activity_id, next = ?next_ids, depth, "activity completed");

            for next_id in next_ids {
                let next = Arc::clone(definition.get_activity_by_id(&next_id)?);
                if next.kind() == ActivityKind::Join {
                    self.data
                        .resolve::<JoinArrivals>(&next_id)?
                        .write()
                        .record(&activity_id);
                }

                let run_immediately = next.prepare(self, &definition).await?;

                if !self.contains(&next_id) {
                    self.current_activity_ids.push(next_id.clone());
                }

                if run_immediately {
                    debug!(activity_id = %next_id, depth = depth + 1, "completing activity immediately");
                    self.complete_chained(next_id, None, cancel.clone(), depth + 1)
                        .await?;
                }
            }

            Ok(result)
        }
        .boxed()
    }

    fn notify_current_activities_changed(&mut self) {
        let changed = {
            let previous: HashSet<&str> =
                self.notified_activity_ids.iter().map(String::as_str).collect();
            let current: HashSet<&str> =
                self.current_activity_ids.iter().map(String::as_str).collect();
            previous != current
        };
        if !changed {
            return;
        }

        let previous = std::mem::replace(
            &mut self.notified_activity_ids,
            self.current_activity_ids.clone(),
        );
        info!(?previous, current = ?self.current_activity_ids, "current activities changed");

        let _ = self.events.send(InstanceEvent::CurrentActivitiesChanged {
            previous,
            current: self.current_activity_ids.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::{EmptyActivity, ForkActivity};
    use crate::data::DataEntry;
    use crate::workflow::WorkflowTransition;

    fn definition() -> Arc<WorkflowDefinition> {
        Arc::new(
            WorkflowDefinition::new(
                "a",
                vec![
                    Arc::new(EmptyActivity::new("a")),
                    Arc::new(ForkActivity::new("f")),
                    Arc::new(EmptyActivity::new("b")),
                    Arc::new(EmptyActivity::new("c")),
                ],
                vec![
                    WorkflowTransition::new("a", "f"),
                    WorkflowTransition::new("f", "b"),
                    WorkflowTransition::new("f", "c"),
                ],
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_new_instance_views() {
        let instance = WorkflowInstance::new(definition());

        assert_eq!(instance.current_activity_ids(), ["a"]);
        assert!(instance.contains("a"));
        assert!(!instance.is_finished());
        assert_eq!(instance.next_activity().unwrap().unwrap().id(), "a");
        assert_eq!(instance.current_activities().unwrap().len(), 1);
        assert!(instance.data().is_empty());
    }

    #[test]
    fn test_from_state_deduplicates_tokens() {
        let state = WorkflowInstanceState {
            current_activity_ids: vec!["b".into(), "c".into(), "b".into()],
            data: vec![],
        };

        let instance = WorkflowInstance::from_state(definition(), state).unwrap();
        assert_eq!(instance.current_activity_ids(), ["b", "c"]);
    }

    #[test]
    fn test_from_state_rejects_unknown_activity() {
        let state = WorkflowInstanceState {
            current_activity_ids: vec!["ghost".into()],
            data: vec![],
        };

        let result = WorkflowInstance::from_state(definition(), state);
        assert!(matches!(result, Err(WorkflowError::ActivityNotFound(id)) if id == "ghost"));
    }

    #[test]
    fn test_finished_instance_has_no_next_activity() {
        let instance = WorkflowInstance::from_state(definition(), WorkflowInstanceState::default())
            .unwrap();

        assert!(instance.is_finished());
        assert!(instance.next_activity().unwrap().is_none());
    }

    #[test]
    fn test_json_state_round_trip() {
        let state = WorkflowInstanceState {
            current_activity_ids: vec!["c".into()],
            data: vec![DataEntry {
                data_type: "note".into(),
                group: "g".into(),
                value: serde_json::json!({ "text": "hi" }),
            }],
        };
        let instance = WorkflowInstance::from_state(definition(), state.clone()).unwrap();

        let json = instance.to_json().unwrap();
        let restored = WorkflowInstance::from_json(definition(), &json).unwrap();

        assert_eq!(restored.to_state().unwrap(), state);
    }

    #[tokio::test]
    async fn test_fork_creates_tokens() {
        let mut instance = WorkflowInstance::new(definition());
        let cancel = CancellationToken::new();

        let result = instance.complete("a", None, &cancel).await.unwrap();
        assert!(result.successful);
        // The fork completes itself and hands a token to each branch
        assert_eq!(instance.current_activity_ids(), ["b", "c"]);
    }

    #[tokio::test]
    async fn test_cancelled_token_aborts() {
        let mut instance = WorkflowInstance::new(definition());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = instance.complete("a", None, &cancel).await;
        assert!(matches!(result, Err(WorkflowError::Cancelled(id)) if id == "a"));
        assert_eq!(instance.current_activity_ids(), ["a"]);
    }
}
