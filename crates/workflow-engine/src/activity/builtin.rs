//! Built-in activities
//!
//! - [`EmptyActivity`]: waits for an external completion, then follows the default transition
//! - [`AutomaticActivity`]: pass-through activity that completes as soon as it is reached
//! - [`ForkActivity`]: hands its token to every default successor
//! - [`JoinActivity`]: waits until every inbound branch has arrived
//! - [`ConditionActivity`]: routes along the `"true"` or `"false"` transition

use std::collections::BTreeSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::{Activity, ActivityArgs, ActivityKind, ActivityType, WorkflowActivityResult};
use crate::data::JoinArrivals;
use crate::engine::WorkflowInstance;
use crate::workflow::{WorkflowDefinition, WorkflowError};

/// Activity without behaviour of its own
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmptyActivity {
    pub id: String,
}

impl EmptyActivity {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

#[async_trait]
impl Activity for EmptyActivity {
    fn id(&self) -> &str {
        &self.id
    }

    fn activity_type(&self) -> &str {
        Self::TYPE
    }

    fn to_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    async fn complete(
        &self,
        _instance: &WorkflowInstance,
        _definition: &WorkflowDefinition,
        _args: &ActivityArgs,
        _cancel: &CancellationToken,
    ) -> Result<WorkflowActivityResult, WorkflowError> {
        Ok(WorkflowActivityResult::succeeded())
    }
}

impl ActivityType for EmptyActivity {
    const TYPE: &'static str = "empty";
}

/// Activity that completes itself as soon as a token arrives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomaticActivity {
    pub id: String,
}

impl AutomaticActivity {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

#[async_trait]
impl Activity for AutomaticActivity {
    fn id(&self) -> &str {
        &self.id
    }

    fn activity_type(&self) -> &str {
        Self::TYPE
    }

    fn to_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    async fn prepare(
        &self,
        _instance: &WorkflowInstance,
        _definition: &WorkflowDefinition,
    ) -> Result<bool, WorkflowError> {
        Ok(true)
    }

    async fn complete(
        &self,
        _instance: &WorkflowInstance,
        _definition: &WorkflowDefinition,
        _args: &ActivityArgs,
        _cancel: &CancellationToken,
    ) -> Result<WorkflowActivityResult, WorkflowError> {
        Ok(WorkflowActivityResult::succeeded())
    }
}

impl ActivityType for AutomaticActivity {
    const TYPE: &'static str = "automatic";
}

/// Activity that splits one token into one token per default successor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForkActivity {
    pub id: String,
}

impl ForkActivity {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

#[async_trait]
impl Activity for ForkActivity {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> ActivityKind {
        ActivityKind::Fork
    }

    fn activity_type(&self) -> &str {
        Self::TYPE
    }

    fn to_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    async fn prepare(
        &self,
        _instance: &WorkflowInstance,
        _definition: &WorkflowDefinition,
    ) -> Result<bool, WorkflowError> {
        Ok(true)
    }

    async fn complete(
        &self,
        _instance: &WorkflowInstance,
        _definition: &WorkflowDefinition,
        _args: &ActivityArgs,
        _cancel: &CancellationToken,
    ) -> Result<WorkflowActivityResult, WorkflowError> {
        Ok(WorkflowActivityResult::succeeded())
    }
}

impl ActivityType for ForkActivity {
    const TYPE: &'static str = "fork";
}

/// Activity that merges the branches of a fork
///
/// The instance records which activity handed each token to the join (see
/// [`JoinArrivals`]). Completion only succeeds once every distinct source of
/// an inbound transition has arrived, and then resets the arrivals. Until
/// then the join's own token stays pending and is retried each time another
/// branch arrives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinActivity {
    pub id: String,
}

impl JoinActivity {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

#[async_trait]
impl Activity for JoinActivity {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> ActivityKind {
        ActivityKind::Join
    }

    fn activity_type(&self) -> &str {
        Self::TYPE
    }

    fn to_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    async fn prepare(
        &self,
        _instance: &WorkflowInstance,
        _definition: &WorkflowDefinition,
    ) -> Result<bool, WorkflowError> {
        Ok(true)
    }

    async fn complete(
        &self,
        instance: &WorkflowInstance,
        definition: &WorkflowDefinition,
        _args: &ActivityArgs,
        _cancel: &CancellationToken,
    ) -> Result<WorkflowActivityResult, WorkflowError> {
        let arrivals = instance.data().resolve::<JoinArrivals>(&self.id)?;

        let missing: BTreeSet<&str> = {
            let arrivals = arrivals.read();
            definition
                .get_inbound_transitions(&self.id)
                .into_iter()
                .map(|t| t.from.as_str())
                .filter(|from| !arrivals.contains(from))
                .collect()
        };

        if !missing.is_empty() {
            debug!(join = %self.id, ?missing, "join waiting for branches");
            return Ok(WorkflowActivityResult::failed());
        }

        arrivals.write().clear();
        Ok(WorkflowActivityResult::succeeded())
    }
}

impl ActivityType for JoinActivity {
    const TYPE: &'static str = "join";
}

/// Activity that routes on a boolean
///
/// The value is read from the `argument` field of the completion input and
/// falls back to `default_value`. The outcome selects the outbound transition
/// with condition `"true"` or `"false"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionActivity {
    pub id: String,

    /// Input field holding the boolean
    #[serde(default = "default_argument")]
    pub argument: String,

    /// Value used when the input does not carry the field
    #[serde(default)]
    pub default_value: bool,

    /// Complete as soon as a token arrives (uses `default_value`)
    #[serde(default)]
    pub automatic: bool,
}

fn default_argument() -> String {
    "value".to_string()
}

impl ConditionActivity {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            argument: default_argument(),
            default_value: false,
            automatic: false,
        }
    }

    /// Set the input field holding the boolean
    pub fn with_argument(mut self, argument: impl Into<String>) -> Self {
        self.argument = argument.into();
        self
    }

    /// Set the fallback value
    pub fn with_default_value(mut self, default_value: bool) -> Self {
        self.default_value = default_value;
        self
    }

    /// Complete immediately when reached
    pub fn automatic(mut self) -> Self {
        self.automatic = true;
        self
    }
}

#[async_trait]
impl Activity for ConditionActivity {
    fn id(&self) -> &str {
        &self.id
    }

    fn activity_type(&self) -> &str {
        Self::TYPE
    }

    fn to_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    async fn prepare(
        &self,
        _instance: &WorkflowInstance,
        _definition: &WorkflowDefinition,
    ) -> Result<bool, WorkflowError> {
        Ok(self.automatic)
    }

    async fn complete(
        &self,
        _instance: &WorkflowInstance,
        definition: &WorkflowDefinition,
        args: &ActivityArgs,
        _cancel: &CancellationToken,
    ) -> Result<WorkflowActivityResult, WorkflowError> {
        let value = args
            .get_field::<bool>(&self.argument)?
            .unwrap_or(self.default_value);
        let condition = if value { "true" } else { "false" };

        WorkflowActivityResult::create_by_transition_condition(
            true,
            Some(serde_json::Value::Bool(value)),
            condition,
            definition,
            self,
        )
    }
}

impl ActivityType for ConditionActivity {
    const TYPE: &'static str = "condition";
}
