//! Activity trait definition

use std::fmt;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use super::{ActivityArgs, WorkflowActivityResult};
use crate::engine::WorkflowInstance;
use crate::workflow::{WorkflowDefinition, WorkflowError};

/// Error type for failures raised by activity implementations
///
/// Business-level failures should be reported through an unsuccessful
/// [`WorkflowActivityResult`] instead, which leaves the token pending.
/// An `ActivityError` aborts the completion call and propagates to the caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActivityError {
    /// Error message
    pub message: String,

    /// Error type/code for programmatic handling
    pub error_type: Option<String>,

    /// Additional error details (for debugging)
    pub details: Option<serde_json::Value>,
}

impl ActivityError {
    /// Create a new activity error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error_type: None,
            details: None,
        }
    }

    /// Set the error type
    pub fn with_type(mut self, error_type: impl Into<String>) -> Self {
        self.error_type = Some(error_type.into());
        self
    }

    /// Add error details
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl fmt::Display for ActivityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ActivityError {}

impl From<anyhow::Error> for ActivityError {
    fn from(err: anyhow::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// Structural role of an activity in the workflow graph
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    /// Ordinary activity with at most one successor
    #[default]
    Task,

    /// Activity that may hand its token to several successors at once
    Fork,

    /// Activity that waits for its inbound branches
    Join,
}

impl ActivityKind {
    /// Whether this kind may produce more than one successor token
    pub fn is_fork(self) -> bool {
        matches!(self, ActivityKind::Fork)
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Task => write!(f, "task"),
            Self::Fork => write!(f, "fork"),
            Self::Join => write!(f, "join"),
        }
    }
}

/// An activity is a node of the workflow graph
///
/// The engine calls [`prepare`](Activity::prepare) when a token arrives at the
/// activity and [`complete`](Activity::complete) when the token is completed,
/// either by an external caller or, if `prepare` returned `true`, right away.
///
/// # Example
///
/// ```ignore
/// use workflow_engine::prelude::*;
///
/// #[derive(Debug, Serialize, Deserialize)]
/// struct ApproveInvoice {
///     id: String,
/// }
///
/// #[async_trait]
/// impl Activity for ApproveInvoice {
///     fn id(&self) -> &str {
///         &self.id
///     }
///
///     fn activity_type(&self) -> &str {
///         Self::TYPE
///     }
///
///     fn to_value(&self) -> Result<serde_json::Value, serde_json::Error> {
///         serde_json::to_value(self)
///     }
///
///     async fn complete(
///         &self,
///         _instance: &WorkflowInstance,
///         definition: &WorkflowDefinition,
///         args: &ActivityArgs,
///         _cancel: &CancellationToken,
///     ) -> Result<WorkflowActivityResult, WorkflowError> {
///         let approved = args.get_field::<bool>("approved")?.unwrap_or(false);
///         let condition = if approved { "approved" } else { "rejected" };
///         WorkflowActivityResult::create_by_transition_condition(
///             true, None, condition, definition, self,
///         )
///     }
/// }
///
/// impl ActivityType for ApproveInvoice {
///     const TYPE: &'static str = "approve_invoice";
/// }
/// ```
#[async_trait]
pub trait Activity: Send + Sync + fmt::Debug + 'static {
    /// Identifier of the activity, unique within its definition
    fn id(&self) -> &str;

    /// Structural role of the activity
    fn kind(&self) -> ActivityKind {
        ActivityKind::Task
    }

    /// Type discriminator written to definition documents
    fn activity_type(&self) -> &str;

    /// Serialized properties of the activity (must be a JSON object)
    fn to_value(&self) -> Result<serde_json::Value, serde_json::Error>;

    /// Called when a token arrives at this activity
    ///
    /// Returns `true` if the activity should be completed immediately,
    /// without waiting for an external completion call.
    async fn prepare(
        &self,
        instance: &WorkflowInstance,
        definition: &WorkflowDefinition,
    ) -> Result<bool, WorkflowError> {
        let _ = (instance, definition);
        Ok(false)
    }

    /// Execute the activity for a pending token
    ///
    /// A result with `next_activities == None` follows the default
    /// (unconditional) outbound transitions.
    async fn complete(
        &self,
        instance: &WorkflowInstance,
        definition: &WorkflowDefinition,
        args: &ActivityArgs,
        cancel: &CancellationToken,
    ) -> Result<WorkflowActivityResult, WorkflowError>;
}

/// An activity that can be registered for polymorphic deserialization
///
/// `TYPE` is the discriminator used in definition documents and must match
/// what [`Activity::activity_type`] returns.
pub trait ActivityType: Activity + Serialize + DeserializeOwned {
    /// Unique type identifier for this activity
    const TYPE: &'static str;
}
