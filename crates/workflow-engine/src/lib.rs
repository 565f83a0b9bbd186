//! # Workflow Engine
//!
//! An activity-graph execution engine: workflow definitions describe
//! activities and the transitions between them, workflow instances move
//! tokens through that graph one activity completion at a time.
//!
//! ## Features
//!
//! - **Token-based execution**: instances track a set of pending activities, not a single state
//! - **Fork/join**: fork activities split a token, join activities wait for their branches
//! - **Pass-through chaining**: activities can ask to complete as soon as they are reached
//! - **Fail-fast graph checks**: illegal fan-out and unreachable successors raise errors
//! - **Activity data**: per-group data objects created on first access
//! - **JSON documents**: definitions and instance state serialize independently
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    WorkflowDefinition                        │
//! │  (activities, transitions, start activity; shared via Arc)  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │ create_instance
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     WorkflowInstance                         │
//! │  (pending tokens, activity data, change notifications)      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │ to_state / from_state
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      InstanceStore                           │
//! │  (persisted instance state, definition re-attached on load) │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use workflow_engine::prelude::*;
//!
//! let registry = ActivityRegistry::with_builtins();
//! let definition = Arc::new(WorkflowDefinition::from_json(DOCUMENT, &registry)?);
//!
//! let mut instance = definition.create_instance();
//! let cancel = CancellationToken::new();
//!
//! instance.complete("submit", None, &cancel).await?;
//! instance
//!     .complete("review", Some(json!({ "value": true })), &cancel)
//!     .await?;
//!
//! assert!(instance.is_finished());
//! ```

pub mod activity;
pub mod data;
pub mod engine;
pub mod persistence;
pub mod workflow;

/// Prelude for common imports
pub mod prelude {
    pub use crate::activity::{
        Activity, ActivityArgs, ActivityError, ActivityKind, ActivityType, AutomaticActivity,
        ConditionActivity, EmptyActivity, ForkActivity, JoinActivity, WorkflowActivityResult,
    };
    pub use crate::data::{ActivityData, JoinArrivals, WorkflowDataProvider};
    pub use crate::engine::{
        ActivityRegistry, InstanceConfig, InstanceEvent, WorkflowInstance, WorkflowInstanceState,
    };
    pub use crate::persistence::{InMemoryInstanceStore, InstanceStore, StoreError};
    pub use crate::workflow::{WorkflowDefinition, WorkflowError, WorkflowTransition};
    pub use tokio_util::sync::CancellationToken;
}

// Re-export key types at crate root
pub use activity::{Activity, ActivityArgs, ActivityError, ActivityKind, WorkflowActivityResult};
pub use data::{ActivityData, WorkflowDataProvider};
pub use engine::{ActivityRegistry, InstanceConfig, InstanceEvent, WorkflowInstance};
pub use persistence::{InMemoryInstanceStore, InstanceStore, StoreError};
pub use workflow::{WorkflowDefinition, WorkflowError, WorkflowTransition};
