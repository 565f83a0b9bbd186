//! Workflow execution
//!
//! - [`WorkflowInstance`]: the state machine advancing tokens through a definition
//! - [`ActivityRegistry`]: factories for loading activities from documents
//! - [`InstanceEvent`]: notifications broadcast by instances

mod config;
mod event;
mod instance;
mod registry;
mod state;

pub use config::InstanceConfig;
pub use event::InstanceEvent;
pub use instance::WorkflowInstance;
pub use registry::{ActivityFactory, ActivityRegistry, RegistryError};
pub use state::WorkflowInstanceState;
