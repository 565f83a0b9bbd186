//! Workflow graph types
//!
//! This module contains the static side of a workflow:
//! - [`WorkflowDefinition`]: activities, transitions and the start activity
//! - [`WorkflowTransition`]: directed, optionally conditioned edges
//! - [`WorkflowDocument`]: the declarative JSON form of a definition
//! - [`WorkflowError`]: errors raised by definitions, instances and activities

mod definition;
mod document;
mod error;
mod transition;

pub use definition::WorkflowDefinition;
pub use document::{ActivityNode, WorkflowDocument};
pub use error::WorkflowError;
pub use transition::WorkflowTransition;
