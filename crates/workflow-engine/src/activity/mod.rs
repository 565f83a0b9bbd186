//! Activity abstractions
//!
//! Activities are the nodes of a workflow graph. They:
//! - Are prepared when a token reaches them, and may ask to run immediately
//! - Complete with a [`WorkflowActivityResult`] that selects successor activities
//! - Observe cancellation through the token threaded through a completion chain

mod builtin;
mod context;
mod definition;
mod result;

pub use builtin::{
    AutomaticActivity, ConditionActivity, EmptyActivity, ForkActivity, JoinActivity,
};
pub use context::ActivityArgs;
pub use definition::{Activity, ActivityError, ActivityKind, ActivityType};
pub use result::WorkflowActivityResult;
