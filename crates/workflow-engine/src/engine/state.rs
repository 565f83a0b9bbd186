//! Persisted instance state

use serde::{Deserialize, Serialize};

use crate::data::DataEntry;

/// Serializable state of a [`WorkflowInstance`](super::WorkflowInstance)
///
/// The definition is not part of the state; it is re-attached on load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowInstanceState {
    /// Pending activity tokens
    pub current_activity_ids: Vec<String>,

    /// Activity data objects
    #[serde(default)]
    pub data: Vec<DataEntry>,
}
