//! Activity data storage
//!
//! Data objects are keyed by their [`ActivityData::TYPE`] and a group name,
//! created on first access and persisted with the instance state.

mod arrivals;
mod provider;

pub use arrivals::JoinArrivals;
pub use provider::{ActivityData, DataEntry, WorkflowDataProvider, RESERVED_DATA_TYPE};
