//! Persistence layer for workflow instance state

mod memory;
mod store;

pub use memory::InMemoryInstanceStore;
pub use store::{InstanceStore, StoreError, StoredInstance};
