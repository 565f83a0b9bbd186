//! InstanceStore trait definition

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::WorkflowInstanceState;

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Instance not found
    #[error("instance not found: {0}")]
    InstanceNotFound(Uuid),
}

/// Instance state as kept by a store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredInstance {
    /// Instance ID
    pub instance_id: Uuid,

    /// Name of the definition the instance runs on
    ///
    /// The definition itself is not stored with the instance; callers use the
    /// name to re-attach it on load.
    pub definition_name: String,

    /// Persisted state
    pub state: WorkflowInstanceState,

    /// When the instance was first saved
    pub created_at: DateTime<Utc>,

    /// When the instance was last saved
    pub updated_at: DateTime<Utc>,
}

/// Storage for workflow instance state
///
/// # Example
///
/// ```ignore
/// let instance_id = Uuid::now_v7();
/// store.save(instance_id, "invoice_approval", instance.to_state()?).await?;
///
/// let stored = store.load(instance_id).await?;
/// let instance = WorkflowInstance::from_state(definition, stored.state)?;
/// ```
#[async_trait]
pub trait InstanceStore: Send + Sync + 'static {
    /// Insert or replace the state of an instance
    async fn save(
        &self,
        instance_id: Uuid,
        definition_name: &str,
        state: WorkflowInstanceState,
    ) -> Result<(), StoreError>;

    /// Load the state of an instance
    async fn load(&self, instance_id: Uuid) -> Result<StoredInstance, StoreError>;

    /// Delete an instance
    async fn delete(&self, instance_id: Uuid) -> Result<(), StoreError>;

    /// List stored instances, optionally restricted to one definition
    async fn list(&self, definition_name: Option<&str>) -> Result<Vec<StoredInstance>, StoreError>;
}
