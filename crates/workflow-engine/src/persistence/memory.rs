//! In-memory implementation of InstanceStore

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::store::*;
use crate::engine::WorkflowInstanceState;

/// In-memory implementation of InstanceStore
///
/// Keeps all instances in a map; suited for tests and single-process use.
///
/// # Example
///
/// ```
/// use workflow_engine::InMemoryInstanceStore;
///
/// let store = InMemoryInstanceStore::new();
/// assert_eq!(store.instance_count(), 0);
/// ```
pub struct InMemoryInstanceStore {
    instances: RwLock<HashMap<Uuid, StoredInstance>>,
}

impl InMemoryInstanceStore {
    /// Create a new in-memory store
    pub fn new() -> Self {
        Self {
            instances: RwLock::new(HashMap::new()),
        }
    }

    /// Get the number of stored instances
    pub fn instance_count(&self) -> usize {
        self.instances.read().len()
    }

    /// Clear all data (for testing)
    pub fn clear(&self) {
        self.instances.write().clear();
    }
}

impl Default for InMemoryInstanceStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InstanceStore for InMemoryInstanceStore {
    async fn save(
        &self,
        instance_id: Uuid,
        definition_name: &str,
        state: WorkflowInstanceState,
    ) -> Result<(), StoreError> {
        let now = Utc::now();
        let mut instances = self.instances.write();

        let created_at = instances
            .get(&instance_id)
            .map(|existing| existing.created_at)
            .unwrap_or(now);

        debug!(%instance_id, definition_name, tokens = state.current_activity_ids.len(), "saving instance");

        instances.insert(
            instance_id,
            StoredInstance {
                instance_id,
                definition_name: definition_name.to_string(),
                state,
                created_at,
                updated_at: now,
            },
        );
        Ok(())
    }

    async fn load(&self, instance_id: Uuid) -> Result<StoredInstance, StoreError> {
        self.instances
            .read()
            .get(&instance_id)
            .cloned()
            .ok_or(StoreError::InstanceNotFound(instance_id))
    }

    async fn delete(&self, instance_id: Uuid) -> Result<(), StoreError> {
        self.instances
            .write()
            .remove(&instance_id)
            .map(|_| ())
            .ok_or(StoreError::InstanceNotFound(instance_id))
    }

    async fn list(&self, definition_name: Option<&str>) -> Result<Vec<StoredInstance>, StoreError> {
        let mut instances: Vec<_> = self
            .instances
            .read()
            .values()
            .filter(|i| definition_name.map_or(true, |name| i.definition_name == name))
            .cloned()
            .collect();
        instances.sort_by_key(|i| i.instance_id);
        Ok(instances)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(ids: &[&str]) -> WorkflowInstanceState {
        WorkflowInstanceState {
            current_activity_ids: ids.iter().map(|s| s.to_string()).collect(),
            data: vec![],
        }
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let store = InMemoryInstanceStore::new();
        let instance_id = Uuid::now_v7();

        store
            .save(instance_id, "approval", state(&["review"]))
            .await
            .unwrap();

        let stored = store.load(instance_id).await.unwrap();
        assert_eq!(stored.instance_id, instance_id);
        assert_eq!(stored.definition_name, "approval");
        assert_eq!(stored.state, state(&["review"]));
        assert_eq!(store.instance_count(), 1);
    }

    #[tokio::test]
    async fn test_save_keeps_created_at() {
        let store = InMemoryInstanceStore::new();
        let instance_id = Uuid::now_v7();

        store.save(instance_id, "approval", state(&["a"])).await.unwrap();
        let first = store.load(instance_id).await.unwrap();

        store.save(instance_id, "approval", state(&["b"])).await.unwrap();
        let second = store.load(instance_id).await.unwrap();

        assert_eq!(second.created_at, first.created_at);
        assert!(second.updated_at >= first.updated_at);
        assert_eq!(second.state, state(&["b"]));
        assert_eq!(store.instance_count(), 1);
    }

    #[tokio::test]
    async fn test_load_missing() {
        let store = InMemoryInstanceStore::new();
        let result = store.load(Uuid::now_v7()).await;

        assert!(matches!(result, Err(StoreError::InstanceNotFound(_))));
    }

    #[tokio::test]
    async fn test_delete() {
        let store = InMemoryInstanceStore::new();
        let instance_id = Uuid::now_v7();
        store.save(instance_id, "approval", state(&[])).await.unwrap();

        store.delete(instance_id).await.unwrap();
        assert_eq!(store.instance_count(), 0);
        assert!(matches!(
            store.delete(instance_id).await,
            Err(StoreError::InstanceNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_filters_by_definition() {
        let store = InMemoryInstanceStore::new();
        store.save(Uuid::now_v7(), "approval", state(&[])).await.unwrap();
        store.save(Uuid::now_v7(), "approval", state(&[])).await.unwrap();
        store.save(Uuid::now_v7(), "onboarding", state(&[])).await.unwrap();

        assert_eq!(store.list(None).await.unwrap().len(), 3);
        assert_eq!(store.list(Some("approval")).await.unwrap().len(), 2);
        assert!(store.list(Some("missing")).await.unwrap().is_empty());

        store.clear();
        assert_eq!(store.instance_count(), 0);
    }
}
