//! Per-group activity data

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::workflow::WorkflowError;

/// Type name reserved for the engine's own instance state
pub const RESERVED_DATA_TYPE: &str = "workflow_instance";

/// Data object shared by the activities of one group
///
/// `TYPE` identifies the data in persisted instance state.
///
/// # Example
///
/// ```ignore
/// #[derive(Debug, Default, Serialize, Deserialize)]
/// struct InvoiceData {
///     amount: u64,
///     approved_by: Option<String>,
/// }
///
/// impl ActivityData for InvoiceData {
///     const TYPE: &'static str = "invoice";
/// }
///
/// let data = instance.data().resolve::<InvoiceData>("invoice")?;
/// data.write().amount = 120;
/// ```
pub trait ActivityData: Serialize + DeserializeOwned + Default + Send + Sync + 'static {
    /// Unique type identifier for this data
    const TYPE: &'static str;
}

/// Persisted form of one data object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataEntry {
    /// Data type identifier
    #[serde(rename = "type")]
    pub data_type: String,

    /// Group the data belongs to
    pub group: String,

    /// Serialized data
    pub value: serde_json::Value,
}

trait StoredData: Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn to_value(&self) -> Result<serde_json::Value, serde_json::Error>;
}

impl<T: ActivityData> StoredData for Arc<RwLock<T>> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn to_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(&*self.read())
    }
}

enum Slot {
    /// Loaded from persisted state, not yet requested by type
    Raw(serde_json::Value),

    /// Materialized data object
    Live(Box<dyn StoredData>),
}

struct Entry {
    data_type: String,
    group: String,
    slot: Slot,
}

/// Create-on-first-access store of activity data keyed by type and group
///
/// At most one data object exists per `(type, group)` pair. Activities in the
/// same group share it deliberately. Lifetime is the lifetime of the owning
/// instance; nothing is evicted.
#[derive(Default)]
pub struct WorkflowDataProvider {
    entries: Mutex<Vec<Entry>>,
}

impl WorkflowDataProvider {
    /// Create an empty provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a provider from persisted entries
    ///
    /// Entries are materialized lazily on their first [`resolve`](Self::resolve).
    pub fn from_entries(entries: Vec<DataEntry>) -> Self {
        let entries = entries
            .into_iter()
            .map(|e| Entry {
                data_type: e.data_type,
                group: e.group,
                slot: Slot::Raw(e.value),
            })
            .collect();

        Self {
            entries: Mutex::new(entries),
        }
    }

    /// Get the data object of type `T` for `group`, creating it on first access
    ///
    /// # Errors
    ///
    /// - [`WorkflowError::ReservedDataType`] if `T::TYPE` is reserved
    /// - [`WorkflowError::DataTypeMismatch`] if the stored object was created
    ///   with a different Rust type under the same type name
    /// - [`WorkflowError::Serialization`] if persisted data does not fit `T`
    pub fn resolve<T: ActivityData>(&self, group: &str) -> Result<Arc<RwLock<T>>, WorkflowError> {
        if T::TYPE == RESERVED_DATA_TYPE {
            return Err(WorkflowError::ReservedDataType(T::TYPE.to_string()));
        }

        let mut entries = self.entries.lock();

        if let Some(entry) = entries
            .iter_mut()
            .find(|e| e.data_type == T::TYPE && e.group == group)
        {
            let data = match &entry.slot {
                Slot::Live(stored) => stored
                    .as_any()
                    .downcast_ref::<Arc<RwLock<T>>>()
                    .cloned()
                    .ok_or_else(|| WorkflowError::DataTypeMismatch {
                        data_type: T::TYPE.to_string(),
                        group: group.to_string(),
                    })?,
                Slot::Raw(value) => {
                    let data: T = serde_json::from_value(value.clone())?;
                    let data = Arc::new(RwLock::new(data));
                    entry.slot = Slot::Live(Box::new(Arc::clone(&data)));
                    data
                }
            };

            return Ok(data);
        }

        debug!(data_type = T::TYPE, group, "creating activity data");
        let data = Arc::new(RwLock::new(T::default()));
        entries.push(Entry {
            data_type: T::TYPE.to_string(),
            group: group.to_string(),
            slot: Slot::Live(Box::new(Arc::clone(&data))),
        });

        Ok(data)
    }

    /// Whether data of `data_type` exists for `group`
    pub fn contains(&self, data_type: &str, group: &str) -> bool {
        self.entries
            .lock()
            .iter()
            .any(|e| e.data_type == data_type && e.group == group)
    }

    /// Number of stored data objects
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether no data is stored
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Snapshot of all data objects in their persisted form
    pub fn entries(&self) -> Result<Vec<DataEntry>, WorkflowError> {
        self.entries
            .lock()
            .iter()
            .map(|e| {
                let value = match &e.slot {
                    Slot::Raw(value) => value.clone(),
                    Slot::Live(stored) => stored.to_value()?,
                };
                Ok(DataEntry {
                    data_type: e.data_type.clone(),
                    group: e.group.clone(),
                    value,
                })
            })
            .collect()
    }
}

impl fmt::Debug for WorkflowDataProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.entries.lock();
        f.debug_struct("WorkflowDataProvider")
            .field(
                "entries",
                &entries
                    .iter()
                    .map(|e| format!("{}/{}", e.data_type, e.group))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Invoice {
        amount: u64,
    }

    impl ActivityData for Invoice {
        const TYPE: &'static str = "invoice";
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    struct Reviewer {
        name: String,
    }

    impl ActivityData for Reviewer {
        const TYPE: &'static str = "reviewer";
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    struct Sneaky;

    impl ActivityData for Sneaky {
        const TYPE: &'static str = RESERVED_DATA_TYPE;
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    struct Impostor {
        amount: u64,
    }

    impl ActivityData for Impostor {
        const TYPE: &'static str = "invoice";
    }

    #[test]
    fn test_resolve_creates_default_once() {
        let provider = WorkflowDataProvider::new();
        assert!(provider.is_empty());

        let first = provider.resolve::<Invoice>("billing").unwrap();
        first.write().amount = 42;

        let second = provider.resolve::<Invoice>("billing").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.read().amount, 42);
        assert_eq!(provider.len(), 1);
    }

    #[test]
    fn test_resolve_distinct_per_group_and_type() {
        let provider = WorkflowDataProvider::new();

        let billing = provider.resolve::<Invoice>("billing").unwrap();
        let refunds = provider.resolve::<Invoice>("refunds").unwrap();
        provider.resolve::<Reviewer>("billing").unwrap();

        assert!(!Arc::ptr_eq(&billing, &refunds));
        assert_eq!(provider.len(), 3);
        assert!(provider.contains("reviewer", "billing"));
        assert!(!provider.contains("reviewer", "refunds"));
    }

    #[test]
    fn test_reserved_type_rejected() {
        let provider = WorkflowDataProvider::new();

        let result = provider.resolve::<Sneaky>("any");
        assert!(matches!(result, Err(WorkflowError::ReservedDataType(_))));
        assert!(provider.is_empty());
    }

    #[test]
    fn test_type_mismatch() {
        let provider = WorkflowDataProvider::new();
        provider.resolve::<Invoice>("billing").unwrap();

        let result = provider.resolve::<Impostor>("billing");
        assert!(matches!(result, Err(WorkflowError::DataTypeMismatch { .. })));
    }

    #[test]
    fn test_entries_round_trip() {
        let provider = WorkflowDataProvider::new();
        provider.resolve::<Invoice>("billing").unwrap().write().amount = 7;

        let entries = provider.entries().unwrap();
        assert_eq!(
            entries,
            vec![DataEntry {
                data_type: "invoice".to_string(),
                group: "billing".to_string(),
                value: serde_json::json!({ "amount": 7 }),
            }]
        );

        let restored = WorkflowDataProvider::from_entries(entries.clone());
        // Raw entries are serialized unchanged before first access
        assert_eq!(restored.entries().unwrap(), entries);

        let invoice = restored.resolve::<Invoice>("billing").unwrap();
        assert_eq!(*invoice.read(), Invoice { amount: 7 });
        assert_eq!(restored.len(), 1);
    }

    #[test]
    fn test_invalid_persisted_data() {
        let provider = WorkflowDataProvider::from_entries(vec![DataEntry {
            data_type: "invoice".to_string(),
            group: "billing".to_string(),
            value: serde_json::json!({ "amount": "lots" }),
        }]);

        let result = provider.resolve::<Invoice>("billing");
        assert!(matches!(result, Err(WorkflowError::Serialization(_))));
    }
}
