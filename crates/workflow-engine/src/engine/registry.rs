//! Activity registry for polymorphic deserialization
//!
//! The registry maps activity type names to factories that build activities
//! from their serialized properties, so definition documents can be loaded
//! without knowing the concrete activity types at compile time.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::activity::{
    Activity, ActivityType, AutomaticActivity, ConditionActivity, EmptyActivity, ForkActivity,
    JoinActivity,
};

/// Factory function type for creating activities from JSON properties
pub type ActivityFactory =
    Box<dyn Fn(Value) -> Result<Arc<dyn Activity>, serde_json::Error> + Send + Sync>;

/// Registry of activity factories
pub struct ActivityRegistry {
    factories: HashMap<String, ActivityFactory>,
}

impl Default for ActivityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ActivityRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Create a registry with all built-in activity types registered
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register::<EmptyActivity>();
        registry.register::<AutomaticActivity>();
        registry.register::<ForkActivity>();
        registry.register::<JoinActivity>();
        registry.register::<ConditionActivity>();
        registry
    }

    /// Register an activity type
    ///
    /// # Example
    ///
    /// ```ignore
    /// let mut registry = ActivityRegistry::with_builtins();
    /// registry.register::<ApproveInvoice>();
    /// ```
    pub fn register<A: ActivityType>(&mut self) {
        let factory: ActivityFactory = Box::new(|properties: Value| {
            let activity: A = serde_json::from_value(properties)?;
            Ok(Arc::new(activity) as Arc<dyn Activity>)
        });

        self.factories.insert(A::TYPE.to_string(), factory);
    }

    /// Check if an activity type is registered
    pub fn contains(&self, activity_type: &str) -> bool {
        self.factories.contains_key(activity_type)
    }

    /// Create an activity from type name and JSON properties
    pub fn create(
        &self,
        activity_type: &str,
        properties: Value,
    ) -> Result<Arc<dyn Activity>, RegistryError> {
        let factory = self
            .factories
            .get(activity_type)
            .ok_or_else(|| RegistryError::UnknownActivityType(activity_type.to_string()))?;

        factory(properties).map_err(|source| RegistryError::Deserialization {
            activity_type: activity_type.to_string(),
            source,
        })
    }

    /// Get the number of registered activity types
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Check if registry is empty
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Get all registered activity type names
    pub fn activity_types(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(|s| s.as_str())
    }
}

impl fmt::Debug for ActivityRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActivityRegistry")
            .field("activity_types", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Errors from registry operations
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Activity type not registered
    #[error("unknown activity type: {0}")]
    UnknownActivityType(String),

    /// Failed to deserialize activity properties
    #[error("failed to deserialize activity of type {activity_type}: {source}")]
    Deserialization {
        activity_type: String,
        #[source]
        source: serde_json::Error,
    },
}
