//! Instance configuration

/// Default bound on chained pass-through completions
const DEFAULT_MAX_CHAIN_DEPTH: usize = 256;

/// Default capacity of the instance event channel
const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Configuration for workflow instances
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceConfig {
    /// Maximum number of chained immediate completions in one call
    ///
    /// Guards against cycles of activities whose `prepare` always asks to run
    /// immediately.
    pub max_chain_depth: usize,

    /// Capacity of the broadcast channel behind [`subscribe`](super::WorkflowInstance::subscribe)
    pub event_capacity: usize,
}

impl Default for InstanceConfig {
    fn default() -> Self {
        Self {
            max_chain_depth: DEFAULT_MAX_CHAIN_DEPTH,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl InstanceConfig {
    /// Create configuration from environment variables
    ///
    /// Reads `WORKFLOW_MAX_CHAIN_DEPTH` and `WORKFLOW_EVENT_CAPACITY`; missing
    /// or unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_chain_depth: env_usize("WORKFLOW_MAX_CHAIN_DEPTH")
                .unwrap_or(defaults.max_chain_depth),
            event_capacity: env_usize("WORKFLOW_EVENT_CAPACITY")
                .unwrap_or(defaults.event_capacity),
        }
    }

    /// Set the maximum chain depth
    pub fn with_max_chain_depth(mut self, max_chain_depth: usize) -> Self {
        self.max_chain_depth = max_chain_depth;
        self
    }

    /// Set the event channel capacity (at least 1)
    pub fn with_event_capacity(mut self, event_capacity: usize) -> Self {
        self.event_capacity = event_capacity.max(1);
        self
    }
}

fn env_usize(name: &str) -> Option<usize> {
    std::env::var(name).ok()?.trim().parse().ok()
}
