//! Branch arrivals recorded for join activities

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::ActivityData;

/// Sources whose tokens reached a join since it last fired
///
/// Stored as activity data grouped by the join's ID, so pending arrivals are
/// persisted with the instance state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinArrivals {
    sources: BTreeSet<String>,
}

impl ActivityData for JoinArrivals {
    const TYPE: &'static str = "join_arrivals";
}

impl JoinArrivals {
    /// Record a token handed over by `source`
    pub fn record(&mut self, source: &str) {
        self.sources.insert(source.to_string());
    }

    /// Whether `source` has arrived
    pub fn contains(&self, source: &str) -> bool {
        self.sources.contains(source)
    }

    /// Sources recorded so far
    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.sources.iter().map(String::as_str)
    }

    /// Forget all arrivals
    pub fn clear(&mut self) {
        self.sources.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_clear() {
        let mut arrivals = JoinArrivals::default();
        arrivals.record("left");
        arrivals.record("left");
        arrivals.record("right");

        assert!(arrivals.contains("left"));
        assert_eq!(arrivals.sources().collect::<Vec<_>>(), vec!["left", "right"]);

        arrivals.clear();
        assert!(!arrivals.contains("left"));
    }

    #[test]
    fn test_serialized_form() {
        let mut arrivals = JoinArrivals::default();
        arrivals.record("b");
        arrivals.record("a");

        assert_eq!(
            serde_json::to_value(&arrivals).unwrap(),
            serde_json::json!({ "sources": ["a", "b"] })
        );
    }
}
