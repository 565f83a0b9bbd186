//! Activity completion arguments

use serde::de::DeserializeOwned;

/// Arguments passed to [`Activity::complete`](super::Activity::complete)
///
/// Wraps the caller's raw input together with information about how the
/// completion was triggered. Chained completions (activities whose `prepare`
/// asked to run immediately) receive no input.
///
/// # Example
///
/// ```ignore
/// async fn complete(&self, ..., args: &ActivityArgs, ...) -> Result<WorkflowActivityResult, WorkflowError> {
///     let amount: Option<u64> = args.get_field("amount")?;
///     // ...
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityArgs {
    /// Activity ID being completed
    pub activity_id: String,

    /// Raw input supplied by the caller
    input: Option<serde_json::Value>,

    /// Number of chained completions above this one (0 for external calls)
    chain_depth: usize,
}

impl ActivityArgs {
    /// Create arguments for an external completion call
    pub fn new(activity_id: impl Into<String>, input: Option<serde_json::Value>) -> Self {
        Self {
            activity_id: activity_id.into(),
            input,
            chain_depth: 0,
        }
    }

    /// Create arguments without input
    pub fn empty(activity_id: impl Into<String>) -> Self {
        Self::new(activity_id, None)
    }

    /// Set the chain depth
    pub fn with_chain_depth(mut self, chain_depth: usize) -> Self {
        self.chain_depth = chain_depth;
        self
    }

    /// Raw input, if any
    pub fn input(&self) -> Option<&serde_json::Value> {
        self.input.as_ref()
    }

    /// Whether the caller supplied no input
    pub fn is_empty(&self) -> bool {
        self.input.as_ref().map_or(true, |v| v.is_null())
    }

    /// Deserialize the whole input into `T`
    pub fn get<T: DeserializeOwned>(&self) -> Result<Option<T>, serde_json::Error> {
        match &self.input {
            Some(value) if !value.is_null() => serde_json::from_value(value.clone()).map(Some),
            _ => Ok(None),
        }
    }

    /// Deserialize a single field of an object input into `T`
    pub fn get_field<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, serde_json::Error> {
        match self.input.as_ref().and_then(|v| v.get(name)) {
            Some(value) if !value.is_null() => serde_json::from_value(value.clone()).map(Some),
            _ => Ok(None),
        }
    }

    /// Number of chained completions above this one
    pub fn chain_depth(&self) -> usize {
        self.chain_depth
    }

    /// Whether this completion was triggered by the engine rather than a caller
    pub fn is_chained(&self) -> bool {
        self.chain_depth > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Approval {
        approved: bool,
        comment: Option<String>,
    }

    #[test]
    fn test_empty_args() {
        let args = ActivityArgs::empty("review");

        assert_eq!(args.activity_id, "review");
        assert!(args.is_empty());
        assert!(!args.is_chained());
        assert_eq!(args.get::<Approval>().unwrap(), None);
        assert_eq!(args.get_field::<bool>("approved").unwrap(), None);
    }

    #[test]
    fn test_get_typed_input() {
        let args = ActivityArgs::new(
            "review",
            Some(serde_json::json!({ "approved": true, "comment": "ok" })),
        );

        let approval = args.get::<Approval>().unwrap().unwrap();
        assert!(approval.approved);
        assert_eq!(approval.comment.as_deref(), Some("ok"));
    }

    #[test]
    fn test_get_field() {
        let args = ActivityArgs::new("review", Some(serde_json::json!({ "approved": false })));

        assert_eq!(args.get_field::<bool>("approved").unwrap(), Some(false));
        assert_eq!(args.get_field::<String>("missing").unwrap(), None);
        assert!(args.get_field::<String>("approved").is_err());
    }

    #[test]
    fn test_chain_depth() {
        let args = ActivityArgs::empty("auto").with_chain_depth(2);

        assert_eq!(args.chain_depth(), 2);
        assert!(args.is_chained());
    }
}
