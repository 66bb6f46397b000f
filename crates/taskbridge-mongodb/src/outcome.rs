//! Task results as seen by callers

use serde::Serialize;
use serde_json::Value as JsonValue;
use taskbridge_common::{BridgeError, ErrorDescriptor};

/// Result of one bridge task: the driver's answer or an error descriptor
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TaskOutcome {
    Success(JsonValue),
    Failure(ErrorDescriptor),
}

impl TaskOutcome {
    /// Classify a raw task value
    pub fn from_value(value: JsonValue) -> Self {
        match ErrorDescriptor::from_value(&value) {
            Some(descriptor) => TaskOutcome::Failure(descriptor),
            None => TaskOutcome::Success(value),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TaskOutcome::Success(_))
    }

    /// The error message, if this is a failure
    pub fn error(&self) -> Option<&str> {
        match self {
            TaskOutcome::Success(_) => None,
            TaskOutcome::Failure(descriptor) => Some(&descriptor.error),
        }
    }

    /// The JSON value handed back across the task boundary
    pub fn into_value(self) -> JsonValue {
        match self {
            TaskOutcome::Success(value) => value,
            TaskOutcome::Failure(descriptor) => descriptor.into_value(),
        }
    }
}

impl From<taskbridge_common::Result<JsonValue>> for TaskOutcome {
    fn from(result: taskbridge_common::Result<JsonValue>) -> Self {
        match result {
            Ok(value) => TaskOutcome::Success(value),
            Err(err) => TaskOutcome::Failure(err.to_descriptor()),
        }
    }
}

impl From<BridgeError> for TaskOutcome {
    fn from(err: BridgeError) -> Self {
        TaskOutcome::Failure(err.to_descriptor())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_result() {
        let ok: TaskOutcome = Ok(json!({ "acknowledged": true })).into();
        assert!(ok.is_success());
        assert_eq!(ok.error(), None);

        let err: TaskOutcome = Err(BridgeError::Connection("refused".to_string())).into();
        assert!(!err.is_success());
        assert_eq!(err.error(), Some("Connection error: refused"));
    }

    #[test]
    fn test_into_value() {
        let failure = TaskOutcome::Failure(ErrorDescriptor::new("boom"));
        assert_eq!(failure.into_value(), json!({ "error": "boom" }));

        let docs = TaskOutcome::Success(json!([{ "name": "Phone" }]));
        assert_eq!(docs.into_value(), json!([{ "name": "Phone" }]));
    }

    #[test]
    fn test_serializes_untagged() {
        let failure = TaskOutcome::Failure(ErrorDescriptor::new("boom"));
        assert_eq!(serde_json::to_value(&failure).unwrap(), json!({ "error": "boom" }));

        let success = TaskOutcome::Success(json!({ "deletedCount": 2 }));
        assert_eq!(serde_json::to_value(&success).unwrap(), json!({ "deletedCount": 2 }));
    }

    #[test]
    fn test_from_value_classifies() {
        assert!(TaskOutcome::from_value(json!([])).is_success());
        assert_eq!(
            TaskOutcome::from_value(json!({ "error": "x" })).error(),
            Some("x")
        );
    }
}
