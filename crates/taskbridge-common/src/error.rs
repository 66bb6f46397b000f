//! Error types for taskbridge

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for taskbridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Unified error type for all taskbridge operations
#[derive(Error, Debug, Clone)]
pub enum BridgeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("MongoDB error: {0}")]
    MongoDB(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// The task argument does not have the shape the task expects
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// No task is registered under the requested name
    #[error("Unknown task: {0}")]
    UnknownTask(String),

    /// HTTP transport failure between a task runner and the bridge server
    #[error("Transport error: {0}")]
    Transport(String),
}

impl BridgeError {
    /// Returns true if the database was never contacted for this error
    pub fn is_rejected_request(&self) -> bool {
        matches!(
            self,
            BridgeError::Validation(_)
                | BridgeError::InvalidRequest(_)
                | BridgeError::UnknownTask(_)
                | BridgeError::Serialization(_)
        )
    }

    /// Render this error as the `{ "error": message }` value handed back to callers
    pub fn to_descriptor(&self) -> ErrorDescriptor {
        ErrorDescriptor::new(self.to_string())
    }
}

/// Structured error value returned across the task boundary instead of a fault
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDescriptor {
    pub error: String,
}

impl ErrorDescriptor {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }

    /// Convert into a JSON value
    pub fn into_value(self) -> serde_json::Value {
        serde_json::json!({ "error": self.error })
    }

    /// Extract a descriptor from a task result, if the result is one
    ///
    /// Only an object whose `error` field is a string counts; a found document
    /// that happens to contain an `error` field is inside an array and never matches.
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        value
            .as_object()
            .and_then(|map| map.get("error"))
            .and_then(|e| e.as_str())
            .map(ErrorDescriptor::new)
    }
}

impl From<BridgeError> for ErrorDescriptor {
    fn from(err: BridgeError) -> Self {
        err.to_descriptor()
    }
}

impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        BridgeError::Serialization(err.to_string())
    }
}

impl From<dotenvy::Error> for BridgeError {
    fn from(err: dotenvy::Error) -> Self {
        BridgeError::Config(err.to_string())
    }
}

// MongoDB-specific error conversions (when mongodb-errors feature is enabled)
#[cfg(feature = "mongodb-errors")]
impl From<mongodb::error::Error> for BridgeError {
    fn from(err: mongodb::error::Error) -> Self {
        BridgeError::MongoDB(err.to_string())
    }
}

#[cfg(feature = "mongodb-errors")]
impl From<bson::ser::Error> for BridgeError {
    fn from(err: bson::ser::Error) -> Self {
        BridgeError::Serialization(format!("BSON serialization error: {}", err))
    }
}

#[cfg(feature = "mongodb-errors")]
impl From<bson::de::Error> for BridgeError {
    fn from(err: bson::de::Error) -> Self {
        BridgeError::Serialization(format!("BSON deserialization error: {}", err))
    }
}

#[cfg(feature = "mongodb-errors")]
impl From<bson::extjson::de::Error> for BridgeError {
    fn from(err: bson::extjson::de::Error) -> Self {
        BridgeError::Serialization(format!("Extended JSON error: {}", err))
    }
}
