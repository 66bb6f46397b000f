//! Input validation for bridge tasks
//!
//! Requests are checked before any connection is opened, so a malformed task
//! argument never costs a round trip to the server.
//!
//! # Checks
//! - Collection names (non-empty, bounded, no system collections)
//! - Update documents (operator documents or pipelines only)

use bson::{Bson, Document as BsonDocument};
use taskbridge_common::{BridgeError, Result};

/// MongoDB's namespace limit (`<database>.<collection>`) in bytes. The
/// database part is only known at connect time, so the server has the last
/// word on the combined length.
const MAX_NAMESPACE_BYTES: usize = 255;

/// Update operators the bridge recognises; others are forwarded with a warning
const UPDATE_OPERATORS: &[&str] = &[
    "$set", "$unset", "$inc", "$mul", "$rename", "$setOnInsert",
    "$min", "$max", "$currentDate", "$addToSet", "$pop", "$pull",
    "$push", "$pullAll", "$bit",
];

/// A collection name that passed [`ValidatedCollectionName::new`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCollectionName {
    name: String,
}

impl ValidatedCollectionName {
    /// Check `name` before it is used to open a collection.
    ///
    /// Rejected: empty names, names longer than the namespace limit, NUL
    /// bytes, `$`, and the reserved `system.` prefix.
    pub fn new(name: &str) -> Result<Self> {
        let problem = if name.is_empty() {
            Some("cannot be empty".to_string())
        } else if name.len() > MAX_NAMESPACE_BYTES {
            Some(format!(
                "is {} bytes, longer than the {}-byte namespace limit",
                name.len(),
                MAX_NAMESPACE_BYTES
            ))
        } else if name.contains('\0') {
            Some("cannot contain null bytes".to_string())
        } else if name.contains('$') {
            Some("cannot contain '$'".to_string())
        } else if name.starts_with("system.") {
            Some("cannot start with reserved prefix 'system.'".to_string())
        } else {
            None
        };

        if let Some(problem) = problem {
            return Err(BridgeError::Validation(format!(
                "Collection name {}: {:?}",
                problem, name
            )));
        }

        if name.contains("..") || name.contains("//") {
            tracing::warn!(collection = name, "Collection name contains an unusual pattern");
        }

        Ok(Self {
            name: name.to_owned(),
        })
    }

    /// Returns the validated collection name as a string slice
    pub fn as_str(&self) -> &str {
        &self.name
    }
}

impl AsRef<str> for ValidatedCollectionName {
    fn as_ref(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for ValidatedCollectionName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Checks if the name is an update operator the bridge knows about
pub fn is_known_update_operator(name: &str) -> bool {
    UPDATE_OPERATORS.contains(&name)
}

/// Validates an update-many modification document.
///
/// Every top-level key must be an operator. Replacement-style documents are
/// rejected the same way the server-side driver contract rejects them.
pub fn validate_update_document(update: &BsonDocument) -> Result<()> {
    if update.is_empty() || update.keys().any(|key| !key.starts_with('$')) {
        return Err(BridgeError::Validation(
            "Update document requires atomic operators".to_string(),
        ));
    }

    for key in update.keys() {
        if !is_known_update_operator(key) {
            tracing::warn!("Unknown update operator: '{}'", key);
        }
    }

    Ok(())
}

/// Validates an aggregation-pipeline update
pub fn validate_update_pipeline(stages: &[Bson]) -> Result<Vec<BsonDocument>> {
    if stages.is_empty() {
        return Err(BridgeError::Validation(
            "Update pipeline cannot be empty".to_string(),
        ));
    }

    stages
        .iter()
        .enumerate()
        .map(|(index, stage)| match stage {
            Bson::Document(doc) => Ok(doc.clone()),
            other => Err(BridgeError::Validation(format!(
                "Update pipeline stage {} must be a document, got {:?}",
                index,
                other.element_type()
            ))),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn test_valid_collection_names() {
        assert!(ValidatedCollectionName::new("test_users").is_ok());
        assert!(ValidatedCollectionName::new("test_products").is_ok());
        assert!(ValidatedCollectionName::new("orders.archive").is_ok());
        assert!(ValidatedCollectionName::new("a").is_ok());
    }

    #[test]
    fn test_collection_name_empty() {
        let err = ValidatedCollectionName::new("").unwrap_err();
        assert!(err.to_string().contains("cannot be empty"));
    }

    #[test]
    fn test_collection_name_length() {
        // Names well past 120 bytes are legal MongoDB collection names
        assert!(ValidatedCollectionName::new(&"a".repeat(121)).is_ok());
        assert!(ValidatedCollectionName::new(&"a".repeat(MAX_NAMESPACE_BYTES)).is_ok());

        let err = ValidatedCollectionName::new(&"a".repeat(MAX_NAMESPACE_BYTES + 1)).unwrap_err();
        assert!(err.to_string().contains("namespace limit"));
    }

    #[test]
    fn test_collection_name_null_byte() {
        assert!(ValidatedCollectionName::new("users\0").is_err());
    }

    #[test]
    fn test_collection_name_system_prefix() {
        let err = ValidatedCollectionName::new("system.users").unwrap_err();
        assert!(err.to_string().contains("'system.'"));
        // Only the prefix is reserved
        assert!(ValidatedCollectionName::new("my_system.users").is_ok());
    }

    #[test]
    fn test_collection_name_dollar() {
        assert!(ValidatedCollectionName::new("$cmd").is_err());
        assert!(ValidatedCollectionName::new("users$").is_err());
    }

    #[test]
    fn test_collection_name_suspicious_pattern_allowed() {
        assert!(ValidatedCollectionName::new("a..b").is_ok());
        assert!(ValidatedCollectionName::new("a//b").is_ok());
    }

    #[test]
    fn test_collection_name_display() {
        let name = ValidatedCollectionName::new("test_users").unwrap();
        assert_eq!(name.to_string(), "test_users");
        assert_eq!(name.as_ref(), "test_users");
    }

    #[test]
    fn test_update_document_operators() {
        assert!(validate_update_document(&doc! { "$set": { "age": 26, "updated": true } }).is_ok());
        assert!(validate_update_document(&doc! { "$inc": { "n": 1 }, "$unset": { "tmp": "" } }).is_ok());
        // Unknown operators pass through to the server
        assert!(validate_update_document(&doc! { "$futureOp": { "a": 1 } }).is_ok());
    }

    #[test]
    fn test_update_document_replacement_rejected() {
        let err = validate_update_document(&doc! { "age": 26 }).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation error: Update document requires atomic operators"
        );
        assert!(validate_update_document(&doc! { "$set": { "a": 1 }, "b": 2 }).is_err());
        assert!(validate_update_document(&doc! {}).is_err());
    }

    #[test]
    fn test_update_pipeline() {
        let stages = vec![Bson::Document(doc! { "$set": { "total": { "$add": ["$a", "$b"] } } })];
        assert_eq!(validate_update_pipeline(&stages).unwrap().len(), 1);

        assert!(validate_update_pipeline(&[]).is_err());
        assert!(validate_update_pipeline(&[Bson::Int32(1)]).is_err());
    }

    #[test]
    fn test_known_update_operators() {
        assert!(is_known_update_operator("$set"));
        assert!(is_known_update_operator("$push"));
        assert!(!is_known_update_operator("$gt"));
        assert!(!is_known_update_operator("set"));
    }
}
