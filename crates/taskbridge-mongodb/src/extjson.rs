//! JSON <-> BSON conversion at the task boundary
//!
//! Task arguments arrive as JSON and are read with MongoDB Extended JSON rules
//! (`{"$oid": ...}`, `{"$date": ...}`, ...). Results leave as relaxed Extended
//! JSON so that plain numbers, strings and booleans stay plain.

use bson::{Bson, Document as BsonDocument};
use serde_json::Value as JsonValue;
use taskbridge_common::{BridgeError, Result};

/// Human-readable JSON type name for error messages
pub fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

/// Convert any JSON value to BSON
pub fn to_bson(value: JsonValue) -> Result<Bson> {
    Ok(Bson::try_from(value)?)
}

/// Convert a JSON object argument to a BSON document.
///
/// `field` names the argument in the error message.
pub fn to_document(value: JsonValue, field: &str) -> Result<BsonDocument> {
    if !value.is_object() {
        return Err(BridgeError::InvalidRequest(format!(
            "`{}` must be an object, got {}",
            field,
            json_kind(&value)
        )));
    }

    match to_bson(value)? {
        Bson::Document(doc) => Ok(doc),
        // An object that is itself an Extended JSON wrapper, e.g. {"$oid": ...}
        other => Err(BridgeError::InvalidRequest(format!(
            "`{}` must be a document, got {:?}",
            field,
            other.element_type()
        ))),
    }
}

/// Like [`to_document`], but `None` and `null` become an empty document
pub fn to_document_or_empty(value: Option<JsonValue>, field: &str) -> Result<BsonDocument> {
    match value {
        None | Some(JsonValue::Null) => Ok(BsonDocument::new()),
        Some(value) => to_document(value, field),
    }
}

/// Render BSON as relaxed Extended JSON
pub fn to_json(value: Bson) -> JsonValue {
    value.into_relaxed_extjson()
}

/// Render a document as relaxed Extended JSON
pub fn document_to_json(doc: BsonDocument) -> JsonValue {
    Bson::Document(doc).into_relaxed_extjson()
}
