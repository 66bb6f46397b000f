//! Find queries for the `findDocuments` task
//!
//! The `options` argument is read as the driver's own `FindOptions`, in its
//! camelCase wire naming, so every option the driver knows reaches the server.

use bson::{Bson, Document as BsonDocument};
use futures::TryStreamExt;
use mongodb::{options::FindOptions, Collection};
use serde_json::Value as JsonValue;
use std::time::Duration;
use taskbridge_common::{BridgeError, Result};

use crate::extjson;

/// Query builder for MongoDB find operations
#[derive(Debug, Clone, Default)]
pub struct FindQuery {
    filter: BsonDocument,
    options: FindOptions,
}

impl FindQuery {
    /// Create a match-all query
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a query from the task's JSON `query` and `options` arguments
    pub fn from_json(query: Option<JsonValue>, options: Option<JsonValue>) -> Result<Self> {
        let filter = extjson::to_document_or_empty(query, "query")?;
        let options = match options {
            None | Some(JsonValue::Null) => FindOptions::default(),
            Some(value) => decode_options(extjson::to_document(value, "options")?)?,
        };

        Ok(Self { filter, options })
    }

    /// Set the filter document
    pub fn filter(mut self, filter: BsonDocument) -> Self {
        self.filter = filter;
        self
    }

    /// Set the projection document
    pub fn projection(mut self, projection: BsonDocument) -> Self {
        self.options.projection = Some(projection);
        self
    }

    /// Set the sort order
    pub fn sort(mut self, sort: BsonDocument) -> Self {
        self.options.sort = Some(sort);
        self
    }

    /// Set the number of documents to skip
    pub fn skip(mut self, skip: u64) -> Self {
        self.options.skip = Some(skip);
        self
    }

    /// Set the maximum number of documents to return
    pub fn limit(mut self, limit: i64) -> Self {
        self.options.limit = Some(limit);
        self
    }

    /// Get the filter document
    pub fn get_filter(&self) -> &BsonDocument {
        &self.filter
    }

    /// Get the projection document
    pub fn get_projection(&self) -> Option<&BsonDocument> {
        self.options.projection.as_ref()
    }

    /// Get the sort document
    pub fn get_sort(&self) -> Option<&BsonDocument> {
        self.options.sort.as_ref()
    }

    /// Get the skip value
    pub fn get_skip(&self) -> Option<u64> {
        self.options.skip
    }

    /// Get the limit value
    pub fn get_limit(&self) -> Option<i64> {
        self.options.limit
    }

    /// Driver options the query runs with
    pub fn options(&self) -> &FindOptions {
        &self.options
    }

    /// Execute the query and return all matching documents
    pub async fn to_list(self, collection: &Collection<BsonDocument>) -> Result<Vec<BsonDocument>> {
        let cursor = collection.find(self.filter).with_options(self.options).await?;
        let docs: Vec<BsonDocument> = cursor.try_collect().await?;
        Ok(docs)
    }
}

/// Decode `options` into `FindOptions`.
///
/// `skip` and `maxTimeMS` are taken out first: both must be non-negative, and
/// the driver reads `maxTimeMS` as a `Duration` rather than milliseconds.
fn decode_options(mut doc: BsonDocument) -> Result<FindOptions> {
    let skip = take_non_negative(&mut doc, "skip")?;
    let max_time = take_non_negative(&mut doc, "maxTimeMS")?.map(Duration::from_millis);

    let mut options: FindOptions = bson::from_document(doc)
        .map_err(|e| BridgeError::InvalidRequest(format!("`options`: {}", e)))?;
    options.skip = skip;
    options.max_time = max_time;
    Ok(options)
}

fn take_non_negative(doc: &mut BsonDocument, key: &str) -> Result<Option<u64>> {
    let value = match doc.remove(key) {
        None | Some(Bson::Null) => return Ok(None),
        Some(Bson::Int32(n)) => i64::from(n),
        Some(Bson::Int64(n)) => n,
        Some(Bson::Double(n)) if n.fract() == 0.0 => n as i64,
        Some(other) => {
            return Err(BridgeError::InvalidRequest(format!(
                "`options.{}` must be an integer, got {:?}",
                key,
                other.element_type()
            )))
        }
    };

    u64::try_from(value).map(Some).map_err(|_| {
        BridgeError::Validation(format!("`options.{}` cannot be negative: {}", key, value))
    })
}
