//! Short command aliases over the bridge tasks
//!
//! Each alias forwards its arguments to the matching task unchanged and hands
//! the task's value back as-is.

use async_trait::async_trait;
use serde_json::{json, Value as JsonValue};
use taskbridge_common::Result;
use taskbridge_mongodb::TaskName;

use crate::runner::TaskRunner;

/// Database commands for test scenarios, available on every [`TaskRunner`]
#[async_trait]
pub trait MongoCommands: TaskRunner {
    /// `findDocuments`; `query` and `options` default to `{}`
    async fn find_in_mongo(
        &self,
        collection: &str,
        query: Option<JsonValue>,
        options: Option<JsonValue>,
    ) -> Result<JsonValue> {
        let arg = json!({
            "collection": collection,
            "query": query.unwrap_or_else(|| json!({})),
            "options": options.unwrap_or_else(|| json!({})),
        });
        self.task(TaskName::FindDocuments.as_str(), arg).await
    }

    /// `insertDocument`
    async fn insert_in_mongo(&self, collection: &str, document: JsonValue) -> Result<JsonValue> {
        let arg = json!({ "collection": collection, "document": document });
        self.task(TaskName::InsertDocument.as_str(), arg).await
    }

    /// `updateDocuments`
    async fn update_in_mongo(
        &self,
        collection: &str,
        filter: JsonValue,
        update: JsonValue,
    ) -> Result<JsonValue> {
        let arg = json!({ "collection": collection, "filter": filter, "update": update });
        self.task(TaskName::UpdateDocuments.as_str(), arg).await
    }

    /// `deleteDocuments`
    async fn delete_from_mongo(&self, collection: &str, filter: JsonValue) -> Result<JsonValue> {
        let arg = json!({ "collection": collection, "filter": filter });
        self.task(TaskName::DeleteDocuments.as_str(), arg).await
    }

    /// `clearCollection`
    async fn clear_mongo_collection(&self, collection: &str) -> Result<JsonValue> {
        self.task(TaskName::ClearCollection.as_str(), JsonValue::String(collection.to_string()))
            .await
    }
}

impl<R: TaskRunner + ?Sized> MongoCommands for R {}
