//! The task bridge: named database operations for e2e test runners
//!
//! Each task decodes and validates its argument, opens a connection, performs
//! exactly one driver call and closes the connection again. Failures come back
//! as `{ "error": message }` values, never as faults.

use bson::{Bson, Document as BsonDocument};
use mongodb::options::UpdateModifications;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;
use taskbridge_common::{BridgeConfig, BridgeError, Result};

use crate::connection::with_collection;
use crate::extjson;
use crate::outcome::TaskOutcome;
use crate::query::FindQuery;
use crate::validation::{validate_update_document, validate_update_pipeline, ValidatedCollectionName};

/// The registered tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskName {
    FindDocuments,
    InsertDocument,
    UpdateDocuments,
    DeleteDocuments,
    ClearCollection,
}

impl TaskName {
    pub const ALL: [TaskName; 5] = [
        TaskName::FindDocuments,
        TaskName::InsertDocument,
        TaskName::UpdateDocuments,
        TaskName::DeleteDocuments,
        TaskName::ClearCollection,
    ];

    /// Wire name used by test runners
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskName::FindDocuments => "findDocuments",
            TaskName::InsertDocument => "insertDocument",
            TaskName::UpdateDocuments => "updateDocuments",
            TaskName::DeleteDocuments => "deleteDocuments",
            TaskName::ClearCollection => "clearCollection",
        }
    }

    /// Short name accepted as an alternative to [`TaskName::as_str`]
    pub fn short_name(&self) -> &'static str {
        match self {
            TaskName::FindDocuments => "find",
            TaskName::InsertDocument => "insert",
            TaskName::UpdateDocuments => "update",
            TaskName::DeleteDocuments => "delete",
            TaskName::ClearCollection => "clear",
        }
    }
}

impl fmt::Display for TaskName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskName {
    type Err = BridgeError;

    fn from_str(name: &str) -> Result<Self> {
        TaskName::ALL
            .into_iter()
            .find(|task| task.as_str() == name || task.short_name() == name)
            .ok_or_else(|| BridgeError::UnknownTask(name.to_string()))
    }
}

/// Argument of `findDocuments`
#[derive(Debug, Clone, Deserialize)]
pub struct FindRequest {
    pub collection: String,
    #[serde(default)]
    pub query: Option<JsonValue>,
    #[serde(default)]
    pub options: Option<JsonValue>,
}

/// Argument of `insertDocument`
#[derive(Debug, Clone, Deserialize)]
pub struct InsertRequest {
    pub collection: String,
    pub document: JsonValue,
}

/// Argument of `updateDocuments`
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRequest {
    pub collection: String,
    pub filter: JsonValue,
    pub update: JsonValue,
}

/// Argument of `deleteDocuments`
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteRequest {
    pub collection: String,
    pub filter: JsonValue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertAck {
    pub acknowledged: bool,
    pub inserted_id: JsonValue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAck {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_count: u64,
    pub upserted_id: JsonValue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAck {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

fn decode<T: DeserializeOwned>(task: TaskName, arg: JsonValue) -> Result<T> {
    if !arg.is_object() {
        return Err(BridgeError::InvalidRequest(format!(
            "{} expects an object argument, got {}",
            task,
            extjson::json_kind(&arg)
        )));
    }
    serde_json::from_value(arg).map_err(|e| BridgeError::InvalidRequest(format!("{}: {}", task, e)))
}

fn update_modifications(update: JsonValue) -> Result<UpdateModifications> {
    match update {
        JsonValue::Array(_) => match extjson::to_bson(update)? {
            Bson::Array(stages) => Ok(UpdateModifications::Pipeline(validate_update_pipeline(&stages)?)),
            other => Err(BridgeError::InvalidRequest(format!(
                "`update` pipeline must be an array, got {:?}",
                other.element_type()
            ))),
        },
        other => {
            let doc = extjson::to_document(other, "update")?;
            validate_update_document(&doc)?;
            Ok(UpdateModifications::Document(doc))
        }
    }
}

/// Dispatch table mapping task names to database operations
#[derive(Debug, Clone)]
pub struct TaskBridge {
    config: Arc<BridgeConfig>,
}

impl TaskBridge {
    pub fn new(config: BridgeConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Names every registered task answers to
    pub fn task_names(&self) -> Vec<&'static str> {
        TaskName::ALL.iter().map(TaskName::as_str).collect()
    }

    /// Run a task by name.
    ///
    /// The only error is [`BridgeError::UnknownTask`]; everything that goes
    /// wrong inside a registered task is returned as an error descriptor value.
    pub async fn dispatch(&self, name: &str, arg: JsonValue) -> Result<JsonValue> {
        let task = name.parse::<TaskName>()?;
        Ok(self.execute(task, arg).await.into_value())
    }

    /// Run a registered task, folding any failure into the outcome
    pub async fn execute(&self, task: TaskName, arg: JsonValue) -> TaskOutcome {
        let started = Instant::now();
        tracing::debug!(task = %task, "Running task");

        let result = self.run(task, arg).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(_) => tracing::debug!(task = %task, elapsed_ms, "Task finished"),
            Err(e) if e.is_rejected_request() => {
                tracing::warn!(task = %task, elapsed_ms, "Task rejected: {}", e)
            }
            Err(e) => tracing::error!(task = %task, elapsed_ms, "Task failed: {}", e),
        }

        result.into()
    }

    async fn run(&self, task: TaskName, arg: JsonValue) -> Result<JsonValue> {
        match task {
            TaskName::FindDocuments => {
                let docs = self.find_documents(decode(task, arg)?).await?;
                Ok(JsonValue::Array(docs.into_iter().map(extjson::document_to_json).collect()))
            }
            TaskName::InsertDocument => {
                Ok(serde_json::to_value(self.insert_document(decode(task, arg)?).await?)?)
            }
            TaskName::UpdateDocuments => {
                Ok(serde_json::to_value(self.update_documents(decode(task, arg)?).await?)?)
            }
            TaskName::DeleteDocuments => {
                Ok(serde_json::to_value(self.delete_documents(decode(task, arg)?).await?)?)
            }
            TaskName::ClearCollection => {
                let collection = match arg {
                    JsonValue::String(name) => name,
                    other => {
                        return Err(BridgeError::InvalidRequest(format!(
                            "{} expects a collection name string, got {}",
                            task,
                            extjson::json_kind(&other)
                        )))
                    }
                };
                Ok(serde_json::to_value(self.clear_collection(&collection).await?)?)
            }
        }
    }

    /// Find all documents matching `query`, honouring projection/sort/skip/limit
    pub async fn find_documents(&self, request: FindRequest) -> Result<Vec<BsonDocument>> {
        let collection = ValidatedCollectionName::new(&request.collection)?;
        let query = FindQuery::from_json(request.query, request.options)?;

        let docs = with_collection(&self.config, &collection, |coll| async move {
            query.to_list(&coll).await
        })
        .await?;

        tracing::info!(collection = %collection, count = docs.len(), "Found documents");
        Ok(docs)
    }

    /// Insert one document; the driver assigns `_id` when it is absent
    pub async fn insert_document(&self, request: InsertRequest) -> Result<InsertAck> {
        let collection = ValidatedCollectionName::new(&request.collection)?;
        let document = extjson::to_document(request.document, "document")?;

        let result = with_collection(&self.config, &collection, |coll| async move {
            Ok::<_, BridgeError>(coll.insert_one(document).await?)
        })
        .await?;

        tracing::info!(collection = %collection, "Inserted document");
        Ok(InsertAck {
            acknowledged: true,
            inserted_id: extjson::to_json(result.inserted_id),
        })
    }

    /// Apply `update` to every document matching `filter`
    pub async fn update_documents(&self, request: UpdateRequest) -> Result<UpdateAck> {
        let collection = ValidatedCollectionName::new(&request.collection)?;
        let filter = extjson::to_document(request.filter, "filter")?;
        let modifications = update_modifications(request.update)?;

        let result = with_collection(&self.config, &collection, |coll| async move {
            Ok::<_, BridgeError>(coll.update_many(filter, modifications).await?)
        })
        .await?;

        tracing::info!(
            collection = %collection,
            matched = result.matched_count,
            modified = result.modified_count,
            "Updated documents"
        );
        Ok(UpdateAck {
            acknowledged: true,
            matched_count: result.matched_count,
            modified_count: result.modified_count,
            upserted_count: u64::from(result.upserted_id.is_some()),
            upserted_id: result.upserted_id.map(extjson::to_json).unwrap_or(JsonValue::Null),
        })
    }

    /// Delete every document matching `filter`
    pub async fn delete_documents(&self, request: DeleteRequest) -> Result<DeleteAck> {
        let collection = ValidatedCollectionName::new(&request.collection)?;
        let filter = extjson::to_document(request.filter, "filter")?;
        self.delete_matching(&collection, filter).await
    }

    /// Delete every document in the collection
    pub async fn clear_collection(&self, collection: &str) -> Result<DeleteAck> {
        let collection = ValidatedCollectionName::new(collection)?;
        self.delete_matching(&collection, BsonDocument::new()).await
    }

    async fn delete_matching(
        &self,
        collection: &ValidatedCollectionName,
        filter: BsonDocument,
    ) -> Result<DeleteAck> {
        let result = with_collection(&self.config, collection, |coll| async move {
            Ok::<_, BridgeError>(coll.delete_many(filter).await?)
        })
        .await?;

        tracing::info!(collection = %collection, deleted = result.deleted_count, "Deleted documents");
        Ok(DeleteAck {
            acknowledged: true,
            deleted_count: result.deleted_count,
        })
    }
}
