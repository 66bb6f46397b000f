//! Anything that can execute a named bridge task

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use taskbridge_common::Result;
use taskbridge_mongodb::TaskBridge;

/// Executes a bridge task by name.
///
/// Registered tasks always resolve to `Ok`, carrying either the task's result
/// or an `{ "error": message }` value. `Err` is reserved for failures outside
/// the task itself: unknown task names and transport errors.
#[async_trait]
pub trait TaskRunner: Send + Sync {
    async fn task(&self, name: &str, arg: JsonValue) -> Result<JsonValue>;
}

/// Runs tasks in-process
#[async_trait]
impl TaskRunner for TaskBridge {
    async fn task(&self, name: &str, arg: JsonValue) -> Result<JsonValue> {
        self.dispatch(name, arg).await
    }
}

#[async_trait]
impl<R: TaskRunner + ?Sized> TaskRunner for std::sync::Arc<R> {
    async fn task(&self, name: &str, arg: JsonValue) -> Result<JsonValue> {
        (**self).task(name, arg).await
    }
}
