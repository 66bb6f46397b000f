//! HTTP transport for the MongoDB task bridge
//!
//! Test runners that cannot link the bridge in-process call it over HTTP:
//! `POST /task` with `{"task": name, "arg": value}` answers with exactly the
//! value the in-process bridge would return.

pub mod error;
pub mod routes;
pub mod state;

use anyhow::Context;
use serde_json::Value as JsonValue;
use std::future::Future;
use taskbridge_mongodb::{TaskBridge, TaskName};
use tokio::net::TcpListener;

pub use routes::router;
pub use state::AppState;

/// Serve the bridge on `listener` until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, bridge: TaskBridge, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = router(AppState { bridge });
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

/// Parse the command-line form of a task: a name and optional JSON argument.
///
/// A missing argument is `null`. Fails for an unknown task name or an
/// argument that is not valid JSON.
pub fn parse_exec_args(task: &str, arg: Option<&str>) -> anyhow::Result<(TaskName, JsonValue)> {
    let task: TaskName = task.parse()?;
    let arg = match arg {
        Some(raw) => serde_json::from_str(raw).context("Task argument is not valid JSON")?,
        None => JsonValue::Null,
    };
    Ok((task, arg))
}

/// Run one task from its command-line form.
///
/// Task failures are part of the returned value, as an error descriptor.
pub async fn exec_once(bridge: &TaskBridge, task: &str, arg: Option<&str>) -> anyhow::Result<JsonValue> {
    let (task, arg) = parse_exec_args(task, arg)?;
    Ok(bridge.execute(task, arg).await.into_value())
}
