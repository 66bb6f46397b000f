//! Routes: `POST /task`, `POST /tasks/{name}` and `GET /health`

use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use taskbridge_mongodb::check_health;
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::state::AppState;

/// `POST /task` body, mirroring a test runner's `task(name, arg)` call
#[derive(Debug, Deserialize)]
pub struct TaskEnvelope {
    pub task: String,
    #[serde(default)]
    pub arg: JsonValue,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/task", post(run_task))
        .route("/tasks/{name}", post(run_named_task))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn run_task(
    State(state): State<AppState>,
    envelope: Result<Json<TaskEnvelope>, JsonRejection>,
) -> Result<Json<JsonValue>, ApiError> {
    let Json(envelope) = envelope.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let value = state.bridge.dispatch(&envelope.task, envelope.arg).await?;
    Ok(Json(value))
}

/// The body is the task argument itself; an empty body means `null`
async fn run_named_task(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<Json<JsonValue>, ApiError> {
    let arg = if body.iter().all(u8::is_ascii_whitespace) {
        JsonValue::Null
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::BadRequest(format!("Invalid JSON body: {}", e)))?
    };

    let value = state.bridge.dispatch(&name, arg).await?;
    Ok(Json(value))
}

async fn health(State(state): State<AppState>) -> Result<Json<JsonValue>, ApiError> {
    let database = check_health(state.bridge.config()).await?;
    Ok(Json(json!({
        "status": "ok",
        "database": database,
        "tasks": state.bridge.task_names(),
    })))
}
