use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use rotor_core::condition::Condition;
use serde::Deserialize;
use std::sync::Arc;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub command_time: Option<DateTime<Utc>>,
}

/// POST /chat: parse a command against the current row and register it.
///
/// A command the parser could not understand is still a 200 with a
/// `failed` condition; only a blank message is rejected.
pub async fn chat(
    State(app): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<Condition>, AppError> {
    let condition = app
        .rotor
        .register_condition(app.parser.as_ref(), &req.message, req.command_time)
        .await?;
    let rotor = Arc::clone(&app.rotor);
    tokio::task::spawn_blocking(move || rotor.persist_registration())
        .await
        .map_err(|e| AppError::internal(format!("snapshot task failed: {e}")))?;
    Ok(Json(condition))
}

/// GET /conditions: every condition ordered by command time.
pub async fn list_conditions(State(app): State<AppState>) -> Json<Vec<Condition>> {
    Json(app.rotor.list_conditions())
}

/// GET /conditions/{id}
pub async fn get_condition(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Condition>, AppError> {
    Ok(Json(app.rotor.condition(&id)?))
}
