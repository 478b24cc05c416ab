//! Axum route handlers for task execution and usage.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::agent::orchestrator::TaskResult;
use crate::agent::task::{TaskOptions, MAX_TASK_MAX_TOKENS};
use crate::agent::usage::UsageRecord;
use crate::context::handlers::require_user_id;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteTaskRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub task_type: String,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub options: TaskOptions,
}

#[derive(Debug, Serialize)]
pub struct UsageResponse {
    pub success: bool,
    pub usage: UsageRecord,
}

/// POST /agent/task
///
/// Provider failures are reported in the body (`success: false`) with a 200;
/// only malformed requests produce an error status.
pub async fn handle_execute_task(
    State(state): State<AppState>,
    payload: Result<Json<ExecuteTaskRequest>, JsonRejection>,
) -> Result<Json<TaskResult>, AppError> {
    let Json(req) = payload?;
    let user_id = require_user_id(&req.user_id)?;
    if req.prompt.trim().is_empty() {
        return Err(AppError::Validation("prompt cannot be empty".to_string()));
    }
    if !(1..=MAX_TASK_MAX_TOKENS).contains(&req.options.max_tokens) {
        return Err(AppError::Validation(format!(
            "options.maxTokens must be between 1 and {MAX_TASK_MAX_TOKENS}"
        )));
    }

    let result = state
        .orchestrator
        .execute_task(user_id, &req.task_type, &req.prompt, req.options)
        .await?;
    Ok(Json(result))
}

/// GET /agent/usage/:user_id
pub async fn handle_get_usage(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UsageResponse>, AppError> {
    let user_id = require_user_id(&user_id)?;
    Ok(Json(UsageResponse {
        success: true,
        usage: state.orchestrator.get_user_stats(user_id),
    }))
}
