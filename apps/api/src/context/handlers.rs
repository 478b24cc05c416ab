use axum::{
    extract::{rejection::JsonRejection, Multipart, Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::context::models::{ContextFields, ContextKind, ContextPayload, StoreAck, UserContext};
use crate::context::resume::{extract_resume_text, UploadedFile, DEFAULT_RESUME_TITLE};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreContextRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub data: ContextFields,
}

#[derive(Debug, Serialize)]
pub struct ContextResponse {
    pub success: bool,
    pub context: UserContext,
}

#[derive(Debug, Serialize)]
pub struct ClearContextResponse {
    pub success: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeUploadResponse {
    pub success: bool,
    pub context_id: Uuid,
    pub characters: usize,
}

pub fn require_user_id(user_id: &str) -> Result<&str, AppError> {
    let trimmed = user_id.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation("userId is required".to_string()));
    }
    Ok(trimmed)
}

/// POST /agent/context
pub async fn handle_store_context(
    State(state): State<AppState>,
    payload: Result<Json<StoreContextRequest>, JsonRejection>,
) -> Result<Json<StoreAck>, AppError> {
    let Json(req) = payload?;
    let user_id = require_user_id(&req.user_id)?;
    let kind: ContextKind = req.kind.parse()?;
    let payload = ContextPayload::from_fields(kind, req.data)?;

    let ack = state.orchestrator.store_context(user_id, payload)?;
    Ok(Json(ack))
}

/// GET /agent/context/:user_id
pub async fn handle_get_context(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ContextResponse>, AppError> {
    let user_id = require_user_id(&user_id)?;
    Ok(Json(ContextResponse {
        success: true,
        context: state.orchestrator.get_context(user_id),
    }))
}

/// DELETE /agent/context/:user_id
pub async fn handle_clear_context(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ClearContextResponse>, AppError> {
    let user_id = require_user_id(&user_id)?;
    state.orchestrator.clear_context(user_id);
    Ok(Json(ClearContextResponse { success: true }))
}

/// POST /agent/context/:user_id/resume
///
/// Multipart upload: `file` (PDF or text, required) and `title` (optional).
/// The extracted text is stored as a document entry.
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<ResumeUploadResponse>, AppError> {
    let user_id = require_user_id(&user_id)?.to_string();

    let mut file: Option<UploadedFile> = None;
    let mut title: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
                file = Some(UploadedFile {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            Some("title") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read title: {e}")))?;
                title = Some(text);
            }
            _ => {}
        }
    }

    let file = file.ok_or_else(|| {
        AppError::Validation("Multipart field 'file' is required".to_string())
    })?;

    let text = tokio::task::spawn_blocking(move || extract_resume_text(&file))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Resume extraction task failed: {e}")))??;

    let title = title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| DEFAULT_RESUME_TITLE.to_string());
    let characters = text.chars().count();

    let ack = state.orchestrator.store_context(
        &user_id,
        ContextPayload::Document {
            title,
            content: text,
        },
    )?;
    info!("Stored resume ({characters} chars) for user {user_id}");

    Ok(Json(ResumeUploadResponse {
        success: ack.success,
        context_id: ack.context_id,
        characters,
    }))
}
