/// Task meta document endpoints
///
/// Validates the task id and body before touching the database; validation failures are
/// answered field by field.

use crate::{
    api::{ApiError, AppState, JsonBody},
    task::{parse_task_id, MetaDoc, MetaDocUpload},
};
use axum::{
    extract::{Path, State},
    response::Json,
    routing::post,
    Router,
};

pub fn create_task_routes() -> Router<AppState> {
    Router::new().route(
        "/api/tasks/{task_id}/metadocs",
        post(upload_meta_doc).get(list_meta_docs),
    )
}

/// Attach a meta document to a task
///
/// POST /api/tasks/{task_id}/metadocs
/// Body: { "createdBy": "<uuid>", "doc_name": "...", "doc_url": "https://...", "type": "..." }
async fn upload_meta_doc(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    body: Result<JsonBody<MetaDocUpload>, ApiError>,
) -> Result<Json<MetaDoc>, ApiError> {
    // The task id is checked before the body
    let task_id = parse_task_id(&task_id).map_err(ApiError::BadRequest)?;
    let JsonBody(upload) = body?;
    let doc = upload.into_meta_doc()?;

    let stored = state.metadocs.insert(task_id, &doc).await?;
    tracing::info!("📎 Stored meta document {} for task {}", stored.id, task_id);

    Ok(Json(stored))
}

/// List a task's meta documents
///
/// GET /api/tasks/{task_id}/metadocs
async fn list_meta_docs(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<Vec<MetaDoc>>, ApiError> {
    let task_id = parse_task_id(&task_id).map_err(ApiError::BadRequest)?;
    Ok(Json(state.metadocs.list_for_task(task_id).await?))
}
