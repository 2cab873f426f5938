/// Workflow generation and definition REST API endpoints
///
/// Generates documents on demand and persists named definitions so the orchestration
/// service can be provisioned from them later.

use crate::{
    api::{ApiError, AppState, JsonBody},
    workflow::{storage::StoredWorkflow, StageDescriptor, Topology, WorkflowDocument},
};
use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Response for workflow creation operations
#[derive(Debug, Serialize)]
pub struct WorkflowResponse {
    pub id: String,
    pub message: String,
}

/// Request body for one-off generation
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub topology: Topology,
    pub stages: Vec<StageDescriptor>,
}

/// Request body for replacing a stored definition
#[derive(Debug, Deserialize)]
pub struct UpdateWorkflowRequest {
    pub name: String,
    pub topology: Topology,
    pub stages: Vec<StageDescriptor>,
}

/// Request body for workflow creation
#[derive(Debug, Deserialize)]
pub struct CreateWorkflowRequest {
    pub id: String,
    pub name: String,
    pub topology: Topology,
    pub stages: Vec<StageDescriptor>,
}

/// Create workflow routes
pub fn create_workflow_routes() -> Router<AppState> {
    Router::new()
        .route("/api/workflows/generate", post(generate_workflow))
        .route("/api/workflows", post(create_workflow).get(list_workflows))
        .route(
            "/api/workflows/{id}",
            get(get_workflow).put(update_workflow).delete(delete_workflow),
        )
}

/// Generate a document without storing it
///
/// POST /api/workflows/generate
/// Body: { "topology": "sequential_chain", "stages": [{ "build": { "tasks": ["lint"] } }] }
async fn generate_workflow(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<GenerateRequest>,
) -> Result<Json<WorkflowDocument>, ApiError> {
    let document = state.generator.generate(request.topology, &request.stages)?;

    tracing::info!(
        "🧩 Generated {} document with {} stages",
        request.topology,
        request.stages.len()
    );

    Ok(Json(document))
}

/// Generate and store a named definition
///
/// POST /api/workflows
/// Body: { "id": "...", "name": "...", "topology": "...", "stages": [...] }
async fn create_workflow(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CreateWorkflowRequest>,
) -> Result<Json<WorkflowResponse>, ApiError> {
    if request.id.is_empty() || request.name.is_empty() {
        return Err(ApiError::BadRequest(
            "workflow id and name are required".to_string(),
        ));
    }

    let document = state.generator.generate(request.topology, &request.stages)?;

    let stored = StoredWorkflow {
        id: request.id,
        name: request.name,
        topology: request.topology,
        stages: request.stages,
        definition: serde_json::to_value(&document).map_err(anyhow::Error::from)?,
    };
    if !state.workflows.create_workflow(&stored).await? {
        return Err(ApiError::Conflict(format!(
            "Workflow '{}' already exists",
            stored.id
        )));
    }

    tracing::info!("🔥 Created workflow: {} ({})", stored.id, stored.name);

    Ok(Json(WorkflowResponse {
        message: format!("Workflow '{}' created successfully", stored.name),
        id: stored.id,
    }))
}

/// Regenerate and store a definition, creating it if missing
///
/// PUT /api/workflows/{id}
/// Body: { "name": "...", "topology": "...", "stages": [...] }
async fn update_workflow(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<UpdateWorkflowRequest>,
) -> Result<Json<WorkflowResponse>, ApiError> {
    if request.name.is_empty() {
        return Err(ApiError::BadRequest("workflow name is required".to_string()));
    }

    let document = state.generator.generate(request.topology, &request.stages)?;

    let stored = StoredWorkflow {
        id,
        name: request.name,
        topology: request.topology,
        stages: request.stages,
        definition: serde_json::to_value(&document).map_err(anyhow::Error::from)?,
    };
    state.workflows.save_workflow(&stored).await?;

    tracing::info!("🔄 Updated workflow: {} ({})", stored.id, stored.name);

    Ok(Json(WorkflowResponse {
        message: format!("Workflow '{}' updated successfully", stored.name),
        id: stored.id,
    }))
}

/// List all stored definitions
///
/// GET /api/workflows
async fn list_workflows(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let workflows = state.workflows.list_workflows().await?;
    Ok(Json(json!({ "workflows": workflows })))
}

/// Get a stored definition by ID
///
/// GET /api/workflows/{id}
async fn get_workflow(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StoredWorkflow>, ApiError> {
    state
        .workflows
        .get_workflow(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Workflow '{}' not found", id)))
}

/// Delete a stored definition
///
/// DELETE /api/workflows/{id}
async fn delete_workflow(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    if state.workflows.delete_workflow(&id).await? {
        tracing::info!("Deleted workflow: {}", id);
        Ok(Json(json!({ "message": "Workflow deleted successfully" })))
    } else {
        Err(ApiError::NotFound(format!("Workflow '{}' not found", id)))
    }
}
