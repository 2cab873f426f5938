/// Resource listing endpoint

use crate::{
    api::{ApiError, AppState},
    resource::{summarize, ResourceSummary},
};
use axum::{
    extract::{Query, State},
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;

/// Optional listing filter
#[derive(Debug, Default, Deserialize)]
pub struct ResourceQuery {
    pub project_id: Option<String>,
}

pub fn create_resource_routes() -> Router<AppState> {
    Router::new().route("/api/resources", get(list_resources))
}

/// List resources, each with the (optionally filtered) projects
///
/// GET /api/resources?project_id=...
async fn list_resources(
    State(state): State<AppState>,
    Query(query): Query<ResourceQuery>,
) -> Result<Json<Vec<ResourceSummary>>, ApiError> {
    let resources = state.resources.list_resources().await?;
    let projects = state
        .resources
        .list_projects(query.project_id.as_deref())
        .await?;

    tracing::debug!(
        "📋 Listing {} resources against {} projects",
        resources.len(),
        projects.len()
    );

    Ok(Json(summarize(&resources, &projects)))
}
