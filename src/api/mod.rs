/// HTTP API Layer
///
/// This module provides the REST endpoints around the generator and the stored data:
/// - Workflow document generation and definition CRUD
/// - Resource listing
/// - Task meta document upload
/// - Error to response mapping and response headers

// Workflow generation and definition endpoints
pub mod workflows;

// Resource listing endpoints
pub mod resources;

// Task meta document endpoints
pub mod tasks;

// ApiError and its HTTP mapping
pub mod error;

// Body extractor rejecting with ApiError
pub mod extract;

use crate::{
    config::GeneratorConfig,
    resource::ResourceStorage,
    task::MetaDocStorage,
    workflow::{storage::WorkflowStorage, WorkflowGenerator},
};
use axum::{
    http::{header, HeaderValue},
    response::Response,
};
use sqlx::sqlite::SqlitePool;
use std::sync::Arc;

// Re-export router builders
pub use error::ApiError;
pub use extract::JsonBody;
pub use resources::create_resource_routes;
pub use tasks::create_task_routes;
pub use workflows::create_workflow_routes;

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    /// Document generator shared by all requests
    pub generator: Arc<WorkflowGenerator>,
    /// Generated definition persistence
    pub workflows: WorkflowStorage,
    /// Resource and project persistence
    pub resources: ResourceStorage,
    /// Task meta document persistence
    pub metadocs: MetaDocStorage,
}

impl AppState {
    /// Build state over one pool with the given generator settings
    pub fn new(pool: SqlitePool, generator: GeneratorConfig) -> Self {
        Self {
            generator: Arc::new(WorkflowGenerator::new(generator)),
            workflows: WorkflowStorage::new(pool.clone()),
            resources: ResourceStorage::new(pool.clone()),
            metadocs: MetaDocStorage::new(pool),
        }
    }
}

/// Add the cross-origin headers every response carries
pub async fn cors_headers(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
        HeaderValue::from_static("true"),
    );
    response
}
