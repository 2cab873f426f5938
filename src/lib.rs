/// Stagecraft: stage/task workflow definition generator
///
/// This library turns ordered stage lists into declarative state-machine documents for an
/// external orchestration service, and carries the small HTTP/database glue around it.

// Core configuration and setup
pub mod config;

// SQLite pool and schema management
pub mod db;

// Workflow documents - types, builder, generator, persistence
pub mod workflow;

// Resources and projects listing
pub mod resource;

// Task meta documents
pub mod task;

// HTTP API layer - REST endpoints and error mapping
pub mod api;

// Server setup and initialization
pub mod server;

// Re-export commonly used types for external consumers
pub use config::{Config, GeneratorConfig, InputPolicy};
pub use server::{build_router, start_server};
pub use workflow::{GenerateError, StageDescriptor, Topology, WorkflowDocument, WorkflowGenerator};
