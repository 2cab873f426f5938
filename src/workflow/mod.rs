/// Workflow Definition Layer
///
/// This module produces the declarative workflow documents consumed by the external
/// orchestration service, and keeps generated definitions around:
/// - Stage descriptors and the document node tree
/// - A node mapping builder enforcing identifier and transition invariants
/// - The generator with its two topologies
/// - SQLite persistence of generated definitions with sqlx

// Stage descriptors and document node types
pub mod types;

// Generation errors
pub mod error;

// Node mapping builder
pub mod builder;

// Stage list -> document generator
pub mod generator;

// SQLite persistence layer for generated definitions
pub mod storage;

// Re-export commonly used types
pub use builder::StatesBuilder;
pub use error::GenerateError;
pub use generator::{Topology, WorkflowGenerator};
pub use types::{Node, StageDescriptor, Transition, WorkflowDocument};
