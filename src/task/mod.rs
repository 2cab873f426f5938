/// Task documents module
///
/// Meta documents (links to files produced or consumed by a task) attached to tasks,
/// with request validation and SQLite persistence.

pub mod storage;
pub mod types;

pub use storage::MetaDocStorage;
pub use types::{parse_task_id, MetaDoc, MetaDocUpload, NewMetaDoc};
