/// Resource management module
///
/// Resources (people or assets) and the projects they can be assigned to, stored as
/// JSON documents and flattened into listing summaries for the API.

pub mod storage;
pub mod types;

pub use storage::ResourceStorage;
pub use types::{summarize, ProjectRecord, ResourceRecord, ResourceSummary};
