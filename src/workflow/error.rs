use thiserror::Error;

/// Errors raised while building a workflow document
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    #[error("invalid input: stage list is empty")]
    EmptyStageList,

    #[error("invalid input: stage '{stage}' has no tasks")]
    EmptyStage { stage: String },

    #[error("invalid input: stage at position {index} has an empty name")]
    EmptyStageName { index: usize },

    #[error("invalid input: stage '{stage}' has a task with an empty name")]
    EmptyTaskName { stage: String },

    #[error("invalid input: duplicate node identifier '{id}'")]
    DuplicateNodeId { id: String },

    #[error("start node '{id}' is not defined")]
    MissingStartNode { id: String },

    #[error("node '{from}' transitions to undefined node '{to}'")]
    DanglingTransition { from: String, to: String },
}

impl GenerateError {
    /// Whether the error is caused by the caller's stage list rather than by
    /// an inconsistent document assembly.
    pub fn is_invalid_input(&self) -> bool {
        !matches!(
            self,
            GenerateError::MissingStartNode { .. } | GenerateError::DanglingTransition { .. }
        )
    }
}
