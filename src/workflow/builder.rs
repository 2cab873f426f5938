/// Node mapping builder
///
/// Collects nodes for one scope (the document root or a single parallel branch) and
/// checks, before handing out a finished mapping, that identifiers are unique, the start
/// node exists and every `Next` target is defined in the same scope.

use crate::workflow::error::GenerateError;
use crate::workflow::types::{Node, NodeId, States, SubWorkflow, WorkflowDocument};
use std::collections::HashSet;

#[derive(Debug, Default)]
pub struct StatesBuilder {
    entries: Vec<(NodeId, Node)>,
    seen: HashSet<NodeId>,
}

impl StatesBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node under a new identifier
    pub fn insert(
        &mut self,
        id: impl Into<NodeId>,
        node: impl Into<Node>,
    ) -> Result<&mut Self, GenerateError> {
        let id = id.into();
        if !self.seen.insert(id.clone()) {
            return Err(GenerateError::DuplicateNodeId { id });
        }
        self.entries.push((id, node.into()));
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Finish as a parallel branch
    pub fn into_sub_workflow(self, start_at: impl Into<NodeId>) -> Result<SubWorkflow, GenerateError> {
        let start_at = start_at.into();
        let states = self.into_states(&start_at)?;
        Ok(SubWorkflow { start_at, states })
    }

    /// Finish as a top-level document
    pub fn into_document(
        self,
        comment: impl Into<String>,
        start_at: impl Into<NodeId>,
    ) -> Result<WorkflowDocument, GenerateError> {
        let start_at = start_at.into();
        let states = self.into_states(&start_at)?;
        Ok(WorkflowDocument {
            comment: comment.into(),
            start_at,
            states,
        })
    }

    fn into_states(self, start_at: &str) -> Result<States, GenerateError> {
        if !self.seen.contains(start_at) {
            return Err(GenerateError::MissingStartNode {
                id: start_at.to_string(),
            });
        }

        for (id, node) in &self.entries {
            if let Some(next) = node.next_id() {
                if !self.seen.contains(next) {
                    return Err(GenerateError::DanglingTransition {
                        from: id.clone(),
                        to: next.to_string(),
                    });
                }
            }
        }

        Ok(States {
            entries: self.entries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::types::{ParallelNode, Transition};

    fn parallel(transition: Transition) -> ParallelNode {
        ParallelNode {
            branches: Vec::new(),
            transition,
        }
    }

    #[test]
    fn rejects_duplicate_identifiers() {
        let mut builder = StatesBuilder::new();
        builder.insert("a", parallel(Transition::End)).unwrap();

        let err = builder.insert("a", parallel(Transition::End)).unwrap_err();
        assert_eq!(err, GenerateError::DuplicateNodeId { id: "a".into() });
        assert_eq!(builder.len(), 1);
    }

    #[test]
    fn rejects_missing_start_node() {
        let mut builder = StatesBuilder::new();
        builder.insert("a", parallel(Transition::End)).unwrap();

        let err = builder.into_sub_workflow("b").unwrap_err();
        assert_eq!(err, GenerateError::MissingStartNode { id: "b".into() });
        assert!(!err.is_invalid_input());
    }

    #[test]
    fn rejects_transition_to_undefined_node() {
        let mut builder = StatesBuilder::new();
        builder
            .insert("a", parallel(Transition::Next("b".into())))
            .unwrap();

        let err = builder.into_document("c", "a").unwrap_err();
        assert_eq!(
            err,
            GenerateError::DanglingTransition {
                from: "a".into(),
                to: "b".into()
            }
        );
    }

    #[test]
    fn keeps_insertion_order() {
        let mut builder = StatesBuilder::new();
        builder
            .insert("z", parallel(Transition::Next("a".into())))
            .unwrap()
            .insert("a", parallel(Transition::End))
            .unwrap();

        let branch = builder.into_sub_workflow("z").unwrap();
        assert_eq!(branch.states.ids().collect::<Vec<_>>(), vec!["z", "a"]);
    }
}
