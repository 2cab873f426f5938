/// Core workflow document type definitions
///
/// Defines the generator input (stage descriptors) and the output document: a tree of
/// process, parallel and task-invocation nodes. The serialized form uses the exact field
/// names the downstream orchestration runtime expects (`StartAt`, `States`, `Type`, ...).

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Identifier of a node inside a document or branch
pub type NodeId = String;

/// Identifier of the root parallel node in the flat-parallel topology
pub const STAGES_NODE_ID: &str = "stages";

/// Identifier of a stage's process node (`build`)
pub fn process_node_id(stage: &str) -> NodeId {
    stage.to_string()
}

/// Identifier of a stage's task fan-out node (`build-tasks`)
pub fn tasks_node_id(stage: &str) -> NodeId {
    format!("{}-tasks", stage)
}

/// Identifier of a single task invocation node (`build-lint`)
pub fn task_node_id(stage: &str, task: &str) -> NodeId {
    format!("{}-{}", stage, task)
}

/// A named stage and its ordered task identifiers
///
/// On the wire a stage is a single-key object: `{ "build": { "tasks": ["lint", "test"] } }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, StageBody>", into = "BTreeMap<String, StageBody>")]
pub struct StageDescriptor {
    /// Stage name, used verbatim as a node identifier fragment
    pub name: String,
    /// Task identifiers, unique within the stage
    pub tasks: Vec<String>,
}

/// Body of the single-key wire representation of a stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageBody {
    pub tasks: Vec<String>,
}

impl StageDescriptor {
    pub fn new<I, T>(name: impl Into<String>, tasks: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            name: name.into(),
            tasks: tasks.into_iter().map(Into::into).collect(),
        }
    }
}

impl TryFrom<BTreeMap<String, StageBody>> for StageDescriptor {
    type Error = String;

    fn try_from(map: BTreeMap<String, StageBody>) -> Result<Self, Self::Error> {
        if map.len() != 1 {
            return Err(format!(
                "stage descriptor must have exactly one key, found {}",
                map.len()
            ));
        }
        let (name, body) = map
            .into_iter()
            .next()
            .ok_or_else(|| "stage descriptor is empty".to_string())?;
        Ok(Self {
            name,
            tasks: body.tasks,
        })
    }
}

impl From<StageDescriptor> for BTreeMap<String, StageBody> {
    fn from(stage: StageDescriptor) -> Self {
        BTreeMap::from([(stage.name, StageBody { tasks: stage.tasks })])
    }
}

/// Retry block attached to a process node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RetryPolicy {
    /// Error classes that trigger a retry
    pub error_equals: Vec<String>,
    /// Delay before the first retry, in seconds
    pub interval_seconds: u32,
    pub max_attempts: u32,
    /// Multiplier applied to the interval after each attempt
    #[serde(serialize_with = "serialize_rate")]
    pub backoff_rate: f64,
}

/// Whole rates are written as integers (`2`, not `2.0`)
fn serialize_rate<S: Serializer>(rate: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if rate.fract() == 0.0 && rate.abs() <= u32::MAX as f64 {
        serializer.serialize_i64(*rate as i64)
    } else {
        serializer.serialize_f64(*rate)
    }
}

/// A forwarded field in a parameter template, serialized as `"<name>.$": "<path>"`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathField {
    pub name: String,
    pub path: String,
}

impl PathField {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    /// Serialized key, suffixed to mark the value as a path expression
    pub fn key(&self) -> String {
        format!("{}.$", self.name)
    }
}

struct PathFields<'a>(&'a [PathField]);

impl Serialize for PathFields<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for field in self.0 {
            map.serialize_entry(&field.key(), &field.path)?;
        }
        map.end()
    }
}

/// Successor of a node: either a named node or the end of the enclosing workflow
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Next(NodeId),
    End,
}

impl Transition {
    pub fn next_id(&self) -> Option<&str> {
        match self {
            Transition::Next(id) => Some(id),
            Transition::End => None,
        }
    }

    pub fn is_end(&self) -> bool {
        matches!(self, Transition::End)
    }

    fn serialize_into<M: SerializeMap>(&self, map: &mut M) -> Result<(), M::Error> {
        match self {
            Transition::Next(id) => map.serialize_entry("Next", id),
            Transition::End => map.serialize_entry("End", &true),
        }
    }
}

/// Synchronous "run the stage's main logic" step
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessNode {
    /// Target invocation reference
    pub resource: String,
    /// Forwarded payload/metadata fields; omitted from output when empty
    pub parameters: Vec<PathField>,
    /// Where the step result is written in the running payload
    pub result_path: Option<String>,
    /// Omitted from output when empty
    pub retry: Vec<RetryPolicy>,
    pub transition: Transition,
}

/// Fan-out step whose branches run independently and must all complete
#[derive(Debug, Clone, PartialEq)]
pub struct ParallelNode {
    pub branches: Vec<SubWorkflow>,
    pub transition: Transition,
}

/// Work dispatched to an external worker that reports back with a callback token
///
/// Always terminal within its branch.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskInvocationNode {
    /// Callback-token integration resource
    pub resource: String,
    /// Worker function receiving the payload
    pub function_name: String,
    pub payload: Vec<PathField>,
}

/// A node in a document or branch
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Process(ProcessNode),
    Parallel(ParallelNode),
    TaskInvocation(TaskInvocationNode),
}

impl Node {
    /// Successor of this node; task invocations always end their branch
    pub fn transition(&self) -> Transition {
        match self {
            Node::Process(node) => node.transition.clone(),
            Node::Parallel(node) => node.transition.clone(),
            Node::TaskInvocation(_) => Transition::End,
        }
    }

    pub fn next_id(&self) -> Option<&str> {
        match self {
            Node::Process(node) => node.transition.next_id(),
            Node::Parallel(node) => node.transition.next_id(),
            Node::TaskInvocation(_) => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.next_id().is_none()
    }

    pub fn as_process(&self) -> Option<&ProcessNode> {
        match self {
            Node::Process(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_parallel(&self) -> Option<&ParallelNode> {
        match self {
            Node::Parallel(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_task_invocation(&self) -> Option<&TaskInvocationNode> {
        match self {
            Node::TaskInvocation(node) => Some(node),
            _ => None,
        }
    }

    /// Branches owned by this node (empty for non-parallel nodes)
    pub fn branches(&self) -> &[SubWorkflow] {
        match self {
            Node::Parallel(node) => &node.branches,
            _ => &[],
        }
    }
}

impl From<ProcessNode> for Node {
    fn from(node: ProcessNode) -> Self {
        Node::Process(node)
    }
}

impl From<ParallelNode> for Node {
    fn from(node: ParallelNode) -> Self {
        Node::Parallel(node)
    }
}

impl From<TaskInvocationNode> for Node {
    fn from(node: TaskInvocationNode) -> Self {
        Node::TaskInvocation(node)
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        match self {
            Node::Process(node) => {
                map.serialize_entry("Type", "Task")?;
                map.serialize_entry("Resource", &node.resource)?;
                if !node.parameters.is_empty() {
                    map.serialize_entry("Parameters", &PathFields(&node.parameters))?;
                }
                if let Some(result_path) = &node.result_path {
                    map.serialize_entry("ResultPath", result_path)?;
                }
                if !node.retry.is_empty() {
                    map.serialize_entry("Retry", &node.retry)?;
                }
                node.transition.serialize_into(&mut map)?;
            }
            Node::Parallel(node) => {
                map.serialize_entry("Type", "Parallel")?;
                map.serialize_entry("Branches", &node.branches)?;
                node.transition.serialize_into(&mut map)?;
            }
            Node::TaskInvocation(node) => {
                map.serialize_entry("Type", "Task")?;
                map.serialize_entry("Resource", &node.resource)?;
                map.serialize_entry(
                    "Parameters",
                    &TaskParameters {
                        function_name: &node.function_name,
                        payload: PathFields(&node.payload),
                    },
                )?;
                Transition::End.serialize_into(&mut map)?;
            }
        }
        map.end()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct TaskParameters<'a> {
    function_name: &'a str,
    payload: PathFields<'a>,
}

/// Insertion-ordered node mapping with unique identifiers
///
/// Only constructed through `StatesBuilder`, which enforces uniqueness and
/// transition targets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct States {
    pub(crate) entries: Vec<(NodeId, Node)>,
}

impl States {
    pub fn get(&self, id: &str) -> Option<&Node> {
        self.entries
            .iter()
            .find(|(node_id, _)| node_id == id)
            .map(|(_, node)| node)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(id, _)| id.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.entries.iter().map(|(id, node)| (id.as_str(), node))
    }

    /// Search this mapping and every nested branch for a node
    pub fn find(&self, id: &str) -> Option<&Node> {
        if let Some(node) = self.get(id) {
            return Some(node);
        }
        self.entries
            .iter()
            .flat_map(|(_, node)| node.branches())
            .find_map(|branch| branch.states.find(id))
    }

    /// Number of nodes in this mapping and all nested branches
    pub fn count_deep(&self) -> usize {
        self.entries
            .iter()
            .map(|(_, node)| {
                1 + node
                    .branches()
                    .iter()
                    .map(|branch| branch.states.count_deep())
                    .sum::<usize>()
            })
            .sum()
    }
}

impl Serialize for States {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (id, node) in &self.entries {
            map.serialize_entry(id, node)?;
        }
        map.end()
    }
}

/// Nested document describing one parallel branch
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SubWorkflow {
    pub start_at: NodeId,
    pub states: States,
}

/// Complete generated workflow document
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct WorkflowDocument {
    pub comment: String,
    pub start_at: NodeId,
    pub states: States,
}

impl WorkflowDocument {
    /// Top-level node lookup
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.states.get(id)
    }

    /// Lookup through top-level nodes and all nested branches
    pub fn find_node(&self, id: &str) -> Option<&Node> {
        self.states.find(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn stage_descriptor_reads_single_key_shape() {
        let stage: StageDescriptor =
            serde_json::from_value(json!({ "build": { "tasks": ["lint", "test"] } })).unwrap();

        assert_eq!(stage, StageDescriptor::new("build", ["lint", "test"]));
        assert_eq!(
            serde_json::to_value(&stage).unwrap(),
            json!({ "build": { "tasks": ["lint", "test"] } })
        );
    }

    #[test]
    fn stage_descriptor_rejects_multiple_keys() {
        let result: Result<StageDescriptor, _> = serde_json::from_value(json!({
            "build": { "tasks": [] },
            "deploy": { "tasks": [] }
        }));

        let message = result.unwrap_err().to_string();
        assert!(message.contains("exactly one key"), "{}", message);
    }

    #[test]
    fn derived_identifiers() {
        assert_eq!(process_node_id("build"), "build");
        assert_eq!(tasks_node_id("build"), "build-tasks");
        assert_eq!(task_node_id("build", "lint"), "build-lint");
    }

    #[test]
    fn transition_serializes_next_or_end() {
        let next = Node::Parallel(ParallelNode {
            branches: Vec::new(),
            transition: Transition::Next("deploy".into()),
        });
        let end = Node::Parallel(ParallelNode {
            branches: Vec::new(),
            transition: Transition::End,
        });

        assert_eq!(
            serde_json::to_value(&next).unwrap(),
            json!({ "Type": "Parallel", "Branches": [], "Next": "deploy" })
        );
        assert_eq!(
            serde_json::to_value(&end).unwrap(),
            json!({ "Type": "Parallel", "Branches": [], "End": true })
        );
    }

    #[test]
    fn task_invocation_wraps_payload_in_parameters() {
        let node = Node::TaskInvocation(TaskInvocationNode {
            resource: "arn:aws:states:::lambda:invoke.waitForTaskToken".into(),
            function_name: "worker".into(),
            payload: vec![PathField::new("token", "$$.Task.Token")],
        });

        assert_eq!(
            serde_json::to_value(&node).unwrap(),
            json!({
                "Type": "Task",
                "Resource": "arn:aws:states:::lambda:invoke.waitForTaskToken",
                "Parameters": {
                    "FunctionName": "worker",
                    "Payload": { "token.$": "$$.Task.Token" }
                },
                "End": true
            })
        );
    }

    #[test]
    fn process_node_omits_empty_blocks() {
        let node = Node::Process(ProcessNode {
            resource: "fn".into(),
            parameters: Vec::new(),
            result_path: Some("$.buildResult".into()),
            retry: Vec::new(),
            transition: Transition::Next("build-tasks".into()),
        });

        assert_eq!(
            serde_json::to_value(&node).unwrap(),
            json!({
                "Type": "Task",
                "Resource": "fn",
                "ResultPath": "$.buildResult",
                "Next": "build-tasks"
            })
        );
    }

    #[test]
    fn whole_backoff_rate_is_written_as_integer() {
        let mut retry = RetryPolicy {
            error_equals: vec!["States.ALL".to_string()],
            interval_seconds: 1,
            max_attempts: 3,
            backoff_rate: 2.0,
        };
        assert_eq!(
            serde_json::to_string(&retry).unwrap(),
            r#"{"ErrorEquals":["States.ALL"],"IntervalSeconds":1,"MaxAttempts":3,"BackoffRate":2}"#
        );

        retry.backoff_rate = 1.5;
        assert_eq!(serde_json::to_value(&retry).unwrap()["BackoffRate"], json!(1.5));
    }
}
