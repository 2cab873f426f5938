/// Workflow definition generator
///
/// Turns an ordered stage list into a state-machine document. Two topologies are
/// offered and callers pick one explicitly:
///
/// - `FlatParallel`: a root `stages` parallel node with one branch per stage; each branch
///   runs the stage's process node and then fans out to its tasks. Process nodes forward
///   the whole payload plus their own name and carry the configured retry block.
/// - `SequentialChain`: stages run one after another, each process node followed by its
///   own task fan-out. Process results land in `$.<stage>Result`, there is no retry block,
///   and task payloads forward only correlation fields (no upstream payload).
///
/// The differences between the two (retry, task payload, result placement) are kept as
/// they are because existing consumers read these shapes; they are not reconciled here.

use crate::config::{GeneratorConfig, InputPolicy};
use crate::workflow::builder::StatesBuilder;
use crate::workflow::error::GenerateError;
use crate::workflow::types::{
    process_node_id, task_node_id, tasks_node_id, NodeId, ParallelNode, PathField, ProcessNode,
    StageDescriptor, SubWorkflow, TaskInvocationNode, Transition, WorkflowDocument,
    STAGES_NODE_ID,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Whole running payload
pub const PAYLOAD_PATH: &str = "$";
/// Name of the node being executed
pub const STATE_NAME_PATH: &str = "$$.State.Name";
/// Execution identifier
pub const EXECUTION_ID_PATH: &str = "$$.Execution.Id";
/// Callback token handed to the worker
pub const TASK_TOKEN_PATH: &str = "$$.Task.Token";

/// Document topology, chosen by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topology {
    FlatParallel,
    SequentialChain,
}

impl Topology {
    pub fn as_str(&self) -> &'static str {
        match self {
            Topology::FlatParallel => "flat_parallel",
            Topology::SequentialChain => "sequential_chain",
        }
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Topology {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "flat_parallel" => Ok(Topology::FlatParallel),
            "sequential_chain" => Ok(Topology::SequentialChain),
            other => Err(format!("unknown topology: {}", other)),
        }
    }
}

/// Fields forwarded to a task worker
#[derive(Debug, Clone, Copy)]
enum TaskPayload {
    /// Correlation fields plus the upstream payload
    WithUpstream,
    /// Correlation fields only
    CorrelationOnly,
}

impl TaskPayload {
    fn fields(self) -> Vec<PathField> {
        match self {
            TaskPayload::WithUpstream => vec![
                PathField::new("executionArn", EXECUTION_ID_PATH),
                PathField::new("token", TASK_TOKEN_PATH),
                PathField::new("taskName", STATE_NAME_PATH),
                PathField::new("payload", PAYLOAD_PATH),
            ],
            TaskPayload::CorrelationOnly => vec![
                PathField::new("executionArn", EXECUTION_ID_PATH),
                PathField::new("token", TASK_TOKEN_PATH),
                PathField::new("stateName", STATE_NAME_PATH),
            ],
        }
    }
}

/// Pure, deterministic stage list to document transformation
///
/// Holds no mutable state; a single instance can serve concurrent callers.
#[derive(Debug, Clone, Default)]
pub struct WorkflowGenerator {
    config: GeneratorConfig,
}

impl WorkflowGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate a document with the given topology
    pub fn generate(
        &self,
        topology: Topology,
        stages: &[StageDescriptor],
    ) -> Result<WorkflowDocument, GenerateError> {
        match topology {
            Topology::FlatParallel => self.flat_parallel(stages),
            Topology::SequentialChain => self.sequential_chain(stages),
        }
    }

    /// One root parallel node, one branch per stage
    pub fn flat_parallel(&self, stages: &[StageDescriptor]) -> Result<WorkflowDocument, GenerateError> {
        self.validate(stages, Topology::FlatParallel)?;
        tracing::debug!("Generating flat-parallel document for {} stages", stages.len());

        let mut branches = Vec::with_capacity(stages.len());
        for stage in stages {
            let process_id = process_node_id(&stage.name);
            let tasks_id = tasks_node_id(&stage.name);

            let process = ProcessNode {
                resource: self.config.process_resource.clone(),
                parameters: vec![
                    PathField::new("payload", PAYLOAD_PATH),
                    PathField::new("stateName", STATE_NAME_PATH),
                ],
                result_path: Some(PAYLOAD_PATH.to_string()),
                retry: vec![self.config.retry.clone()],
                transition: Transition::Next(tasks_id.clone()),
            };
            let fan_out = ParallelNode {
                branches: self.task_branches(stage, TaskPayload::WithUpstream)?,
                transition: Transition::End,
            };

            let mut states = StatesBuilder::new();
            states.insert(process_id.clone(), process)?.insert(tasks_id, fan_out)?;
            branches.push(states.into_sub_workflow(process_id)?);
        }

        let mut root = StatesBuilder::new();
        root.insert(
            STAGES_NODE_ID,
            ParallelNode {
                branches,
                transition: Transition::End,
            },
        )?;
        root.into_document(self.config.comment.clone(), STAGES_NODE_ID)
    }

    /// Stages chained one after another, each followed by its task fan-out
    pub fn sequential_chain(
        &self,
        stages: &[StageDescriptor],
    ) -> Result<WorkflowDocument, GenerateError> {
        self.validate(stages, Topology::SequentialChain)?;
        let first = stages.first().ok_or(GenerateError::EmptyStageList)?;
        tracing::debug!("Generating sequential-chain document for {} stages", stages.len());

        let mut states = StatesBuilder::new();
        for (index, stage) in stages.iter().enumerate() {
            let tasks_id = tasks_node_id(&stage.name);
            let after_tasks = match stages.get(index + 1) {
                Some(next) => Transition::Next(process_node_id(&next.name)),
                None => Transition::End,
            };

            states.insert(
                process_node_id(&stage.name),
                ProcessNode {
                    resource: self.config.process_resource.clone(),
                    parameters: Vec::new(),
                    result_path: Some(format!("$.{}Result", stage.name)),
                    retry: Vec::new(),
                    transition: Transition::Next(tasks_id.clone()),
                },
            )?;
            states.insert(
                tasks_id,
                ParallelNode {
                    branches: self.task_branches(stage, TaskPayload::CorrelationOnly)?,
                    transition: after_tasks,
                },
            )?;
        }

        states.into_document(self.config.comment.clone(), process_node_id(&first.name))
    }

    fn task_branches(
        &self,
        stage: &StageDescriptor,
        payload: TaskPayload,
    ) -> Result<Vec<SubWorkflow>, GenerateError> {
        stage
            .tasks
            .iter()
            .map(|task| {
                let id = task_node_id(&stage.name, task);
                let mut states = StatesBuilder::new();
                states.insert(
                    id.clone(),
                    TaskInvocationNode {
                        resource: self.config.task_resource.clone(),
                        function_name: self.config.task_function_name.clone(),
                        payload: payload.fields(),
                    },
                )?;
                states.into_sub_workflow(id)
            })
            .collect()
    }

    /// Check names, derived identifier uniqueness and the configured input policy
    fn validate(&self, stages: &[StageDescriptor], topology: Topology) -> Result<(), GenerateError> {
        let strict = self.config.input_policy == InputPolicy::Strict;

        if stages.is_empty() && (strict || topology == Topology::SequentialChain) {
            return Err(GenerateError::EmptyStageList);
        }

        let mut ids: HashSet<NodeId> = HashSet::new();
        if topology == Topology::FlatParallel {
            ids.insert(STAGES_NODE_ID.to_string());
        }
        let mut claim = |id: NodeId| {
            if ids.insert(id.clone()) {
                Ok(())
            } else {
                Err(GenerateError::DuplicateNodeId { id })
            }
        };

        for (index, stage) in stages.iter().enumerate() {
            if stage.name.is_empty() {
                return Err(GenerateError::EmptyStageName { index });
            }
            if stage.tasks.is_empty() {
                if strict {
                    return Err(GenerateError::EmptyStage {
                        stage: stage.name.clone(),
                    });
                }
                tracing::warn!("Stage '{}' has no tasks, its fan-out will have no branches", stage.name);
            }

            claim(process_node_id(&stage.name))?;
            claim(tasks_node_id(&stage.name))?;
            for task in &stage.tasks {
                if task.is_empty() {
                    return Err(GenerateError::EmptyTaskName {
                        stage: stage.name.clone(),
                    });
                }
                claim(task_node_id(&stage.name, task))?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn generator(policy: InputPolicy) -> WorkflowGenerator {
        WorkflowGenerator::new(GeneratorConfig {
            input_policy: policy,
            ..GeneratorConfig::default()
        })
    }

    #[test]
    fn topology_round_trips_through_str() {
        for topology in [Topology::FlatParallel, Topology::SequentialChain] {
            assert_eq!(topology.as_str().parse::<Topology>(), Ok(topology));
        }
        assert!("diamond".parse::<Topology>().is_err());
    }

    #[test]
    fn flat_parallel_single_stage_document() {
        let document = generator(InputPolicy::Strict)
            .flat_parallel(&[StageDescriptor::new("build", ["lint"])])
            .unwrap();

        assert_eq!(
            serde_json::to_value(&document).unwrap(),
            json!({
                "Comment": "My test workflow state machine",
                "StartAt": "stages",
                "States": {
                    "stages": {
                        "Type": "Parallel",
                        "Branches": [{
                            "StartAt": "build",
                            "States": {
                                "build": {
                                    "Type": "Task",
                                    "Resource": crate::config::DEFAULT_PROCESS_RESOURCE,
                                    "Parameters": {
                                        "payload.$": "$",
                                        "stateName.$": "$$.State.Name"
                                    },
                                    "ResultPath": "$",
                                    "Retry": [{
                                        "ErrorEquals": [
                                            "Lambda.ServiceException",
                                            "Lambda.AWSLambdaException",
                                            "Lambda.SdkClientException",
                                            "Lambda.TooManyRequestsException"
                                        ],
                                        "IntervalSeconds": 1,
                                        "MaxAttempts": 3,
                                        "BackoffRate": 2
                                    }],
                                    "Next": "build-tasks"
                                },
                                "build-tasks": {
                                    "Type": "Parallel",
                                    "Branches": [{
                                        "StartAt": "build-lint",
                                        "States": {
                                            "build-lint": {
                                                "Type": "Task",
                                                "Resource": "arn:aws:states:::lambda:invoke.waitForTaskToken",
                                                "Parameters": {
                                                    "FunctionName": "workflow-parallel-task-lambda",
                                                    "Payload": {
                                                        "executionArn.$": "$$.Execution.Id",
                                                        "token.$": "$$.Task.Token",
                                                        "taskName.$": "$$.State.Name",
                                                        "payload.$": "$"
                                                    }
                                                },
                                                "End": true
                                            }
                                        }
                                    }],
                                    "End": true
                                }
                            }
                        }],
                        "End": true
                    }
                }
            })
        );
    }

    #[test]
    fn sequential_chain_uses_stage_scoped_result_and_no_retry() {
        let document = generator(InputPolicy::Strict)
            .sequential_chain(&[StageDescriptor::new("build", ["lint"])])
            .unwrap();

        let process = document.node("build").and_then(|n| n.as_process()).unwrap();
        assert_eq!(process.result_path.as_deref(), Some("$.buildResult"));
        assert!(process.retry.is_empty());
        assert!(process.parameters.is_empty());

        let task = document
            .find_node("build-lint")
            .and_then(|n| n.as_task_invocation())
            .unwrap();
        let keys: Vec<String> = task.payload.iter().map(PathField::key).collect();
        assert_eq!(keys, vec!["executionArn.$", "token.$", "stateName.$"]);
    }

    #[test]
    fn stage_named_like_root_collides_in_flat_parallel_only() {
        let stages = [StageDescriptor::new("stages", ["a"])];

        assert_eq!(
            generator(InputPolicy::Strict).flat_parallel(&stages).unwrap_err(),
            GenerateError::DuplicateNodeId { id: "stages".into() }
        );
        assert!(generator(InputPolicy::Strict).sequential_chain(&stages).is_ok());
    }

    #[test]
    fn empty_names_are_rejected_under_any_policy() {
        for policy in [InputPolicy::Strict, InputPolicy::Permissive] {
            assert_eq!(
                generator(policy)
                    .flat_parallel(&[StageDescriptor::new("", ["a"])])
                    .unwrap_err(),
                GenerateError::EmptyStageName { index: 0 }
            );
            assert_eq!(
                generator(policy)
                    .sequential_chain(&[StageDescriptor::new("build", [""])])
                    .unwrap_err(),
                GenerateError::EmptyTaskName { stage: "build".into() }
            );
        }
    }
}
