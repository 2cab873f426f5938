/// Configuration management for Stagecraft
///
/// Handles server configuration, database location, and the generator's worker
/// references, retry defaults and input policy.

use crate::workflow::types::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Default process step invocation target
pub const DEFAULT_PROCESS_RESOURCE: &str =
    "arn:aws:lambda:us-east-1:657907747545:function:workflow-process-lambda:$LATEST";

/// Default callback-token integration used by task invocations
pub const DEFAULT_TASK_RESOURCE: &str = "arn:aws:states:::lambda:invoke.waitForTaskToken";

/// Default worker function receiving task payloads
pub const DEFAULT_TASK_FUNCTION: &str = "workflow-parallel-task-lambda";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Workflow document generation
    pub generator: GeneratorConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server bind address (e.g., "0.0.0.0")
    pub host: String,
    /// Server port number
    pub port: u16,
}

/// SQLite storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Directory holding the database file (default: "data")
    pub data_dir: String,
    /// Upper bound of pooled connections
    pub max_connections: u32,
}

/// Settings applied identically to every generated document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Free-text `Comment` of the document root
    pub comment: String,
    /// Target of every stage process node
    pub process_resource: String,
    /// Target of every task invocation node
    pub task_resource: String,
    /// Worker function named in task invocation parameters
    pub task_function_name: String,
    /// Retry block attached to flat-parallel process nodes
    pub retry: RetryPolicy,
    /// How degenerate stage lists are treated
    pub input_policy: InputPolicy,
}

/// Treatment of degenerate generator input
///
/// `Strict` rejects empty stage lists and stages without tasks. `Permissive` lets them
/// through: an empty stage yields a parallel node with zero branches, and an empty list
/// yields a flat-parallel root with zero branches. Duplicate node identifiers and empty
/// names are rejected under both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputPolicy {
    #[default]
    Strict,
    Permissive,
}

impl FromStr for InputPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(InputPolicy::Strict),
            "permissive" => Ok(InputPolicy::Permissive),
            other => Err(format!("unknown input policy: {}", other)),
        }
    }
}

impl Default for RetryPolicy {
    /// Transient invocation failures, retried 3 times starting at 1s and doubling
    fn default() -> Self {
        Self {
            error_equals: [
                "Lambda.ServiceException",
                "Lambda.AWSLambdaException",
                "Lambda.SdkClientException",
                "Lambda.TooManyRequestsException",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            interval_seconds: 1,
            max_attempts: 3,
            backoff_rate: 2.0,
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            comment: "My test workflow state machine".to_string(),
            process_resource: DEFAULT_PROCESS_RESOURCE.to_string(),
            task_resource: DEFAULT_TASK_RESOURCE.to_string(),
            task_function_name: DEFAULT_TASK_FUNCTION.to_string(),
            retry: RetryPolicy::default(),
            input_policy: InputPolicy::default(),
        }
    }
}

impl GeneratorConfig {
    /// Defaults overridden by STAGECRAFT_* environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let input_policy = match std::env::var("STAGECRAFT_INPUT_POLICY") {
            Ok(value) => value.parse().unwrap_or_else(|e| {
                tracing::warn!("{}, falling back to {:?}", e, defaults.input_policy);
                defaults.input_policy
            }),
            Err(_) => defaults.input_policy,
        };

        Self {
            comment: std::env::var("STAGECRAFT_COMMENT").unwrap_or(defaults.comment),
            process_resource: std::env::var("STAGECRAFT_PROCESS_RESOURCE")
                .unwrap_or(defaults.process_resource),
            task_resource: std::env::var("STAGECRAFT_TASK_RESOURCE")
                .unwrap_or(defaults.task_resource),
            task_function_name: std::env::var("STAGECRAFT_TASK_FUNCTION")
                .unwrap_or(defaults.task_function_name),
            retry: defaults.retry,
            input_policy,
        }
    }
}

impl Default for Config {
    /// Default configuration with ENV_VAR support for container deployment
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: std::env::var("STAGECRAFT_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: std::env::var("STAGECRAFT_PORT")
                    .unwrap_or_else(|_| "3004".to_string())
                    .parse()
                    .unwrap_or(3004),
            },
            database: DatabaseConfig {
                data_dir: std::env::var("STAGECRAFT_DATA_DIR")
                    .unwrap_or_else(|_| "data".to_string()),
                max_connections: std::env::var("STAGECRAFT_DB_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(5),
            },
            generator: GeneratorConfig::from_env(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_defaults() {
        let retry = RetryPolicy::default();
        assert_eq!(retry.error_equals.len(), 4);
        assert_eq!(retry.interval_seconds, 1);
        assert_eq!(retry.max_attempts, 3);
        assert_eq!(retry.backoff_rate, 2.0);
    }

    #[test]
    fn input_policy_parses_case_insensitively() {
        assert_eq!("Permissive".parse::<InputPolicy>(), Ok(InputPolicy::Permissive));
        assert_eq!("strict".parse::<InputPolicy>(), Ok(InputPolicy::Strict));
        assert!("lenient".parse::<InputPolicy>().is_err());
    }
}
