/// SQLite persistence layer for generated workflow definitions
///
/// Definitions are stored as JSON next to the stage list and topology they were
/// generated from, so they can be listed, fetched and regenerated.

use crate::workflow::generator::Topology;
use crate::workflow::types::StageDescriptor;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{sqlite::SqlitePool, Row};

/// A generated definition as persisted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredWorkflow {
    /// Unique workflow identifier (e.g., "wf-release")
    pub id: String,
    /// Human-readable workflow name
    pub name: String,
    pub topology: Topology,
    /// Stage list the definition was generated from
    pub stages: Vec<StageDescriptor>,
    /// Generated document
    pub definition: Value,
}

/// SQLite-based workflow definition storage
#[derive(Debug, Clone)]
pub struct WorkflowStorage {
    /// SQLite connection pool
    pool: SqlitePool,
}

impl WorkflowStorage {
    /// Create new storage instance with database connection
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Initialize the workflow storage schema
    ///
    /// Safe to call multiple times (uses IF NOT EXISTS).
    pub async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS workflows (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                topology TEXT NOT NULL,
                stages JSON NOT NULL,
                definition JSON NOT NULL,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_workflows_name ON workflows(name)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Store a new workflow, leaving any existing row with the same ID untouched
    ///
    /// Returns false when the ID is already taken. The existence check and the insert
    /// are a single statement, so concurrent creations cannot both succeed.
    pub async fn create_workflow(&self, workflow: &StoredWorkflow) -> Result<bool> {
        let stages_json = serde_json::to_string(&workflow.stages)?;
        let definition_json = serde_json::to_string(&workflow.definition)?;

        let result = sqlx::query(
            r#"
            INSERT INTO workflows (id, name, topology, stages, definition)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(id) DO NOTHING
            "#,
        )
        .bind(&workflow.id)
        .bind(&workflow.name)
        .bind(workflow.topology.as_str())
        .bind(&stages_json)
        .bind(&definition_json)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Store a new workflow or update existing one
    ///
    /// Uses UPSERT to handle both create and update operations atomically.
    pub async fn save_workflow(&self, workflow: &StoredWorkflow) -> Result<()> {
        let stages_json = serde_json::to_string(&workflow.stages)?;
        let definition_json = serde_json::to_string(&workflow.definition)?;

        sqlx::query(
            r#"
            INSERT INTO workflows (id, name, topology, stages, definition, updated_at)
            VALUES (?, ?, ?, ?, ?, CURRENT_TIMESTAMP)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                topology = excluded.topology,
                stages = excluded.stages,
                definition = excluded.definition,
                updated_at = CURRENT_TIMESTAMP
            "#,
        )
        .bind(&workflow.id)
        .bind(&workflow.name)
        .bind(workflow.topology.as_str())
        .bind(&stages_json)
        .bind(&definition_json)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Retrieve a workflow by ID
    pub async fn get_workflow(&self, id: &str) -> Result<Option<StoredWorkflow>> {
        let row = sqlx::query(
            "SELECT id, name, topology, stages, definition FROM workflows WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let topology: String = row.get("topology");
                let stages_json: String = row.get("stages");
                let definition_json: String = row.get("definition");
                Ok(Some(StoredWorkflow {
                    id: row.get("id"),
                    name: row.get("name"),
                    topology: topology.parse().map_err(anyhow::Error::msg)?,
                    stages: serde_json::from_str(&stages_json)?,
                    definition: serde_json::from_str(&definition_json)?,
                }))
            }
            None => Ok(None),
        }
    }

    /// List all workflows with basic metadata
    pub async fn list_workflows(&self) -> Result<Vec<WorkflowMetadata>> {
        let rows = sqlx::query(
            "SELECT id, name, topology, created_at, updated_at FROM workflows ORDER BY updated_at DESC, id",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut workflows = Vec::new();
        for row in rows {
            workflows.push(WorkflowMetadata {
                id: row.get("id"),
                name: row.get("name"),
                topology: row.get("topology"),
                created_at: row.get("created_at"),
                updated_at: row.get("updated_at"),
            });
        }

        Ok(workflows)
    }

    /// Delete a workflow by ID
    pub async fn delete_workflow(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM workflows WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Basic workflow metadata for listing operations
#[derive(Debug, serde::Serialize)]
pub struct WorkflowMetadata {
    pub id: String,
    pub name: String,
    pub topology: String,
    pub created_at: String,
    pub updated_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use serde_json::json;

    fn stored(id: &str) -> StoredWorkflow {
        StoredWorkflow {
            id: id.to_string(),
            name: "Release".to_string(),
            topology: Topology::SequentialChain,
            stages: vec![StageDescriptor::new("build", ["lint"])],
            definition: json!({ "StartAt": "build" }),
        }
    }

    #[tokio::test]
    async fn save_get_delete() {
        let storage = WorkflowStorage::new(db::open_in_memory().await.unwrap());

        storage.save_workflow(&stored("wf-1")).await.unwrap();
        let loaded = storage.get_workflow("wf-1").await.unwrap().unwrap();
        assert_eq!(loaded.topology, Topology::SequentialChain);
        assert_eq!(loaded.stages, vec![StageDescriptor::new("build", ["lint"])]);
        assert_eq!(loaded.definition, json!({ "StartAt": "build" }));

        let listed = storage.list_workflows().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].topology, "sequential_chain");

        assert!(storage.delete_workflow("wf-1").await.unwrap());
        assert!(!storage.delete_workflow("wf-1").await.unwrap());
        assert!(storage.get_workflow("wf-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn create_keeps_the_first_definition() {
        let storage = WorkflowStorage::new(db::open_in_memory().await.unwrap());

        assert!(storage.create_workflow(&stored("wf-1")).await.unwrap());
        let mut renamed = stored("wf-1");
        renamed.name = "Release v2".to_string();
        assert!(!storage.create_workflow(&renamed).await.unwrap());

        let loaded = storage.get_workflow("wf-1").await.unwrap().unwrap();
        assert_eq!(loaded.name, "Release");
        assert_eq!(storage.list_workflows().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn save_is_an_upsert() {
        let storage = WorkflowStorage::new(db::open_in_memory().await.unwrap());

        storage.save_workflow(&stored("wf-1")).await.unwrap();
        let mut renamed = stored("wf-1");
        renamed.name = "Release v2".to_string();
        storage.save_workflow(&renamed).await.unwrap();

        let loaded = storage.get_workflow("wf-1").await.unwrap().unwrap();
        assert_eq!(loaded.name, "Release v2");
        assert_eq!(storage.list_workflows().await.unwrap().len(), 1);
    }
}
