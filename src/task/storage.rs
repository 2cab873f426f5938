/// SQLite persistence for task meta documents

use crate::task::types::{MetaDoc, NewMetaDoc};
use anyhow::Result;
use sqlx::{sqlite::SqlitePool, sqlite::SqliteRow, Row};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct MetaDocStorage {
    pool: SqlitePool,
}

impl MetaDocStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS metadocs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                tasks_id TEXT NOT NULL,
                created_by TEXT NOT NULL,
                doc_name TEXT NOT NULL,
                doc_url TEXT NOT NULL,
                created_time TEXT NOT NULL,
                type TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_metadocs_tasks_id ON metadocs(tasks_id)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Insert a validated document for a task and return the stored row
    pub async fn insert(&self, task_id: Uuid, doc: &NewMetaDoc) -> Result<MetaDoc> {
        let created_time = chrono::Utc::now().to_rfc3339();

        let row = sqlx::query(
            r#"
            INSERT INTO metadocs (tasks_id, created_by, doc_name, doc_url, created_time, type)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id, tasks_id, created_by, doc_name, doc_url, created_time, type
            "#,
        )
        .bind(task_id.to_string())
        .bind(&doc.created_by)
        .bind(&doc.doc_name)
        .bind(&doc.doc_url)
        .bind(&created_time)
        .bind(&doc.doc_type)
        .fetch_one(&self.pool)
        .await?;

        Ok(meta_doc_from_row(&row))
    }

    /// Documents attached to a task, oldest first
    pub async fn list_for_task(&self, task_id: Uuid) -> Result<Vec<MetaDoc>> {
        let rows = sqlx::query(
            r#"
            SELECT id, tasks_id, created_by, doc_name, doc_url, created_time, type
            FROM metadocs WHERE tasks_id = ? ORDER BY id
            "#,
        )
        .bind(task_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(meta_doc_from_row).collect())
    }
}

fn meta_doc_from_row(row: &SqliteRow) -> MetaDoc {
    MetaDoc {
        id: row.get("id"),
        tasks_id: row.get("tasks_id"),
        created_by: row.get("created_by"),
        doc_name: row.get("doc_name"),
        doc_url: row.get("doc_url"),
        created_time: row.get("created_time"),
        doc_type: row.get("type"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    #[tokio::test]
    async fn insert_returns_stored_row() {
        let storage = MetaDocStorage::new(db::open_in_memory().await.unwrap());
        let task_id = Uuid::new_v4();
        let doc = NewMetaDoc {
            created_by: Uuid::new_v4().to_string(),
            doc_name: "design".to_string(),
            doc_url: "https://docs.example.com/design.pdf".to_string(),
            doc_type: "brief".to_string(),
        };

        let stored = storage.insert(task_id, &doc).await.unwrap();
        assert_eq!(stored.tasks_id, task_id.to_string());
        assert_eq!(stored.doc_type, "brief");
        assert!(chrono::DateTime::parse_from_rfc3339(&stored.created_time).is_ok());

        let listed = storage.list_for_task(task_id).await.unwrap();
        assert_eq!(listed, vec![stored]);
        assert!(storage.list_for_task(Uuid::new_v4()).await.unwrap().is_empty());
    }
}
