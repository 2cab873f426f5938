/// SQLite persistence for resources and projects
///
/// Both tables keep an id column and a JSON document column.

use crate::resource::types::{ProjectDetails, ProjectRecord, ResourceDetails, ResourceRecord};
use anyhow::Result;
use sqlx::{sqlite::SqlitePool, Row};

#[derive(Debug, Clone)]
pub struct ResourceStorage {
    pool: SqlitePool,
}

impl ResourceStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the resources and projects tables
    pub async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS resources (
                id TEXT PRIMARY KEY,
                resource JSON NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS projects (
                id TEXT PRIMARY KEY,
                project JSON NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn save_resource(&self, record: &ResourceRecord) -> Result<()> {
        let resource_json = serde_json::to_string(&record.resource)?;

        sqlx::query(
            r#"
            INSERT INTO resources (id, resource) VALUES (?, ?)
            ON CONFLICT(id) DO UPDATE SET resource = excluded.resource
            "#,
        )
        .bind(&record.id)
        .bind(&resource_json)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn save_project(&self, record: &ProjectRecord) -> Result<()> {
        let project_json = serde_json::to_string(&record.project)?;

        sqlx::query(
            r#"
            INSERT INTO projects (id, project) VALUES (?, ?)
            ON CONFLICT(id) DO UPDATE SET project = excluded.project
            "#,
        )
        .bind(&record.id)
        .bind(&project_json)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// All resources, ordered by id
    pub async fn list_resources(&self) -> Result<Vec<ResourceRecord>> {
        let rows = sqlx::query("SELECT id, resource FROM resources ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        let mut resources = Vec::with_capacity(rows.len());
        for row in rows {
            let resource_json: String = row.get("resource");
            let resource: ResourceDetails = serde_json::from_str(&resource_json)?;
            resources.push(ResourceRecord {
                id: row.get("id"),
                resource,
            });
        }

        Ok(resources)
    }

    /// Projects, optionally narrowed to a single id
    pub async fn list_projects(&self, project_id: Option<&str>) -> Result<Vec<ProjectRecord>> {
        let rows = match project_id {
            Some(id) => {
                sqlx::query("SELECT id, project FROM projects WHERE id = ? ORDER BY id")
                    .bind(id)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                sqlx::query("SELECT id, project FROM projects ORDER BY id")
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        let mut projects = Vec::with_capacity(rows.len());
        for row in rows {
            let project_json: String = row.get("project");
            let project: ProjectDetails = serde_json::from_str(&project_json)?;
            projects.push(ProjectRecord {
                id: row.get("id"),
                project,
            });
        }

        Ok(projects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    async fn seeded() -> ResourceStorage {
        let storage = ResourceStorage::new(db::open_in_memory().await.unwrap());
        for (id, name) in [("p1", "Apollo"), ("p2", "Gemini")] {
            storage
                .save_project(&ProjectRecord {
                    id: id.to_string(),
                    project: ProjectDetails {
                        name: Some(name.to_string()),
                    },
                })
                .await
                .unwrap();
        }
        storage
            .save_resource(&ResourceRecord {
                id: "r1".to_string(),
                resource: ResourceDetails {
                    name: Some("Ada".to_string()),
                    image: None,
                    email: Some("ada@example.com".to_string()),
                },
            })
            .await
            .unwrap();
        storage
    }

    #[tokio::test]
    async fn lists_all_projects_without_filter() {
        let storage = seeded().await;

        let projects = storage.list_projects(None).await.unwrap();
        assert_eq!(projects.len(), 2);
        assert_eq!(projects[0].id, "p1");
    }

    #[tokio::test]
    async fn filter_is_bound_not_interpolated() {
        let storage = seeded().await;

        let projects = storage.list_projects(Some("p2")).await.unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].project.name.as_deref(), Some("Gemini"));

        let injected = storage.list_projects(Some("' OR '1'='1")).await.unwrap();
        assert!(injected.is_empty());
    }

    #[tokio::test]
    async fn resources_round_trip_their_document() {
        let storage = seeded().await;

        let resources = storage.list_resources().await.unwrap();
        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0].resource.email.as_deref(), Some("ada@example.com"));
        assert_eq!(resources[0].resource.image, None);
    }
}
