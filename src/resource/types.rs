/// Resource and project type definitions
///
/// Records mirror the stored rows (an id plus a JSON document); summaries are the
/// flattened shape returned by the listing endpoint.

use serde::{Deserialize, Serialize};

/// JSON document stored for a resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceDetails {
    #[serde(default)]
    pub name: Option<String>,
    /// Avatar or picture URL
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// JSON document stored for a project
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectDetails {
    #[serde(default)]
    pub name: Option<String>,
}

/// A resource row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceRecord {
    pub id: String,
    pub resource: ResourceDetails,
}

/// A project row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub id: String,
    pub project: ProjectDetails,
}

/// Project entry nested in a resource summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectSummary {
    pub project_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    /// Projects carry no image yet, always empty
    pub project_img_url: String,
}

/// Resource listing entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceSummary {
    pub resource_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_img_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_email: Option<String>,
    pub projects: Vec<ProjectSummary>,
}

/// Flatten resources, attaching every given project to each of them
pub fn summarize(resources: &[ResourceRecord], projects: &[ProjectRecord]) -> Vec<ResourceSummary> {
    let project_summaries: Vec<ProjectSummary> = projects
        .iter()
        .map(|project| ProjectSummary {
            project_id: project.id.clone(),
            project_name: project.project.name.clone(),
            project_img_url: String::new(),
        })
        .collect();

    resources
        .iter()
        .map(|resource| ResourceSummary {
            resource_id: resource.id.clone(),
            resource_name: resource.resource.name.clone(),
            resource_img_url: resource.resource.image.clone(),
            resource_email: resource.resource.email.clone(),
            projects: project_summaries.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resource(id: &str, name: &str) -> ResourceRecord {
        ResourceRecord {
            id: id.to_string(),
            resource: ResourceDetails {
                name: Some(name.to_string()),
                image: Some(format!("https://img.example.com/{}.png", id)),
                email: None,
            },
        }
    }

    fn project(id: &str, name: &str) -> ProjectRecord {
        ProjectRecord {
            id: id.to_string(),
            project: ProjectDetails {
                name: Some(name.to_string()),
            },
        }
    }

    #[test]
    fn every_resource_lists_every_project() {
        let summaries = summarize(
            &[resource("r1", "Ada"), resource("r2", "Linus")],
            &[project("p1", "Apollo"), project("p2", "Gemini")],
        );

        assert_eq!(summaries.len(), 2);
        for summary in &summaries {
            let ids: Vec<&str> = summary.projects.iter().map(|p| p.project_id.as_str()).collect();
            assert_eq!(ids, vec!["p1", "p2"]);
        }
    }

    #[test]
    fn summary_shape() {
        let summaries = summarize(&[resource("r1", "Ada")], &[project("p1", "Apollo")]);

        assert_eq!(
            serde_json::to_value(&summaries).unwrap(),
            json!([{
                "resource_id": "r1",
                "resource_name": "Ada",
                "resource_img_url": "https://img.example.com/r1.png",
                "projects": [{
                    "project_id": "p1",
                    "project_name": "Apollo",
                    "project_img_url": ""
                }]
            }])
        );
    }

    #[test]
    fn no_resources_no_summaries() {
        assert!(summarize(&[], &[project("p1", "Apollo")]).is_empty());
    }
}
