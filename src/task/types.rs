/// Task meta document types and validation rules

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

/// Message returned for malformed UUIDs
pub const INVALID_UUID: &str = "Invalid uuid";

/// Message reported for a missing body field
pub const REQUIRED: &str = "Required";

/// Request body for attaching a meta document to a task
///
/// Every field is optional at the serde level so a missing field is reported
/// alongside the other field errors instead of failing deserialization.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct MetaDocUpload {
    /// Account that created the document
    #[serde(rename = "createdBy")]
    #[validate(required(message = "Required"), custom(function = "validate_uuid"))]
    pub created_by: Option<String>,
    #[validate(required(message = "Required"))]
    pub doc_name: Option<String>,
    #[validate(required(message = "Required"), url(message = "invalid string"))]
    pub doc_url: Option<String>,
    /// Document kind (e.g., "brief", "report")
    #[serde(rename = "type")]
    #[validate(
        required(message = "Required"),
        length(min = 3, message = "type must be at least 3 characters")
    )]
    pub doc_type: Option<String>,
}

impl MetaDocUpload {
    /// Validate the body and turn it into an insertable document
    pub fn into_meta_doc(self) -> Result<NewMetaDoc, ValidationErrors> {
        self.validate()?;
        Ok(NewMetaDoc {
            created_by: self.created_by.unwrap_or_default(),
            doc_name: self.doc_name.unwrap_or_default(),
            doc_url: self.doc_url.unwrap_or_default(),
            doc_type: self.doc_type.unwrap_or_default(),
        })
    }
}

/// A validated meta document ready for insertion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMetaDoc {
    #[serde(rename = "createdBy")]
    pub created_by: String,
    pub doc_name: String,
    pub doc_url: String,
    #[serde(rename = "type")]
    pub doc_type: String,
}

/// A stored meta document row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaDoc {
    pub id: i64,
    pub tasks_id: String,
    pub created_by: String,
    pub doc_name: String,
    pub doc_url: String,
    /// RFC 3339 UTC timestamp
    pub created_time: String,
    #[serde(rename = "type")]
    pub doc_type: String,
}

fn validate_uuid(value: &str) -> Result<(), ValidationError> {
    Uuid::parse_str(value).map(|_| ()).map_err(|_| {
        let mut error = ValidationError::new("uuid");
        error.message = Some(Cow::Borrowed(INVALID_UUID));
        error
    })
}

/// Parse a task id path segment
pub fn parse_task_id(raw: &str) -> Result<Uuid, String> {
    Uuid::parse_str(raw).map_err(|_| INVALID_UUID.to_string())
}
