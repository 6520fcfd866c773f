//! Activity log models.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// A stored activity record, as returned when a log entry is created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub id: i64,
    pub case_id: i64,
    pub user_id: i64,
    pub activity_date: String,
    pub activity_desc: String,
    pub user_input: bool,
    pub is_from_api: bool,
}

/// One entry of the activity feed (`GET /case/activities/list`): the record
/// joined with the acting user's display name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub activity_date: String,
    pub name: String,
    pub activity_desc: String,
    pub is_from_api: bool,
}

/// Request body for `POST /case/tasklog/add`.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskLogRequest {
    #[serde(default)]
    pub log_content: Option<String>,
}

impl TaskLogRequest {
    /// Schema validation: `log_content` is required and must not be blank.
    /// Failures carry per-field messages for the 400 envelope.
    pub fn validate(&self) -> Result<&str, AppError> {
        let mut fields: BTreeMap<String, Vec<String>> = BTreeMap::new();

        match self.log_content.as_deref() {
            None => {
                fields.insert(
                    "log_content".to_string(),
                    vec!["Missing data for required field.".to_string()],
                );
            }
            Some(content) if content.trim().is_empty() => {
                fields.insert(
                    "log_content".to_string(),
                    vec!["Field may not be empty.".to_string()],
                );
            }
            Some(_) => {}
        }

        if !fields.is_empty() {
            return Err(AppError::Schema {
                message: "Data error".to_string(),
                fields,
            });
        }

        Ok(self.log_content.as_deref().unwrap_or_default())
    }
}
