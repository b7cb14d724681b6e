//! Task (shortcut) record.
//!
//! # Responsibility
//! - Hold the shortcut target fields: URLs, file path, directory path.
//! - Convert between the in-memory record and its persisted JSON shape.
//!
//! # Invariants
//! - `id` is unique across all tasks and groups in one document.
//! - `url` is always a list; an absent input is stored as `[]`.

use super::validation::{require_id, require_name, RecordValidationError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Shortcut record owned by exactly one group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// Document-unique id, `T_...` when generated.
    pub id: String,
    /// User-facing display name.
    pub task_name: String,
    /// Optional label rendered on the task button.
    pub button_text: Option<String>,
    /// Normalized URL list.
    pub url: Vec<String>,
    pub file_path: Option<String>,
    pub directory_path: Option<String>,
}

/// Persisted value stored under `tasks[<id>]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct TaskRecord {
    task_name: String,
    #[serde(default)]
    button_text: Option<String>,
    #[serde(default)]
    url: Vec<String>,
    #[serde(default)]
    file_path: Option<String>,
    #[serde(default)]
    directory_path: Option<String>,
}

impl Task {
    /// Creates a task with only a name; all optional fields start empty.
    pub fn new(id: impl Into<String>, task_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            task_name: task_name.into(),
            button_text: None,
            url: Vec::new(),
            file_path: None,
            directory_path: None,
        }
    }

    /// Validates id, name and URL entries.
    pub fn validate(&self) -> Result<(), RecordValidationError> {
        require_id(&self.id)?;
        require_name(&self.id, &self.task_name)?;
        if self.url.iter().any(|entry| entry.trim().is_empty()) {
            return Err(RecordValidationError::EmptyUrl {
                id: self.id.clone(),
            });
        }
        Ok(())
    }

    /// Returns the label a launcher button should show.
    pub fn display_label(&self) -> &str {
        self.button_text.as_deref().unwrap_or(&self.task_name)
    }

    pub(crate) fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(TaskRecord {
            task_name: self.task_name.clone(),
            button_text: self.button_text.clone(),
            url: self.url.clone(),
            file_path: self.file_path.clone(),
            directory_path: self.directory_path.clone(),
        })
    }

    pub(crate) fn from_value(id: &str, value: &Value) -> Result<Self, serde_json::Error> {
        let record = TaskRecord::deserialize(value)?;
        Ok(Self {
            id: id.to_string(),
            task_name: record.task_name,
            button_text: record.button_text,
            url: record.url,
            file_path: record.file_path,
            directory_path: record.directory_path,
        })
    }
}
