//! Record-level validation errors shared by groups and tasks.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Validation failure for a group or task record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordValidationError {
    /// Record id is empty or whitespace.
    EmptyId,
    /// Display name is empty or whitespace.
    EmptyName { id: String },
    /// A stored URL entry is empty or whitespace.
    EmptyUrl { id: String },
}

impl Display for RecordValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "record id must not be empty"),
            Self::EmptyName { id } => write!(f, "record `{id}` must have a non-empty name"),
            Self::EmptyUrl { id } => write!(f, "task `{id}` contains an empty url entry"),
        }
    }
}

impl Error for RecordValidationError {}

pub(crate) fn require_id(id: &str) -> Result<(), RecordValidationError> {
    if id.trim().is_empty() {
        return Err(RecordValidationError::EmptyId);
    }
    Ok(())
}

pub(crate) fn require_name(id: &str, name: &str) -> Result<(), RecordValidationError> {
    if name.trim().is_empty() {
        return Err(RecordValidationError::EmptyName { id: id.to_string() });
    }
    Ok(())
}
