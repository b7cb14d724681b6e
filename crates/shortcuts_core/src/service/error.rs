//! Error taxonomy surfaced by store operations.

use crate::model::group::MembershipError;
use crate::model::validation::RecordValidationError;
use crate::repo::document_repo::RepoError;
use crate::verify::UrlError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Error returned by `ShortcutStore` operations.
#[derive(Debug)]
pub enum StoreError {
    /// Named entity (setting, task owner) does not exist.
    NotFound(String),
    /// Id is already taken, or listed twice in a reorder request.
    AlreadyExists(String),
    /// Group has no member tasks.
    EmptyGroup(String),
    TaskNotFoundInGroup { group: String, task: String },
    TaskAlreadyInGroup { group: String, task: String },
    /// Id is not a key of the save file.
    NotInDocument(String),
    InvalidUrl(UrlError),
    Validation(RecordValidationError),
    /// Persisted record does not match the expected shape.
    InvalidData(String),
    Repo(RepoError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(name) => write!(f, "'{name}' not found"),
            Self::AlreadyExists(name) => write!(f, "'{name}' already exists"),
            Self::EmptyGroup(group) => write!(f, "no tasks found in {group}"),
            Self::TaskNotFoundInGroup { group, task } => {
                write!(f, "task {task} not found in {group}")
            }
            Self::TaskAlreadyInGroup { group, task } => {
                write!(f, "task {task} is already a member of {group}")
            }
            Self::NotInDocument(id) => write!(f, "{id} not found in save file"),
            Self::InvalidUrl(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid save data: {message}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidUrl(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<RecordValidationError> for StoreError {
    fn from(value: RecordValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<UrlError> for StoreError {
    fn from(value: UrlError) -> Self {
        Self::InvalidUrl(value)
    }
}

impl From<MembershipError> for StoreError {
    fn from(value: MembershipError) -> Self {
        match value {
            MembershipError::AlreadyMember { group, task } => {
                Self::TaskAlreadyInGroup { group, task }
            }
            MembershipError::NotMember { group, task } => Self::TaskNotFoundInGroup { group, task },
            MembershipError::Empty { group } => Self::EmptyGroup(group),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::StoreError;
    use crate::model::group::MembershipError;

    #[test]
    fn messages_match_launcher_wording() {
        assert_eq!(
            StoreError::NotInDocument("T_1".to_string()).to_string(),
            "T_1 not found in save file"
        );
        assert_eq!(
            StoreError::NotFound("theme".to_string()).to_string(),
            "'theme' not found"
        );
    }

    #[test]
    fn membership_errors_map_to_store_variants() {
        let err: StoreError = MembershipError::Empty {
            group: "Work".to_string(),
        }
        .into();
        assert!(matches!(err, StoreError::EmptyGroup(group) if group == "Work"));
    }
}
