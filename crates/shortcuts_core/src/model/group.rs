//! Group record: a named, ordered list of member task ids.
//!
//! # Invariants
//! - `group_tasks` never contains the same id twice.
//! - Iteration yields every member id in stored order.

use super::validation::{require_id, require_name, RecordValidationError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Membership rule violation on a group's task list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MembershipError {
    /// Task is already a member of the named group.
    AlreadyMember { group: String, task: String },
    /// Task is not a member of the named group.
    NotMember { group: String, task: String },
    /// Operation needs at least one member.
    Empty { group: String },
}

impl Display for MembershipError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyMember { group, task } => {
                write!(f, "task {task} is already a member of {group}")
            }
            Self::NotMember { group, task } => write!(f, "task {task} not found in {group}"),
            Self::Empty { group } => write!(f, "no tasks found in {group}"),
        }
    }
}

impl Error for MembershipError {}

/// Named ordered collection of task ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    /// Document-unique id, `G_...` when generated.
    pub id: String,
    pub group_name: String,
    group_tasks: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct GroupRecord {
    group_name: String,
    #[serde(default)]
    group_tasks: Vec<String>,
}

impl Group {
    /// Creates an empty group.
    pub fn new(id: impl Into<String>, group_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            group_name: group_name.into(),
            group_tasks: Vec::new(),
        }
    }

    /// Creates a group with an initial member list.
    ///
    /// Fails with `AlreadyMember` when `tasks` repeats an id.
    pub fn with_tasks(
        id: impl Into<String>,
        group_name: impl Into<String>,
        tasks: impl IntoIterator<Item = String>,
    ) -> Result<Self, MembershipError> {
        let mut group = Self::new(id, group_name);
        for task_id in tasks {
            group.append(task_id)?;
        }
        Ok(group)
    }

    pub fn validate(&self) -> Result<(), RecordValidationError> {
        require_id(&self.id)?;
        require_name(&self.id, &self.group_name)
    }

    /// Member task ids in order.
    pub fn task_ids(&self) -> &[String] {
        &self.group_tasks
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.group_tasks.iter()
    }

    pub fn len(&self) -> usize {
        self.group_tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.group_tasks.is_empty()
    }

    pub fn contains(&self, task_id: &str) -> bool {
        self.position(task_id).is_some()
    }

    /// Index of `task_id` in the member list.
    pub fn position(&self, task_id: &str) -> Option<usize> {
        self.group_tasks.iter().position(|member| member == task_id)
    }

    /// Inserts `task_id` at `index`, clamped to the list length.
    pub fn insert(
        &mut self,
        index: usize,
        task_id: impl Into<String>,
    ) -> Result<(), MembershipError> {
        let task_id = task_id.into();
        self.ensure_absent(&task_id)?;
        let index = index.min(self.group_tasks.len());
        self.group_tasks.insert(index, task_id);
        Ok(())
    }

    pub fn append(&mut self, task_id: impl Into<String>) -> Result<(), MembershipError> {
        let task_id = task_id.into();
        self.ensure_absent(&task_id)?;
        self.group_tasks.push(task_id);
        Ok(())
    }

    /// Removes `task_id`, returning the index it occupied.
    pub fn remove(&mut self, task_id: &str) -> Result<usize, MembershipError> {
        let index = self.position(task_id).ok_or_else(|| MembershipError::NotMember {
            group: self.group_name.clone(),
            task: task_id.to_string(),
        })?;
        self.group_tasks.remove(index);
        Ok(index)
    }

    /// Moves an existing member to `index` (clamped) within this group.
    pub fn move_to(&mut self, task_id: &str, index: usize) -> Result<(), MembershipError> {
        if self.group_tasks.is_empty() {
            return Err(MembershipError::Empty {
                group: self.group_name.clone(),
            });
        }
        self.remove(task_id)?;
        let index = index.min(self.group_tasks.len());
        self.group_tasks.insert(index, task_id.to_string());
        Ok(())
    }

    fn ensure_absent(&self, task_id: &str) -> Result<(), MembershipError> {
        if self.contains(task_id) {
            return Err(MembershipError::AlreadyMember {
                group: self.group_name.clone(),
                task: task_id.to_string(),
            });
        }
        Ok(())
    }

    pub(crate) fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(GroupRecord {
            group_name: self.group_name.clone(),
            group_tasks: self.group_tasks.clone(),
        })
    }

    pub(crate) fn from_value(id: &str, value: &Value) -> Result<Self, serde_json::Error> {
        let record = GroupRecord::deserialize(value)?;
        Ok(Self {
            id: id.to_string(),
            group_name: record.group_name,
            group_tasks: record.group_tasks,
        })
    }
}

impl<'a> IntoIterator for &'a Group {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Display for Group {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.group_name)
    }
}
