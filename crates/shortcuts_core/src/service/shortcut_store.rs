//! Shortcut store: groups, tasks and settings over one save document.
//!
//! # Responsibility
//! - Provide create/read/update/delete use-cases for groups and tasks.
//! - Provide key/value access to launcher settings.
//! - Run URL normalization before taking the document lock.
//!
//! # Invariants
//! - Mutations run on a copy of the document; the copy replaces the cached
//!   document only after the repository write succeeds.
//! - A task id belongs to at most one group; group member lists hold no
//!   duplicates.
//! - Deleting a group deletes every member task in the same write.
//! - A save file changed or removed behind the store's back is re-read (and
//!   repaired) before the next read or write.

use crate::config::StoreConfig;
use crate::model::document::{reorder_map, ReorderError, SaveDocument};
use crate::model::group::Group;
use crate::model::ids::{generate_id, IdKind};
use crate::model::task::Task;
use crate::model::validation::RecordValidationError;
use crate::repo::document_repo::{DocumentRepository, JsonFileRepository};
use crate::service::error::{StoreError, StoreResult};
use crate::verify::{normalize_urls, HttpUrlVerifier, OfflineUrlVerifier, UrlInput, UrlVerifier};
use log::{debug, info, warn};
use serde_json::{Map, Value};
use std::sync::{Mutex, MutexGuard};

/// Field values for creating or editing a task.
///
/// Editing overwrites every field, so omitted optionals are cleared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub task_name: String,
    pub button_text: Option<String>,
    pub url: UrlInput,
    pub file_path: Option<String>,
    pub directory_path: Option<String>,
}

impl TaskDraft {
    pub fn new(task_name: impl Into<String>) -> Self {
        Self {
            task_name: task_name.into(),
            ..Self::default()
        }
    }

    pub fn button_text(mut self, button_text: impl Into<String>) -> Self {
        self.button_text = Some(button_text.into());
        self
    }

    pub fn url(mut self, url: impl Into<UrlInput>) -> Self {
        self.url = url.into();
        self
    }

    pub fn file_path(mut self, file_path: impl Into<String>) -> Self {
        self.file_path = Some(file_path.into());
        self
    }

    pub fn directory_path(mut self, directory_path: impl Into<String>) -> Self {
        self.directory_path = Some(directory_path.into());
        self
    }
}

/// Store over a `DocumentRepository`.
pub struct ShortcutStore<R: DocumentRepository> {
    repo: R,
    document: Mutex<SaveDocument>,
    verifier: Box<dyn UrlVerifier>,
}

impl ShortcutStore<JsonFileRepository> {
    /// Opens the JSON save file described by `config`, repairing it if needed.
    pub fn open(config: &StoreConfig) -> StoreResult<Self> {
        let repo = JsonFileRepository::open(&config.path)?;
        let verifier: Box<dyn UrlVerifier> = if config.offline {
            Box::new(OfflineUrlVerifier)
        } else {
            Box::new(HttpUrlVerifier::new(&config.verifier))
        };
        info!(
            "event=store_open module=store status=ok offline={} path={}",
            config.offline,
            repo.path().display()
        );
        Self::new(repo, verifier)
    }
}

impl<R: DocumentRepository> ShortcutStore<R> {
    /// Creates a store and loads the current document from `repo`.
    pub fn new(repo: R, verifier: Box<dyn UrlVerifier>) -> StoreResult<Self> {
        let document = repo.load()?;
        Ok(Self {
            repo,
            document: Mutex::new(document),
            verifier,
        })
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Re-reads the document from the repository, dropping the cached copy.
    pub fn reload(&self) -> StoreResult<()> {
        let document = self.repo.load()?;
        *self.lock() = document;
        debug!("event=store_reload module=store status=ok");
        Ok(())
    }

    /// Returns a copy of the cached document.
    pub fn snapshot(&self) -> SaveDocument {
        self.lock().clone()
    }

    // ---- lookup -------------------------------------------------------

    pub fn get_task_by_id(&self, task_id: &str) -> StoreResult<Task> {
        load_task(&self.lock(), task_id)
    }

    pub fn get_group_by_id(&self, group_id: &str) -> StoreResult<Group> {
        load_group(&self.lock(), group_id)
    }

    /// Returns the id of the group whose member list holds `task_id`.
    pub fn get_group_id_of_task(&self, task_id: &str) -> StoreResult<String> {
        owner_of(&self.lock(), task_id)?
            .map(|group| group.id)
            .ok_or_else(|| StoreError::NotFound(task_id.to_string()))
    }

    /// Whether `id` is already a group or task key.
    pub fn is_id_used(&self, id: &str) -> bool {
        self.lock().is_id_used(id)
    }

    /// Group ids in stored order.
    pub fn load_groups(&self) -> Vec<String> {
        self.lock().group_ids()
    }

    /// Task ids in stored order.
    pub fn load_tasks(&self) -> Vec<String> {
        self.lock().task_ids()
    }

    /// Rehydrates every member task of `group_id` in member order.
    pub fn group_tasks(&self, group_id: &str) -> StoreResult<Vec<Task>> {
        let document = self.lock();
        let group = load_group(&document, group_id)?;
        group
            .iter()
            .map(|task_id| load_task(&document, task_id))
            .collect()
    }

    // ---- groups -------------------------------------------------------

    /// Creates an empty group with a generated id.
    pub fn create_group(&self, group_name: &str) -> StoreResult<Group> {
        self.create_group_with(group_name, None, Vec::new())
    }

    /// Creates a group with an optional explicit id and initial members.
    ///
    /// Members must be existing tasks that no other group owns.
    pub fn create_group_with(
        &self,
        group_name: &str,
        group_id: Option<&str>,
        tasks: Vec<String>,
    ) -> StoreResult<Group> {
        let group = self.mutate(|document| {
            let id = claim_id(document, IdKind::Group, group_id)?;
            let group = Group::with_tasks(id, group_name, tasks)?;
            put_group(document, &group)?;
            Ok(group)
        })?;
        info!(
            "event=group_create module=store status=ok group_id={} tasks={}",
            group.id,
            group.len()
        );
        Ok(group)
    }

    /// Persists `group` as given, replacing any stored version.
    pub fn save_group(&self, group: &Group) -> StoreResult<()> {
        self.mutate(|document| {
            if document.tasks.contains_key(&group.id) {
                return Err(StoreError::AlreadyExists(group.id.clone()));
            }
            put_group(document, group)
        })?;
        debug!(
            "event=group_save module=store status=ok group_id={}",
            group.id
        );
        Ok(())
    }

    pub fn rename_group(&self, group_id: &str, group_name: &str) -> StoreResult<Group> {
        self.update_group(group_id, |group| {
            group.group_name = group_name.to_string();
            Ok(())
        })
    }

    /// Inserts an existing task into the group at `index` (clamped).
    pub fn insert_task_into_group(
        &self,
        group_id: &str,
        index: usize,
        task_id: &str,
    ) -> StoreResult<Group> {
        self.update_group(group_id, |group| Ok(group.insert(index, task_id)?))
    }

    pub fn append_task_to_group(&self, group_id: &str, task_id: &str) -> StoreResult<Group> {
        self.update_group(group_id, |group| Ok(group.append(task_id)?))
    }

    /// Removes `task_id` from the member list; the task record is kept.
    pub fn remove_task_from_group(&self, group_id: &str, task_id: &str) -> StoreResult<Group> {
        self.update_group(group_id, |group| {
            group.remove(task_id)?;
            Ok(())
        })
    }

    /// Moves a member to `index` (clamped) inside the same group.
    pub fn move_task_within_group(
        &self,
        group_id: &str,
        task_id: &str,
        index: usize,
    ) -> StoreResult<Group> {
        self.update_group(group_id, |group| Ok(group.move_to(task_id, index)?))
    }

    /// Moves a task into `target_group_id`, leaving its previous group.
    ///
    /// `index` of `None` appends. Moving inside the owning group behaves like
    /// `move_task_within_group`.
    pub fn move_task_to_group(
        &self,
        task_id: &str,
        target_group_id: &str,
        index: Option<usize>,
    ) -> StoreResult<Group> {
        let target = self.mutate(|document| {
            require_task(document, task_id)?;
            let mut target = load_group(document, target_group_id)?;

            match owner_of(document, task_id)? {
                Some(source) if source.id == target.id => {
                    let index = index.unwrap_or(target.len());
                    target.move_to(task_id, index)?;
                }
                Some(mut source) => {
                    source.remove(task_id)?;
                    put_group(document, &source)?;
                    place(&mut target, task_id, index)?;
                }
                None => place(&mut target, task_id, index)?,
            }

            put_group(document, &target)?;
            Ok(target)
        })?;
        info!(
            "event=task_move module=store status=ok task_id={} group_id={}",
            task_id, target.id
        );
        Ok(target)
    }

    /// Removes `task_id` from the group and deletes its task record.
    pub fn delete_task_in_group(&self, group_id: &str, task_id: &str) -> StoreResult<()> {
        self.mutate(|document| {
            let mut group = load_group(document, group_id)?;
            group.remove(task_id)?;
            put_group(document, &group)?;
            document.tasks.shift_remove(task_id);
            Ok(())
        })?;
        info!(
            "event=task_delete module=store status=ok task_id={} group_id={}",
            task_id, group_id
        );
        Ok(())
    }

    /// Deletes the group entry and every member task record.
    ///
    /// Returns the ids of the deleted tasks.
    pub fn delete_group_and_tasks(&self, group: &Group) -> StoreResult<Vec<String>> {
        let removed = self.mutate(|document| {
            let stored = load_group(document, &group.id)?;
            document.groups.shift_remove(&stored.id);
            let mut removed = Vec::with_capacity(stored.len());
            for task_id in stored.iter() {
                if document.tasks.shift_remove(task_id).is_some() {
                    removed.push(task_id.clone());
                }
            }
            Ok(removed)
        })?;
        info!(
            "event=group_delete module=store status=ok group_id={} tasks_removed={}",
            group.id,
            removed.len()
        );
        Ok(removed)
    }

    pub fn delete_group_by_id(&self, group_id: &str) -> StoreResult<Vec<String>> {
        let group = self.get_group_by_id(group_id)?;
        self.delete_group_and_tasks(&group)
    }

    // ---- tasks --------------------------------------------------------

    /// Creates a task owned by `group_id` with a generated id.
    pub fn create_task(&self, group_id: &str, draft: TaskDraft) -> StoreResult<Task> {
        self.insert_task(group_id, None, draft)
    }

    /// Creates a task owned by `group_id` under an explicit, unused id.
    pub fn create_task_with_id(
        &self,
        group_id: &str,
        task_id: &str,
        draft: TaskDraft,
    ) -> StoreResult<Task> {
        self.insert_task(group_id, Some(task_id), draft)
    }

    /// Overwrites every mutable field of the task and re-normalizes URLs.
    pub fn edit_task(&self, task_id: &str, draft: TaskDraft) -> StoreResult<Task> {
        let urls = normalize_urls(self.verifier.as_ref(), &draft.url);
        let task = self.mutate(|document| {
            require_task(document, task_id)?;
            let task = build_task(task_id.to_string(), draft, urls);
            task.validate()?;
            put_task(document, &task)?;
            Ok(task)
        })?;
        info!(
            "event=task_edit module=store status=ok task_id={} urls={}",
            task.id,
            task.url.len()
        );
        Ok(task)
    }

    /// Persists `task` as given. Group membership is not touched.
    pub fn save_task(&self, task: &Task) -> StoreResult<()> {
        self.mutate(|document| {
            task.validate()?;
            if document.groups.contains_key(&task.id) {
                return Err(StoreError::AlreadyExists(task.id.clone()));
            }
            put_task(document, task)
        })?;
        debug!("event=task_save module=store status=ok task_id={}", task.id);
        Ok(())
    }

    /// Deletes a task, detaching it from its owning group when it has one.
    pub fn delete_task_by_id(&self, task_id: &str) -> StoreResult<()> {
        let owner = self.mutate(|document| {
            require_task(document, task_id)?;
            let owner = owner_of(document, task_id)?;
            if let Some(mut group) = owner.clone() {
                group.remove(task_id)?;
                put_group(document, &group)?;
            }
            document.tasks.shift_remove(task_id);
            Ok(owner.map(|group| group.id))
        })?;
        info!(
            "event=task_delete module=store status=ok task_id={} group_id={}",
            task_id,
            owner.as_deref().unwrap_or("none")
        );
        Ok(())
    }

    // ---- ordering -----------------------------------------------------

    /// Reorders the `groups` mapping; unlisted groups keep their relative
    /// order after the listed ones.
    pub fn reorder_groups(&self, new_order: &[String]) -> StoreResult<()> {
        self.mutate(|document| reorder(&mut document.groups, new_order))?;
        info!(
            "event=groups_reorder module=store status=ok listed={}",
            new_order.len()
        );
        Ok(())
    }

    /// Reorders the `tasks` mapping with the same rules as `reorder_groups`.
    pub fn reorder_tasks(&self, new_order: &[String]) -> StoreResult<()> {
        self.mutate(|document| reorder(&mut document.tasks, new_order))?;
        info!(
            "event=tasks_reorder module=store status=ok listed={}",
            new_order.len()
        );
        Ok(())
    }

    // ---- settings -----------------------------------------------------

    pub fn apply_setting(&self, name: &str, value: Value) -> StoreResult<()> {
        self.mutate(|document| {
            document.settings.insert(name.to_string(), value);
            Ok(())
        })?;
        debug!("event=setting_apply module=store status=ok name={name}");
        Ok(())
    }

    pub fn get_setting(&self, name: &str) -> StoreResult<Value> {
        self.lock()
            .settings
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }

    pub fn has_setting(&self, name: &str) -> bool {
        self.lock().settings.contains_key(name)
    }

    /// Removes a setting and returns its previous value.
    pub fn remove_setting(&self, name: &str) -> StoreResult<Value> {
        let removed = self.mutate(|document| {
            document
                .settings
                .shift_remove(name)
                .ok_or_else(|| StoreError::NotFound(name.to_string()))
        })?;
        debug!("event=setting_remove module=store status=ok name={name}");
        Ok(removed)
    }

    // ---- urls ---------------------------------------------------------

    /// Verifies a single URL candidate, surfacing the failure reason.
    pub fn verify_url(&self, candidate: &str) -> StoreResult<String> {
        Ok(self.verifier.verify_root(candidate.trim())?)
    }

    // ---- internals ----------------------------------------------------

    fn insert_task(
        &self,
        group_id: &str,
        task_id: Option<&str>,
        draft: TaskDraft,
    ) -> StoreResult<Task> {
        let urls = normalize_urls(self.verifier.as_ref(), &draft.url);
        let task = self.mutate(|document| {
            let mut group = load_group(document, group_id)?;
            let id = claim_id(document, IdKind::Task, task_id)?;
            let task = build_task(id, draft, urls);
            task.validate()?;
            group.append(task.id.clone())?;
            put_task(document, &task)?;
            put_group(document, &group)?;
            Ok(task)
        })?;
        info!(
            "event=task_create module=store status=ok task_id={} group_id={} urls={}",
            task.id,
            group_id,
            task.url.len()
        );
        Ok(task)
    }

    fn update_group(
        &self,
        group_id: &str,
        change: impl FnOnce(&mut Group) -> StoreResult<()>,
    ) -> StoreResult<Group> {
        let group = self.mutate(|document| {
            let mut group = load_group(document, group_id)?;
            change(&mut group)?;
            put_group(document, &group)?;
            Ok(group)
        })?;
        debug!(
            "event=group_update module=store status=ok group_id={} tasks={}",
            group.id,
            group.len()
        );
        Ok(group)
    }

    /// Applies `change` to a working copy and commits it after a successful
    /// repository write.
    fn mutate<T>(
        &self,
        change: impl FnOnce(&mut SaveDocument) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut cached = self.lock();
        let mut working = cached.clone();
        let output = change(&mut working)?;
        self.repo.store(&working)?;
        *cached = working;
        Ok(output)
    }

    fn lock(&self) -> MutexGuard<'_, SaveDocument> {
        // The cached document is only replaced after a full successful write,
        // so a poisoned lock still guards a consistent value.
        let mut cached = self
            .document
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if self.repo.is_stale() {
            match self.repo.load() {
                Ok(document) => {
                    *cached = document;
                    info!("event=store_refresh module=store status=ok");
                }
                Err(err) => warn!(
                    "event=store_refresh module=store status=error error_code=load_failed error={}",
                    err
                ),
            }
        }
        cached
    }
}

fn build_task(id: String, draft: TaskDraft, urls: Vec<String>) -> Task {
    Task {
        id,
        task_name: draft.task_name,
        button_text: draft.button_text,
        url: urls,
        file_path: draft.file_path,
        directory_path: draft.directory_path,
    }
}

fn claim_id(
    document: &SaveDocument,
    kind: IdKind,
    requested: Option<&str>,
) -> StoreResult<String> {
    match requested {
        Some(id) => {
            if id.trim().is_empty() {
                return Err(RecordValidationError::EmptyId.into());
            }
            if document.is_id_used(id) {
                return Err(StoreError::AlreadyExists(id.to_string()));
            }
            Ok(id.to_string())
        }
        None => Ok(generate_id(kind, |candidate| document.is_id_used(candidate))),
    }
}

fn place(group: &mut Group, task_id: &str, index: Option<usize>) -> StoreResult<()> {
    match index {
        Some(index) => group.insert(index, task_id)?,
        None => group.append(task_id)?,
    }
    Ok(())
}

fn reorder(map: &mut Map<String, Value>, new_order: &[String]) -> StoreResult<()> {
    reorder_map(map, new_order).map_err(|err| match err {
        ReorderError::Unknown(id) => StoreError::NotInDocument(id),
        ReorderError::Duplicate(id) => StoreError::AlreadyExists(id),
    })
}

fn require_task(document: &SaveDocument, task_id: &str) -> StoreResult<()> {
    if !document.tasks.contains_key(task_id) {
        return Err(StoreError::NotInDocument(task_id.to_string()));
    }
    Ok(())
}

fn load_task(document: &SaveDocument, task_id: &str) -> StoreResult<Task> {
    let value = document
        .tasks
        .get(task_id)
        .ok_or_else(|| StoreError::NotInDocument(task_id.to_string()))?;
    Task::from_value(task_id, value)
        .map_err(|err| StoreError::InvalidData(format!("task `{task_id}`: {err}")))
}

fn load_group(document: &SaveDocument, group_id: &str) -> StoreResult<Group> {
    let value = document
        .groups
        .get(group_id)
        .ok_or_else(|| StoreError::NotInDocument(group_id.to_string()))?;
    Group::from_value(group_id, value)
        .map_err(|err| StoreError::InvalidData(format!("group `{group_id}`: {err}")))
}

fn owner_of(document: &SaveDocument, task_id: &str) -> StoreResult<Option<Group>> {
    for group_id in document.groups.keys() {
        let group = load_group(document, group_id)?;
        if group.contains(task_id) {
            return Ok(Some(group));
        }
    }
    Ok(None)
}

fn put_task(document: &mut SaveDocument, task: &Task) -> StoreResult<()> {
    let value = task
        .to_value()
        .map_err(|err| StoreError::InvalidData(format!("task `{}`: {err}", task.id)))?;
    document.tasks.insert(task.id.clone(), value);
    Ok(())
}

/// Validates `group` against the rest of the document and stores it.
///
/// Only members that the stored version of the group lacks are checked, so a
/// member whose record is already gone does not block later writes.
fn put_group(document: &mut SaveDocument, group: &Group) -> StoreResult<()> {
    group.validate()?;
    let stored_members = load_group(document, &group.id)
        .map(|stored| stored.task_ids().to_vec())
        .unwrap_or_default();
    for task_id in group.iter().filter(|id| !stored_members.contains(id)) {
        require_task(document, task_id)?;
        if let Some(owner) = owner_of(document, task_id)? {
            if owner.id != group.id {
                return Err(StoreError::TaskAlreadyInGroup {
                    group: owner.group_name,
                    task: task_id.clone(),
                });
            }
        }
    }

    let value = group
        .to_value()
        .map_err(|err| StoreError::InvalidData(format!("group `{}`: {err}", group.id)))?;
    document.groups.insert(group.id.clone(), value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{ShortcutStore, TaskDraft};
    use crate::repo::document_repo::MemoryDocumentRepository;
    use crate::service::error::StoreError;
    use crate::verify::OfflineUrlVerifier;

    fn store() -> ShortcutStore<MemoryDocumentRepository> {
        ShortcutStore::new(
            MemoryDocumentRepository::new(),
            Box::new(OfflineUrlVerifier),
        )
        .unwrap()
    }

    #[test]
    fn failed_write_leaves_cache_untouched() {
        let store = store();
        let group = store.create_group("Work").unwrap();

        store.repository().set_fail_writes(true);
        let err = store
            .create_task(&group.id, TaskDraft::new("Mail"))
            .unwrap_err();
        assert!(matches!(err, StoreError::Repo(_)));

        assert!(store.load_tasks().is_empty());
        assert!(store.get_group_by_id(&group.id).unwrap().is_empty());
    }

    #[test]
    fn task_id_cannot_shadow_a_group_id() {
        let store = store();
        let group = store.create_group("Work").unwrap();

        let err = store
            .create_task_with_id(&group.id, &group.id, TaskDraft::new("Clash"))
            .unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists(id) if id == group.id));
    }
}
