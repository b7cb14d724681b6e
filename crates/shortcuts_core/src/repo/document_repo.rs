//! Save-document repository contracts and JSON file implementation.
//!
//! # Responsibility
//! - Read the save file, repairing it when missing or malformed.
//! - Write the full document back with atomic replace semantics.
//!
//! # Invariants
//! - A missing, non-UTF-8, non-JSON or key-incomplete file is replaced by
//!   the empty document. No backup of the broken file is kept.
//! - Other I/O failures (permissions, disk full) surface as `RepoError::Io`.
//! - A file that changed on disk since the last load or store reports itself
//!   as stale, so callers re-read it before trusting a cached copy.

use crate::model::document::SaveDocument;
use log::{error, info, warn};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::{Instant, SystemTime};

const JSON_INDENT: &[u8] = b"    ";

pub type RepoResult<T> = Result<T, RepoError>;

/// Error from reading or writing the save document.
#[derive(Debug)]
pub enum RepoError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "save file i/o failed: {err}"),
            Self::Json(err) => write!(f, "save file encoding failed: {err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for RepoError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Storage contract for the whole save document.
pub trait DocumentRepository {
    /// Loads the document, repairing the backing storage when needed.
    fn load(&self) -> RepoResult<SaveDocument>;
    /// Replaces the stored document with `document`.
    fn store(&self, document: &SaveDocument) -> RepoResult<()>;
    /// Whether the backing storage changed outside this repository since the
    /// last `load` or `store`.
    fn is_stale(&self) -> bool {
        false
    }
}

/// Size and modification time of the save file as last seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileStamp {
    len: u64,
    modified: Option<SystemTime>,
}

impl FileStamp {
    fn read(path: &Path) -> Option<Self> {
        let metadata = fs::metadata(path).ok()?;
        Some(Self {
            len: metadata.len(),
            modified: metadata.modified().ok(),
        })
    }
}

/// JSON file on disk, pretty-printed with a four-space indent.
#[derive(Debug)]
pub struct JsonFileRepository {
    path: PathBuf,
    seen: Mutex<Option<FileStamp>>,
}

impl JsonFileRepository {
    /// Opens the repository at `path` and runs the repair-on-read check once.
    ///
    /// Missing parent directories are created.
    pub fn open(path: impl Into<PathBuf>) -> RepoResult<Self> {
        let repo = Self {
            path: path.into(),
            seen: Mutex::new(None),
        };
        if let Some(parent) = repo.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        repo.load()?;
        Ok(repo)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn repair(&self, reason: &str) -> RepoResult<SaveDocument> {
        warn!(
            "event=save_repair module=repo status=start reason={} path={}",
            reason,
            self.path.display()
        );
        let document = SaveDocument::empty();
        self.store(&document)?;
        Ok(document)
    }

    fn remember_stamp(&self) {
        *self.seen.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) =
            FileStamp::read(&self.path);
    }

    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "save.json".to_string());
        self.path
            .with_file_name(format!(".{file_name}.tmp-{}", std::process::id()))
    }
}

impl DocumentRepository for JsonFileRepository {
    fn load(&self) -> RepoResult<SaveDocument> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return self.repair("missing"),
            Err(err) => {
                error!(
                    "event=save_load module=repo status=error error_code=read_failed path={} error={}",
                    self.path.display(),
                    err
                );
                return Err(err.into());
            }
        };

        let Ok(text) = String::from_utf8(bytes) else {
            return self.repair("bad_encoding");
        };

        match serde_json::from_str::<SaveDocument>(&text) {
            Ok(document) => {
                self.remember_stamp();
                Ok(document)
            }
            Err(err) => {
                let reason = if err.is_data() { "missing_key" } else { "malformed" };
                self.repair(reason)
            }
        }
    }

    fn store(&self, document: &SaveDocument) -> RepoResult<()> {
        let started_at = Instant::now();
        let encoded = encode_document(document)?;

        let tmp_path = self.temp_path();
        let write_result = (|| -> std::io::Result<()> {
            let mut file = fs::File::create(&tmp_path)?;
            file.write_all(&encoded)?;
            file.sync_data()?;
            drop(file);
            fs::rename(&tmp_path, &self.path)
        })();

        if let Err(err) = write_result {
            let _ = fs::remove_file(&tmp_path);
            error!(
                "event=save_store module=repo status=error error_code=write_failed duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
        self.remember_stamp();

        info!(
            "event=save_store module=repo status=ok groups={} tasks={} settings={} duration_ms={}",
            document.groups.len(),
            document.tasks.len(),
            document.settings.len(),
            started_at.elapsed().as_millis()
        );
        Ok(())
    }

    fn is_stale(&self) -> bool {
        let seen = *self.seen.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        match (seen, FileStamp::read(&self.path)) {
            (Some(seen), Some(current)) => seen != current,
            _ => true,
        }
    }
}

/// In-memory repository for tests and ephemeral stores.
#[derive(Debug, Default)]
pub struct MemoryDocumentRepository {
    document: Mutex<SaveDocument>,
    fail_writes: AtomicBool,
}

impl MemoryDocumentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the repository with an existing document.
    pub fn with_document(document: SaveDocument) -> Self {
        Self {
            document: Mutex::new(document),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Makes subsequent `store` calls fail with an I/O error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Returns a copy of the last stored document.
    pub fn snapshot(&self) -> SaveDocument {
        self.document
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl DocumentRepository for MemoryDocumentRepository {
    fn load(&self) -> RepoResult<SaveDocument> {
        Ok(self.snapshot())
    }

    fn store(&self, document: &SaveDocument) -> RepoResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(RepoError::Io(std::io::Error::new(
                ErrorKind::Other,
                "memory repository write disabled",
            )));
        }
        *self
            .document
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = document.clone();
        Ok(())
    }
}

impl<R: DocumentRepository + ?Sized> DocumentRepository for &R {
    fn load(&self) -> RepoResult<SaveDocument> {
        (**self).load()
    }

    fn store(&self, document: &SaveDocument) -> RepoResult<()> {
        (**self).store(document)
    }

    fn is_stale(&self) -> bool {
        (**self).is_stale()
    }
}

fn encode_document(document: &SaveDocument) -> RepoResult<Vec<u8>> {
    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(JSON_INDENT);
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    document.serialize(&mut serializer)?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::{encode_document, DocumentRepository, JsonFileRepository};
    use crate::model::document::SaveDocument;
    use serde_json::json;
    use std::fs;

    #[test]
    fn encode_uses_four_space_indent() {
        let mut document = SaveDocument::empty();
        document
            .settings
            .insert("theme".to_string(), json!("dark"));
        let text = String::from_utf8(encode_document(&document).unwrap()).unwrap();
        assert!(text.contains("\n    \"settings\": {\n        \"theme\": \"dark\""));
    }

    #[test]
    fn outside_changes_mark_the_file_stale() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("save.json");
        let repo = JsonFileRepository::open(&path).unwrap();
        assert!(!repo.is_stale());

        fs::write(&path, "{\"settings\": {}}").unwrap();
        assert!(repo.is_stale());
        repo.load().unwrap();
        assert!(!repo.is_stale());

        fs::remove_file(&path).unwrap();
        assert!(repo.is_stale());
    }

    #[test]
    fn store_leaves_no_temp_file_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("save.json");
        let repo = JsonFileRepository::open(&path).unwrap();
        repo.store(&SaveDocument::empty()).unwrap();

        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["save.json".to_string()]);
    }
}
