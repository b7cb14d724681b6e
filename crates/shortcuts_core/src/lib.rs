//! Persistence core for the shortcuts launcher.
//! Groups of shortcut tasks and launcher settings live in one JSON save file;
//! this crate owns that file and every invariant on it.

pub mod addon;
pub mod config;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod verify;

pub use addon::order::{
    apply_order, discover_addons, load_or_create_order, resolve_load_order, AddonError,
    AddonOrder,
};
pub use config::{default_store_path, StoreConfig, VerifierConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::document::SaveDocument;
pub use model::group::{Group, MembershipError};
pub use model::ids::IdKind;
pub use model::task::Task;
pub use model::validation::RecordValidationError;
pub use repo::document_repo::{
    DocumentRepository, JsonFileRepository, MemoryDocumentRepository, RepoError, RepoResult,
};
pub use service::error::{StoreError, StoreResult};
pub use service::shortcut_store::{ShortcutStore, TaskDraft};
pub use verify::{
    normalize_urls, HttpUrlVerifier, OfflineUrlVerifier, UrlError, UrlInput, UrlVerifier,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
