//! Repository layer: loading and storing the save document.
//!
//! # Responsibility
//! - Own the on-disk format and its repair-on-read policy.
//! - Keep file-system details out of the store service.
//!
//! # Invariants
//! - `load` never returns a document missing one of the three top-level keys.
//! - `store` replaces the whole document atomically (temp file + rename).

pub mod document_repo;
