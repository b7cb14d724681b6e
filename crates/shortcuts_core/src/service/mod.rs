//! Store service: the single entry point the launcher UI calls into.
//!
//! # Responsibility
//! - Own the in-memory save document behind one mutex.
//! - Enforce group/task invariants on every mutation.
//! - Flush each committed mutation through the document repository.

pub mod error;
pub mod shortcut_store;
