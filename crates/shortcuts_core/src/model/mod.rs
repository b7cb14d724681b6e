//! Domain model for the shortcuts save document.
//!
//! # Responsibility
//! - Define the persisted document shape (`settings`, `groups`, `tasks`).
//! - Define group/task records and their in-memory invariants.
//!
//! # Invariants
//! - A task id appears in at most one group's member list.
//! - Group member lists keep insertion order and never hold duplicates.
//! - Task URLs are always stored as a list.

pub mod document;
pub mod group;
pub mod ids;
pub mod task;
pub mod validation;
