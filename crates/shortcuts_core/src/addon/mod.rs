//! Add-on discovery and load ordering.
//!
//! # Responsibility
//! - Find add-on entry modules inside the add-ons folder.
//! - Sort them by the priorities declared in `order.json`.
//!
//! # Invariants
//! - Load order is high, medium, unspecified (discovery order), low.
//! - Priority names match case-insensitively on the last module segment.

pub mod order;
