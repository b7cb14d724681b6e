//! Record id generation.
//!
//! Ids are `T_`/`G_` followed by a v4 UUID in simple form. A collision with an
//! id already in use gets a `-<n>` suffix until it is free.

use uuid::Uuid;

/// Record kind that owns an id namespace prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    Task,
    Group,
}

impl IdKind {
    /// Returns the id prefix for this record kind.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Task => "T_",
            Self::Group => "G_",
        }
    }
}

/// Generates an id for `kind` that `is_used` reports as free.
pub fn generate_id(kind: IdKind, is_used: impl Fn(&str) -> bool) -> String {
    generate_id_from(kind, Uuid::new_v4(), is_used)
}

fn generate_id_from(kind: IdKind, seed: Uuid, is_used: impl Fn(&str) -> bool) -> String {
    let base = format!("{}{}", kind.prefix(), seed.simple());
    if !is_used(&base) {
        return base;
    }

    let mut count: u64 = 1;
    loop {
        let candidate = format!("{base}-{count}");
        if !is_used(&candidate) {
            return candidate;
        }
        count += 1;
    }
}
