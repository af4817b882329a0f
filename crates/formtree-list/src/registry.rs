//! Child handle registry keyed by structured positions.
//!
//! Each rendered element row contributes one handle per item field, keyed by
//! a [`Position`] (element index plus field name). The registry is rebuilt
//! from scratch every render cycle and never outlives one.
//!
//! # Invariants
//!
//! 1. Positions are unique: registering a duplicate replaces the existing
//!    handle rather than adding a second entry.
//! 2. Iteration order is canonical: ascending index, then registration order
//!    within an index. Rows register their fields in item-schema order, so
//!    within-row order matches the schema.
//!
//! # Failure Modes
//!
//! Externally keyed registration tolerates forged keys: a key that does not
//! parse as `"<index>:<field>"` is skipped with a trace log, never an error.

use core::fmt;

use tracing::{debug, trace};

use crate::ChildRef;

/// A structured registry key: element index plus field name.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    /// Element index within the list.
    pub index: usize,
    /// Field name within the element record.
    pub field: String,
}

impl Position {
    /// Create a position.
    pub fn new(index: usize, field: impl Into<String>) -> Self {
        Self {
            index,
            field: field.into(),
        }
    }

    /// Parse a composite `"<index>:<field>"` key.
    ///
    /// The index is one or more consecutive decimal digits; the field name is
    /// the remainder after the first `:` and may be empty. Returns `None` for
    /// anything else.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        let (digits, field) = key.split_once(':')?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let index = digits.parse().ok()?;
        Some(Self {
            index,
            field: field.to_owned(),
        })
    }

    /// The composite key form of this position.
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}:{}", self.index, self.field)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.index, self.field)
    }
}

/// Mapping from [`Position`] to a live child handle.
#[derive(Default)]
pub struct ChildRegistry {
    entries: Vec<(Position, ChildRef)>,
}

impl ChildRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handle at a position. A duplicate position replaces the
    /// existing handle.
    pub fn register(&mut self, position: Position, handle: ChildRef) {
        if let Some(slot) = self.entries.iter_mut().find(|(p, _)| *p == position) {
            debug!(position = %position, "replacing child handle at duplicate position");
            slot.1 = handle;
        } else {
            self.entries.push((position, handle));
        }
    }

    /// Register a handle under a composite `"<index>:<field>"` key.
    ///
    /// Malformed keys are skipped; they cannot occur for handles created by
    /// this component, but external keys must not crash assembly.
    pub fn register_keyed(&mut self, key: &str, handle: ChildRef) {
        match Position::from_key(key) {
            Some(position) => self.register(position, handle),
            None => trace!(key, "skipping malformed child key"),
        }
    }

    /// Visit every entry in canonical order: ascending index, registration
    /// order within an index.
    pub fn for_each(&self, mut f: impl FnMut(&Position, &ChildRef)) {
        let mut ordered: Vec<&(Position, ChildRef)> = self.entries.iter().collect();
        ordered.sort_by_key(|(position, _)| position.index);
        for (position, handle) in ordered {
            f(position, handle);
        }
    }

    /// Drop every entry. Called at the start of each render cycle.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of registered handles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry has no handles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for ChildRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChildRegistry")
            .field("len", &self.entries.len())
            .finish()
    }
}
