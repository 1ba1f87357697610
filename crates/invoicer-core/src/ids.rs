//! # Identifiers
//!
//! Stable ids for items and sub-items.
//!
//! ## Why Ids At All?
//! Indices change on every insert, delete and drag. Ids do not. They are
//! the reconciliation key the view uses to keep a row's DOM node (and the
//! user's caret) attached to the same entry while the list is reordered,
//! and the key the drag controller receives in its drag-end event.
//!
//! ## Contract
//! - Assigned once at creation
//! - Never null, never reused within a document
//! - Carried unchanged across moves, promotions and demotions
//!
//! ## Generators
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  UuidIds        random v4 UUIDs, default for real sessions             │
//! │  SequentialIds  "{prefix}{n}" counter, deterministic for tests/hosts    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! Either satisfies the uniqueness invariant: edit operations additionally
//! skip any generated id the document already contains.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;
use uuid::Uuid;

// =============================================================================
// Item Id
// =============================================================================

/// Identifier shared by items and sub-items.
///
/// Serializes as a bare JSON string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ItemId(String);

impl ItemId {
    /// Wraps an existing id string.
    pub fn new(id: impl Into<String>) -> Self {
        ItemId(id.into())
    }

    /// Returns the id as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the id is empty or only whitespace.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        ItemId(id.to_string())
    }
}

impl From<String> for ItemId {
    fn from(id: String) -> Self {
        ItemId(id)
    }
}

// =============================================================================
// Generators
// =============================================================================

/// Source of fresh ids for newly created entries.
pub trait IdGenerator {
    /// Returns an id that this generator has never returned before.
    fn next_id(&mut self) -> ItemId;
}

/// Random UUID v4 ids.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn next_id(&mut self) -> ItemId {
        ItemId(Uuid::new_v4().to_string())
    }
}

/// Monotonic counter ids: `"{prefix}{n}"`, starting at 1.
///
/// ## Example
/// ```rust
/// use invoicer_core::ids::{IdGenerator, SequentialIds};
///
/// let mut ids = SequentialIds::with_prefix("row-");
/// assert_eq!(ids.next_id().as_str(), "row-1");
/// assert_eq!(ids.next_id().as_str(), "row-2");
/// ```
#[derive(Debug, Clone)]
pub struct SequentialIds {
    prefix: String,
    next: u64,
}

impl SequentialIds {
    /// Counter with the default `"id-"` prefix.
    pub fn new() -> Self {
        Self::with_prefix("id-")
    }

    /// Counter with a custom prefix.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        SequentialIds {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> ItemId {
        let id = ItemId(format!("{}{}", self.prefix, self.next));
        self.next += 1;
        id
    }
}

impl<G: IdGenerator + ?Sized> IdGenerator for Box<G> {
    fn next_id(&mut self) -> ItemId {
        (**self).next_id()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
