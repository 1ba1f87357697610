//! # Error Types
//!
//! Domain-specific error types for invoicer-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  invoicer-core errors (this file)                                      │
//! │  ├── CoreError        - Hydration / parsing failures                   │
//! │  └── ValidationError  - Document invariant violations                  │
//! │                                                                         │
//! │  editor errors (apps/editor)                                           │
//! │  ├── GatewayError     - Persistence / PDF collaborator failures        │
//! │  └── ApiError         - What the view sees (serialized)                │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → Frontend               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## What Is NOT an Error
//! Structural edits never fail. Deleting the last item, promoting the first
//! item or dropping a drag outside a list are defined no-ops, and bad numeric
//! text is coerced to zero. Errors only exist at the edges: turning foreign
//! JSON into a document, or parsing an element id that came from the view.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Errors raised while bringing outside data into the editing core.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Document JSON could not be parsed.
    #[error("Invalid document JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// An element id from the view does not follow the focus id scheme.
    ///
    /// ## Expected Shapes
    /// ```text
    /// item-3-quantity
    /// item-0-subitem-2-description
    /// ```
    #[error("Malformed element id: {0}")]
    MalformedElementId(String),

    /// An item index was requested that the document does not have.
    #[error("Item {index} does not exist (document has {len} items)")]
    ItemOutOfRange { index: usize, len: usize },

    /// A sub-item index was requested that the parent does not have.
    #[error("Sub-item {sub_index} of item {item_index} does not exist")]
    SubItemOutOfRange { item_index: usize, sub_index: usize },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Document invariant violations.
///
/// Raised by strict deserialization and by [`crate::validation`] checks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The document has no items.
    #[error("At least one item is required")]
    EmptyDocument,

    /// Two entries (items or sub-items) share an id.
    #[error("id '{id}' is used more than once")]
    DuplicateId { id: String },

    /// An id is blank.
    #[error("{field} is required")]
    Required { field: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
