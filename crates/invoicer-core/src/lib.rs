//! # invoicer-core: Line-Item Editing Logic for Invoicer
//!
//! This crate holds the invoice line-item editor: the document model, the
//! totals math, the structural edits and the controllers that turn keys and
//! drags into edits. Everything here is a pure function of its inputs.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Invoicer Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Invoice Form (view)                          │   │
//! │  │   item rows ──► sub-item rows ──► totals ──► submit / preview   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ commands                               │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                invoicer-editor (session host)                   │   │
//! │  │   handle_key, drag_end, insert_item, submit_invoice, etc.       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ invoicer-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │  ┌─────────┐ ┌────────┐ ┌────────┐ ┌──────────┐ ┌─────────┐   │   │
//! │  │  │  types  │ │ totals │ │  edit  │ │ keyboard │ │  drag   │   │   │
//! │  │  │Document │ │ Totals │ │ insert │ │ handle_  │ │ resolve │   │   │
//! │  │  │  Item   │ │        │ │ promote│ │   key    │ │ Gesture │   │   │
//! │  │  └─────────┘ └────────┘ └────────┘ └──────────┘ └─────────┘   │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DOM • NO NETWORK • PURE FUNCTIONS                │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Document, Item, SubItem, InvoiceDraft, lookups
//! - [`ids`] - Item ids and id generators
//! - [`totals`] - Line totals, subtotal, discount, tax, grand total
//! - [`edit`] - Structural edits returning a new document plus focus
//! - [`keyboard`] - Key press → edit / focus move
//! - [`drag`] - Drop → move edit, activation threshold
//! - [`focus`] - Focus targets, element ids, deferred focus
//! - [`validation`] - Numeric coercion and document invariants
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **New values, never mutation**: every edit borrows the document and returns a new one
//! 2. **Total operations**: invalid requests are no-ops, not errors
//! 3. **Ids over indices**: ids survive moves, indices are recomputed
//! 4. **No I/O**: focus goes through the [`FocusHost`] port
//!
//! ## Example Usage
//!
//! ```rust
//! use invoicer_core::keyboard::{handle_key, Key, KeyEvent, KeyOutcome};
//! use invoicer_core::{Document, SequentialIds, Totals};
//!
//! let mut ids = SequentialIds::new();
//! let doc = Document::new(&mut ids);
//!
//! // Enter on the first description inserts a row below it.
//! let KeyOutcome::Edit(edit) = handle_key(&doc, invoicer_core::FocusTarget::description(0), KeyEvent::plain(Key::Enter)) else {
//!     unreachable!()
//! };
//! let outcome = edit.apply(&doc, &mut ids);
//! assert_eq!(outcome.document.len(), 2);
//! assert_eq!(outcome.focus.unwrap().element_id(), "item-1-description");
//!
//! let totals = Totals::compute(&outcome.document, 10.0, 0.0);
//! assert_eq!(totals.total, 0.0);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod drag;
pub mod edit;
pub mod error;
pub mod focus;
pub mod ids;
pub mod keyboard;
pub mod totals;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use drag::{DragEnd, DragGesture};
pub use edit::{EditOutcome, StructuralEdit};
pub use error::{CoreError, CoreResult, ValidationError};
pub use focus::{FocusHost, FocusResult, FocusScheduler, FocusTarget};
pub use ids::{IdGenerator, ItemId, SequentialIds, UuidIds};
pub use keyboard::{KeyEvent, KeyOutcome};
pub use totals::Totals;
pub use types::*;
