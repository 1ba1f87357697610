//! # Item Commands
//!
//! Structural edits on the line items, triggered by buttons and menus. Key
//! presses that resolve to the same edits go through `keyboard.rs`.
//!
//! ## Edit Cycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  remove_item(&doc, 1)                                                   │
//! │                    │                                                    │
//! │                    ▼                                                    │
//! │  ┌────────────────────────────────────────────────────────────────┐    │
//! │  │  1. Lock the session                                           │    │
//! │  │  2. Core computes the new document and the focus target        │    │
//! │  │  3. Session replaces its document, schedules the focus         │    │
//! │  │  4. Return document + captions + totals + focus                │    │
//! │  └────────────────────────────────────────────────────────────────┘    │
//! │                    │                                                    │
//! │                    ▼                                                    │
//! │  View re-renders, then after_render() moves the focus                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Edits whose preconditions fail (removing the only item, promoting the
//! first one, stale indices) return the document unchanged. They are not
//! errors.

use serde::Serialize;
use tracing::debug;
use ts_rs::TS;

use invoicer_core::{Document, EditOutcome, FocusTarget, StructuralEdit, Totals};

use crate::state::{DocumentState, EditorSession};

/// Document response including items, totals and the pending focus.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DocumentResponse {
    pub document: Document,
    /// Heading for each item, in document order.
    pub captions: Vec<String>,
    pub totals: Totals,
    /// Where focus goes after the next render.
    pub focus: Option<FocusTarget>,
    pub revision: u64,
}

impl From<&EditorSession> for DocumentResponse {
    fn from(session: &EditorSession) -> Self {
        let captions = session
            .document()
            .items()
            .iter()
            .enumerate()
            .map(|(index, item)| item.caption(index))
            .collect();

        DocumentResponse {
            document: session.document().clone(),
            captions,
            totals: session.totals(),
            focus: session.pending_focus(),
            revision: session.revision(),
        }
    }
}

/// Gets the current document.
pub fn get_document(doc: &DocumentState) -> DocumentResponse {
    debug!("get_document command");
    doc.with_session(|s| DocumentResponse::from(s))
}

/// Applies any structural edit.
///
/// The button commands below are shorthands for this one.
pub fn apply_edit(doc: &DocumentState, edit: StructuralEdit) -> DocumentResponse {
    debug!(?edit, "apply_edit command");
    doc.with_session_mut(|s| {
        let before = s.revision();
        let EditOutcome { focus, .. } = s.apply(edit);
        if s.revision() == before {
            debug!(?edit, "Edit was a no-op");
        } else {
            debug!(?focus, items = s.document().len(), "Edit applied");
        }
        DocumentResponse::from(&*s)
    })
}

/// Inserts a blank item after `index`.
pub fn insert_item_after(doc: &DocumentState, index: usize) -> DocumentResponse {
    apply_edit(doc, StructuralEdit::InsertItemAfter { index })
}

/// Appends a blank item ("Add item" button).
pub fn append_item(doc: &DocumentState) -> DocumentResponse {
    apply_edit(doc, StructuralEdit::AppendItem)
}

/// Removes the item at `index`. The only item is never removed.
pub fn remove_item(doc: &DocumentState, index: usize) -> DocumentResponse {
    apply_edit(doc, StructuralEdit::RemoveItem { index })
}

/// Turns the item at `index` into a sub-item of the item above it.
pub fn promote_item(doc: &DocumentState, index: usize) -> DocumentResponse {
    apply_edit(doc, StructuralEdit::PromoteItemToSubitem { index })
}

/// Turns a sub-item into a top-level item right after its parent.
pub fn demote_subitem(doc: &DocumentState, item_index: usize, sub_index: usize) -> DocumentResponse {
    apply_edit(
        doc,
        StructuralEdit::DemoteSubitemToItem {
            item_index,
            sub_index,
        },
    )
}

/// Inserts an empty sub-item after `sub_index`, or at the end when `None`.
pub fn insert_subitem(
    doc: &DocumentState,
    item_index: usize,
    sub_index: Option<usize>,
) -> DocumentResponse {
    apply_edit(
        doc,
        StructuralEdit::InsertSubitemAfter {
            item_index,
            sub_index,
        },
    )
}

/// Removes a sub-item.
pub fn remove_subitem(doc: &DocumentState, item_index: usize, sub_index: usize) -> DocumentResponse {
    apply_edit(
        doc,
        StructuralEdit::RemoveSubitem {
            item_index,
            sub_index,
        },
    )
}

/// Moves an item to another position.
pub fn move_item(doc: &DocumentState, from: usize, to: usize) -> DocumentResponse {
    apply_edit(doc, StructuralEdit::MoveItem { from, to })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use invoicer_core::{ItemField, SequentialIds};

    fn state() -> DocumentState {
        DocumentState::new(EditorSession::blank(
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            Box::new(SequentialIds::new()),
            5.0,
        ))
    }

    #[test]
    fn test_insert_focuses_new_description() {
        let doc = state();
        let response = insert_item_after(&doc, 0);
        assert_eq!(response.document.len(), 2);
        assert_eq!(response.focus, Some(FocusTarget::description(1)));
        assert_eq!(response.revision, 1);
    }

    #[test]
    fn test_remove_only_item_is_noop() {
        let doc = state();
        let response = remove_item(&doc, 0);
        assert_eq!(response.document.len(), 1);
        assert_eq!(response.revision, 0);
        assert_eq!(response.focus, None);
    }

    #[test]
    fn test_promote_then_demote() {
        let doc = state();
        append_item(&doc);
        let promoted = promote_item(&doc, 1);
        assert_eq!(promoted.document.len(), 1);
        assert_eq!(promoted.document.items()[0].subitems.len(), 1);
        assert_eq!(promoted.focus, Some(FocusTarget::subitem(0, 0)));

        let demoted = demote_subitem(&doc, 0, 0);
        assert_eq!(demoted.document.len(), 2);
        assert_eq!(demoted.focus, Some(FocusTarget::description(1)));
        assert_eq!(demoted.document.items()[1].id.as_str(), "id-2");
    }

    #[test]
    fn test_subitem_commands() {
        let doc = state();
        let response = insert_subitem(&doc, 0, None);
        assert_eq!(response.focus, Some(FocusTarget::subitem(0, 0)));

        let response = remove_subitem(&doc, 0, 0);
        assert!(response.document.items()[0].subitems.is_empty());
        assert_eq!(
            response.focus,
            Some(FocusTarget::item(0, ItemField::DiscountPercentage))
        );
    }

    #[test]
    fn test_move_item_and_totals() {
        let doc = state();
        doc.with_session_mut(|s| {
            s.set_item_field(0, ItemField::Description, "first");
            s.set_item_field(0, ItemField::UnitPrice, "10");
        });
        append_item(&doc);

        let response = move_item(&doc, 0, 1);
        assert_eq!(response.document.items()[1].description, "first");
        assert_eq!(response.totals.subtotal, 10.0);
        assert_eq!(get_document(&doc), response);
    }

    #[test]
    fn test_captions_follow_edits() {
        let doc = state();
        doc.with_session_mut(|s| {
            s.set_item_field(0, ItemField::Description, "Consulting, phase one and two");
        });

        let response = apply_edit(&doc, StructuralEdit::InsertItemAfter { index: 0 });
        assert_eq!(response.captions, vec!["Consulting, phase on...", "Item 2"]);

        let response = apply_edit(&doc, StructuralEdit::MoveItem { from: 1, to: 0 });
        assert_eq!(response.captions, vec!["Item 1", "Consulting, phase on..."]);
    }
}
