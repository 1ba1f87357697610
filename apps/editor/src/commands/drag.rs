//! # Drag Commands
//!
//! Drag-and-drop reordering of items and sub-items.
//!
//! ## Gesture
//! ```text
//! pointerdown on handle ──► drag_start(active, x, y)     Pressed
//! pointermove ────────────► drag_move(x, y)              Dragging once travel ≥ distance
//! pointerup over a row ───► drag_end(over)               drop resolved, edit applied
//! escape / pointer lost ──► drag_cancel()                Idle
//! ```
//!
//! A press that never travels far enough is a click, and `drag_end` leaves
//! the document alone. Hosts with their own gesture recognizer skip the
//! first three commands and call [`drop_item`] directly.

use tracing::debug;

use invoicer_core::drag::{resolve_drag_end, DragPhase};
use invoicer_core::{DragEnd, ItemId};

use crate::commands::items::DocumentResponse;
use crate::state::{DocumentState, EditorSession};

/// Pointer pressed on the drag handle of `active`.
///
/// Ignored when `active` is not in the document.
pub fn drag_start(doc: &DocumentState, active: ItemId, x: f64, y: f64) -> DragPhase {
    debug!(%active, x, y, "drag_start command");

    doc.with_session_mut(|s| {
        if s.document().contains_id(&active) {
            s.gesture_mut().pointer_down(active, x, y);
        } else {
            debug!(%active, "Drag handle does not belong to the document");
            s.gesture_mut().cancel();
        }
        s.gesture().phase().clone()
    })
}

/// Pointer moved.
pub fn drag_move(doc: &DocumentState, x: f64, y: f64) -> DragPhase {
    doc.with_session_mut(|s| {
        if s.gesture_mut().pointer_move(x, y) {
            debug!(x, y, "Drag activated");
        }
        s.gesture().phase().clone()
    })
}

/// Pointer released over `over` (`None` outside any row).
pub fn drag_end(doc: &DocumentState, over: Option<ItemId>) -> DocumentResponse {
    debug!(?over, "drag_end command");

    doc.with_session_mut(|s| {
        if let Some(drop) = s.gesture_mut().pointer_up(over) {
            apply_drop(s, &drop);
        }
        DocumentResponse::from(&*s)
    })
}

/// Abandons the current gesture.
pub fn drag_cancel(doc: &DocumentState) {
    debug!("drag_cancel command");
    doc.with_session_mut(|s| s.gesture_mut().cancel());
}

/// Applies a completed drop reported by the view.
pub fn drop_item(doc: &DocumentState, drop: DragEnd) -> DocumentResponse {
    debug!(active = %drop.active, over = ?drop.over, "drop_item command");

    doc.with_session_mut(|s| {
        apply_drop(s, &drop);
        DocumentResponse::from(&*s)
    })
}

fn apply_drop(session: &mut EditorSession, drop: &DragEnd) {
    match resolve_drag_end(session.document(), drop) {
        Some(edit) => {
            debug!(?edit, "Drop resolved");
            session.apply(edit);
        }
        None => debug!("Drop ignored"),
    }
}
