//! # Drag Controller
//!
//! Turns pointer gestures into reorder edits.
//!
//! ## Gesture Lifecycle
//! ```text
//! ┌────────┐ pointer_down ┌─────────┐ travel ≥ distance ┌──────────┐
//! │  Idle  │ ───────────► │ Pressed │ ────────────────► │ Dragging │
//! └────────┘              └─────────┘                   └──────────┘
//!      ▲                       │ pointer_up                  │ pointer_up
//!      │                       ▼ (click, no DragEnd)         ▼
//!      └───────────────────────┴──────────────────────── DragEnd { active, over }
//! ```
//! A press that never travels far enough is a click: the row's inputs keep
//! working and no reorder happens.
//!
//! ## Drop Resolution
//! | active      | over                      | edit                                   |
//! |-------------|---------------------------|----------------------------------------|
//! | item        | item                      | `MoveItem(active, over)`               |
//! | sub-item    | sub-item, same parent     | `MoveSubitem` within the parent        |
//! | sub-item    | sub-item, other parent    | `MoveSubitem` to just after `over`     |
//! | anything    | itself / none / unknown   | no-op                                  |
//! | item        | sub-item (or vice versa)  | no-op                                  |

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::edit::{EditOutcome, StructuralEdit};
use crate::ids::{IdGenerator, ItemId};
use crate::types::{Document, Location};

/// Pointer travel (in px) before a press becomes a drag.
pub const DEFAULT_ACTIVATION_DISTANCE: f64 = 5.0;

// =============================================================================
// Drag End
// =============================================================================

/// A completed drag: what was dragged and what it was dropped on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DragEnd {
    pub active: ItemId,
    /// `None` when dropped outside any row.
    pub over: Option<ItemId>,
}

/// Resolves a drop to a move edit, or `None` for a no-op drop.
///
/// ## Example
/// ```rust
/// use invoicer_core::drag::{resolve_drag_end, DragEnd};
/// use invoicer_core::{Document, Item, ItemId, StructuralEdit};
///
/// let doc = Document::from_items(vec![
///     Item::blank(ItemId::new("y")),
///     Item::blank(ItemId::new("z")),
///     Item::blank(ItemId::new("x")),
/// ]).unwrap();
///
/// let drop = DragEnd { active: ItemId::new("x"), over: Some(ItemId::new("y")) };
/// assert_eq!(resolve_drag_end(&doc, &drop), Some(StructuralEdit::MoveItem { from: 2, to: 0 }));
/// ```
pub fn resolve_drag_end(document: &Document, drop: &DragEnd) -> Option<StructuralEdit> {
    let over = drop.over.as_ref()?;
    if over == &drop.active {
        return None;
    }

    match (document.locate(&drop.active)?, document.locate(over)?) {
        (Location::Item { index: from }, Location::Item { index: to }) => {
            Some(StructuralEdit::MoveItem { from, to })
        }
        (
            Location::SubItem {
                item_index: from_item,
                sub_index: from_sub,
            },
            Location::SubItem {
                item_index: to_item,
                sub_index: to_sub,
            },
        ) => {
            let to_sub = if from_item == to_item { to_sub } else { to_sub + 1 };
            Some(StructuralEdit::MoveSubitem {
                from_item,
                from_sub,
                to_item,
                to_sub,
            })
        }
        _ => None,
    }
}

/// Resolves and applies a drop. A no-op drop returns the document unchanged.
pub fn apply_drag_end(
    document: &Document,
    drop: &DragEnd,
    ids: &mut impl IdGenerator,
) -> EditOutcome {
    match resolve_drag_end(document, drop) {
        Some(edit) => edit.apply(document, ids),
        None => EditOutcome {
            document: document.clone(),
            focus: None,
        },
    }
}

// =============================================================================
// Drag Gesture
// =============================================================================

/// Where a pointer gesture currently stands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum DragPhase {
    Idle,
    Pressed { active: ItemId, origin_x: f64, origin_y: f64 },
    Dragging { active: ItemId },
}

/// Pointer-gesture tracker with an activation distance.
#[derive(Debug, Clone, PartialEq)]
pub struct DragGesture {
    activation_distance: f64,
    phase: DragPhase,
}

impl Default for DragGesture {
    fn default() -> Self {
        Self::new(DEFAULT_ACTIVATION_DISTANCE)
    }
}

impl DragGesture {
    /// Tracker that activates after `activation_distance` px of travel.
    /// Negative or non-finite distances activate immediately.
    pub fn new(activation_distance: f64) -> Self {
        let activation_distance = if activation_distance.is_finite() {
            activation_distance.max(0.0)
        } else {
            0.0
        };
        DragGesture {
            activation_distance,
            phase: DragPhase::Idle,
        }
    }

    pub fn activation_distance(&self) -> f64 {
        self.activation_distance
    }

    pub fn phase(&self) -> &DragPhase {
        &self.phase
    }

    /// True once the press has turned into a drag.
    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, DragPhase::Dragging { .. })
    }

    /// Pointer pressed on the drag handle of `active`.
    pub fn pointer_down(&mut self, active: ItemId, x: f64, y: f64) {
        self.phase = DragPhase::Pressed {
            active,
            origin_x: x,
            origin_y: y,
        };
    }

    /// Pointer moved. Returns true when this move activated the drag.
    pub fn pointer_move(&mut self, x: f64, y: f64) -> bool {
        let DragPhase::Pressed {
            active,
            origin_x,
            origin_y,
        } = &self.phase
        else {
            return false;
        };
        let travel = (x - origin_x).hypot(y - origin_y);
        if travel >= self.activation_distance {
            self.phase = DragPhase::Dragging {
                active: active.clone(),
            };
            return true;
        }
        false
    }

    /// Pointer released over `over`. Yields a drop only for an active drag.
    pub fn pointer_up(&mut self, over: Option<ItemId>) -> Option<DragEnd> {
        match std::mem::replace(&mut self.phase, DragPhase::Idle) {
            DragPhase::Dragging { active } => Some(DragEnd { active, over }),
            _ => None,
        }
    }

    /// Abandons the gesture (escape key, pointer lost).
    pub fn cancel(&mut self) {
        self.phase = DragPhase::Idle;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SequentialIds;
    use crate::types::{Item, SubItem};

    fn id(s: &str) -> ItemId {
        ItemId::new(s)
    }

    fn drop(active: &str, over: Option<&str>) -> DragEnd {
        DragEnd {
            active: id(active),
            over: over.map(id),
        }
    }

    fn doc() -> Document {
        let mut a = Item::blank(id("a"));
        a.subitems = vec![SubItem::new(id("a1"), ""), SubItem::new(id("a2"), "")];
        let mut b = Item::blank(id("b"));
        b.subitems = vec![SubItem::new(id("b1"), "")];
        Document::from_items(vec![a, b, Item::blank(id("c"))]).unwrap()
    }

    #[test]
    fn test_item_drag_moves_to_over_index() {
        let d = doc();
        let outcome = apply_drag_end(&d, &drop("c", Some("a")), &mut SequentialIds::new());
        let ids: Vec<&str> = outcome.document.items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
        // Sub-items travel with their items untouched.
        assert_eq!(outcome.document.items()[1].subitems.len(), 2);
        assert_eq!(outcome.focus, None);
    }

    #[test]
    fn test_subitem_drag_same_parent() {
        assert_eq!(
            resolve_drag_end(&doc(), &drop("a2", Some("a1"))),
            Some(StructuralEdit::MoveSubitem {
                from_item: 0,
                from_sub: 1,
                to_item: 0,
                to_sub: 0
            })
        );
    }

    #[test]
    fn test_subitem_drag_across_parents_lands_after_over() {
        let d = doc();
        let edit = resolve_drag_end(&d, &drop("a1", Some("b1"))).unwrap();
        assert_eq!(
            edit,
            StructuralEdit::MoveSubitem {
                from_item: 0,
                from_sub: 0,
                to_item: 1,
                to_sub: 1
            }
        );

        let outcome = edit.apply(&d, &mut SequentialIds::new());
        let b_subs: Vec<&str> = outcome.document.items()[1]
            .subitems
            .iter()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(b_subs, vec!["b1", "a1"]);
    }

    #[test]
    fn test_noop_drops() {
        let d = doc();
        assert_eq!(resolve_drag_end(&d, &drop("a", Some("a"))), None);
        assert_eq!(resolve_drag_end(&d, &drop("a", None)), None);
        assert_eq!(resolve_drag_end(&d, &drop("zz", Some("a"))), None);
        assert_eq!(resolve_drag_end(&d, &drop("a", Some("b1"))), None);
        assert_eq!(resolve_drag_end(&d, &drop("a1", Some("c"))), None);

        let outcome = apply_drag_end(&d, &drop("a", None), &mut SequentialIds::new());
        assert_eq!(outcome.document, d);
    }

    #[test]
    fn test_click_is_not_a_drag() {
        let mut gesture = DragGesture::default();
        gesture.pointer_down(id("a"), 10.0, 10.0);
        assert!(!gesture.pointer_move(13.0, 13.0));
        assert!(!gesture.is_dragging());
        assert_eq!(gesture.pointer_up(Some(id("b"))), None);
        assert_eq!(gesture.phase(), &DragPhase::Idle);
    }

    #[test]
    fn test_drag_activates_after_distance() {
        let mut gesture = DragGesture::new(5.0);
        gesture.pointer_down(id("c"), 0.0, 0.0);
        assert!(gesture.pointer_move(3.0, 4.0));
        assert!(gesture.is_dragging());
        // Further moves do not re-activate.
        assert!(!gesture.pointer_move(30.0, 40.0));

        let end = gesture.pointer_up(Some(id("a"))).unwrap();
        assert_eq!(end, drop("c", Some("a")));
        assert!(!gesture.is_dragging());
    }

    #[test]
    fn test_cancel_and_move_without_press() {
        let mut gesture = DragGesture::default();
        assert!(!gesture.pointer_move(100.0, 100.0));

        gesture.pointer_down(id("a"), 0.0, 0.0);
        gesture.pointer_move(50.0, 0.0);
        gesture.cancel();
        assert_eq!(gesture.pointer_up(Some(id("b"))), None);
    }

    #[test]
    fn test_bad_distance_activates_immediately() {
        let gesture = DragGesture::new(f64::NAN);
        assert_eq!(gesture.activation_distance(), 0.0);
        assert_eq!(DragGesture::new(-3.0).activation_distance(), 0.0);
    }
}
