//! # Structural Edits
//!
//! Insert, remove, promote, demote and move operations on the item tree.
//!
//! ## Contract
//! Every operation takes the current [`Document`] by reference and returns
//! an [`EditOutcome`]: a new document plus where focus should land. The
//! input is never mutated. Operations are total; a request whose
//! precondition does not hold returns the document unchanged with no focus
//! target.
//!
//! ## Promote / Demote
//! ```text
//!   before                 promote(1)              demote(0, 0)
//!   ┌──────────────┐       ┌──────────────┐        ┌──────────────┐
//!   │ 0  Design    │       │ 0  Design    │        │ 0  Design    │
//!   │ 1  Revisions │  ──►  │    └ Revisions│  ──►  │ 1  Revisions │ (qty 1, $0)
//!   │ 2  Hosting   │       │ 1  Hosting   │        │ 2  Hosting   │
//!   └──────────────┘       └──────────────┘        └──────────────┘
//! ```
//! The moved entry keeps its id in both directions. Numbers do not survive
//! promotion.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::focus::FocusTarget;
use crate::ids::{IdGenerator, ItemId};
use crate::types::{Document, Item, ItemField, SubItem};

// =============================================================================
// Edit Outcome
// =============================================================================

/// Result of a structural edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct EditOutcome {
    pub document: Document,
    /// `None` when the edit was a no-op or does not move focus.
    pub focus: Option<FocusTarget>,
}

impl EditOutcome {
    fn changed(items: Vec<Item>, focus: Option<FocusTarget>) -> Self {
        EditOutcome {
            document: Document::from_items_unchecked(items),
            focus,
        }
    }

    fn unchanged(document: &Document) -> Self {
        EditOutcome {
            document: document.clone(),
            focus: None,
        }
    }
}

// =============================================================================
// Structural Edit
// =============================================================================

/// A structural edit request, as produced by the keyboard and drag
/// controllers or sent directly by the view's buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum StructuralEdit {
    InsertItemAfter { index: usize },
    AppendItem,
    RemoveItem { index: usize },
    PromoteItemToSubitem { index: usize },
    DemoteSubitemToItem { item_index: usize, sub_index: usize },
    /// `sub_index: None` appends to the end of the list.
    InsertSubitemAfter { item_index: usize, sub_index: Option<usize> },
    RemoveSubitem { item_index: usize, sub_index: usize },
    MoveItem { from: usize, to: usize },
    MoveSubitem {
        from_item: usize,
        from_sub: usize,
        to_item: usize,
        to_sub: usize,
    },
}

impl StructuralEdit {
    /// Applies the edit to `document`.
    ///
    /// `ids` is only consulted by edits that create an entry.
    pub fn apply(&self, document: &Document, ids: &mut impl IdGenerator) -> EditOutcome {
        match *self {
            StructuralEdit::InsertItemAfter { index } => insert_item_after(document, index, ids),
            StructuralEdit::AppendItem => append_item(document, ids),
            StructuralEdit::RemoveItem { index } => remove_item(document, index),
            StructuralEdit::PromoteItemToSubitem { index } => {
                promote_item_to_subitem(document, index)
            }
            StructuralEdit::DemoteSubitemToItem {
                item_index,
                sub_index,
            } => demote_subitem_to_item(document, item_index, sub_index),
            StructuralEdit::InsertSubitemAfter {
                item_index,
                sub_index,
            } => insert_subitem_after(document, item_index, sub_index, ids),
            StructuralEdit::RemoveSubitem {
                item_index,
                sub_index,
            } => remove_subitem(document, item_index, sub_index),
            StructuralEdit::MoveItem { from, to } => move_item(document, from, to),
            StructuralEdit::MoveSubitem {
                from_item,
                from_sub,
                to_item,
                to_sub,
            } => move_subitem(document, from_item, from_sub, to_item, to_sub),
        }
    }
}

/// Draws ids until one is not already used by the document.
fn fresh_id(document: &Document, ids: &mut impl IdGenerator) -> ItemId {
    loop {
        let id = ids.next_id();
        if !id.is_blank() && !document.contains_id(&id) {
            return id;
        }
    }
}

// =============================================================================
// Item Operations
// =============================================================================

/// Inserts a blank item after `index` (appends when `index` is past the end).
///
/// ## Example
/// ```rust
/// use invoicer_core::edit::insert_item_after;
/// use invoicer_core::{Document, FocusTarget, SequentialIds};
///
/// let mut ids = SequentialIds::new();
/// let doc = Document::new(&mut ids);
/// let outcome = insert_item_after(&doc, 0, &mut ids);
///
/// assert_eq!(outcome.document.len(), 2);
/// assert_eq!(outcome.focus, Some(FocusTarget::description(1)));
/// ```
pub fn insert_item_after(
    document: &Document,
    index: usize,
    ids: &mut impl IdGenerator,
) -> EditOutcome {
    let at = index.saturating_add(1).min(document.len());
    let mut items = document.items().to_vec();
    items.insert(at, Item::blank(fresh_id(document, ids)));
    EditOutcome::changed(items, Some(FocusTarget::description(at)))
}

/// Appends a blank item at the end.
pub fn append_item(document: &Document, ids: &mut impl IdGenerator) -> EditOutcome {
    let at = document.len();
    let mut items = document.items().to_vec();
    items.push(Item::blank(fresh_id(document, ids)));
    EditOutcome::changed(items, Some(FocusTarget::description(at)))
}

/// Removes the item at `index`.
///
/// No-op when it is the only item or `index` is out of range.
pub fn remove_item(document: &Document, index: usize) -> EditOutcome {
    if document.len() <= 1 || index >= document.len() {
        return EditOutcome::unchanged(document);
    }
    let mut items = document.items().to_vec();
    items.remove(index);
    EditOutcome::changed(
        items,
        Some(FocusTarget::description(index.saturating_sub(1))),
    )
}

/// Turns the item at `index` into the last sub-item of the item before it.
///
/// ## Rules
/// - No-op for index 0 and out-of-range indices
/// - The sub-item keeps the item's id and description
/// - The item's own sub-items follow it into the new parent, in order
pub fn promote_item_to_subitem(document: &Document, index: usize) -> EditOutcome {
    if index == 0 || index >= document.len() {
        return EditOutcome::unchanged(document);
    }
    let mut items = document.items().to_vec();
    let promoted = items.remove(index);
    let parent = &mut items[index - 1];

    let sub_index = parent.subitems.len();
    parent.subitems.push(promoted.to_subitem());
    parent.subitems.extend(promoted.subitems);

    EditOutcome::changed(items, Some(FocusTarget::subitem(index - 1, sub_index)))
}

/// Moves an item from `from` to `to`, shifting the ones between.
///
/// `to` is clamped to the last index. No focus change.
pub fn move_item(document: &Document, from: usize, to: usize) -> EditOutcome {
    let len = document.len();
    if from >= len {
        return EditOutcome::unchanged(document);
    }
    let to = to.min(len - 1);
    if from == to {
        return EditOutcome::unchanged(document);
    }
    let mut items = document.items().to_vec();
    let moved = items.remove(from);
    items.insert(to, moved);
    EditOutcome::changed(items, None)
}

// =============================================================================
// Sub-Item Operations
// =============================================================================

/// Turns a sub-item into a full item placed right after its parent.
///
/// The new item keeps the sub-item's id and description and takes default
/// numbers. Sub-items after the demoted one stay with the parent.
pub fn demote_subitem_to_item(
    document: &Document,
    item_index: usize,
    sub_index: usize,
) -> EditOutcome {
    if document.subitem_at(item_index, sub_index).is_none() {
        return EditOutcome::unchanged(document);
    }
    let mut items = document.items().to_vec();
    let sub = items[item_index].subitems.remove(sub_index);
    items.insert(item_index + 1, Item::with_description(sub.id, sub.description));
    EditOutcome::changed(items, Some(FocusTarget::description(item_index + 1)))
}

/// Inserts a blank sub-item after `sub_index`, or at the end when
/// `sub_index` is `None` or past the end.
pub fn insert_subitem_after(
    document: &Document,
    item_index: usize,
    sub_index: Option<usize>,
    ids: &mut impl IdGenerator,
) -> EditOutcome {
    let Some(parent) = document.item_at(item_index) else {
        return EditOutcome::unchanged(document);
    };
    let len = parent.subitems.len();
    let at = sub_index.map_or(len, |s| s.saturating_add(1).min(len));

    let mut items = document.items().to_vec();
    items[item_index]
        .subitems
        .insert(at, SubItem::new(fresh_id(document, ids), String::new()));
    EditOutcome::changed(items, Some(FocusTarget::subitem(item_index, at)))
}

/// Removes a sub-item.
///
/// Focus moves to the previous sub-item, or to the parent's discount field
/// when the removed sub-item was first (including when it was the only one).
pub fn remove_subitem(document: &Document, item_index: usize, sub_index: usize) -> EditOutcome {
    if document.subitem_at(item_index, sub_index).is_none() {
        return EditOutcome::unchanged(document);
    }
    let mut items = document.items().to_vec();
    items[item_index].subitems.remove(sub_index);

    let focus = if sub_index == 0 {
        FocusTarget::item(item_index, ItemField::DiscountPercentage)
    } else {
        FocusTarget::subitem(item_index, sub_index - 1)
    };
    EditOutcome::changed(items, Some(focus))
}

/// Moves a sub-item within its parent or into another item's list.
///
/// ## Rules
/// - Same parent: array move, `to_sub` clamped to the last index
/// - Different parent: removed from the source, inserted at `to_sub`
///   (clamped to the destination length)
/// - The sub-item keeps its id. No focus change.
pub fn move_subitem(
    document: &Document,
    from_item: usize,
    from_sub: usize,
    to_item: usize,
    to_sub: usize,
) -> EditOutcome {
    if document.subitem_at(from_item, from_sub).is_none() || to_item >= document.len() {
        return EditOutcome::unchanged(document);
    }
    let mut items = document.items().to_vec();

    if from_item == to_item {
        let subs = &mut items[from_item].subitems;
        let to = to_sub.min(subs.len() - 1);
        if to == from_sub {
            return EditOutcome::unchanged(document);
        }
        let moved = subs.remove(from_sub);
        subs.insert(to, moved);
    } else {
        let moved = items[from_item].subitems.remove(from_sub);
        let dest = &mut items[to_item].subitems;
        let to = to_sub.min(dest.len());
        dest.insert(to, moved);
    }
    EditOutcome::changed(items, None)
}

// =============================================================================
// Scalar Updates
// =============================================================================

/// Sets one field of an item from raw input text.
///
/// Numeric fields are coerced; out-of-range indices leave the document as
/// it was.
pub fn set_item_field(document: &Document, index: usize, field: ItemField, text: &str) -> Document {
    if index >= document.len() {
        return document.clone();
    }
    let mut items = document.items().to_vec();
    items[index].set_field(field, text);
    Document::from_items_unchecked(items)
}

/// Sets a sub-item's description.
pub fn set_subitem_description(
    document: &Document,
    item_index: usize,
    sub_index: usize,
    text: &str,
) -> Document {
    if document.subitem_at(item_index, sub_index).is_none() {
        return document.clone();
    }
    let mut items = document.items().to_vec();
    items[item_index].subitems[sub_index].description = text.to_string();
    Document::from_items_unchecked(items)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SequentialIds;
    use crate::validation::validate_items;

    fn item(id: &str, desc: &str, subs: &[&str]) -> Item {
        let mut item = Item::with_description(ItemId::new(id), desc);
        item.subitems = subs
            .iter()
            .map(|s| SubItem::new(ItemId::new(*s), format!("{s} text")))
            .collect();
        item
    }

    fn doc(items: Vec<Item>) -> Document {
        Document::from_items(items).unwrap()
    }

    fn ids_of(doc: &Document) -> Vec<&str> {
        doc.items().iter().map(|i| i.id.as_str()).collect()
    }

    fn sub_ids_of(doc: &Document, index: usize) -> Vec<&str> {
        doc.items()[index]
            .subitems
            .iter()
            .map(|s| s.id.as_str())
            .collect()
    }

    #[test]
    fn test_insert_item_after_single_item() {
        let mut ids = SequentialIds::with_prefix("n");
        let original = doc(vec![item("a", "First", &[])]);
        let outcome = insert_item_after(&original, 0, &mut ids);

        assert_eq!(outcome.document.len(), 2);
        let new = &outcome.document.items()[1];
        assert_ne!(new.id, original.items()[0].id);
        assert_eq!(new.quantity, 1.0);
        assert_eq!(new.unit_price, 0.0);
        assert_eq!(new.description, "");
        assert_eq!(outcome.focus, Some(FocusTarget::description(1)));
        // Input untouched.
        assert_eq!(original.len(), 1);
    }

    #[test]
    fn test_insert_item_in_middle_and_past_end() {
        let mut ids = SequentialIds::with_prefix("n");
        let d = doc(vec![item("a", "", &[]), item("b", "", &[])]);

        let mid = insert_item_after(&d, 0, &mut ids);
        assert_eq!(ids_of(&mid.document), vec!["a", "n1", "b"]);

        let end = insert_item_after(&d, 99, &mut ids);
        assert_eq!(ids_of(&end.document), vec!["a", "b", "n2"]);
        assert_eq!(end.focus, Some(FocusTarget::description(2)));
    }

    #[test]
    fn test_fresh_id_skips_ids_in_use() {
        let mut ids = SequentialIds::new();
        let d = doc(vec![item("id-1", "", &["id-2"])]);
        let outcome = append_item(&d, &mut ids);
        assert_eq!(outcome.document.items()[1].id.as_str(), "id-3");
    }

    #[test]
    fn test_remove_item_focuses_previous() {
        let d = doc(vec![item("a", "", &[]), item("b", "", &[]), item("c", "", &[])]);
        let outcome = remove_item(&d, 2);
        assert_eq!(ids_of(&outcome.document), vec!["a", "b"]);
        assert_eq!(outcome.focus, Some(FocusTarget::description(1)));

        let outcome = remove_item(&d, 0);
        assert_eq!(ids_of(&outcome.document), vec!["b", "c"]);
        assert_eq!(outcome.focus, Some(FocusTarget::description(0)));
    }

    #[test]
    fn test_remove_last_remaining_item_is_noop() {
        let d = doc(vec![item("a", "keep", &[])]);
        let outcome = remove_item(&d, 0);
        assert_eq!(outcome.document, d);
        assert_eq!(outcome.focus, None);
    }

    #[test]
    fn test_promote_first_item_is_noop() {
        let d = doc(vec![item("a", "", &[]), item("b", "", &[])]);
        let outcome = promote_item_to_subitem(&d, 0);
        assert_eq!(outcome.document, d);
        assert_eq!(outcome.focus, None);
    }

    #[test]
    fn test_promote_appends_to_previous_item() {
        let d = doc(vec![
            item("a", "Design", &["a1"]),
            item("b", "Revisions", &["b1", "b2"]),
        ]);
        let outcome = promote_item_to_subitem(&d, 1);

        assert_eq!(ids_of(&outcome.document), vec!["a"]);
        assert_eq!(sub_ids_of(&outcome.document, 0), vec!["a1", "b", "b1", "b2"]);
        assert_eq!(outcome.document.subitem_at(0, 1).unwrap().description, "Revisions");
        assert_eq!(outcome.focus, Some(FocusTarget::subitem(0, 1)));
    }

    #[test]
    fn test_promote_then_demote_restores_position() {
        let mut original = doc(vec![
            item("a", "Design", &[]),
            item("b", "Revisions", &[]),
            item("c", "Hosting", &[]),
        ])
        .into_items();
        original[1].quantity = 5.0;
        original[1].unit_price = 80.0;
        let d = doc(original);

        let promoted = promote_item_to_subitem(&d, 1);
        let Some(FocusTarget::SubItem {
            item_index,
            sub_index,
        }) = promoted.focus
        else {
            panic!("expected sub-item focus");
        };
        let restored = demote_subitem_to_item(&promoted.document, item_index, sub_index);

        assert_eq!(ids_of(&restored.document), vec!["a", "b", "c"]);
        let b = &restored.document.items()[1];
        assert_eq!(b.description, "Revisions");
        assert_eq!(b.quantity, 1.0);
        assert_eq!(b.unit_price, 0.0);
        assert_eq!(restored.focus, Some(FocusTarget::description(1)));
    }

    #[test]
    fn test_demote_keeps_following_subitems_with_parent() {
        let d = doc(vec![item("a", "", &["a1", "a2", "a3"]), item("b", "", &[])]);
        let outcome = demote_subitem_to_item(&d, 0, 1);
        assert_eq!(ids_of(&outcome.document), vec!["a", "a2", "b"]);
        assert_eq!(sub_ids_of(&outcome.document, 0), vec!["a1", "a3"]);
        assert_eq!(outcome.document.items()[1].description, "a2 text");
    }

    #[test]
    fn test_demote_out_of_range_is_noop() {
        let d = doc(vec![item("a", "", &[])]);
        assert_eq!(demote_subitem_to_item(&d, 0, 0).document, d);
        assert_eq!(demote_subitem_to_item(&d, 3, 0).focus, None);
    }

    #[test]
    fn test_insert_subitem_after_and_append() {
        let mut ids = SequentialIds::with_prefix("s");
        let d = doc(vec![item("a", "", &["a1", "a2"])]);

        let after_first = insert_subitem_after(&d, 0, Some(0), &mut ids);
        assert_eq!(sub_ids_of(&after_first.document, 0), vec!["a1", "s1", "a2"]);
        assert_eq!(after_first.focus, Some(FocusTarget::subitem(0, 1)));

        let appended = insert_subitem_after(&d, 0, None, &mut ids);
        assert_eq!(sub_ids_of(&appended.document, 0), vec!["a1", "a2", "s2"]);
        assert_eq!(appended.focus, Some(FocusTarget::subitem(0, 2)));

        let empty = doc(vec![item("b", "", &[])]);
        let first = insert_subitem_after(&empty, 0, None, &mut ids);
        assert_eq!(first.focus, Some(FocusTarget::subitem(0, 0)));
    }

    #[test]
    fn test_remove_only_subitem_focuses_discount() {
        let d = doc(vec![item("a", "", &["a1"])]);
        let outcome = remove_subitem(&d, 0, 0);
        assert!(outcome.document.items()[0].subitems.is_empty());
        assert_eq!(
            outcome.focus,
            Some(FocusTarget::item(0, ItemField::DiscountPercentage))
        );
    }

    #[test]
    fn test_remove_subitem_focuses_previous() {
        let d = doc(vec![item("a", "", &["a1", "a2", "a3"])]);
        let outcome = remove_subitem(&d, 0, 2);
        assert_eq!(sub_ids_of(&outcome.document, 0), vec!["a1", "a2"]);
        assert_eq!(outcome.focus, Some(FocusTarget::subitem(0, 1)));

        let outcome = remove_subitem(&d, 0, 0);
        assert_eq!(
            outcome.focus,
            Some(FocusTarget::item(0, ItemField::DiscountPercentage))
        );
    }

    #[test]
    fn test_move_item_array_move() {
        let d = doc(vec![
            item("y", "", &[]),
            item("z", "", &[]),
            item("x", "", &[]),
        ]);
        let outcome = move_item(&d, 2, 0);
        assert_eq!(ids_of(&outcome.document), vec!["x", "y", "z"]);

        let outcome = move_item(&d, 0, 2);
        assert_eq!(ids_of(&outcome.document), vec!["z", "x", "y"]);

        assert_eq!(move_item(&d, 1, 1).document, d);
        assert_eq!(move_item(&d, 5, 0).document, d);
    }

    #[test]
    fn test_move_subitem_within_parent() {
        let d = doc(vec![item("a", "", &["a1", "a2", "a3"])]);
        let outcome = move_subitem(&d, 0, 0, 0, 2);
        assert_eq!(sub_ids_of(&outcome.document, 0), vec!["a2", "a3", "a1"]);
    }

    #[test]
    fn test_move_subitem_across_parents() {
        let d = doc(vec![item("a", "", &["a1", "a2"]), item("b", "", &["b1"])]);
        let outcome = move_subitem(&d, 0, 0, 1, 1);
        assert_eq!(sub_ids_of(&outcome.document, 0), vec!["a2"]);
        assert_eq!(sub_ids_of(&outcome.document, 1), vec!["b1", "a1"]);

        let clamped = move_subitem(&d, 0, 1, 1, 42);
        assert_eq!(sub_ids_of(&clamped.document, 1), vec!["b1", "a2"]);
    }

    #[test]
    fn test_scalar_updates() {
        let d = doc(vec![item("a", "", &["a1"])]);

        let d2 = set_item_field(&d, 0, ItemField::UnitPrice, "12.50");
        assert_eq!(d2.items()[0].unit_price, 12.5);
        assert_eq!(d.items()[0].unit_price, 0.0);

        let d3 = set_item_field(&d2, 0, ItemField::Quantity, "");
        assert_eq!(d3.items()[0].quantity, 0.0);

        let d4 = set_subitem_description(&d3, 0, 0, "Color: blue");
        assert_eq!(d4.subitem_at(0, 0).unwrap().description, "Color: blue");

        assert_eq!(set_item_field(&d, 9, ItemField::Description, "x"), d);
    }

    #[test]
    fn test_apply_dispatches() {
        let mut ids = SequentialIds::with_prefix("n");
        let d = doc(vec![item("a", "", &[]), item("b", "", &[])]);

        let outcome = StructuralEdit::PromoteItemToSubitem { index: 1 }.apply(&d, &mut ids);
        assert_eq!(outcome, promote_item_to_subitem(&d, 1));

        let outcome = StructuralEdit::AppendItem.apply(&d, &mut ids);
        assert_eq!(ids_of(&outcome.document), vec!["a", "b", "n1"]);
    }

    #[test]
    fn test_edit_request_json_shape() {
        let edit: StructuralEdit =
            serde_json::from_str(r#"{"op": "insert_subitem_after", "item_index": 2, "sub_index": null}"#)
                .unwrap();
        assert_eq!(
            edit,
            StructuralEdit::InsertSubitemAfter {
                item_index: 2,
                sub_index: None
            }
        );
    }

    /// Drives a long deterministic sequence of edits and checks the document
    /// invariants after every step.
    #[test]
    fn test_invariants_hold_across_edit_sequences() {
        let mut ids = SequentialIds::new();
        let mut d = Document::new(&mut ids);
        let mut seed: u64 = 0x2545_F491_4F6C_DD1D;
        let mut next = |bound: usize| {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            (seed % bound.max(1) as u64) as usize
        };

        for _ in 0..2000 {
            let len = d.len();
            let item_index = next(len + 1);
            let sub_len = d.item_at(item_index).map_or(1, |i| i.subitems.len() + 1);
            let edit = match next(9) {
                0 => StructuralEdit::InsertItemAfter { index: item_index },
                1 => StructuralEdit::AppendItem,
                2 => StructuralEdit::RemoveItem { index: item_index },
                3 => StructuralEdit::PromoteItemToSubitem { index: item_index },
                4 => StructuralEdit::DemoteSubitemToItem {
                    item_index,
                    sub_index: next(sub_len),
                },
                5 => StructuralEdit::InsertSubitemAfter {
                    item_index,
                    sub_index: Some(next(sub_len)),
                },
                6 => StructuralEdit::RemoveSubitem {
                    item_index,
                    sub_index: next(sub_len),
                },
                7 => StructuralEdit::MoveItem {
                    from: item_index,
                    to: next(len + 1),
                },
                _ => StructuralEdit::MoveSubitem {
                    from_item: item_index,
                    from_sub: next(sub_len),
                    to_item: next(len + 1),
                    to_sub: next(sub_len + 1),
                },
            };

            let outcome = edit.apply(&d, &mut ids);
            assert!(outcome.document.len() >= 1);
            assert_eq!(validate_items(outcome.document.items()), Ok(()), "{edit:?}");
            if let Some(target) = outcome.focus {
                assert!(target.item_index() < outcome.document.len(), "{edit:?}");
            }
            d = outcome.document;
        }
    }
}
