//! # Keyboard Controller
//!
//! Maps a key press on a focused field to a structural edit, a focus move,
//! or nothing at all.
//!
//! ## Field Grid
//! ```text
//!            ◄── ArrowLeft (caret at start)    ArrowRight (caret at end) ──►
//!
//!   item 0   [description] [quantity] [unit_price] [discount_percentage] ──► item 1 description
//!              │ ▲            │ ▲          │ ▲              │ ▲             (or new item when last)
//!   sub 0.0    ▼ │            │ │          │ │              │ │
//!   [sub-item description]    ▼ │          ▼ │              ▼ │
//!   item 1   [description] [quantity] [unit_price] [discount_percentage]
//! ```
//! Vertical keys on a numeric column move along that column. Vertical keys on
//! descriptions walk items and sub-items in display order.
//!
//! ## Outcomes
//! - [`KeyOutcome::Edit`]: apply the edit; focus comes from its outcome
//! - [`KeyOutcome::Focus`]: move focus, document unchanged
//! - [`KeyOutcome::Consumed`]: suppress native handling, do nothing else
//! - [`KeyOutcome::PassThrough`]: let the control handle the key natively
//!
//! Horizontal arrows away from a text boundary, Tab and every unmapped key
//! pass through. Vertical moves past the first or last row are consumed.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::edit::StructuralEdit;
use crate::focus::FocusTarget;
use crate::types::{Document, ItemField};

// =============================================================================
// Key Event
// =============================================================================

/// Keys the controller distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Enter,
    Backspace,
    Space,
    Tab,
    #[serde(other)]
    Other,
}

impl Key {
    /// Maps a DOM `KeyboardEvent.code` / `.key` value.
    pub fn from_dom(name: &str) -> Self {
        match name {
            "ArrowLeft" => Key::ArrowLeft,
            "ArrowRight" => Key::ArrowRight,
            "ArrowUp" => Key::ArrowUp,
            "ArrowDown" => Key::ArrowDown,
            "Enter" | "NumpadEnter" => Key::Enter,
            "Backspace" => Key::Backspace,
            "Space" | " " => Key::Space,
            "Tab" => Key::Tab,
            _ => Key::Other,
        }
    }
}

/// Selection of the focused text control, in characters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Caret {
    pub selection_start: usize,
    pub selection_end: usize,
    /// Length of the control's current text.
    pub text_len: usize,
}

impl Caret {
    /// Collapsed caret at `pos` in text of length `text_len`.
    pub const fn at(pos: usize, text_len: usize) -> Self {
        Caret {
            selection_start: pos,
            selection_end: pos,
            text_len,
        }
    }

    /// Collapsed at position 0.
    pub const fn at_start(&self) -> bool {
        self.selection_start == 0 && self.selection_end == 0
    }

    /// Collapsed after the last character.
    pub const fn at_end(&self) -> bool {
        self.selection_start == self.text_len && self.selection_end == self.text_len
    }

    /// Selection starts after the last character, whatever its end.
    pub const fn starts_at_end(&self) -> bool {
        self.selection_start == self.text_len
    }
}

/// A key press on the focused field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct KeyEvent {
    pub key: Key,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub caret: Caret,
}

impl KeyEvent {
    /// Plain key press with a caret at the start of empty text.
    pub const fn plain(key: Key) -> Self {
        KeyEvent {
            key,
            ctrl: false,
            caret: Caret::at(0, 0),
        }
    }

    /// Same key press with the given caret.
    pub const fn with_caret(self, caret: Caret) -> Self {
        KeyEvent { caret, ..self }
    }

    /// Same key press with Ctrl held.
    pub const fn with_ctrl(self) -> Self {
        KeyEvent { ctrl: true, ..self }
    }

    const fn is_toggle(&self) -> bool {
        self.ctrl && matches!(self.key, Key::Space)
    }
}

/// What the view should do with a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "action", content = "target", rename_all = "snake_case")]
pub enum KeyOutcome {
    Edit(StructuralEdit),
    Focus(FocusTarget),
    Consumed,
    PassThrough,
}

// =============================================================================
// Dispatch
// =============================================================================

/// Resolves a key press on `target` against the current document.
///
/// A target that no longer exists in the document passes the key through.
///
/// ## Example
/// ```rust
/// use invoicer_core::keyboard::{handle_key, Key, KeyEvent, KeyOutcome};
/// use invoicer_core::{Document, FocusTarget, SequentialIds, StructuralEdit};
///
/// let doc = Document::new(&mut SequentialIds::new());
/// let outcome = handle_key(&doc, FocusTarget::description(0), KeyEvent::plain(Key::Enter));
/// assert_eq!(outcome, KeyOutcome::Edit(StructuralEdit::InsertItemAfter { index: 0 }));
/// ```
pub fn handle_key(document: &Document, target: FocusTarget, event: KeyEvent) -> KeyOutcome {
    match target {
        FocusTarget::Item { index, field } => {
            if index >= document.len() {
                return KeyOutcome::PassThrough;
            }
            match field {
                ItemField::Description => on_description(document, index, event),
                ItemField::Quantity | ItemField::UnitPrice => on_numeric(document, index, field, event),
                ItemField::DiscountPercentage => on_discount(document, index, event),
            }
        }
        FocusTarget::SubItem {
            item_index,
            sub_index,
        } => {
            if document.subitem_at(item_index, sub_index).is_none() {
                return KeyOutcome::PassThrough;
            }
            on_subitem(document, item_index, sub_index, event)
        }
    }
}

/// Focus `index`'s description when it exists, consume otherwise.
fn focus_description_if_exists(document: &Document, index: usize) -> KeyOutcome {
    if index < document.len() {
        KeyOutcome::Focus(FocusTarget::description(index))
    } else {
        KeyOutcome::Consumed
    }
}

fn on_description(document: &Document, index: usize, event: KeyEvent) -> KeyOutcome {
    if event.is_toggle() {
        if index == 0 {
            return KeyOutcome::Consumed;
        }
        return KeyOutcome::Edit(StructuralEdit::PromoteItemToSubitem { index });
    }

    match event.key {
        Key::Enter => KeyOutcome::Edit(StructuralEdit::InsertItemAfter { index }),
        Key::Backspace => {
            // Raw check: whitespace-only descriptions are kept.
            let empty = document
                .item_at(index)
                .is_some_and(|item| item.description.is_empty());
            if !empty {
                KeyOutcome::PassThrough
            } else if document.len() > 1 {
                KeyOutcome::Edit(StructuralEdit::RemoveItem { index })
            } else {
                KeyOutcome::Consumed
            }
        }
        Key::ArrowDown => {
            let has_subitems = document
                .item_at(index)
                .is_some_and(|item| !item.subitems.is_empty());
            if has_subitems {
                KeyOutcome::Focus(FocusTarget::subitem(index, 0))
            } else {
                focus_description_if_exists(document, index + 1)
            }
        }
        Key::ArrowUp => match index.checked_sub(1) {
            Some(prev) => KeyOutcome::Focus(FocusTarget::description(prev)),
            None => KeyOutcome::Consumed,
        },
        Key::ArrowRight if event.caret.starts_at_end() => {
            KeyOutcome::Focus(FocusTarget::item(index, ItemField::Quantity))
        }
        _ => KeyOutcome::PassThrough,
    }
}

/// Quantity and unit price share one shape: left, right/enter, column moves.
fn on_numeric(document: &Document, index: usize, field: ItemField, event: KeyEvent) -> KeyOutcome {
    let (left, right) = match field {
        ItemField::Quantity => (ItemField::Description, ItemField::UnitPrice),
        _ => (ItemField::Quantity, ItemField::DiscountPercentage),
    };

    match event.key {
        Key::ArrowLeft if event.caret.at_start() => {
            KeyOutcome::Focus(FocusTarget::item(index, left))
        }
        Key::ArrowRight if event.caret.at_end() => {
            KeyOutcome::Focus(FocusTarget::item(index, right))
        }
        Key::Enter => KeyOutcome::Focus(FocusTarget::item(index, right)),
        Key::ArrowDown | Key::ArrowUp => column_move(document, index, field, event.key),
        _ => KeyOutcome::PassThrough,
    }
}

fn on_discount(document: &Document, index: usize, event: KeyEvent) -> KeyOutcome {
    let advance = || {
        if document.is_last_item(index) {
            KeyOutcome::Edit(StructuralEdit::InsertItemAfter { index })
        } else {
            KeyOutcome::Focus(FocusTarget::description(index + 1))
        }
    };

    match event.key {
        Key::ArrowLeft if event.caret.at_start() => {
            KeyOutcome::Focus(FocusTarget::item(index, ItemField::UnitPrice))
        }
        Key::ArrowRight if event.caret.at_end() => advance(),
        Key::Enter => advance(),
        Key::ArrowDown | Key::ArrowUp => {
            column_move(document, index, ItemField::DiscountPercentage, event.key)
        }
        _ => KeyOutcome::PassThrough,
    }
}

/// Same field on the next or previous item; consumed at the edges.
fn column_move(document: &Document, index: usize, field: ItemField, key: Key) -> KeyOutcome {
    let next = match key {
        Key::ArrowDown => Some(index + 1).filter(|&i| i < document.len()),
        _ => index.checked_sub(1),
    };
    match next {
        Some(i) => KeyOutcome::Focus(FocusTarget::item(i, field)),
        None => KeyOutcome::Consumed,
    }
}

fn on_subitem(document: &Document, item_index: usize, sub_index: usize, event: KeyEvent) -> KeyOutcome {
    if event.is_toggle() {
        return KeyOutcome::Edit(StructuralEdit::DemoteSubitemToItem {
            item_index,
            sub_index,
        });
    }

    let sub_count = document
        .item_at(item_index)
        .map_or(0, |item| item.subitems.len());

    match event.key {
        Key::Enter => KeyOutcome::Edit(StructuralEdit::InsertSubitemAfter {
            item_index,
            sub_index: Some(sub_index),
        }),
        Key::Backspace => {
            // Trimmed check, unlike item descriptions.
            let empty = document
                .subitem_at(item_index, sub_index)
                .is_some_and(|sub| sub.description.trim().is_empty());
            if empty {
                KeyOutcome::Edit(StructuralEdit::RemoveSubitem {
                    item_index,
                    sub_index,
                })
            } else {
                KeyOutcome::PassThrough
            }
        }
        Key::ArrowDown => {
            if sub_index + 1 < sub_count {
                KeyOutcome::Focus(FocusTarget::subitem(item_index, sub_index + 1))
            } else {
                focus_description_if_exists(document, item_index + 1)
            }
        }
        Key::ArrowUp => match sub_index.checked_sub(1) {
            Some(prev) => KeyOutcome::Focus(FocusTarget::subitem(item_index, prev)),
            None => KeyOutcome::Focus(FocusTarget::description(item_index)),
        },
        _ => KeyOutcome::PassThrough,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
