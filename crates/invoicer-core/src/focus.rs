//! # Focus Module
//!
//! Where input focus should land after an edit, and the deferred hand-off
//! that moves it there once the view has caught up.
//!
//! ## Element Id Scheme
//! ```text
//! item-{i}-description
//! item-{i}-quantity
//! item-{i}-unit_price
//! item-{i}-discount_percentage
//! item-{i}-subitem-{j}-description
//! ```
//! Ids are derived from positions only, so the view can compute them
//! without consulting the document.
//!
//! ## Scheduling
//! ```text
//! ┌──────────────┐   schedule()   ┌────────────────┐  after render  ┌─────────────┐
//! │ edit / key   │ ─────────────► │ FocusScheduler │ ─────────────► │ FocusHost   │
//! │ controller   │                │ (latest wins)  │    flush()     │ (the view)  │
//! └──────────────┘                └────────────────┘                └─────────────┘
//! ```
//! The mutation that creates a field always happens before the field exists
//! in the view, so the scheduler holds the target until the host has
//! rendered. A target whose control is gone is dropped quietly.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreError;
use crate::types::ItemField;

// =============================================================================
// Focus Target
// =============================================================================

/// A field that should receive input focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FocusTarget {
    /// A field of a top-level item.
    Item { index: usize, field: ItemField },
    /// The description of a sub-item.
    SubItem { item_index: usize, sub_index: usize },
}

impl FocusTarget {
    /// Description field of an item.
    pub const fn description(index: usize) -> Self {
        FocusTarget::Item {
            index,
            field: ItemField::Description,
        }
    }

    /// Any field of an item.
    pub const fn item(index: usize, field: ItemField) -> Self {
        FocusTarget::Item { index, field }
    }

    /// Description field of a sub-item.
    pub const fn subitem(item_index: usize, sub_index: usize) -> Self {
        FocusTarget::SubItem {
            item_index,
            sub_index,
        }
    }

    /// The item this target belongs to.
    pub const fn item_index(&self) -> usize {
        match self {
            FocusTarget::Item { index, .. } => *index,
            FocusTarget::SubItem { item_index, .. } => *item_index,
        }
    }

    /// Element id the view assigns to the target's control.
    ///
    /// ## Example
    /// ```rust
    /// use invoicer_core::{FocusTarget, ItemField};
    ///
    /// assert_eq!(FocusTarget::item(3, ItemField::UnitPrice).element_id(), "item-3-unit_price");
    /// assert_eq!(FocusTarget::subitem(0, 2).element_id(), "item-0-subitem-2-description");
    /// ```
    pub fn element_id(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for FocusTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FocusTarget::Item { index, field } => write!(f, "item-{}-{}", index, field),
            FocusTarget::SubItem {
                item_index,
                sub_index,
            } => write!(f, "item-{}-subitem-{}-description", item_index, sub_index),
        }
    }
}

impl FromStr for FocusTarget {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || CoreError::MalformedElementId(s.to_string());

        let rest = s.strip_prefix("item-").ok_or_else(malformed)?;
        let (index, rest) = rest.split_once('-').ok_or_else(malformed)?;
        let index = parse_index(index).ok_or_else(malformed)?;

        if let Some(sub) = rest.strip_prefix("subitem-") {
            let sub_index = sub
                .strip_suffix("-description")
                .and_then(parse_index)
                .ok_or_else(malformed)?;
            return Ok(FocusTarget::subitem(index, sub_index));
        }

        let field = ItemField::parse(rest).ok_or_else(malformed)?;
        Ok(FocusTarget::item(index, field))
    }
}

/// Digits only. `usize::from_str` alone would accept a leading `+`.
fn parse_index(text: &str) -> Option<usize> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

// =============================================================================
// Focus Host Port
// =============================================================================

/// The view side of focus transfer.
///
/// Implemented by whatever renders the editor (a webview bridge, a TUI, a
/// test double).
pub trait FocusHost {
    /// Focuses the control with `element_id`. Returns false when no such
    /// control exists.
    fn focus_element(&mut self, element_id: &str) -> bool;
}

/// What happened when a pending target was flushed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FocusResult {
    /// Focus moved to the control.
    Focused { element_id: String },
    /// The control no longer exists. Not an error.
    Missing { element_id: String },
    /// Nothing was pending.
    Idle,
}

// =============================================================================
// Focus Scheduler
// =============================================================================

/// Holds the focus target of the latest action until the view has rendered.
///
/// Scheduling replaces any target that has not been flushed yet, so the
/// focus of one action can never land after the next action's mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FocusScheduler {
    pending: Option<FocusTarget>,
}

impl FocusScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the target for the next flush.
    pub fn schedule(&mut self, target: FocusTarget) {
        self.pending = Some(target);
    }

    /// The target waiting for the next render, if any.
    pub fn pending(&self) -> Option<FocusTarget> {
        self.pending
    }

    /// Drops the pending target without focusing anything.
    pub fn cancel(&mut self) -> Option<FocusTarget> {
        self.pending.take()
    }

    /// Moves focus to the pending target. Call after the view has rendered.
    pub fn flush(&mut self, host: &mut impl FocusHost) -> FocusResult {
        let Some(target) = self.pending.take() else {
            return FocusResult::Idle;
        };
        let element_id = target.element_id();
        if host.focus_element(&element_id) {
            FocusResult::Focused { element_id }
        } else {
            FocusResult::Missing { element_id }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
