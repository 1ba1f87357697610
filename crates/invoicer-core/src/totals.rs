//! # Totals Module
//!
//! Derives line totals, subtotal, discount, tax and grand total from a
//! document.
//!
//! ## Calculation Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Totals Pipeline                                    │
//! │                                                                         │
//! │  Item ──► line_total = qty × price × (1 − item_discount/100)           │
//! │             │   (sub-items contribute nothing)                          │
//! │             ▼                                                           │
//! │  subtotal = Σ line_total                                               │
//! │             │                                                           │
//! │             ▼                                                           │
//! │  discount_amount   = subtotal × doc_discount/100                       │
//! │  discounted        = subtotal × (1 − doc_discount/100)                 │
//! │             │                                                           │
//! │             ▼                                                           │
//! │  tax   = discounted × tax_rate/100                                     │
//! │  total = discounted + tax                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Precision
//! Arithmetic keeps full `f64` precision. Rounding to the currency's minor
//! unit happens only in [`round_for_display`] and [`format_amount`], so a
//! recomputation never drifts from the previous one.
//!
//! ## Usage
//! ```rust
//! use invoicer_core::{Document, Item, ItemId, Totals};
//!
//! let mut item = Item::with_description(ItemId::new("a"), "Widget");
//! item.quantity = 2.0;
//! item.unit_price = 10.0;
//! let doc = Document::from_items(vec![item]).unwrap();
//!
//! let totals = Totals::compute(&doc, 10.0, 0.0);
//! assert_eq!(totals.subtotal, 20.0);
//! assert_eq!(totals.tax, 2.0);
//! assert_eq!(totals.total, 22.0);
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::{Document, Item};
use crate::validation::finite_or_zero;

/// Decimal places used when none are configured.
pub const DEFAULT_DISPLAY_DECIMALS: u32 = 2;

// =============================================================================
// Primitive Calculations
// =============================================================================

/// Fraction left after removing `pct` percent.
#[inline]
fn remaining_fraction(pct: f64) -> f64 {
    1.0 - finite_or_zero(pct) / 100.0
}

/// `quantity × unit_price × (1 − discount_percentage/100)`.
pub fn line_total(item: &Item) -> f64 {
    finite_or_zero(item.quantity)
        * finite_or_zero(item.unit_price)
        * remaining_fraction(item.discount_percentage)
}

/// Sum of line totals. Sub-items are descriptive only.
pub fn subtotal(items: &[Item]) -> f64 {
    items.iter().map(line_total).sum()
}

/// Amount removed by the document-level discount.
pub fn discount_amount(subtotal: f64, document_discount_pct: f64) -> f64 {
    finite_or_zero(subtotal) * finite_or_zero(document_discount_pct) / 100.0
}

/// Tax on the subtotal after the document-level discount.
pub fn tax(subtotal: f64, tax_rate: f64, document_discount_pct: f64) -> f64 {
    discounted_subtotal(subtotal, document_discount_pct) * finite_or_zero(tax_rate) / 100.0
}

/// Discounted subtotal plus tax.
pub fn total(subtotal: f64, tax: f64, document_discount_pct: f64) -> f64 {
    discounted_subtotal(subtotal, document_discount_pct) + finite_or_zero(tax)
}

/// Subtotal after the document-level discount.
pub fn discounted_subtotal(subtotal: f64, document_discount_pct: f64) -> f64 {
    finite_or_zero(subtotal) * remaining_fraction(document_discount_pct)
}

// =============================================================================
// Totals Bundle
// =============================================================================

/// Every derived amount shown under the line items.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Totals {
    pub subtotal: f64,
    pub discount_amount: f64,
    pub discounted_subtotal: f64,
    pub tax: f64,
    pub total: f64,
}

impl Totals {
    /// Computes all totals for a document.
    pub fn compute(document: &Document, tax_rate: f64, document_discount_pct: f64) -> Self {
        let subtotal = subtotal(document.items());
        let tax = tax(subtotal, tax_rate, document_discount_pct);
        Totals {
            subtotal,
            discount_amount: discount_amount(subtotal, document_discount_pct),
            discounted_subtotal: discounted_subtotal(subtotal, document_discount_pct),
            tax,
            total: total(subtotal, tax, document_discount_pct),
        }
    }

    /// The same totals rounded for display.
    pub fn rounded(&self, decimals: u32) -> Self {
        Totals {
            subtotal: round_for_display(self.subtotal, decimals),
            discount_amount: round_for_display(self.discount_amount, decimals),
            discounted_subtotal: round_for_display(self.discounted_subtotal, decimals),
            tax: round_for_display(self.tax, decimals),
            total: round_for_display(self.total, decimals),
        }
    }
}

// =============================================================================
// Display
// =============================================================================

/// Rounds half away from zero to `decimals` places.
pub fn round_for_display(amount: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    let rounded = (finite_or_zero(amount) * factor).round() / factor;
    // Avoid rendering "-0.00".
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Formats an amount with a currency symbol, e.g. `$19.80`.
///
/// ## Example
/// ```rust
/// use invoicer_core::totals::format_amount;
///
/// assert_eq!(format_amount(19.8, "$", 2), "$19.80");
/// assert_eq!(format_amount(-3.456, "€", 2), "-€3.46");
/// ```
pub fn format_amount(amount: f64, symbol: &str, decimals: u32) -> String {
    let rounded = round_for_display(amount, decimals);
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!(
        "{}{}{:.*}",
        sign,
        symbol,
        decimals as usize,
        rounded.abs()
    )
}

// =============================================================================
// Unit Tests
// =============================================================================
