//! # Validation Module
//!
//! Numeric coercion and document invariant checks.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Field edits (THIS MODULE)                                    │
//! │  ├── Numeric text coerced to a finite number, never rejected           │
//! │  └── "", "abc", "NaN", "inf" → 0                                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Document invariants (THIS MODULE)                            │
//! │  ├── At least one item                                                 │
//! │  └── Ids present and unique across items and sub-items                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Form schema (external collaborator)                          │
//! │  ├── Required description, ranges, contacts                            │
//! │  └── Runs on submit, outside the core                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use invoicer_core::validation::coerce_number;
//!
//! assert_eq!(coerce_number("12.5"), 12.5);
//! assert_eq!(coerce_number(""), 0.0);
//! assert_eq!(coerce_number("twelve"), 0.0);
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::ValidationError;
use crate::types::Item;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Numeric Coercion
// =============================================================================

/// Returns `value` when finite, `0.0` otherwise.
#[inline]
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Coerces raw field text to a finite number.
///
/// ## Rules
/// - Surrounding whitespace is ignored
/// - Empty text is 0
/// - Unparseable text is 0
/// - NaN and infinities are 0
///
/// Out-of-range values (negative quantities, discounts above 100) are kept
/// as typed. Range checks belong to the form schema collaborator.
pub fn coerce_number(text: &str) -> f64 {
    let text = text.trim();
    if text.is_empty() {
        return 0.0;
    }
    text.parse::<f64>().map(finite_or_zero).unwrap_or(0.0)
}

/// Serde helper accepting numbers, numeric strings, empty strings and null.
///
/// Persisted invoices carry decimal columns that arrive as strings
/// (`"10.00"`); hand-built payloads may carry `""` or `null`. All of them
/// land as finite numbers.
pub fn deserialize_lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64().map(finite_or_zero).unwrap_or(0.0),
        Some(Value::String(s)) => coerce_number(&s),
        _ => 0.0,
    })
}

// =============================================================================
// Document Invariants
// =============================================================================

/// Validates the structural invariants of an item list.
///
/// ## Rules
/// - At least one item
/// - Every item and sub-item id is non-blank
/// - No id appears twice anywhere in the tree
pub fn validate_items(items: &[Item]) -> ValidationResult<()> {
    if items.is_empty() {
        return Err(ValidationError::EmptyDocument);
    }

    let mut seen = HashSet::new();
    for item in items {
        check_id(&mut seen, item.id.as_str(), "item id")?;
        for sub in &item.subitems {
            check_id(&mut seen, sub.id.as_str(), "subitem id")?;
        }
    }

    Ok(())
}

fn check_id<'a>(seen: &mut HashSet<&'a str>, id: &'a str, field: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    if !seen.insert(id) {
        return Err(ValidationError::DuplicateId { id: id.to_string() });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
