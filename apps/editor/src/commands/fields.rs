//! # Field Commands
//!
//! Text typed into the form, and the totals shown under the items.
//!
//! Numeric item fields accept any text; anything that is not a finite
//! number is stored as 0 and the totals follow.

use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use invoicer_core::validation::finite_or_zero;
use invoicer_core::{CoreError, FocusTarget, ItemField, Totals};

use crate::commands::items::DocumentResponse;
use crate::error::{ApiError, ApiResult};
use crate::state::{ConfigState, DocumentState};

/// Sets one field of an item from raw input text.
///
/// ## Errors
/// `NOT_FOUND` when `index` no longer exists (the row was removed between
/// render and input).
pub fn set_item_field(
    doc: &DocumentState,
    index: usize,
    field: ItemField,
    text: &str,
) -> ApiResult<DocumentResponse> {
    debug!(index, %field, "set_item_field command");

    doc.with_session_mut(|s| {
        let len = s.document().len();
        if index >= len {
            return Err(ApiError::from(CoreError::ItemOutOfRange { index, len }));
        }
        s.set_item_field(index, field, text);
        Ok(DocumentResponse::from(&*s))
    })
}

/// Sets a sub-item's description.
pub fn set_subitem_description(
    doc: &DocumentState,
    item_index: usize,
    sub_index: usize,
    text: &str,
) -> ApiResult<DocumentResponse> {
    debug!(item_index, sub_index, "set_subitem_description command");

    doc.with_session_mut(|s| {
        if s.document().subitem_at(item_index, sub_index).is_none() {
            return Err(ApiError::from(CoreError::SubItemOutOfRange {
                item_index,
                sub_index,
            }));
        }
        s.set_subitem_description(item_index, sub_index, text);
        Ok(DocumentResponse::from(&*s))
    })
}

/// Sets whichever field `element_id` names.
///
/// The view can route every `input` event here without knowing the layout.
pub fn set_field_text(
    doc: &DocumentState,
    element_id: &str,
    text: &str,
) -> ApiResult<DocumentResponse> {
    match element_id.parse::<FocusTarget>()? {
        FocusTarget::Item { index, field } => set_item_field(doc, index, field, text),
        FocusTarget::SubItem {
            item_index,
            sub_index,
        } => set_subitem_description(doc, item_index, sub_index, text),
    }
}

// =============================================================================
// Invoice-Level Fields
// =============================================================================

/// Partial update of the fields around the line items.
///
/// Absent fields are left as they are. `bill_to_id`, `send_to_id` and
/// `template_id` use a nested option: `Some(None)` clears the selection.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, TS)]
#[ts(export)]
pub struct InvoiceFieldsUpdate {
    #[serde(default)]
    #[ts(optional)]
    pub invoice_number: Option<String>,

    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub invoice_date: Option<chrono::NaiveDate>,

    #[serde(default, deserialize_with = "nullable")]
    #[ts(optional)]
    pub bill_to_id: Option<Option<i64>>,

    #[serde(default, deserialize_with = "nullable")]
    #[ts(optional)]
    pub send_to_id: Option<Option<i64>>,

    #[serde(default)]
    #[ts(optional)]
    pub tax_rate: Option<f64>,

    #[serde(default)]
    #[ts(optional)]
    pub discount_percentage: Option<f64>,

    #[serde(default)]
    #[ts(optional)]
    pub notes: Option<String>,

    #[serde(default, deserialize_with = "nullable")]
    #[ts(optional)]
    pub template_id: Option<Option<i64>>,
}

/// Present-but-null becomes `Some(None)`.
fn nullable<'de, D>(deserializer: D) -> Result<Option<Option<i64>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<i64>::deserialize(deserializer).map(Some)
}

/// Applies a partial update to the invoice-level fields.
pub fn update_invoice_fields(
    doc: &DocumentState,
    update: InvoiceFieldsUpdate,
) -> DocumentResponse {
    debug!(?update, "update_invoice_fields command");

    doc.with_session_mut(|s| {
        s.update_draft(|d| {
            if let Some(number) = update.invoice_number {
                d.invoice_number = number;
            }
            if let Some(date) = update.invoice_date {
                d.invoice_date = date;
            }
            if let Some(bill_to) = update.bill_to_id {
                d.bill_to_id = bill_to;
            }
            if let Some(send_to) = update.send_to_id {
                d.send_to_id = send_to;
            }
            if let Some(rate) = update.tax_rate {
                d.tax_rate = finite_or_zero(rate);
            }
            if let Some(pct) = update.discount_percentage {
                d.discount_percentage = finite_or_zero(pct);
            }
            if let Some(notes) = update.notes {
                d.notes = notes;
            }
            if let Some(template) = update.template_id {
                d.template_id = template;
            }
        });
        DocumentResponse::from(&*s)
    })
}

// =============================================================================
// Totals
// =============================================================================

/// Totals for display: rounded amounts plus formatted strings.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TotalsResponse {
    /// Rounded to the configured decimals.
    pub amounts: Totals,
    pub subtotal: String,
    pub discount_amount: String,
    pub discounted_subtotal: String,
    pub tax: String,
    pub total: String,
}

impl TotalsResponse {
    pub fn new(totals: &Totals, config: &ConfigState) -> Self {
        TotalsResponse {
            amounts: totals.rounded(config.currency_decimals),
            subtotal: config.format_currency(totals.subtotal),
            discount_amount: config.format_currency(totals.discount_amount),
            discounted_subtotal: config.format_currency(totals.discounted_subtotal),
            tax: config.format_currency(totals.tax),
            total: config.format_currency(totals.total),
        }
    }
}

/// Gets the totals of the current draft, formatted for display.
pub fn get_totals(doc: &DocumentState, config: &ConfigState) -> TotalsResponse {
    debug!("get_totals command");
    let totals = doc.with_session(|s| s.totals());
    TotalsResponse::new(&totals, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::state::EditorSession;
    use chrono::NaiveDate;
    use invoicer_core::SequentialIds;

    fn state() -> DocumentState {
        DocumentState::new(EditorSession::blank(
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            Box::new(SequentialIds::new()),
            5.0,
        ))
    }

    #[test]
    fn test_widget_scenario_totals() {
        let doc = state();
        set_field_text(&doc, "item-0-description", "Widget").unwrap();
        set_field_text(&doc, "item-0-quantity", "2").unwrap();
        set_field_text(&doc, "item-0-unit_price", "10").unwrap();
        update_invoice_fields(
            &doc,
            InvoiceFieldsUpdate {
                tax_rate: Some(10.0),
                ..Default::default()
            },
        );

        let totals = get_totals(&doc, &ConfigState::default());
        assert_eq!(totals.subtotal, "$20.00");
        assert_eq!(totals.tax, "$2.00");
        assert_eq!(totals.total, "$22.00");
        assert_eq!(totals.amounts.total, 22.0);
    }

    #[test]
    fn test_document_discount_totals() {
        let doc = state();
        set_item_field(&doc, 0, ItemField::Quantity, "2").unwrap();
        set_item_field(&doc, 0, ItemField::UnitPrice, "10").unwrap();
        update_invoice_fields(
            &doc,
            InvoiceFieldsUpdate {
                tax_rate: Some(10.0),
                discount_percentage: Some(10.0),
                ..Default::default()
            },
        );

        let totals = get_totals(&doc, &ConfigState::default());
        assert_eq!(totals.discounted_subtotal, "$18.00");
        assert_eq!(totals.tax, "$1.80");
        assert_eq!(totals.total, "$19.80");
    }

    #[test]
    fn test_invalid_number_is_zero() {
        let doc = state();
        let response = set_item_field(&doc, 0, ItemField::UnitPrice, "abc").unwrap();
        assert_eq!(response.document.items()[0].unit_price, 0.0);
        assert_eq!(response.totals.total, 0.0);
    }

    #[test]
    fn test_stale_index_is_not_found() {
        let doc = state();
        let err = set_item_field(&doc, 3, ItemField::Description, "x").unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err = set_subitem_description(&doc, 0, 0, "x").unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[test]
    fn test_malformed_element_id() {
        let doc = state();
        let err = set_field_text(&doc, "item-0-colour", "red").unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_update_fields_partial() {
        let doc = state();
        let update: InvoiceFieldsUpdate =
            serde_json::from_str(r#"{"invoice_number":"INV-7","bill_to_id":3}"#).unwrap();
        update_invoice_fields(&doc, update);

        let cleared: InvoiceFieldsUpdate = serde_json::from_str(r#"{"bill_to_id":null}"#).unwrap();
        assert_eq!(cleared.bill_to_id, Some(None));

        doc.with_session(|s| {
            assert_eq!(s.draft().invoice_number, "INV-7");
            assert_eq!(s.draft().bill_to_id, Some(3));
            assert_eq!(s.draft().send_to_id, None);
        });

        update_invoice_fields(&doc, cleared);
        doc.with_session(|s| assert_eq!(s.draft().bill_to_id, None));
    }
}
