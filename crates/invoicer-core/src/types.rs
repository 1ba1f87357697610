//! # Domain Types
//!
//! The line-item document and the invoice draft that wraps it.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  InvoiceDraft                                                           │
//! │  ├── invoice_number, invoice_date, bill_to_id, send_to_id               │
//! │  ├── tax_rate, discount_percentage, notes, template_id                  │
//! │  └── Document ─────────────────┐                                        │
//! │                                ▼                                        │
//! │                 ┌─────────────────────────┐                             │
//! │                 │  Item (1..n, ordered)   │                             │
//! │                 │  ─────────────────────  │                             │
//! │                 │  id (ItemId)            │                             │
//! │                 │  description            │   ┌────────────────────┐    │
//! │                 │  quantity               │   │ SubItem (0..n)     │    │
//! │                 │  unit_price             │──►│ id, description    │    │
//! │                 │  discount_percentage    │   └────────────────────┘    │
//! │                 └─────────────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Strict vs Lenient Input
//! - [`Document`] deserializes strictly: non-empty, unique ids. It is the
//!   shape this crate produces, so it must round-trip.
//! - [`DocumentInput`] / [`InvoiceInput`] accept what persisted invoices
//!   actually look like: numeric ids, missing ids, decimal strings. Call
//!   `hydrate` to turn them into a valid document.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::ids::{IdGenerator, ItemId};
use crate::validation::{coerce_number, deserialize_lenient_number, validate_items};

/// Maximum characters of a description shown in an item's caption.
pub const CAPTION_MAX_CHARS: usize = 20;

// =============================================================================
// Sub-Item
// =============================================================================

/// Descriptive-only child of an item. Contributes nothing to totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SubItem {
    pub id: ItemId,
    #[serde(default)]
    pub description: String,
}

impl SubItem {
    pub fn new(id: ItemId, description: impl Into<String>) -> Self {
        SubItem {
            id,
            description: description.into(),
        }
    }
}

// =============================================================================
// Item Fields
// =============================================================================

/// The editable fields of an item, in left-to-right tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ItemField {
    Description,
    Quantity,
    UnitPrice,
    DiscountPercentage,
}

impl ItemField {
    /// All fields, left to right.
    pub const ALL: [ItemField; 4] = [
        ItemField::Description,
        ItemField::Quantity,
        ItemField::UnitPrice,
        ItemField::DiscountPercentage,
    ];

    /// Field name as used in payloads and element ids.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ItemField::Description => "description",
            ItemField::Quantity => "quantity",
            ItemField::UnitPrice => "unit_price",
            ItemField::DiscountPercentage => "discount_percentage",
        }
    }

    /// Inverse of [`ItemField::as_str`].
    pub fn parse(name: &str) -> Option<Self> {
        ItemField::ALL.into_iter().find(|f| f.as_str() == name)
    }

    /// True for the three numeric fields.
    pub const fn is_numeric(&self) -> bool {
        !matches!(self, ItemField::Description)
    }
}

impl std::fmt::Display for ItemField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Item
// =============================================================================

/// Top-level invoice line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Item {
    pub id: ItemId,

    #[serde(default)]
    pub description: String,

    /// Non-negative by convention; coerced, never rejected.
    #[serde(default, deserialize_with = "deserialize_lenient_number")]
    pub quantity: f64,

    #[serde(default, deserialize_with = "deserialize_lenient_number")]
    pub unit_price: f64,

    /// Percentage in [0, 100] by convention.
    #[serde(default, deserialize_with = "deserialize_lenient_number")]
    pub discount_percentage: f64,

    #[serde(default)]
    pub subitems: Vec<SubItem>,
}

impl Item {
    /// Default quantity of a freshly inserted item.
    pub const DEFAULT_QUANTITY: f64 = 1.0;

    /// A new blank item: quantity 1, no price, no discount, no sub-items.
    pub fn blank(id: ItemId) -> Self {
        Self::with_description(id, String::new())
    }

    /// A new item with default numbers and the given description.
    pub fn with_description(id: ItemId, description: impl Into<String>) -> Self {
        Item {
            id,
            description: description.into(),
            quantity: Self::DEFAULT_QUANTITY,
            unit_price: 0.0,
            discount_percentage: 0.0,
            subitems: Vec::new(),
        }
    }

    /// Reduces the item to a sub-item. Numbers and children are dropped.
    pub fn to_subitem(&self) -> SubItem {
        SubItem::new(self.id.clone(), self.description.clone())
    }

    /// Writes a field from raw input text. Numeric text is coerced.
    pub fn set_field(&mut self, field: ItemField, text: &str) {
        match field {
            ItemField::Description => self.description = text.to_string(),
            ItemField::Quantity => self.quantity = coerce_number(text),
            ItemField::UnitPrice => self.unit_price = coerce_number(text),
            ItemField::DiscountPercentage => self.discount_percentage = coerce_number(text),
        }
    }

    /// Heading shown above the item's fields.
    ///
    /// ## Rules
    /// - Blank description: `Item N` (1-based)
    /// - Longer than 20 characters: first 20 characters + `...`
    /// - Otherwise the description itself
    ///
    /// ## Example
    /// ```rust
    /// use invoicer_core::{Item, ItemId};
    ///
    /// let mut item = Item::blank(ItemId::new("a"));
    /// assert_eq!(item.caption(0), "Item 1");
    ///
    /// item.description = "Consulting, phase one and two".to_string();
    /// assert_eq!(item.caption(0), "Consulting, phase on...");
    /// ```
    pub fn caption(&self, index: usize) -> String {
        if self.description.trim().is_empty() {
            return format!("Item {}", index + 1);
        }
        if self.description.chars().count() > CAPTION_MAX_CHARS {
            let head: String = self.description.chars().take(CAPTION_MAX_CHARS).collect();
            return format!("{}...", head);
        }
        self.description.clone()
    }
}

// =============================================================================
// Location
// =============================================================================

/// Where an id lives in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Location {
    /// A top-level item at this index.
    Item { index: usize },
    /// A sub-item of the item at `item_index`.
    SubItem { item_index: usize, sub_index: usize },
}

// =============================================================================
// Document
// =============================================================================

/// The editable body of one invoice: an ordered, non-empty list of items.
///
/// ## Invariants
/// - At least one item
/// - Every item and sub-item id is unique across the whole document
///
/// Fields are private so the invariants can only be broken from inside the
/// crate. Every structural edit in [`crate::edit`] returns a new value.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct Document {
    items: Vec<Item>,
}

impl Document {
    /// A new document with one blank item.
    pub fn new(ids: &mut impl IdGenerator) -> Self {
        Document {
            items: vec![Item::blank(ids.next_id())],
        }
    }

    /// Builds a document from items, checking the invariants.
    pub fn from_items(items: Vec<Item>) -> CoreResult<Self> {
        validate_items(&items)?;
        Ok(Document { items })
    }

    /// Parses a document produced by [`Document`]'s own serialization.
    pub fn from_json(json: &str) -> CoreResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Internal constructor for edit operations that preserve the invariants.
    pub(crate) fn from_items_unchecked(items: Vec<Item>) -> Self {
        debug_assert!(validate_items(&items).is_ok());
        Document { items }
    }

    /// All items in display order.
    #[inline]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Consumes the document, returning its items.
    pub fn into_items(self) -> Vec<Item> {
        self.items
    }

    /// Number of items (always at least 1).
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always false; present for API symmetry with collections.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Item at `index`.
    #[inline]
    pub fn item_at(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    /// Sub-item `sub_index` of the item at `item_index`.
    pub fn subitem_at(&self, item_index: usize, sub_index: usize) -> Option<&SubItem> {
        self.items.get(item_index)?.subitems.get(sub_index)
    }

    /// True when `index` is the final item.
    #[inline]
    pub fn is_last_item(&self, index: usize) -> bool {
        index + 1 == self.items.len()
    }

    /// Finds where an id lives.
    pub fn locate(&self, id: &ItemId) -> Option<Location> {
        for (index, item) in self.items.iter().enumerate() {
            if &item.id == id {
                return Some(Location::Item { index });
            }
            if let Some(sub_index) = item.subitems.iter().position(|s| &s.id == id) {
                return Some(Location::SubItem {
                    item_index: index,
                    sub_index,
                });
            }
        }
        None
    }

    /// True when any item or sub-item carries `id`.
    pub fn contains_id(&self, id: &ItemId) -> bool {
        self.locate(id).is_some()
    }

    /// Every id in display order (items before their sub-items).
    pub fn ids(&self) -> Vec<&ItemId> {
        self.items
            .iter()
            .flat_map(|item| std::iter::once(&item.id).chain(item.subitems.iter().map(|s| &s.id)))
            .collect()
    }

    /// Copies the document into an id-less input (for "save as new").
    pub fn without_ids(&self) -> DocumentInput {
        DocumentInput {
            items: self
                .items
                .iter()
                .map(|item| ItemInput {
                    id: None,
                    description: item.description.clone(),
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                    discount_percentage: item.discount_percentage,
                    subitems: item
                        .subitems
                        .iter()
                        .map(|s| SubItemInput {
                            id: None,
                            description: s.description.clone(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            items: Vec<Item>,
        }

        let raw = Raw::deserialize(deserializer)?;
        validate_items(&raw.items).map_err(serde::de::Error::custom)?;
        Ok(Document { items: raw.items })
    }
}

// =============================================================================
// Lenient Input (hydration + id-less payloads)
// =============================================================================

/// A sub-item as persisted or as sent for creation (id optional).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SubItemInput {
    #[serde(default, deserialize_with = "deserialize_lenient_id", skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub id: Option<ItemId>,
    #[serde(default, deserialize_with = "deserialize_lenient_text")]
    pub description: String,
}

/// An item as persisted or as sent for creation (id optional).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ItemInput {
    #[serde(default, deserialize_with = "deserialize_lenient_id", skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub id: Option<ItemId>,
    #[serde(default, deserialize_with = "deserialize_lenient_text")]
    pub description: String,
    #[serde(default, deserialize_with = "deserialize_lenient_number")]
    pub quantity: f64,
    #[serde(default, deserialize_with = "deserialize_lenient_number")]
    pub unit_price: f64,
    #[serde(default, deserialize_with = "deserialize_lenient_number")]
    pub discount_percentage: f64,
    #[serde(default)]
    pub subitems: Vec<SubItemInput>,
}

/// Item list as persisted or as sent for creation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DocumentInput {
    #[serde(default)]
    pub items: Vec<ItemInput>,
}

impl DocumentInput {
    /// Turns loose input into a valid document.
    ///
    /// ## Repairs
    /// - Missing, blank or already-used ids get a fresh id
    /// - An empty item list becomes one blank item
    ///
    /// ## Example
    /// ```rust
    /// use invoicer_core::{DocumentInput, SequentialIds};
    ///
    /// let input: DocumentInput = serde_json::from_str(
    ///     r#"{"items": [{"id": 7, "description": "Widget", "quantity": "2", "unit_price": "10.00"}]}"#,
    /// ).unwrap();
    ///
    /// let doc = input.hydrate(&mut SequentialIds::new());
    /// assert_eq!(doc.items()[0].id.as_str(), "7");
    /// assert_eq!(doc.items()[0].quantity, 2.0);
    /// ```
    pub fn hydrate(self, ids: &mut impl IdGenerator) -> Document {
        let mut seen: HashSet<ItemId> = HashSet::new();
        let mut items = Vec::with_capacity(self.items.len().max(1));

        for input in self.items {
            let id = claim_id(input.id, &mut seen, ids);
            let subitems = input
                .subitems
                .into_iter()
                .map(|sub| SubItem {
                    id: claim_id(sub.id, &mut seen, ids),
                    description: sub.description,
                })
                .collect();
            items.push(Item {
                id,
                description: input.description,
                quantity: input.quantity,
                unit_price: input.unit_price,
                discount_percentage: input.discount_percentage,
                subitems,
            });
        }

        if items.is_empty() {
            items.push(Item::blank(claim_id(None, &mut seen, ids)));
        }

        Document::from_items_unchecked(items)
    }
}

/// Keeps `wanted` when it is usable and unused, otherwise draws a fresh id.
fn claim_id(
    wanted: Option<ItemId>,
    seen: &mut HashSet<ItemId>,
    ids: &mut impl IdGenerator,
) -> ItemId {
    if let Some(id) = wanted {
        if !id.is_blank() && seen.insert(id.clone()) {
            return id;
        }
    }
    loop {
        let id = ids.next_id();
        if seen.insert(id.clone()) {
            return id;
        }
    }
}

/// Accepts string or numeric ids (persisted invoices use integer keys).
fn deserialize_lenient_id<'de, D>(deserializer: D) -> Result<Option<ItemId>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(ItemId::new(s)),
        Some(Value::Number(n)) => Some(ItemId::new(n.to_string())),
        _ => None,
    })
}

/// Accepts a string or null.
fn deserialize_lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

// =============================================================================
// Lookups
// =============================================================================

/// A contact offered in the bill-to / send-to selectors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ContactRef {
    pub id: i64,
    pub name: String,
}

/// A PDF template offered in the template selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TemplateRef {
    pub id: i64,
    pub name: String,
}

/// Id of the built-in template preferred when none is selected.
pub const DEFAULT_TEMPLATE_ID: i64 = 1;

/// Picks the template a fresh invoice starts with.
///
/// Prefers the built-in template, falls back to the first one offered.
pub fn default_template(templates: &[TemplateRef]) -> Option<&TemplateRef> {
    templates
        .iter()
        .find(|t| t.id == DEFAULT_TEMPLATE_ID)
        .or_else(|| templates.first())
}

// =============================================================================
// Invoice Draft
// =============================================================================

/// The full invoice form value handed to the persistence collaborator.
///
/// ## Serialization
/// ```json
/// {
///   "invoice_number": "INV-0042",
///   "invoice_date": "2024-03-01",
///   "bill_to_id": 3,
///   "send_to_id": 3,
///   "tax_rate": 10.0,
///   "discount_percentage": 0.0,
///   "notes": "",
///   "template_id": 1,
///   "items": [{ "id": "…", "description": "Widget", "quantity": 2.0,
///               "unit_price": 10.0, "discount_percentage": 0.0,
///               "subitems": [] }]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InvoiceDraft {
    pub invoice_number: String,

    #[ts(as = "String")]
    pub invoice_date: NaiveDate,

    pub bill_to_id: Option<i64>,

    pub send_to_id: Option<i64>,

    /// Percentage applied after the document-level discount.
    #[serde(default, deserialize_with = "deserialize_lenient_number")]
    pub tax_rate: f64,

    /// Document-level discount percentage.
    #[serde(default, deserialize_with = "deserialize_lenient_number")]
    pub discount_percentage: f64,

    #[serde(default)]
    pub notes: String,

    pub template_id: Option<i64>,

    #[serde(flatten)]
    pub document: Document,
}

impl InvoiceDraft {
    /// A blank draft for the "new invoice" flow.
    pub fn new(invoice_date: NaiveDate, ids: &mut impl IdGenerator) -> Self {
        InvoiceDraft {
            invoice_number: String::new(),
            invoice_date,
            bill_to_id: None,
            send_to_id: None,
            tax_rate: 0.0,
            discount_percentage: 0.0,
            notes: String::new(),
            template_id: None,
            document: Document::new(ids),
        }
    }

    /// Copy of this draft with every id stripped and a new invoice number.
    pub fn as_new(&self, invoice_number: impl Into<String>) -> InvoiceInput {
        InvoiceInput {
            id: None,
            invoice_number: invoice_number.into(),
            invoice_date: Some(self.invoice_date),
            bill_to_id: self.bill_to_id,
            send_to_id: self.send_to_id,
            tax_rate: self.tax_rate,
            discount_percentage: self.discount_percentage,
            notes: self.notes.clone(),
            template_id: self.template_id,
            items: self.document.without_ids(),
        }
    }
}

/// A persisted invoice as loaded for editing, or an id-less creation payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InvoiceInput {
    /// Persisted invoice key; absent for new invoices.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub id: Option<i64>,

    #[serde(default, deserialize_with = "deserialize_lenient_text")]
    pub invoice_number: String,

    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub invoice_date: Option<NaiveDate>,

    #[serde(default)]
    pub bill_to_id: Option<i64>,

    #[serde(default)]
    pub send_to_id: Option<i64>,

    #[serde(default, deserialize_with = "deserialize_lenient_number")]
    pub tax_rate: f64,

    #[serde(default, deserialize_with = "deserialize_lenient_number")]
    pub discount_percentage: f64,

    #[serde(default, deserialize_with = "deserialize_lenient_text")]
    pub notes: String,

    #[serde(default)]
    pub template_id: Option<i64>,

    #[serde(flatten)]
    pub items: DocumentInput,
}

impl InvoiceInput {
    /// Parses persisted invoice JSON.
    pub fn from_json(json: &str) -> CoreResult<Self> {
        serde_json::from_str(json).map_err(CoreError::from)
    }

    /// Turns a persisted invoice into an editable draft.
    ///
    /// `today` is used when the stored invoice has no date.
    pub fn hydrate(self, today: NaiveDate, ids: &mut impl IdGenerator) -> InvoiceDraft {
        InvoiceDraft {
            invoice_number: self.invoice_number,
            invoice_date: self.invoice_date.unwrap_or(today),
            bill_to_id: self.bill_to_id,
            send_to_id: self.send_to_id,
            tax_rate: self.tax_rate,
            discount_percentage: self.discount_percentage,
            notes: self.notes,
            template_id: self.template_id,
            document: self.items.hydrate(ids),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::ids::SequentialIds;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn test_new_document_has_one_blank_item() {
        let doc = Document::new(&mut SequentialIds::new());
        assert_eq!(doc.len(), 1);
        let item = doc.item_at(0).unwrap();
        assert_eq!(item.description, "");
        assert_eq!(item.quantity, 1.0);
        assert_eq!(item.unit_price, 0.0);
        assert!(item.subitems.is_empty());
        assert!(doc.is_last_item(0));
    }

    #[test]
    fn test_locate() {
        let mut a = Item::blank(ItemId::new("a"));
        a.subitems.push(SubItem::new(ItemId::new("a1"), "x"));
        let doc = Document::from_items(vec![a, Item::blank(ItemId::new("b"))]).unwrap();

        assert_eq!(doc.locate(&ItemId::new("b")), Some(Location::Item { index: 1 }));
        assert_eq!(
            doc.locate(&ItemId::new("a1")),
            Some(Location::SubItem {
                item_index: 0,
                sub_index: 0
            })
        );
        assert_eq!(doc.locate(&ItemId::new("zz")), None);
        assert_eq!(doc.subitem_at(0, 0).unwrap().description, "x");
        assert!(doc.subitem_at(1, 0).is_none());
    }

    #[test]
    fn test_strict_deserialize_rejects_empty() {
        let err = Document::from_json(r#"{"items": []}"#).unwrap_err();
        assert!(err.to_string().contains("At least one item"));
    }

    #[test]
    fn test_strict_deserialize_rejects_duplicates() {
        let json = r#"{"items": [
            {"id": "a", "description": "", "quantity": 1, "unit_price": 0, "discount_percentage": 0, "subitems": [{"id": "a", "description": ""}]}
        ]}"#;
        assert!(Document::from_json(json).is_err());
    }

    #[test]
    fn test_document_round_trips() {
        let doc = Document::new(&mut SequentialIds::new());
        let json = serde_json::to_string(&doc).unwrap();
        assert_eq!(Document::from_json(&json).unwrap(), doc);
    }

    #[test]
    fn test_from_items_validates() {
        assert!(matches!(
            Document::from_items(vec![]),
            Err(CoreError::Validation(ValidationError::EmptyDocument))
        ));
    }

    #[test]
    fn test_hydrate_repairs_ids() {
        let json = r#"{"items": [
            {"id": 1, "description": "A", "subitems": [{"description": "a1"}, {"id": 1, "description": "a2"}]},
            {"description": "B", "quantity": "3", "unit_price": "", "discount_percentage": null}
        ]}"#;
        let input: DocumentInput = serde_json::from_str(json).unwrap();
        let doc = input.hydrate(&mut SequentialIds::new());

        assert_eq!(doc.items()[0].id.as_str(), "1");
        let ids: HashSet<&ItemId> = doc.ids().into_iter().collect();
        assert_eq!(ids.len(), 4);
        assert_eq!(doc.items()[1].quantity, 3.0);
        assert_eq!(doc.items()[1].unit_price, 0.0);
    }

    #[test]
    fn test_hydrate_skips_generated_ids_already_in_use() {
        let json = r#"{"items": [{"id": "id-1"}, {}]}"#;
        let input: DocumentInput = serde_json::from_str(json).unwrap();
        let doc = input.hydrate(&mut SequentialIds::new());
        assert_eq!(doc.items()[0].id.as_str(), "id-1");
        assert_eq!(doc.items()[1].id.as_str(), "id-2");
    }

    #[test]
    fn test_hydrate_empty_list_gets_blank_item() {
        let doc = DocumentInput::default().hydrate(&mut SequentialIds::new());
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn test_caption() {
        let mut item = Item::blank(ItemId::new("a"));
        assert_eq!(item.caption(2), "Item 3");
        item.description = "   ".to_string();
        assert_eq!(item.caption(0), "Item 1");
        item.description = "Short".to_string();
        assert_eq!(item.caption(0), "Short");
        item.description = "exactly twenty chars".to_string();
        assert_eq!(item.caption(0), "exactly twenty chars");
    }

    #[test]
    fn test_item_field_names() {
        for field in ItemField::ALL {
            assert_eq!(ItemField::parse(field.as_str()), Some(field));
        }
        assert_eq!(ItemField::parse("price"), None);
        assert!(!ItemField::Description.is_numeric());
        assert!(ItemField::UnitPrice.is_numeric());
    }

    #[test]
    fn test_set_field_coerces() {
        let mut item = Item::blank(ItemId::new("a"));
        item.set_field(ItemField::Quantity, "4");
        item.set_field(ItemField::UnitPrice, "oops");
        item.set_field(ItemField::Description, "Labor");
        assert_eq!(item.quantity, 4.0);
        assert_eq!(item.unit_price, 0.0);
        assert_eq!(item.description, "Labor");
    }

    #[test]
    fn test_draft_serializes_flat() {
        let draft = InvoiceDraft::new(date(), &mut SequentialIds::new());
        let value = serde_json::to_value(&draft).unwrap();
        assert_eq!(value["invoice_date"], "2024-03-01");
        assert!(value["items"].is_array());
        assert_eq!(value["items"][0]["id"], "id-1");
        assert_eq!(value["items"][0]["subitems"], serde_json::json!([]));
    }

    #[test]
    fn test_draft_round_trips() {
        let draft = InvoiceDraft::new(date(), &mut SequentialIds::new());
        let json = serde_json::to_string(&draft).unwrap();
        let back: InvoiceDraft = serde_json::from_str(&json).unwrap();
        assert_eq!(back, draft);
    }

    #[test]
    fn test_as_new_strips_ids() {
        let mut draft = InvoiceDraft::new(date(), &mut SequentialIds::new());
        draft.invoice_number = "INV-1".to_string();
        let copy = draft.as_new("INV-2");
        let value = serde_json::to_value(&copy).unwrap();

        assert_eq!(value["invoice_number"], "INV-2");
        assert!(value.get("id").is_none());
        assert!(value["items"][0].get("id").is_none());
    }

    #[test]
    fn test_invoice_input_hydrates_persisted_invoice() {
        let json = r#"{
            "id": 12, "user_id": 1, "invoice_number": "INV-12",
            "invoice_date": "2024-02-10", "bill_to_id": 2, "send_to_id": 3,
            "tax_rate": "8.25", "discount_percentage": "0.00", "notes": null,
            "template_id": 1, "subtotal": 20.0, "tax": 1.65, "total": 21.65,
            "items": [{"id": 5, "description": "Widget", "quantity": 2,
                       "unit_price": "10.00", "discount_percentage": "0.00",
                       "line_total": 20.0, "subitems": [{"id": 9, "description": "blue"}]}]
        }"#;
        let input = InvoiceInput::from_json(json).unwrap();
        assert_eq!(input.id, Some(12));

        let draft = input.hydrate(date(), &mut SequentialIds::new());
        assert_eq!(draft.invoice_date, NaiveDate::from_ymd_opt(2024, 2, 10).unwrap());
        assert_eq!(draft.tax_rate, 8.25);
        assert_eq!(draft.notes, "");
        assert_eq!(draft.document.items()[0].unit_price, 10.0);
        assert_eq!(draft.document.subitem_at(0, 0).unwrap().id.as_str(), "9");
    }

    #[test]
    fn test_default_template() {
        let templates = vec![
            TemplateRef { id: 4, name: "Modern".into() },
            TemplateRef { id: 1, name: "Classic".into() },
        ];
        assert_eq!(default_template(&templates).unwrap().id, 1);
        assert_eq!(default_template(&templates[..1]).unwrap().id, 4);
        assert!(default_template(&[]).is_none());
    }
}
