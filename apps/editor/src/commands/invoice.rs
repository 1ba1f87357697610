//! # Invoice Commands
//!
//! Starting, loading, submitting and previewing the invoice being edited.
//!
//! ## Invoice Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Invoice Lifecycle                                    │
//! │                                                                         │
//! │  new_invoice ──┐                                                        │
//! │                ├──► ┌──────────┐  submit_invoice  ┌──────────────────┐  │
//! │  load_invoice ─┤    │ Editing  │ ───────────────► │ create / update  │  │
//! │                │    │  draft   │                  │ (gateway)        │  │
//! │  hydrate_json ─┘    └──────────┘                  └──────────────────┘  │
//! │                      │   │    ▲                          │             │
//! │       save_as_new ◄──┘   │    │ failure: draft kept      │ success     │
//! │       preview_pdf ◄──────┘    └──────────────────────────┤             │
//! │                                                          ▼             │
//! │                                            fresh blank draft           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Locking
//! Collaborator calls run on a snapshot of the draft with the session
//! unlocked, so the view stays responsive while they are in flight. Only one
//! submit or save-as-new runs at a time.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, error, info, warn};
use ts_rs::TS;

use invoicer_core::{InvoiceDraft, InvoiceInput};

use crate::commands::items::DocumentResponse;
use crate::error::{ApiError, ApiResult};
use crate::gateway::{InvoiceGateway, PdfGenerator};
use crate::state::{ConfigState, DocumentState, EditorSession, LookupState};

/// Result of a successful submit.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub invoice_id: i64,

    /// True when a new invoice was created, false for an update.
    pub created: bool,

    /// The session after submit.
    pub document: DocumentResponse,
}

/// Result of a successful save-as-new.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaveAsNewResponse {
    pub invoice_id: i64,
    pub invoice_number: String,
}

/// A blank draft with the configured defaults applied.
fn blank_draft(
    session: &mut EditorSession,
    config: &ConfigState,
    lookups: &LookupState,
    today: NaiveDate,
) -> InvoiceDraft {
    let mut draft = session.blank_draft(today);
    draft.tax_rate = config.default_tax_rate;
    draft.template_id = lookups.initial_template_id(config.default_template_id);
    draft
}

fn busy() -> ApiError {
    ApiError::validation("Another save is already in progress")
}

// =============================================================================
// Starting a Draft
// =============================================================================

/// Starts a new invoice: one blank item, configured tax rate and template.
pub fn new_invoice(
    doc: &DocumentState,
    config: &ConfigState,
    lookups: &LookupState,
    today: NaiveDate,
) -> DocumentResponse {
    debug!(%today, "new_invoice command");

    doc.with_session_mut(|s| {
        let draft = blank_draft(s, config, lookups, today);
        s.reset(draft, None);
        DocumentResponse::from(&*s)
    })
}

/// Throws the current draft away and starts a new one.
pub fn discard(
    doc: &DocumentState,
    config: &ConfigState,
    lookups: &LookupState,
    today: NaiveDate,
) -> DocumentResponse {
    info!("Discarding draft");
    new_invoice(doc, config, lookups, today)
}

/// Loads a persisted invoice for editing.
///
/// ## Errors
/// `NOT_FOUND` when the gateway does not know `id`; the current draft is
/// kept in that case.
pub async fn load_invoice<G: InvoiceGateway>(
    doc: &DocumentState,
    gateway: &G,
    id: i64,
    today: NaiveDate,
) -> ApiResult<DocumentResponse> {
    debug!(id, "load_invoice command");

    let input = gateway.load_invoice(id).await?;
    let response = doc.with_session_mut(|s| {
        let draft = input.hydrate(today, s.ids_mut());
        s.reset(draft, Some(id));
        DocumentResponse::from(&*s)
    });

    info!(id, items = response.document.len(), "Invoice loaded");
    Ok(response)
}

/// Hydrates the session from persisted invoice JSON.
///
/// The invoice id in the JSON, if any, decides whether a later submit
/// creates or updates.
pub fn hydrate_from_json(
    doc: &DocumentState,
    json: &str,
    today: NaiveDate,
) -> ApiResult<DocumentResponse> {
    debug!(len = json.len(), "hydrate_from_json command");

    let input = InvoiceInput::from_json(json)?;
    let invoice_id = input.id;
    Ok(doc.with_session_mut(|s| {
        let draft = input.hydrate(today, s.ids_mut());
        s.reset(draft, invoice_id);
        DocumentResponse::from(&*s)
    }))
}

/// Gets the full draft as it would be submitted.
pub fn get_draft(doc: &DocumentState) -> InvoiceDraft {
    doc.with_session(|s| s.draft().clone())
}

// =============================================================================
// Persisting
// =============================================================================

/// Submits the draft: creates it when no invoice id is known, updates it
/// otherwise.
///
/// ## Behavior
/// - Success: the session starts a fresh blank draft. When the draft was
///   edited while the call was in flight, those edits are kept instead and
///   the session adopts the invoice id.
/// - Failure: the session is left exactly as it was.
pub async fn submit_invoice<G: InvoiceGateway>(
    doc: &DocumentState,
    gateway: &G,
    config: &ConfigState,
    lookups: &LookupState,
    today: NaiveDate,
) -> ApiResult<SubmitResponse> {
    let _slot = doc.try_begin_persist().ok_or_else(busy)?;
    let (draft, invoice_id, revision) =
        doc.with_session(|s| (s.draft().clone(), s.invoice_id(), s.revision()));
    debug!(?invoice_id, revision, items = draft.document.len(), "submit_invoice command");

    let result = match invoice_id {
        Some(id) => gateway.update_invoice(id, &draft).await.map(|()| (id, false)),
        None => gateway.create_invoice(&draft).await.map(|id| (id, true)),
    };

    let (saved_id, created) = result.map_err(|e| {
        error!(?invoice_id, "Submit failed: {}", e);
        ApiError::from(e)
    })?;

    let document = doc.with_session_mut(|s| {
        if s.revision() == revision {
            let fresh = blank_draft(s, config, lookups, today);
            s.reset(fresh, None);
        } else {
            warn!(saved_id, "Draft changed during submit, keeping the edits");
            let draft = s.draft().clone();
            s.reset(draft, Some(saved_id));
        }
        DocumentResponse::from(&*s)
    });

    info!(invoice_id = saved_id, created, "Invoice submitted");
    Ok(SubmitResponse {
        invoice_id: saved_id,
        created,
        document,
    })
}

/// Saves a copy of the draft as a brand-new invoice with the next free
/// number. Every item and sub-item id is stripped from the copy. The
/// session keeps editing the original.
pub async fn save_as_new<G: InvoiceGateway>(
    doc: &DocumentState,
    gateway: &G,
) -> ApiResult<SaveAsNewResponse> {
    let _slot = doc.try_begin_persist().ok_or_else(busy)?;
    let draft = get_draft(doc);
    debug!(items = draft.document.len(), "save_as_new command");

    let invoice_number = gateway.next_invoice_number().await.map_err(|e| {
        error!("Could not fetch the next invoice number: {}", e);
        ApiError::from(e)
    })?;

    let payload = draft.as_new(invoice_number.clone());
    let invoice_id = gateway.create_copy(&payload).await.map_err(|e| {
        error!(%invoice_number, "Save as new failed: {}", e);
        ApiError::from(e)
    })?;

    info!(invoice_id, %invoice_number, "Invoice saved as new");
    Ok(SaveAsNewResponse {
        invoice_id,
        invoice_number,
    })
}

/// Renders the draft to PDF with its selected template.
pub async fn preview_pdf<P: PdfGenerator>(doc: &DocumentState, pdf: &P) -> ApiResult<Vec<u8>> {
    let draft = get_draft(doc);
    debug!(template_id = ?draft.template_id, "preview_pdf command");

    let bytes = pdf.generate_pdf(&draft, draft.template_id).await?;
    debug!(bytes = bytes.len(), "PDF generated");
    Ok(bytes)
}
