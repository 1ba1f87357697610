//! # Collaborator Ports
//!
//! The editor never talks to the network or renders PDFs itself. It hands
//! plain values to these traits and the host application supplies the
//! implementations (REST client, embedded renderer, test fakes).
//!
//! ```text
//! ┌─────────────────┐   InvoiceDraft / InvoiceInput   ┌──────────────────┐
//! │ commands::      │ ──────────────────────────────► │ InvoiceGateway   │
//! │ invoice         │ ◄────────────────────────────── │ (persistence)    │
//! │                 │        invoice id / number      └──────────────────┘
//! │                 │                                 ┌──────────────────┐
//! │                 │ ──────── InvoiceDraft ────────► │ PdfGenerator     │
//! │                 │ ◄──────── PDF bytes ─────────── │                  │
//! └─────────────────┘                                 └──────────────────┘
//! ```
//!
//! Calls are made on a snapshot of the draft with no session lock held.

use std::future::Future;

use thiserror::Error;

use invoicer_core::{InvoiceDraft, InvoiceInput};

/// Failures reported by collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The invoice does not exist.
    #[error("Invoice not found: {0}")]
    NotFound(i64),

    /// The collaborator refused the invoice (e.g. server-side validation).
    #[error("Invoice rejected: {0}")]
    Rejected(String),

    /// Transport or server failure.
    #[error("Invoice service unavailable: {0}")]
    Unavailable(String),

    /// PDF generation failed.
    #[error("PDF generation failed: {0}")]
    Pdf(String),
}

/// Persistence collaborator.
pub trait InvoiceGateway: Send + Sync {
    /// Fetches a persisted invoice for editing.
    fn load_invoice(&self, id: i64) -> impl Future<Output = Result<InvoiceInput, GatewayError>> + Send;

    /// Creates an invoice, returning its id.
    fn create_invoice(
        &self,
        draft: &InvoiceDraft,
    ) -> impl Future<Output = Result<i64, GatewayError>> + Send;

    /// Replaces an existing invoice.
    fn update_invoice(
        &self,
        id: i64,
        draft: &InvoiceDraft,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;

    /// Creates an invoice from an id-less copy, returning its id.
    fn create_copy(
        &self,
        payload: &InvoiceInput,
    ) -> impl Future<Output = Result<i64, GatewayError>> + Send;

    /// The next free invoice number.
    fn next_invoice_number(&self) -> impl Future<Output = Result<String, GatewayError>> + Send;
}

/// PDF rendering collaborator.
pub trait PdfGenerator: Send + Sync {
    /// Renders the draft with the given template.
    fn generate_pdf(
        &self,
        draft: &InvoiceDraft,
        template_id: Option<i64>,
    ) -> impl Future<Output = Result<Vec<u8>, GatewayError>> + Send;
}
