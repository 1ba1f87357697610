//! # Document State
//!
//! The editing session behind one open invoice form.
//!
//! ## Thread Safety
//! The session is wrapped in `Arc<Mutex<T>>` because:
//! 1. Multiple commands may read or modify it
//! 2. Only one command should modify it at a time
//! 3. Commands can run concurrently with async submit / preview calls
//!
//! Each command takes the lock once, so an action's document replacement and
//! its focus scheduling are one atomic step.
//!
//! ## Session Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Session Operations                                   │
//! │                                                                         │
//! │  View Action              Command                 Session Change        │
//! │  ───────────              ───────                 ──────────────        │
//! │                                                                         │
//! │  Key press ──────────────► handle_key() ────────► apply(edit) + focus  │
//! │                                                                         │
//! │  Drop row ───────────────► drag_end() ──────────► apply(move)          │
//! │                                                                         │
//! │  Type in field ──────────► set_item_field() ────► replace document     │
//! │                                                                         │
//! │  View rendered ──────────► after_render() ──────► focus.flush(host)    │
//! │                                                                         │
//! │  Submit ─────────────────► submit_invoice() ────► snapshot, then reset │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::NaiveDate;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use invoicer_core::edit::{set_item_field, set_subitem_description};
use invoicer_core::{
    Document, DragGesture, EditOutcome, FocusScheduler, FocusTarget, IdGenerator, InvoiceDraft,
    ItemField, StructuralEdit, Totals,
};

/// One open invoice form.
///
/// ## Invariants
/// - `draft.document` always satisfies the document invariants (edits are
///   produced by the core and replace it wholesale)
/// - `revision` increases by one for every change to the draft
pub struct EditorSession {
    /// Persisted id when editing an existing invoice.
    invoice_id: Option<i64>,

    draft: InvoiceDraft,

    ids: Box<dyn IdGenerator + Send>,

    focus: FocusScheduler,

    gesture: DragGesture,

    revision: u64,
}

impl std::fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("invoice_id", &self.invoice_id)
            .field("draft", &self.draft)
            .field("focus", &self.focus)
            .field("gesture", &self.gesture)
            .field("revision", &self.revision)
            .finish_non_exhaustive()
    }
}

impl EditorSession {
    /// Session over an existing draft.
    pub fn new(
        draft: InvoiceDraft,
        invoice_id: Option<i64>,
        ids: Box<dyn IdGenerator + Send>,
        drag_activation_distance: f64,
    ) -> Self {
        EditorSession {
            invoice_id,
            draft,
            ids,
            focus: FocusScheduler::new(),
            gesture: DragGesture::new(drag_activation_distance),
            revision: 0,
        }
    }

    /// Session for a brand-new invoice: one blank item.
    pub fn blank(
        today: NaiveDate,
        mut ids: Box<dyn IdGenerator + Send>,
        drag_activation_distance: f64,
    ) -> Self {
        let draft = InvoiceDraft::new(today, &mut ids);
        Self::new(draft, None, ids, drag_activation_distance)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn invoice_id(&self) -> Option<i64> {
        self.invoice_id
    }

    pub fn draft(&self) -> &InvoiceDraft {
        &self.draft
    }

    pub fn document(&self) -> &Document {
        &self.draft.document
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Target waiting for the next render.
    pub fn pending_focus(&self) -> Option<FocusTarget> {
        self.focus.pending()
    }

    pub fn focus_mut(&mut self) -> &mut FocusScheduler {
        &mut self.focus
    }

    pub fn gesture(&self) -> &DragGesture {
        &self.gesture
    }

    pub fn gesture_mut(&mut self) -> &mut DragGesture {
        &mut self.gesture
    }

    /// Totals of the current draft, at full precision.
    pub fn totals(&self) -> Totals {
        Totals::compute(
            &self.draft.document,
            self.draft.tax_rate,
            self.draft.discount_percentage,
        )
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Applies a structural edit and schedules its focus target.
    ///
    /// Returns the edit outcome; a no-op edit leaves the revision unchanged.
    /// An edit that changes the document without a focus target of its own
    /// drops the pending one, since its row indices no longer hold.
    pub fn apply(&mut self, edit: StructuralEdit) -> EditOutcome {
        let outcome = edit.apply(&self.draft.document, &mut self.ids);
        let before = self.revision;
        self.replace_document(outcome.document.clone());
        match outcome.focus {
            Some(target) => self.focus.schedule(target),
            None if self.revision != before => {
                self.focus.cancel();
            }
            None => {}
        }
        outcome
    }

    /// Replaces the document. Bumps the revision when it differs.
    pub fn replace_document(&mut self, document: Document) {
        if document != self.draft.document {
            self.draft.document = document;
            self.revision += 1;
        }
    }

    /// Sets one field of an item from raw text.
    pub fn set_item_field(&mut self, index: usize, field: ItemField, text: &str) {
        let document = set_item_field(&self.draft.document, index, field, text);
        self.replace_document(document);
    }

    /// Sets a sub-item's description.
    pub fn set_subitem_description(&mut self, item_index: usize, sub_index: usize, text: &str) {
        let document = set_subitem_description(&self.draft.document, item_index, sub_index, text);
        self.replace_document(document);
    }

    /// Edits the invoice-level fields around the document.
    pub fn update_draft(&mut self, f: impl FnOnce(&mut InvoiceDraft)) {
        let before = self.draft.clone();
        f(&mut self.draft);
        if self.draft != before {
            self.revision += 1;
        }
    }

    /// Starts over with another draft (load, discard, after submit).
    pub fn reset(&mut self, draft: InvoiceDraft, invoice_id: Option<i64>) {
        self.draft = draft;
        self.invoice_id = invoice_id;
        self.focus.cancel();
        self.gesture.cancel();
        self.revision += 1;
    }

    /// A fresh blank draft dated `today`, drawing ids from this session.
    pub fn blank_draft(&mut self, today: NaiveDate) -> InvoiceDraft {
        InvoiceDraft::new(today, &mut self.ids)
    }

    /// Gives access to the session's id generator (hydration).
    pub fn ids_mut(&mut self) -> &mut Box<dyn IdGenerator + Send> {
        &mut self.ids
    }
}

// =============================================================================
// Document State
// =============================================================================

/// Shared handle to the session.
///
/// ## Poisoning
/// A panic while the lock is held leaves the session as it was before the
/// panicking command (edits replace the document only after the core
/// returns), so a poisoned lock is recovered rather than propagated.
#[derive(Debug, Clone)]
pub struct DocumentState {
    session: Arc<Mutex<EditorSession>>,

    /// Held for the duration of a submit or save-as-new.
    in_flight: Arc<AsyncMutex<()>>,
}

impl DocumentState {
    pub fn new(session: EditorSession) -> Self {
        DocumentState {
            session: Arc::new(Mutex::new(session)),
            in_flight: Arc::new(AsyncMutex::new(())),
        }
    }

    /// Claims the persistence slot. `None` while another submit is running.
    pub fn try_begin_persist(&self) -> Option<OwnedMutexGuard<()>> {
        Arc::clone(&self.in_flight).try_lock_owned().ok()
    }

    fn lock(&self) -> MutexGuard<'_, EditorSession> {
        self.session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Executes a function with read access to the session.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let totals = state.with_session(|s| s.totals());
    /// ```
    pub fn with_session<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&EditorSession) -> R,
    {
        let session = self.lock();
        f(&session)
    }

    /// Executes a function with write access to the session.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// state.with_session_mut(|s| s.apply(StructuralEdit::AppendItem));
    /// ```
    pub fn with_session_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut EditorSession) -> R,
    {
        let mut session = self.lock();
        f(&mut session)
    }
}
