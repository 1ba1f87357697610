//! # Lookup State
//!
//! Contacts and templates offered by the form's selectors. The host fetches
//! them from wherever it likes and pushes them in with [`LookupState::set`].

use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use invoicer_core::{default_template, ContactRef, TemplateRef};

/// Selector options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Lookups {
    pub contacts: Vec<ContactRef>,
    pub templates: Vec<TemplateRef>,
}

impl Lookups {
    /// Resolves the template a new invoice starts with.
    ///
    /// A configured id wins when that template is on offer; otherwise the
    /// built-in default rule applies.
    pub fn initial_template(&self, configured: Option<i64>) -> Option<&TemplateRef> {
        configured
            .and_then(|id| self.templates.iter().find(|t| t.id == id))
            .or_else(|| default_template(&self.templates))
    }
}

/// Shared handle to the selector options.
#[derive(Debug, Clone, Default)]
pub struct LookupState {
    lookups: Arc<Mutex<Lookups>>,
}

impl LookupState {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Lookups> {
        self.lookups
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Replaces both option lists.
    pub fn set(&self, contacts: Vec<ContactRef>, templates: Vec<TemplateRef>) {
        *self.lock() = Lookups {
            contacts,
            templates,
        };
    }

    /// Snapshot of the current options.
    pub fn get(&self) -> Lookups {
        self.lock().clone()
    }

    /// Id of the template a new invoice starts with.
    pub fn initial_template_id(&self, configured: Option<i64>) -> Option<i64> {
        self.lock().initial_template(configured).map(|t| t.id)
    }
}
