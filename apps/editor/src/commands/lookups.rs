//! # Lookup Commands
//!
//! Contact and template options for the selectors. The host fetches them
//! and pushes them in; the view reads them back when it renders the form.

use tracing::debug;

use crate::state::{LookupState, Lookups};

/// Replaces the selector options. Returns what is now on offer.
pub fn set_lookups(lookups: &LookupState, options: Lookups) -> Lookups {
    debug!(
        contacts = options.contacts.len(),
        templates = options.templates.len(),
        "set_lookups command"
    );
    lookups.set(options.contacts, options.templates);
    lookups.get()
}

/// Gets the current selector options.
pub fn get_lookups(lookups: &LookupState) -> Lookups {
    lookups.get()
}
