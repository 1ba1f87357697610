//! # State Module
//!
//! Manages the editor host's state.
//!
//! Each concern gets its own state type, and each command takes only the
//! states it needs.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────────┐  ┌──────────────────┐  ┌──────────────────────┐  │
//! │  │  DocumentState   │  │   LookupState    │  │    ConfigState       │  │
//! │  │                  │  │                  │  │                      │  │
//! │  │  Arc<Mutex<      │  │  Arc<Mutex<      │  │  currency_symbol     │  │
//! │  │   EditorSession  │  │   Lookups        │  │  default_tax_rate    │  │
//! │  │  >>              │  │  >>              │  │  drag distance       │  │
//! │  └──────────────────┘  └──────────────────┘  └──────────────────────┘  │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • DocumentState: one lock per command, released before async calls    │
//! │  • LookupState: replaced wholesale by the host                         │
//! │  • ConfigState: Read-only after initialization                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod document;
mod lookups;

pub use config::{ConfigState, IdStrategy};
pub use document::{DocumentState, EditorSession};
pub use lookups::{LookupState, Lookups};
