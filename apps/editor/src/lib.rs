//! # Invoicer Editor Library
//!
//! Session host for the invoice line-item editor. The view (webview, TUI,
//! test harness) calls the commands in [`commands`]; the editing logic
//! itself lives in `invoicer-core`.
//!
//! ## Module Organization
//! ```text
//! invoicer_editor/
//! ├── lib.rs          ◄─── You are here (bootstrap & logging)
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── document.rs ◄─── Editing session (draft, ids, focus, drag)
//! │   ├── lookups.rs  ◄─── Contacts and templates for the selectors
//! │   └── config.rs   ◄─── Configuration state
//! ├── commands/
//! │   ├── mod.rs      ◄─── Command exports
//! │   ├── items.rs    ◄─── Structural edits
//! │   ├── fields.rs   ◄─── Field text and totals
//! │   ├── keyboard.rs ◄─── Key presses and focus hand-off
//! │   ├── drag.rs     ◄─── Drag-and-drop reordering
//! │   ├── lookups.rs  ◄─── Selector options
//! │   └── invoice.rs  ◄─── New / load / submit / preview
//! ├── gateway.rs      ◄─── Persistence and PDF collaborator traits
//! └── error.rs        ◄─── API error type for commands
//! ```
//!
//! ## Example
//! ```rust
//! use invoicer_editor::commands::{fields, items};
//! use invoicer_editor::state::ConfigState;
//! use invoicer_editor::EditorApp;
//!
//! let app = EditorApp::new(ConfigState::default());
//! fields::set_field_text(&app.document, "item-0-unit_price", "19.99").unwrap();
//! let response = items::append_item(&app.document);
//!
//! assert_eq!(response.document.len(), 2);
//! assert_eq!(fields::get_totals(&app.document, &app.config).subtotal, "$19.99");
//! ```

pub mod commands;
pub mod error;
pub mod gateway;
pub mod state;

use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use tracing::info;
use tracing_subscriber::EnvFilter;

use invoicer_core::InvoiceDraft;

use state::{ConfigState, DocumentState, EditorSession, LookupState};

/// Everything one editor window needs.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                       Editor Startup                                    │
/// │                                                                         │
/// │  1. Initialize Logging (host's choice) ───────────────────────────────► │
/// │     • init_tracing(): fmt subscriber with env filter                    │
/// │                                                                         │
/// │  2. Load Configuration ───────────────────────────────────────────────► │
/// │     • defaults → editor.toml → INVOICER_* env vars                      │
/// │     • falls back to defaults with a warning                             │
/// │                                                                         │
/// │  3. Initialize State Objects ─────────────────────────────────────────► │
/// │     • DocumentState: blank draft, ids per configured strategy           │
/// │     • LookupState: empty until the host pushes contacts / templates     │
/// │     • ConfigState: read-only from here on                               │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone)]
pub struct EditorApp {
    pub config: ConfigState,
    pub document: DocumentState,
    pub lookups: LookupState,
}

impl EditorApp {
    /// Loads configuration from `config_path` (or the platform default)
    /// and opens a blank draft dated today.
    pub fn bootstrap(config_path: Option<PathBuf>) -> Self {
        let config = ConfigState::load_or_default(config_path);
        info!(
            id_strategy = ?config.id_strategy,
            currency = %config.currency_symbol,
            "Starting Invoicer editor"
        );
        Self::new(config)
    }

    /// Opens a blank draft dated today with the given configuration.
    pub fn new(config: ConfigState) -> Self {
        Self::with_date(config, Local::now().date_naive())
    }

    /// Opens a blank draft dated `today`.
    pub fn with_date(config: ConfigState, today: NaiveDate) -> Self {
        let mut ids = config.id_generator();
        let mut draft = InvoiceDraft::new(today, &mut ids);
        draft.tax_rate = config.default_tax_rate;
        let session = EditorSession::new(draft, None, ids, config.drag_activation_distance);

        EditorApp {
            document: DocumentState::new(session),
            lookups: LookupState::new(),
            config,
        }
    }
}

/// Initializes the tracing subscriber.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=invoicer=trace` - Show trace for invoicer crates only
/// - Default: INFO, DEBUG for invoicer crates
///
/// Does nothing when a global subscriber is already installed.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,invoicer=debug"));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
