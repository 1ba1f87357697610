//! # Editor Commands Module
//!
//! All commands the view calls.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs       ◄─── You are here (exports)
//! ├── items.rs     ◄─── Structural edits (insert, remove, promote, move...)
//! ├── fields.rs    ◄─── Field text, invoice-level fields, totals
//! ├── keyboard.rs  ◄─── Key presses and the post-render focus hand-off
//! ├── drag.rs      ◄─── Pointer gestures and drops
//! ├── lookups.rs   ◄─── Contact and template options
//! └── invoice.rs   ◄─── New / load / submit / save-as-new / preview
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Command Flow                                         │
//! │                                                                         │
//! │  View                                                                   │
//! │  ────                                                                   │
//! │  onKeyDown(e) ──► handle_key(&doc, "item-0-description", event)         │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Rust Host                                                              │
//! │  ─────────                                                              │
//! │  fn handle_key(                                                         │
//! │      doc: &DocumentState,    ◄── Only the state it needs                │
//! │      element_id: &str,       ◄── Focused control                        │
//! │      event: KeyEvent,                                                   │
//! │  ) -> ApiResult<KeyResponse>                                            │
//! │         │                                                               │
//! │         │ (JSON serialization)                                          │
//! │         ▼                                                               │
//! │  View re-renders, then calls after_render(&doc, host)                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every command that changes the document returns a [`items::DocumentResponse`]
//! so the view can re-render from one value.

pub mod drag;
pub mod fields;
pub mod invoice;
pub mod items;
pub mod keyboard;
pub mod lookups;
