//! # Keyboard Commands
//!
//! Key presses on the focused field, and the focus hand-off after render.
//!
//! ## Key Press Cycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  keydown on #item-2-discount_percentage                                 │
//! │                    │                                                    │
//! │                    ▼                                                    │
//! │  handle_key(&doc, "item-2-discount_percentage", { key: "Enter" })       │
//! │                    │                                                    │
//! │        ┌───────────┼───────────────┬──────────────────┐                 │
//! │        ▼           ▼               ▼                  ▼                 │
//! │      Edit        Focus          Consumed          PassThrough           │
//! │   apply + focus  schedule       preventDefault    native handling       │
//! │        │           │                                                    │
//! │        └─────┬─────┘                                                    │
//! │              ▼                                                          │
//! │  View re-renders ──► after_render(&doc, host) ──► host.focus_element()  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use tracing::{debug, warn};
use ts_rs::TS;

use invoicer_core::keyboard::handle_key as resolve_key;
use invoicer_core::{FocusHost, FocusResult, FocusTarget, KeyEvent, KeyOutcome};

use crate::commands::items::DocumentResponse;
use crate::error::ApiResult;
use crate::state::DocumentState;

/// What the view should do after a key press.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct KeyResponse {
    pub outcome: KeyOutcome,

    /// Whether the browser's default handling must be suppressed.
    pub prevent_default: bool,

    /// The updated document, when the key performed an edit.
    pub document: Option<DocumentResponse>,

    /// Where focus goes after the next render.
    pub focus: Option<FocusTarget>,
}

/// Handles a key press on the control `element_id`.
///
/// ## Errors
/// `VALIDATION_ERROR` when `element_id` is not an editor field id.
pub fn handle_key(
    doc: &DocumentState,
    element_id: &str,
    event: KeyEvent,
) -> ApiResult<KeyResponse> {
    let target: FocusTarget = element_id.parse()?;
    debug!(%target, key = ?event.key, ctrl = event.ctrl, "handle_key command");

    let response = doc.with_session_mut(|s| {
        let outcome = resolve_key(s.document(), target, event);
        let document = match outcome {
            KeyOutcome::Edit(edit) => {
                s.apply(edit);
                Some(DocumentResponse::from(&*s))
            }
            KeyOutcome::Focus(next) => {
                s.focus_mut().schedule(next);
                None
            }
            KeyOutcome::Consumed | KeyOutcome::PassThrough => None,
        };

        KeyResponse {
            outcome,
            prevent_default: !matches!(outcome, KeyOutcome::PassThrough),
            document,
            focus: s.pending_focus(),
        }
    });

    Ok(response)
}

/// Moves focus to the pending target. The view calls this after it has
/// rendered the latest document.
///
/// A target whose control is gone is dropped with a warning.
pub fn after_render(doc: &DocumentState, host: &mut impl FocusHost) -> FocusResult {
    let result = doc.with_session_mut(|s| s.focus_mut().flush(host));

    match &result {
        FocusResult::Focused { element_id } => debug!(%element_id, "Focus moved"),
        FocusResult::Missing { element_id } => {
            warn!(%element_id, "Focus target not rendered, dropping it")
        }
        FocusResult::Idle => {}
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::items::{append_item, insert_subitem};
    use crate::error::ErrorCode;
    use crate::state::EditorSession;
    use chrono::NaiveDate;
    use invoicer_core::keyboard::{Caret, Key};
    use invoicer_core::{ItemField, SequentialIds, StructuralEdit};
    use std::collections::HashSet;

    fn state() -> DocumentState {
        DocumentState::new(EditorSession::blank(
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            Box::new(SequentialIds::new()),
            5.0,
        ))
    }

    /// Focus host backed by a set of rendered element ids.
    #[derive(Default)]
    struct FakeView {
        rendered: HashSet<String>,
        focused: Option<String>,
    }

    impl FakeView {
        fn render(&mut self, doc: &DocumentState) {
            self.rendered = doc.with_session(|s| {
                let mut ids = HashSet::new();
                for (i, item) in s.document().items().iter().enumerate() {
                    for field in ItemField::ALL {
                        ids.insert(FocusTarget::item(i, field).element_id());
                    }
                    for j in 0..item.subitems.len() {
                        ids.insert(FocusTarget::subitem(i, j).element_id());
                    }
                }
                ids
            });
        }
    }

    impl FocusHost for FakeView {
        fn focus_element(&mut self, element_id: &str) -> bool {
            if self.rendered.contains(element_id) {
                self.focused = Some(element_id.to_string());
                true
            } else {
                false
            }
        }
    }

    #[test]
    fn test_enter_on_description_inserts_and_focuses() {
        let doc = state();
        let mut view = FakeView::default();

        let response = handle_key(&doc, "item-0-description", KeyEvent::plain(Key::Enter)).unwrap();
        assert_eq!(
            response.outcome,
            KeyOutcome::Edit(StructuralEdit::InsertItemAfter { index: 0 })
        );
        assert!(response.prevent_default);
        assert_eq!(response.document.map(|d| d.document.len()), Some(2));

        view.render(&doc);
        let result = after_render(&doc, &mut view);
        assert_eq!(
            result,
            FocusResult::Focused {
                element_id: "item-1-description".into()
            }
        );
        assert_eq!(view.focused.as_deref(), Some("item-1-description"));
        assert_eq!(after_render(&doc, &mut view), FocusResult::Idle);
    }

    #[test]
    fn test_arrow_right_at_end_moves_to_quantity() {
        let doc = state();
        let event = KeyEvent::plain(Key::ArrowRight).with_caret(Caret::at(3, 3));
        let response = handle_key(&doc, "item-0-description", event).unwrap();
        assert_eq!(
            response.focus,
            Some(FocusTarget::item(0, ItemField::Quantity))
        );
        assert!(response.document.is_none());
    }

    #[test]
    fn test_pass_through_keeps_default() {
        let doc = state();
        let event = KeyEvent::plain(Key::ArrowRight).with_caret(Caret::at(1, 3));
        let response = handle_key(&doc, "item-0-description", event).unwrap();
        assert_eq!(response.outcome, KeyOutcome::PassThrough);
        assert!(!response.prevent_default);
        assert_eq!(response.focus, None);
    }

    #[test]
    fn test_edge_arrow_is_consumed() {
        let doc = state();
        let response = handle_key(&doc, "item-0-quantity", KeyEvent::plain(Key::ArrowUp)).unwrap();
        assert_eq!(response.outcome, KeyOutcome::Consumed);
        assert!(response.prevent_default);
    }

    #[test]
    fn test_ctrl_space_promotes_and_demotes() {
        let doc = state();
        append_item(&doc);
        let toggle = KeyEvent::plain(Key::Space).with_ctrl();

        let response = handle_key(&doc, "item-1-description", toggle).unwrap();
        assert_eq!(response.focus, Some(FocusTarget::subitem(0, 0)));

        let response = handle_key(&doc, "item-0-subitem-0-description", toggle).unwrap();
        assert_eq!(response.focus, Some(FocusTarget::description(1)));
        assert_eq!(response.document.map(|d| d.document.len()), Some(2));
    }

    #[test]
    fn test_promote_carries_subitems_along() {
        let doc = state();
        append_item(&doc);
        insert_subitem(&doc, 0, None);
        insert_subitem(&doc, 1, None);
        insert_subitem(&doc, 1, Some(0));

        let toggle = KeyEvent::plain(Key::Space).with_ctrl();
        let response = handle_key(&doc, "item-1-description", toggle).unwrap();
        assert_eq!(
            response.focus.map(|f| f.element_id()).as_deref(),
            Some("item-0-subitem-1-description")
        );

        let document = response.document.unwrap().document;
        assert_eq!(document.len(), 1);
        let order: Vec<&str> = document.items()[0]
            .subitems
            .iter()
            .map(|sub| sub.id.as_str())
            .collect();
        assert_eq!(order, vec!["id-3", "id-2", "id-4", "id-5"]);
    }

    #[test]
    fn test_backspace_on_empty_subitem_removes_it() {
        let doc = state();
        insert_subitem(&doc, 0, None);
        let response =
            handle_key(&doc, "item-0-subitem-0-description", KeyEvent::plain(Key::Backspace)).unwrap();
        assert_eq!(
            response.focus,
            Some(FocusTarget::item(0, ItemField::DiscountPercentage))
        );
    }

    #[test]
    fn test_latest_focus_wins() {
        let doc = state();
        let mut view = FakeView::default();
        handle_key(&doc, "item-0-description", KeyEvent::plain(Key::Enter)).unwrap();
        handle_key(&doc, "item-1-quantity", KeyEvent::plain(Key::Enter)).unwrap();

        view.render(&doc);
        assert_eq!(
            after_render(&doc, &mut view),
            FocusResult::Focused {
                element_id: "item-1-unit_price".into()
            }
        );
    }

    #[test]
    fn test_missing_target_is_dropped() {
        let doc = state();
        let mut view = FakeView::default();
        handle_key(&doc, "item-0-description", KeyEvent::plain(Key::Enter)).unwrap();

        // Rendered nothing yet.
        let result = after_render(&doc, &mut view);
        assert!(matches!(result, FocusResult::Missing { .. }));
        assert_eq!(view.focused, None);
    }

    #[test]
    fn test_unknown_element_id() {
        let doc = state();
        let err = handle_key(&doc, "total", KeyEvent::plain(Key::Enter)).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }
}
