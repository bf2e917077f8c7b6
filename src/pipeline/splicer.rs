//! Tree splicer: swap translated results back into the document.

use std::cell::RefCell;
use std::rc::Rc;

use markup5ever_rcdom::Handle;

use crate::dom::{append_child, make_element, make_text, replace_node, set_text};
use crate::overlay::{OverlayController, OverlayRegistry, PanelContent, HOST_CLASS};
use crate::pipeline::dispatcher::TranslationOutcome;
use crate::pipeline::grouper::TranslationUnit;
use crate::settings::Settings;

/// Splice one successful outcome into the document.
///
/// The unit's first member leaf is replaced in place by a freshly created
/// overlay host carrying the translated text; the replacement completes
/// before any sibling leaf is cleared, since both mutate the same ancestor's
/// subtree. Returns the fresh controller for the inserted host, or `None`
/// when the leaf's parent could no longer be resolved. A leaf detached by
/// an earlier splice in the same batch is a quiet no-op, never an error.
pub fn splice(
    unit: &TranslationUnit,
    outcome: &TranslationOutcome,
    settings: &Settings,
    registry: &Rc<RefCell<OverlayRegistry>>,
) -> Option<OverlayController> {
    let translated = outcome.translated_text.as_deref()?;
    let first_leaf = unit.member_leaves.first()?;

    let host = build_host(translated);
    if !replace_node(&first_leaf.node, &host) {
        tracing::debug!("splice target already detached, skipping unit");
        return None;
    }

    for leaf in &unit.member_leaves[1..] {
        set_text(&leaf.node, "");
    }

    let content = PanelContent {
        original_markup: unit.context_markup.clone(),
        usage: outcome.usage,
        provider: settings.provider,
        model: settings.model.clone(),
        show_token_count: settings.show_token_count,
    };

    Some(OverlayController::new(host, content, Rc::clone(registry)))
}

/// The inline overlay host: a marked span holding the translated text, so
/// later scans recognize the region as already translated.
fn build_host(translated: &str) -> Handle {
    let host = make_element(
        "span",
        &[
            ("class", HOST_CLASS),
            (
                "style",
                "cursor:pointer;text-decoration:underline dashed 1px;text-underline-offset:4px",
            ),
        ],
    );
    append_child(&host, &make_text(translated));
    host
}
