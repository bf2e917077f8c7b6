//! Entry points for translating the current selection.

use std::cell::RefCell;
use std::rc::Rc;

use markup5ever_rcdom::RcDom;

use crate::backend::TranslationBackend;
use crate::dom::range::SelectionRange;
use crate::error::{TranslateError, TranslateResult};
use crate::overlay::{OverlayController, OverlayRegistry};
use crate::pipeline::{group, scan, AggregateResult, Dispatcher};
use crate::settings::Settings;

/// The outcome of one "translate the current selection" invocation.
pub struct SelectionTranslation {
    pub aggregate: AggregateResult,
    /// One controller per overlay host spliced into the document, in
    /// completion order.
    pub overlays: Vec<OverlayController>,
    pub failed_units: usize,
    pub total_units: usize,
}

impl SelectionTranslation {
    /// Map a partially or fully failed batch to an error. Successful units
    /// stay spliced in the document either way; there is no rollback.
    pub fn require_success(&self) -> TranslateResult<()> {
        if self.aggregate.success {
            Ok(())
        } else {
            Err(TranslateError::PartialBatchFailure {
                failed: self.failed_units,
                total: self.total_units,
            })
        }
    }
}

/// Translate the text covered by the given selection ranges.
///
/// Multi-range selections are merged into one span first. Settings must be
/// resolved by the caller; configuration problems surface before any unit is
/// dispatched. Successful units are spliced into the document as their
/// outcomes resolve, which may differ from scan order.
pub async fn translate_selection<B>(
    dom: &RcDom,
    ranges: &[SelectionRange],
    settings: &Settings,
    backend: &B,
    registry: &Rc<RefCell<OverlayRegistry>>,
) -> TranslateResult<SelectionTranslation>
where
    B: TranslationBackend,
{
    let root = dom.document.clone();

    if ranges.is_empty() {
        return Err(TranslateError::NoSelection);
    }
    let merged = SelectionRange::merge(&root, ranges).ok_or(TranslateError::NoSelection)?;

    let leaves = scan(&root, &merged);
    if leaves.is_empty() {
        return Err(TranslateError::NoSelection);
    }

    let scope = merged
        .common_ancestor(&root)
        .ok_or(TranslateError::NoSelection)?;
    let units = group(&scope, &leaves);

    tracing::info!(
        provider = settings.provider.id(),
        model = %settings.model,
        units = units.len(),
        "dispatching selection translation"
    );

    let mut overlays: Vec<OverlayController> = Vec::new();
    let mut failed_units = 0usize;

    let aggregate = Dispatcher::default()
        .dispatch(&units, backend, |unit, outcome| {
            if outcome.success {
                if let Some(controller) =
                    crate::pipeline::splice(unit, outcome, settings, registry)
                {
                    overlays.push(controller);
                }
            } else {
                failed_units += 1;
            }
        })
        .await;

    tracing::info!(
        success = aggregate.success,
        failed = failed_units,
        total = units.len(),
        "selection translation finished"
    );

    Ok(SelectionTranslation {
        aggregate,
        overlays,
        failed_units,
        total_units: units.len(),
    })
}

/// The trimmed text of the current selection, or empty when there is none.
pub fn selected_text(dom: &RcDom, ranges: &[SelectionRange]) -> String {
    let root = dom.document.clone();
    match SelectionRange::merge(&root, ranges) {
        Some(merged) => merged.text(&root).trim().to_string(),
        None => String::new(),
    }
}
