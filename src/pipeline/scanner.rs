//! Document scanner: find the text leaves a selection covers.

use markup5ever_rcdom::Handle;

use crate::dom::range::SelectionRange;
use crate::dom::{closest_ancestor, get_node_attr, get_node_name, has_class, parent_element, text_of};
use crate::overlay::{HOST_CLASS, PANEL_CLASS, PANEL_CONTENT_ID};

/// One indivisible run of raw text discovered in the document. The scanner
/// only discovers leaves; it never creates or destroys them.
#[derive(Clone)]
pub struct TextLeaf {
    pub node: Handle,
}

impl TextLeaf {
    /// The leaf's raw text with surrounding whitespace trimmed.
    pub fn trimmed_text(&self) -> String {
        text_of(&self.node).unwrap_or_default().trim().to_string()
    }

    pub fn parent(&self) -> Option<Handle> {
        parent_element(&self.node)
    }
}

/// Collect, in document order, every non-empty text leaf intersecting the
/// range, excluding leaves inside prior overlays and preformatted regions.
///
/// Purely observational: a fresh scan is required for a new range.
pub fn scan(root: &Handle, range: &SelectionRange) -> Vec<TextLeaf> {
    let scope = match range.common_ancestor(root) {
        Some(scope) => scope,
        None => return Vec::new(),
    };

    let mut leaves = Vec::new();
    walk(root, &scope, range, &mut leaves);

    tracing::debug!(leaves = leaves.len(), "selection scan complete");
    leaves
}

fn walk(root: &Handle, node: &Handle, range: &SelectionRange, out: &mut Vec<TextLeaf>) {
    if let Some(text) = text_of(node) {
        if text.trim().is_empty() {
            return;
        }
        if is_excluded(node) {
            return;
        }
        if range.intersects(root, node) {
            out.push(TextLeaf { node: node.clone() });
        }
        return;
    }

    for child in node.children.borrow().iter() {
        walk(root, child, range, out);
    }
}

/// A leaf is rejected when any ancestor is a prior overlay host, the overlay
/// detail panel, or a preformatted/code container. The first matching
/// ancestor short-circuits the walk.
fn is_excluded(leaf: &Handle) -> bool {
    closest_ancestor(leaf, |ancestor| {
        if has_class(ancestor, HOST_CLASS) || has_class(ancestor, PANEL_CLASS) {
            return true;
        }
        if get_node_attr(ancestor, "id").as_deref() == Some(PANEL_CONTENT_ID) {
            return true;
        }
        matches!(get_node_name(ancestor), Some("pre") | Some("code"))
    })
    .is_some()
}
