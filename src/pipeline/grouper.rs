//! Fragment grouper: partition scanned leaves into translation units.

use std::rc::Rc;

use markup5ever_rcdom::Handle;

use crate::dom::{closest_ancestor, get_node_name, outer_html};
use crate::pipeline::scanner::TextLeaf;

/// Closed set of container kinds that hold semantically related text
/// together. Leaves under the same nearest structural ancestor are
/// translated as one unit.
pub const STRUCTURAL_TAGS: [&str; 24] = [
    "article", "aside", "div", "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "li",
    "main", "nav", "ol", "p", "section", "table", "tbody", "td", "th", "thead", "tr", "ul",
];

/// One logical chunk of source text submitted as a single translation
/// request. Ownership of the member leaves is transient and ends once the
/// splicer has consumed them.
#[derive(Clone)]
pub struct TranslationUnit {
    /// Trimmed, non-empty source text (member texts joined by single spaces).
    pub source_text: String,
    /// Serialized original markup, captured before any mutation; becomes the
    /// overlay's reference content.
    pub context_markup: String,
    /// Ordered member leaves, at least one.
    pub member_leaves: Vec<TextLeaf>,
    pub is_structural: bool,
}

fn is_structural(node: &Handle) -> bool {
    get_node_name(node)
        .map(|name| STRUCTURAL_TAGS.contains(&name))
        .unwrap_or(false)
}

/// Partition leaves into ordered translation units.
///
/// Grouping depends only on ancestor identity and document order, so two
/// runs over an unchanged tree produce identical unit boundaries.
pub fn group(root: &Handle, leaves: &[TextLeaf]) -> Vec<TranslationUnit> {
    // First-seen order, keyed by ancestor identity.
    let mut structural_groups: Vec<(Handle, Vec<TextLeaf>)> = Vec::new();
    let mut singletons: Vec<(TextLeaf, Handle)> = Vec::new();

    for leaf in leaves {
        match closest_ancestor(&leaf.node, is_structural) {
            Some(ancestor) => {
                match structural_groups
                    .iter_mut()
                    .find(|(existing, _)| Rc::ptr_eq(existing, &ancestor))
                {
                    Some((_, members)) => members.push(leaf.clone()),
                    None => structural_groups.push((ancestor, vec![leaf.clone()])),
                }
            }
            None => {
                let context = leaf.parent().unwrap_or_else(|| root.clone());
                singletons.push((leaf.clone(), context));
            }
        }
    }

    let mut units = Vec::new();

    for (ancestor, members) in structural_groups {
        let texts: Vec<String> = members
            .iter()
            .map(|leaf| leaf.trimmed_text())
            .filter(|text| !text.is_empty())
            .collect();
        let source_text = texts.join(" ");
        if source_text.is_empty() {
            continue;
        }

        units.push(TranslationUnit {
            source_text,
            context_markup: outer_html(&ancestor),
            member_leaves: members,
            is_structural: true,
        });
    }

    for (leaf, context) in singletons {
        let source_text = leaf.trimmed_text();
        if source_text.is_empty() {
            continue;
        }

        units.push(TranslationUnit {
            source_text,
            context_markup: outer_html(&context),
            member_leaves: vec![leaf],
            is_structural: false,
        });
    }

    tracing::debug!(units = units.len(), "grouped selection into units");
    units
}
