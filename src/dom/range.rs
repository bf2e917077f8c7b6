//! Selection ranges over the live document tree.
//!
//! A [`SelectionRange`] pins a start and end boundary point (container node
//! plus child/character offset) inside one document. Multi-range selections
//! are merged into a single span before scanning, mirroring how platforms
//! that report disjoint ranges are handled upstream.

use std::rc::Rc;

use markup5ever_rcdom::{Handle, NodeData};

use crate::dom::{node_path, parent_element, text_of};

/// One boundary point of a selection.
#[derive(Clone)]
pub struct BoundaryPoint {
    pub container: Handle,
    pub offset: usize,
}

/// A selection span anchored in the live document.
#[derive(Clone)]
pub struct SelectionRange {
    pub start: BoundaryPoint,
    pub end: BoundaryPoint,
}

impl SelectionRange {
    pub fn new(start: (Handle, usize), end: (Handle, usize)) -> Self {
        Self {
            start: BoundaryPoint {
                container: start.0,
                offset: start.1,
            },
            end: BoundaryPoint {
                container: end.0,
                offset: end.1,
            },
        }
    }

    /// Select an entire subtree: from before its first child to after its
    /// last one.
    pub fn select_node_contents(node: &Handle) -> Self {
        let child_count = node.children.borrow().len();
        Self::new((node.clone(), 0), (node.clone(), child_count))
    }

    /// Merge disjoint ranges into one span running from the earliest start
    /// point to the latest end point, in document order.
    ///
    /// Returns `None` when the slice is empty or the ranges are not all
    /// attached under the same document root.
    pub fn merge(root: &Handle, ranges: &[SelectionRange]) -> Option<SelectionRange> {
        let mut merged: Option<SelectionRange> = None;

        for range in ranges {
            let candidate = match merged.take() {
                None => range.clone(),
                Some(current) => {
                    let start = if boundary_before(root, &range.start, &current.start)? {
                        range.start.clone()
                    } else {
                        current.start.clone()
                    };
                    let end = if boundary_before(root, &current.end, &range.end)? {
                        range.end.clone()
                    } else {
                        current.end.clone()
                    };
                    SelectionRange { start, end }
                }
            };
            merged = Some(candidate);
        }

        merged
    }

    /// The nearest element enclosing both boundary points; if the common
    /// container is itself a text leaf, its parent element.
    pub fn common_ancestor(&self, root: &Handle) -> Option<Handle> {
        let start_path = node_path(root, &self.start.container)?;
        let end_path = node_path(root, &self.end.container)?;

        let common_len = start_path
            .iter()
            .zip(end_path.iter())
            .take_while(|(a, b)| a == b)
            .count();

        let mut node = root.clone();
        for &index in &start_path[..common_len] {
            let child = node.children.borrow().get(index).cloned()?;
            node = child;
        }

        match node.data {
            NodeData::Element { .. } => Some(node),
            NodeData::Text { .. } => parent_element(&node),
            // Document container: descend no further, use it as-is.
            _ => Some(node),
        }
    }

    /// Whether a node lies between the two boundary points in document
    /// order. Boundary containers themselves, and nodes nested inside them,
    /// count as intersecting, except where a boundary offset places the node
    /// entirely outside the span.
    pub fn intersects(&self, root: &Handle, node: &Handle) -> bool {
        let path = match node_path(root, node) {
            Some(p) => p,
            None => return false,
        };
        let start = match node_path(root, &self.start.container) {
            Some(p) => p,
            None => return false,
        };
        let end = match node_path(root, &self.end.container) {
            Some(p) => p,
            None => return false,
        };

        // Lexicographic order ranks an ancestor before its descendants, so a
        // node inside the start container still compares >= start. The end
        // side needs the explicit prefix check.
        let inside_start = path.len() >= start.len() && path[..start.len()] == start[..];
        let inside_end = path.len() >= end.len() && path[..end.len()] == end[..];
        if !(path >= start && (path <= end || inside_end)) {
            return false;
        }

        // For an element boundary container, the offset is a child index:
        // subtrees before the start offset or at and past the end offset lie
        // outside the selection.
        if inside_start && path.len() > start.len() && path[start.len()] < self.start.offset {
            return false;
        }
        if inside_end && path.len() > end.len() && path[end.len()] >= self.end.offset {
            return false;
        }

        // A range ending at character 0 of a text leaf only touches it.
        if path == end && self.end.offset == 0 && text_of(node).is_some() {
            return false;
        }

        true
    }

    /// Concatenated trimmed text of every text leaf intersecting the range,
    /// in document order, joined by single spaces.
    pub fn text(&self, root: &Handle) -> String {
        let scope = match self.common_ancestor(root) {
            Some(scope) => scope,
            None => return String::new(),
        };

        let mut pieces: Vec<String> = Vec::new();
        collect_range_text(root, &scope, self, &mut pieces);
        pieces.join(" ")
    }
}

fn collect_range_text(root: &Handle, node: &Handle, range: &SelectionRange, out: &mut Vec<String>) {
    if let Some(text) = text_of(node) {
        let trimmed = text.trim();
        if !trimmed.is_empty() && range.intersects(root, node) {
            out.push(trimmed.to_string());
        }
        return;
    }

    for child in node.children.borrow().iter() {
        collect_range_text(root, child, range, out);
    }
}

/// Document-order comparison of boundary points: true when `a` starts before
/// `b`. Same-container points fall back to offsets.
fn boundary_before(root: &Handle, a: &BoundaryPoint, b: &BoundaryPoint) -> Option<bool> {
    if Rc::ptr_eq(&a.container, &b.container) {
        return Some(a.offset < b.offset);
    }

    let a_path = node_path(root, &a.container)?;
    let b_path = node_path(root, &b.container)?;
    Some(a_path < b_path)
}
