//! Low-level helpers over the rcdom document tree.
//!
//! Everything that touches `markup5ever_rcdom` node internals lives here:
//! attribute access, parent lookups, the shared upward ancestor walk, node
//! replacement, and (de)serialization. The pipeline and overlay modules are
//! written against these helpers instead of raw node fields.

pub mod range;

use std::rc::Rc;

use encoding_rs::Encoding;
use html5ever::interface::{Attribute, QualName};
use html5ever::parse_document;
use html5ever::serialize::{serialize, SerializeOpts, TraversalScope};
use html5ever::tendril::{format_tendril, TendrilSink};
use html5ever::{namespace_url, ns, LocalName};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom, SerializableHandle};

/// Parse HTML bytes into a DOM, honoring the document's declared charset.
pub fn html_to_dom(data: &[u8], document_encoding: &str) -> RcDom {
    let s: String;

    if let Some(encoding) = Encoding::for_label(document_encoding.as_bytes()) {
        let (string, _, _) = encoding.decode(data);
        s = string.to_string();
    } else {
        s = String::from_utf8_lossy(data).to_string();
    }

    parse_document(RcDom::default(), Default::default())
        .from_utf8()
        .read_from(&mut s.as_bytes())
        .unwrap()
}

/// Get a node's attribute value by name.
pub fn get_node_attr(node: &Handle, attr_name: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => {
            for attr in attrs.borrow().iter() {
                if &*attr.name.local == attr_name {
                    return Some(attr.value.to_string());
                }
            }
            None
        }
        _ => None,
    }
}

/// Set, overwrite, or (with `None`) remove a node's attribute.
pub fn set_node_attr(node: &Handle, attr_name: &str, attr_value: Option<String>) {
    if let NodeData::Element { attrs, .. } = &node.data {
        let attrs_mut = &mut attrs.borrow_mut();
        let mut i = 0;
        let mut found_existing_attr: bool = false;

        while i < attrs_mut.len() {
            if &attrs_mut[i].name.local == attr_name {
                found_existing_attr = true;

                if let Some(attr_value) = attr_value.clone() {
                    let _ = &attrs_mut[i].value.clear();
                    let _ = &attrs_mut[i].value.push_slice(attr_value.as_str());
                } else {
                    attrs_mut.remove(i);
                    continue;
                }
            }

            i += 1;
        }

        if !found_existing_attr {
            if let Some(attr_value) = attr_value.clone() {
                let name = LocalName::from(attr_name);

                attrs_mut.push(Attribute {
                    name: QualName::new(None, ns!(), name),
                    value: format_tendril!("{}", attr_value),
                });
            }
        }
    };
}

/// Get an element node's local tag name.
pub fn get_node_name(node: &Handle) -> Option<&'_ str> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name.local.as_ref()),
        _ => None,
    }
}

/// Look up a node's parent without disturbing the parent link.
///
/// The parent is stored in a `Cell`, so it has to be taken out and put back;
/// callers must never observe a cleared link afterwards.
pub fn parent_node(node: &Handle) -> Option<Handle> {
    let weak = node.parent.take();
    let parent = weak.as_ref().and_then(|w| w.upgrade());
    node.parent.set(weak);
    parent
}

/// Like [`parent_node`], but only yields element parents.
pub fn parent_element(node: &Handle) -> Option<Handle> {
    parent_node(node).filter(|p| matches!(p.data, NodeData::Element { .. }))
}

/// Walk upward from `node` and return the nearest ancestor element matching
/// the predicate, or `None` once the walk leaves the element tree.
///
/// Both the scanner's exclusion rule and the grouper's structural lookup are
/// predicates over this single traversal.
pub fn closest_ancestor<P>(node: &Handle, mut predicate: P) -> Option<Handle>
where
    P: FnMut(&Handle) -> bool,
{
    let mut current = parent_element(node);
    while let Some(ancestor) = current {
        if predicate(&ancestor) {
            return Some(ancestor);
        }
        current = parent_element(&ancestor);
    }
    None
}

/// Check whether an element's `class` attribute carries the given token.
pub fn has_class(node: &Handle, class_name: &str) -> bool {
    get_node_attr(node, "class")
        .map(|classes| classes.split_whitespace().any(|c| c == class_name))
        .unwrap_or(false)
}

/// Find the first child element with the given tag name.
pub fn get_child_node_by_name(parent: &Handle, node_name: &str) -> Option<Handle> {
    let children = parent.children.borrow();
    let matching_children = children.iter().find(|child| match child.data {
        NodeData::Element { ref name, .. } => &*name.local == node_name,
        _ => false,
    });
    matching_children.cloned()
}

/// Locate the document's `body` element.
pub fn get_body(dom: &RcDom) -> Option<Handle> {
    let html = get_child_node_by_name(&dom.document, "html")?;
    get_child_node_by_name(&html, "body")
}

/// Create a detached element node.
pub fn make_element(tag: &str, attrs: &[(&str, &str)]) -> Handle {
    let attributes = attrs
        .iter()
        .map(|(name, value)| Attribute {
            name: QualName::new(None, ns!(), LocalName::from(*name)),
            value: format_tendril!("{}", value),
        })
        .collect();

    Node::new(NodeData::Element {
        name: QualName::new(None, ns!(html), LocalName::from(tag)),
        attrs: std::cell::RefCell::new(attributes),
        template_contents: std::cell::RefCell::new(None),
        mathml_annotation_xml_integration_point: false,
    })
}

/// Create a detached text node.
pub fn make_text(text: &str) -> Handle {
    Node::new(NodeData::Text {
        contents: std::cell::RefCell::new(format_tendril!("{}", text)),
    })
}

/// Append `child` as the last child of `parent`, fixing up the parent link.
pub fn append_child(parent: &Handle, child: &Handle) {
    child.parent.set(Some(Rc::downgrade(parent)));
    parent.children.borrow_mut().push(child.clone());
}

/// Swap `new` into the exact tree position of `old`.
///
/// Returns `false` without mutating anything when `old`'s parent can no
/// longer be resolved (the node was already detached by an earlier splice).
pub fn replace_node(old: &Handle, new: &Handle) -> bool {
    let parent = match parent_node(old) {
        Some(parent) => parent,
        None => return false,
    };

    let mut children = parent.children.borrow_mut();
    let position = children.iter().position(|child| Rc::ptr_eq(child, old));
    match position {
        Some(i) => {
            new.parent.set(Some(Rc::downgrade(&parent)));
            children[i] = new.clone();
            old.parent.set(None);
            true
        }
        None => false,
    }
}

/// Detach a node from its parent, if it still has one.
pub fn detach_node(node: &Handle) {
    if let Some(parent) = parent_node(node) {
        parent
            .children
            .borrow_mut()
            .retain(|child| !Rc::ptr_eq(child, node));
    }
    node.parent.set(None);
}

/// Overwrite a text node's contents. Non-text nodes are left untouched.
pub fn set_text(node: &Handle, text: &str) {
    if let NodeData::Text { ref contents } = node.data {
        let mut contents = contents.borrow_mut();
        contents.clear();
        contents.push_slice(text);
    }
}

/// Read a text node's raw contents.
pub fn text_of(node: &Handle) -> Option<String> {
    match node.data {
        NodeData::Text { ref contents } => Some(contents.borrow().to_string()),
        _ => None,
    }
}

/// Serialize one node including its own tag.
pub fn outer_html(node: &Handle) -> String {
    serialize_handle(node, TraversalScope::IncludeNode)
}

/// Serialize a node's children only.
pub fn inner_html(node: &Handle) -> String {
    serialize_handle(node, TraversalScope::ChildrenOnly(None))
}

fn serialize_handle(node: &Handle, traversal_scope: TraversalScope) -> String {
    let mut buf: Vec<u8> = Vec::new();
    let serializable: SerializableHandle = node.clone().into();
    serialize(
        &mut buf,
        &serializable,
        SerializeOpts {
            traversal_scope,
            ..Default::default()
        },
    )
    .expect("Unable to serialize DOM into buffer");

    String::from_utf8_lossy(&buf).to_string()
}

/// Compute a node's child-index path from `root`, or `None` when the node is
/// not attached under `root`. Paths compare lexicographically in document
/// order; a shorter path that prefixes a longer one belongs to an ancestor.
pub fn node_path(root: &Handle, node: &Handle) -> Option<Vec<usize>> {
    let mut path = Vec::new();
    let mut current = node.clone();

    while !Rc::ptr_eq(&current, root) {
        let parent = parent_node(&current)?;
        let index = parent
            .children
            .borrow()
            .iter()
            .position(|child| Rc::ptr_eq(child, &current))?;
        path.push(index);
        current = parent;
    }

    path.reverse();
    Some(path)
}
