//! Detail-panel construction.
//!
//! The panel shows the sanitized original markup behind a translated
//! fragment and, when enabled and priced, a usage/cost summary. Injected
//! markup is display-only content: scripts and inline event handlers are
//! stripped before it ever reaches the panel.

use markup5ever_rcdom::{Handle, NodeData};

use crate::dom::{
    append_child, get_body, get_node_attr, get_node_name, html_to_dom, inner_html, make_element,
    make_text, set_node_attr,
};
use crate::overlay::{PanelContent, PANEL_CLASS, PANEL_CONTENT_ID};
use crate::providers::calculate_cost;

const PANEL_STYLE: &str = "position:fixed;z-index:9999;max-width:min(450px,calc(100vw - 32px));\
    width:max-content;padding:0.75rem 1rem;font-size:14px;line-height:1.5;color:#f8fafc;\
    background-color:rgba(15,23,42,0.95);border:1px solid rgba(255,255,255,0.1);\
    border-radius:0.5rem";
const CONTENT_STYLE: &str = "color:#f8fafc;font-size:14px;line-height:1.5";
const USAGE_STYLE: &str =
    "margin-top:0.25rem;border-top:1px solid rgba(255,255,255,0.2);font-size:13px;color:#94a3b8";

const LINK_STYLE: &str = "color:#93c5fd;text-decoration:none;font-size:14px";
const HEADING_STYLE: &str = "color:#f8fafc;font-weight:600;margin:0.5em 0;font-size:15px";
const PARAGRAPH_STYLE: &str = "margin:0.5em 0;color:#e2e8f0;line-height:1.5;font-size:14px";
const CODE_STYLE: &str = "background-color:rgba(255,255,255,0.1);padding:0.2em 0.4em;\
    border-radius:0.25em;font-size:13px;font-family:ui-monospace,SFMono-Regular,Menlo,Monaco,\
    Consolas,monospace;color:#e2e8f0";
const PRE_STYLE: &str = "background-color:rgba(255,255,255,0.1);padding:0.75em;\
    border-radius:0.375em;overflow-x:auto;margin:0.75em 0;font-size:13px";
const LIST_STYLE: &str = "margin:0.5em 0;padding-left:1.5em;color:#e2e8f0;font-size:14px";
const LIST_ITEM_STYLE: &str = "margin:0.25em 0;font-size:14px";

/// Build a detached panel element for one translated fragment.
pub fn build_panel(content: &PanelContent) -> Handle {
    let panel = make_element("div", &[("class", PANEL_CLASS), ("style", PANEL_STYLE)]);

    let markup_region = make_element(
        "div",
        &[
            ("id", PANEL_CONTENT_ID),
            ("class", "ot-panel-content"),
            ("style", CONTENT_STYLE),
        ],
    );
    for child in sanitized_fragment_children(&content.original_markup) {
        append_child(&markup_region, &child);
    }
    append_child(&panel, &markup_region);

    if let Some(usage_region) = build_usage_region(content) {
        append_child(&panel, &usage_region);
    }

    panel
}

/// Rewrite the panel's style for a newly computed placement, keeping the
/// base presentation intact.
pub fn apply_placement(panel: &Handle, placement: &crate::overlay::Placement) {
    let style = format!(
        "{};left:{:.0}px;top:{:.0}px",
        PANEL_STYLE, placement.x, placement.y
    );
    set_node_attr(panel, "style", Some(style));
}

/// Sanitize original markup and return it as a serialized string.
pub fn sanitize_markup(markup: &str) -> String {
    let dom = html_to_dom(markup.as_bytes(), "utf-8");
    match get_body(&dom) {
        Some(body) => {
            sanitize_subtree(&body);
            inner_html(&body)
        }
        None => String::new(),
    }
}

fn sanitized_fragment_children(markup: &str) -> Vec<Handle> {
    let dom = html_to_dom(markup.as_bytes(), "utf-8");
    match get_body(&dom) {
        Some(body) => {
            sanitize_subtree(&body);
            // Dropping the parse DOM empties the child vector of every node
            // it ever owned, even nodes still referenced from outside, so
            // the sanitized subtrees are rebuilt as fresh detached nodes.
            body.children
                .borrow()
                .iter()
                .filter_map(detached_copy)
                .collect()
        }
        None => Vec::new(),
    }
}

fn detached_copy(node: &Handle) -> Option<Handle> {
    match node.data {
        NodeData::Text { ref contents } => Some(make_text(&contents.borrow())),
        NodeData::Element {
            ref name,
            ref attrs,
            ..
        } => {
            let attr_values: Vec<(String, String)> = attrs
                .borrow()
                .iter()
                .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
                .collect();
            let attr_refs: Vec<(&str, &str)> = attr_values
                .iter()
                .map(|(attr_name, value)| (attr_name.as_str(), value.as_str()))
                .collect();

            let copy = make_element(name.local.as_ref(), &attr_refs);
            for child in node.children.borrow().iter() {
                if let Some(child_copy) = detached_copy(child) {
                    append_child(&copy, &child_copy);
                }
            }
            Some(copy)
        }
        _ => None,
    }
}

/// Walk the parsed markup: drop script elements, strip inline event
/// handlers, harden anchors, and apply the fixed presentational styling.
fn sanitize_subtree(node: &Handle) {
    node.children.borrow_mut().retain(|child| {
        !matches!(get_node_name(child), Some("script") | Some("noscript"))
    });

    for child in node.children.borrow().iter() {
        if let NodeData::Element { ref attrs, .. } = child.data {
            let handler_attrs: Vec<String> = attrs
                .borrow()
                .iter()
                .filter(|attr| attr.name.local.as_ref().starts_with("on"))
                .map(|attr| attr.name.local.to_string())
                .collect();
            for name in handler_attrs {
                set_node_attr(child, &name, None);
            }

            match get_node_name(child) {
                Some("a") => {
                    set_node_attr(child, "target", Some("_blank".to_string()));
                    set_node_attr(child, "rel", Some("noopener noreferrer".to_string()));
                    if let Some(href) = get_node_attr(child, "href") {
                        if href.trim_start().to_lowercase().starts_with("javascript:") {
                            set_node_attr(child, "href", None);
                        }
                    }
                    set_node_attr(child, "style", Some(LINK_STYLE.to_string()));
                }
                Some("h1") | Some("h2") | Some("h3") | Some("h4") | Some("h5") | Some("h6") => {
                    set_node_attr(child, "style", Some(HEADING_STYLE.to_string()));
                }
                Some("p") => {
                    set_node_attr(child, "style", Some(PARAGRAPH_STYLE.to_string()));
                }
                Some("code") => {
                    set_node_attr(child, "style", Some(CODE_STYLE.to_string()));
                }
                Some("pre") => {
                    set_node_attr(child, "style", Some(PRE_STYLE.to_string()));
                }
                Some("ul") | Some("ol") => {
                    set_node_attr(child, "style", Some(LIST_STYLE.to_string()));
                }
                Some("li") => {
                    set_node_attr(child, "style", Some(LIST_ITEM_STYLE.to_string()));
                }
                _ => {}
            }

            sanitize_subtree(child);
        }
    }
}

/// The usage/cost block: token counts plus a dollar cost with its yen
/// conversion. Rendered only when usage was reported, the model's pricing is
/// known, and the user's display preference is on.
fn build_usage_region(content: &PanelContent) -> Option<Handle> {
    if !content.show_token_count {
        return None;
    }
    let usage = content.usage.as_ref()?;
    let model = content.provider.find_model(&content.model)?;
    let costs = calculate_cost(usage, model);

    let region = make_element("div", &[("class", "ot-panel-usage"), ("style", USAGE_STYLE)]);

    for line in [
        format!("Total: {}", usage.total),
        format!("Input: {} / Output: {}", usage.input, usage.output),
        format!(
            "Cost: ${:.6} (¥{:.2})",
            costs.total_cost, costs.total_cost_jpy
        ),
    ] {
        let row = make_element("div", &[]);
        append_child(&row, &make_text(&line));
        append_child(&region, &row);
    }

    Some(region)
}
