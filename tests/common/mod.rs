//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use std::cell::RefCell;
use std::time::Duration;

use markup5ever_rcdom::{Handle, RcDom};

use overlay_translate::backend::{Translation, TranslationBackend, Usage};
use overlay_translate::dom::{get_body, get_node_name, html_to_dom, text_of};
use overlay_translate::{Provider, SelectionRange, Settings, TranslateError, TranslateResult};

pub fn dom_from(html: &str) -> RcDom {
    html_to_dom(html.as_bytes(), "utf-8")
}

pub fn body_of(dom: &RcDom) -> Handle {
    get_body(dom).expect("fixture document should have a body")
}

/// A range spanning the whole body, the way a select-all gesture would.
pub fn full_body_range(dom: &RcDom) -> SelectionRange {
    SelectionRange::select_node_contents(&body_of(dom))
}

/// Depth-first search for the first text node containing `needle`.
pub fn find_text(node: &Handle, needle: &str) -> Option<Handle> {
    if let Some(text) = text_of(node) {
        if text.contains(needle) {
            return Some(node.clone());
        }
        return None;
    }
    for child in node.children.borrow().iter() {
        if let Some(found) = find_text(child, needle) {
            return Some(found);
        }
    }
    None
}

/// Every element with the given tag name, in document order.
pub fn find_elements(node: &Handle, tag: &str) -> Vec<Handle> {
    let mut found = Vec::new();
    collect_elements(node, tag, &mut found);
    found
}

fn collect_elements(node: &Handle, tag: &str, out: &mut Vec<Handle>) {
    if get_node_name(node) == Some(tag) {
        out.push(node.clone());
    }
    for child in node.children.borrow().iter() {
        collect_elements(child, tag, out);
    }
}

pub fn test_settings() -> Settings {
    Settings {
        provider: Provider::OpenAi,
        api_key: "sk-test".to_string(),
        model: "gpt-4o".to_string(),
        show_token_count: true,
    }
}

/// Scripted stand-in for the remote translation collaborator.
pub struct MockBackend {
    pub usage: Option<Usage>,
    pub fail_on: Vec<String>,
    pub delay: Option<Duration>,
    pub calls: RefCell<Vec<String>>,
}

impl MockBackend {
    /// Translates everything by prefixing it, reporting no usage.
    pub fn echo() -> Self {
        Self {
            usage: None,
            fail_on: Vec::new(),
            delay: None,
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn with_usage(usage: Usage) -> Self {
        Self {
            usage: Some(usage),
            ..Self::echo()
        }
    }

    pub fn failing_on(text: &str) -> Self {
        Self {
            fail_on: vec![text.to_string()],
            ..Self::echo()
        }
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::echo()
        }
    }
}

impl TranslationBackend for MockBackend {
    async fn translate(&self, text: &str) -> TranslateResult<Translation> {
        self.calls.borrow_mut().push(text.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail_on.iter().any(|blocked| blocked == text) {
            return Err(TranslateError::RequestFailed(
                "service unavailable".to_string(),
            ));
        }

        Ok(Translation {
            text: format!("訳: {text}"),
            usage: self.usage,
        })
    }
}
