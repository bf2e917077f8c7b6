//! Tests for the overlay state machine, panel singleton, placement, and the
//! panel's markup sanitizer.

mod common;

use std::rc::Rc;

use common::{body_of, dom_from, find_elements, test_settings};
use markup5ever_rcdom::Handle;

use overlay_translate::backend::Usage;
use overlay_translate::dom::{get_node_attr, make_element, outer_html};
use overlay_translate::overlay::{
    build_panel, sanitize_markup, OverlayRegistry, PanelContent, Rect, Size, Viewport, HOST_CLASS,
    PANEL_CLASS,
};
use overlay_translate::{OverlayController, OverlayPhase};

fn panel_content(markup: &str) -> PanelContent {
    let settings = test_settings();
    PanelContent {
        original_markup: markup.to_string(),
        usage: None,
        provider: settings.provider,
        model: settings.model,
        show_token_count: settings.show_token_count,
    }
}

fn overlay_host() -> Handle {
    make_element("span", &[("class", HOST_CLASS)])
}

fn controller_on(
    registry: &Rc<std::cell::RefCell<OverlayRegistry>>,
    markup: &str,
) -> OverlayController {
    OverlayController::new(overlay_host(), panel_content(markup), registry.clone())
}

#[test]
fn hover_then_pin_then_unpin_walks_the_state_machine() {
    let dom = dom_from("<html><body></body></html>");
    let registry = OverlayRegistry::shared(body_of(&dom));
    let mut overlay = controller_on(&registry, "<p>original</p>");

    assert_eq!(overlay.phase(), OverlayPhase::Hidden);

    // Hover reveals the preview and mounts the panel.
    assert!(overlay.pointer_enter());
    assert_eq!(overlay.phase(), OverlayPhase::HoverPreview);
    assert!(registry.borrow().mounted_panel().is_some());

    // A second enter while visible changes nothing.
    assert!(!overlay.pointer_enter());

    // Click pins; the event must not reach the document underneath.
    let response = overlay.click();
    assert!(response.stop_propagation);
    assert!(response.pinned);
    assert_eq!(overlay.phase(), OverlayPhase::Pinned);

    // Pinned panels survive the pointer leaving.
    overlay.pointer_leave();
    assert_eq!(overlay.phase(), OverlayPhase::Pinned);
    assert!(registry.borrow().mounted_panel().is_some());

    // A second click unpins and hides.
    let response = overlay.click();
    assert!(response.stop_propagation);
    assert!(!response.pinned);
    assert_eq!(overlay.phase(), OverlayPhase::Hidden);
    assert!(registry.borrow().mounted_panel().is_none());
}

#[test]
fn hover_preview_hides_when_the_pointer_leaves() {
    let dom = dom_from("<html><body></body></html>");
    let registry = OverlayRegistry::shared(body_of(&dom));
    let mut overlay = controller_on(&registry, "<p>original</p>");

    overlay.pointer_enter();
    overlay.pointer_leave();

    assert_eq!(overlay.phase(), OverlayPhase::Hidden);
    assert!(registry.borrow().mounted_panel().is_none());
}

#[test]
fn at_most_one_panel_is_mounted_across_overlays() {
    let dom = dom_from("<html><body></body></html>");
    let body = body_of(&dom);
    let registry = OverlayRegistry::shared(body.clone());

    let mut first = controller_on(&registry, "<p>first</p>");
    let mut second = controller_on(&registry, "<p>second</p>");

    first.click();
    assert!(first.is_pinned());

    // Pinning the second evicts the first overlay's panel synchronously.
    second.click();
    let mounted = registry.borrow().mounted_host().unwrap();
    assert!(Rc::ptr_eq(&mounted, second.host()));

    let panels = find_elements(&body, "div")
        .into_iter()
        .filter(|el| get_node_attr(el, "class").as_deref() == Some(PANEL_CLASS))
        .count();
    assert_eq!(panels, 1);
}

#[test]
fn remounting_for_the_same_host_reuses_the_panel() {
    let dom = dom_from("<html><body></body></html>");
    let registry = OverlayRegistry::shared(body_of(&dom));
    let host = overlay_host();
    let content = panel_content("<p>original</p>");

    let first = registry.borrow_mut().mount(&host, &content);
    let second = registry.borrow_mut().mount(&host, &content);

    assert!(Rc::ptr_eq(&first, &second));
}

#[test]
fn viewport_changes_restyle_only_visible_overlays() {
    let dom = dom_from("<html><body></body></html>");
    let registry = OverlayRegistry::shared(body_of(&dom));
    let mut overlay = controller_on(&registry, "<p>original</p>");

    let host_rect = Rect {
        x: 600.0,
        y: 100.0,
        width: 120.0,
        height: 20.0,
    };
    let panel_size = Size {
        width: 400.0,
        height: 200.0,
    };
    let viewport = Viewport {
        width: 1280.0,
        height: 800.0,
    };

    // Hidden overlays ignore the event entirely.
    assert!(overlay
        .viewport_changed(host_rect, panel_size, viewport)
        .is_none());

    overlay.pointer_enter();
    let placement = overlay
        .viewport_changed(host_rect, panel_size, viewport)
        .unwrap();
    assert_eq!(placement.y, 130.0);

    let panel = registry.borrow().mounted_panel().unwrap();
    let style = get_node_attr(&panel, "style").unwrap();
    assert!(style.contains("left:"));
    assert!(style.contains("top:130px"));
}

#[test]
fn evicted_overlay_stops_tracking_the_panel() {
    let dom = dom_from("<html><body></body></html>");
    let registry = OverlayRegistry::shared(body_of(&dom));
    let mut first = controller_on(&registry, "<p>first</p>");
    let mut second = controller_on(&registry, "<p>second</p>");

    first.click();
    second.click();

    let host_rect = Rect {
        x: 0.0,
        y: 0.0,
        width: 100.0,
        height: 20.0,
    };
    let panel_size = Size {
        width: 400.0,
        height: 200.0,
    };
    let viewport = Viewport {
        width: 1280.0,
        height: 800.0,
    };

    // The evicted controller reconciles to Hidden and must not restyle the
    // other overlay's mounted panel.
    assert!(first
        .viewport_changed(host_rect, panel_size, viewport)
        .is_none());
    assert_eq!(first.phase(), OverlayPhase::Hidden);

    let panel = registry.borrow().mounted_panel().unwrap();
    let style = get_node_attr(&panel, "style").unwrap();
    assert!(!style.contains("top:"));

    // The owner of the mounted panel still places it.
    assert!(second
        .viewport_changed(host_rect, panel_size, viewport)
        .is_some());
}

#[test]
fn dismiss_releases_the_panel_even_when_pinned() {
    let dom = dom_from("<html><body></body></html>");
    let registry = OverlayRegistry::shared(body_of(&dom));
    let mut overlay = controller_on(&registry, "<p>original</p>");

    overlay.click();
    overlay.dismiss();

    assert_eq!(overlay.phase(), OverlayPhase::Hidden);
    assert!(registry.borrow().mounted_panel().is_none());
}

#[test]
fn sanitizer_strips_scripts_and_handlers_and_hardens_links() {
    let sanitized = sanitize_markup(
        "<p onclick=\"steal()\">text</p>\
         <script>alert(1)</script>\
         <a href=\"https://example.com\">link</a>\
         <a href=\"javascript:alert(1)\">bad link</a>",
    );

    assert!(!sanitized.contains("<script"));
    assert!(!sanitized.contains("onclick"));
    assert!(!sanitized.contains("javascript:"));
    assert!(sanitized.contains("target=\"_blank\""));
    assert!(sanitized.contains("rel=\"noopener noreferrer\""));
    assert!(sanitized.contains("https://example.com"));
    assert!(sanitized.contains("text"));
}

#[test]
fn panel_shows_usage_and_cost_for_a_priced_model() {
    let mut content = panel_content("<p>original</p>");
    content.usage = Some(Usage {
        total: 150,
        input: 100,
        output: 50,
    });

    let html = outer_html(&build_panel(&content));

    assert!(html.contains("Total: 150"));
    assert!(html.contains("Input: 100 / Output: 50"));
    // gpt-4o: 100·$5/1M + 50·$15/1M = $0.001250, ¥0.19 at the fixed rate.
    assert!(html.contains("Cost: $0.001250"));
    assert!(html.contains("¥0.19"));
}

#[test]
fn usage_region_is_omitted_when_display_is_off() {
    let mut content = panel_content("<p>original</p>");
    content.usage = Some(Usage {
        total: 150,
        input: 100,
        output: 50,
    });
    content.show_token_count = false;

    let html = outer_html(&build_panel(&content));
    assert!(!html.contains("Total:"));
    assert!(!html.contains("Cost:"));
}

#[test]
fn usage_region_is_omitted_for_unknown_models() {
    let mut content = panel_content("<p>original</p>");
    content.usage = Some(Usage {
        total: 150,
        input: 100,
        output: 50,
    });
    content.model = "gpt-unpriced".to_string();

    let html = outer_html(&build_panel(&content));
    assert!(html.contains("original"));
    assert!(!html.contains("Cost:"));
}

#[test]
fn panel_preserves_nested_original_markup() {
    let content = panel_content(
        "<p>refer to <a href=\"https://example.com\">the guide</a> and <code>run()</code></p>",
    );
    let html = outer_html(&build_panel(&content));

    assert!(html.contains("refer to"));
    assert!(html.contains("the guide"));
    assert!(html.contains("run()"));
    assert!(html.contains("href=\"https://example.com\""));
}

#[test]
fn panel_content_region_carries_the_expected_id() {
    let content = panel_content("<p>original</p>");
    let html = outer_html(&build_panel(&content));

    assert!(html.contains("class=\"ot-panel\""));
    assert!(html.contains("id=\"ot-panel-content\""));
    assert!(html.contains("original"));
}
