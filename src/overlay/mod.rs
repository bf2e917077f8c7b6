//! Interactive overlay lifecycle: hover preview, pinning, placement, and the
//! at-most-one mounted detail panel invariant.

pub mod panel;
pub mod position;

use std::cell::RefCell;
use std::rc::Rc;

use markup5ever_rcdom::Handle;

use crate::backend::Usage;
use crate::dom::{append_child, detach_node};
use crate::providers::Provider;

pub use panel::{build_panel, sanitize_markup};
pub use position::{compute_placement, Anchor, Placement, Rect, Size, Viewport};

/// Class marking an inline overlay host spliced into the document. Scans
/// treat anything inside such a host as already translated.
pub const HOST_CLASS: &str = "ot-translated";
/// Class on the floating detail panel.
pub const PANEL_CLASS: &str = "ot-panel";
/// Id of the panel region holding the sanitized original markup.
pub const PANEL_CONTENT_ID: &str = "ot-panel-content";

/// Everything the detail panel needs to render for one translated fragment.
#[derive(Clone)]
pub struct PanelContent {
    pub original_markup: String,
    pub usage: Option<Usage>,
    pub provider: Provider,
    pub model: String,
    pub show_token_count: bool,
}

/// Interactive state of one overlay.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverlayPhase {
    Hidden,
    HoverPreview,
    Pinned,
}

/// What the host page should do with a click event on the overlay.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClickResponse {
    /// Always true: clicks on the overlay never bubble to the underlying
    /// document, so they cannot re-trigger selection handlers.
    pub stop_propagation: bool,
    /// Whether the overlay is pinned after the click.
    pub pinned: bool,
}

struct MountedPanel {
    host: Handle,
    panel: Handle,
}

/// Exclusive owner of the single mounted detail panel.
///
/// Mounting for a new host tears the previous panel down synchronously
/// before the new one attaches, so two panels never coexist, even
/// transiently. The registry is injected into every controller; it is the
/// only shared mutable resource in the system.
pub struct OverlayRegistry {
    body: Handle,
    mounted: Option<MountedPanel>,
}

impl OverlayRegistry {
    /// `body` is where panels attach, normally the document's body element.
    pub fn new(body: Handle) -> Self {
        Self {
            body,
            mounted: None,
        }
    }

    pub fn shared(body: Handle) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::new(body)))
    }

    /// Mount a panel for `host`, detaching any panel mounted for a different
    /// host first. A host whose panel is already mounted keeps it (update in
    /// place, no remount).
    pub fn mount(&mut self, host: &Handle, content: &PanelContent) -> Handle {
        if let Some(mounted) = &self.mounted {
            if Rc::ptr_eq(&mounted.host, host) {
                return mounted.panel.clone();
            }
        }

        self.unmount();

        let panel = build_panel(content);
        append_child(&self.body, &panel);
        self.mounted = Some(MountedPanel {
            host: host.clone(),
            panel: panel.clone(),
        });
        panel
    }

    /// Detach the panel mounted for `host`, if that is the one showing.
    pub fn unmount_for(&mut self, host: &Handle) {
        let matches = self
            .mounted
            .as_ref()
            .is_some_and(|mounted| Rc::ptr_eq(&mounted.host, host));
        if matches {
            self.unmount();
        }
    }

    fn unmount(&mut self) {
        if let Some(mounted) = self.mounted.take() {
            detach_node(&mounted.panel);
        }
    }

    /// The host whose panel is currently mounted, if any.
    pub fn mounted_host(&self) -> Option<Handle> {
        self.mounted.as_ref().map(|mounted| mounted.host.clone())
    }

    pub fn mounted_panel(&self) -> Option<Handle> {
        self.mounted.as_ref().map(|mounted| mounted.panel.clone())
    }
}

/// Drives one overlay host's interactive behavior.
///
/// State machine over {Hidden, HoverPreview, Pinned}; hosts are never shared
/// across units, but every controller shares the one panel registry.
pub struct OverlayController {
    host: Handle,
    content: PanelContent,
    phase: OverlayPhase,
    registry: Rc<RefCell<OverlayRegistry>>,
}

impl OverlayController {
    pub fn new(
        host: Handle,
        content: PanelContent,
        registry: Rc<RefCell<OverlayRegistry>>,
    ) -> Self {
        Self {
            host,
            content,
            phase: OverlayPhase::Hidden,
            registry,
        }
    }

    pub fn phase(&self) -> OverlayPhase {
        self.phase
    }

    pub fn host(&self) -> &Handle {
        &self.host
    }

    pub fn is_pinned(&self) -> bool {
        self.phase == OverlayPhase::Pinned
    }

    /// Pointer entered the translated text affordance. Reveals the preview
    /// unless pinned; returns whether the panel was newly revealed.
    pub fn pointer_enter(&mut self) -> bool {
        if self.phase != OverlayPhase::Hidden {
            return false;
        }
        self.phase = OverlayPhase::HoverPreview;
        self.registry.borrow_mut().mount(&self.host, &self.content);
        true
    }

    /// Pointer left the affordance. Hides the preview unless pinned.
    pub fn pointer_leave(&mut self) {
        if self.phase == OverlayPhase::HoverPreview {
            self.phase = OverlayPhase::Hidden;
            self.registry.borrow_mut().unmount_for(&self.host);
        }
    }

    /// Primary click: toggles the pin. The event never propagates onward.
    pub fn click(&mut self) -> ClickResponse {
        match self.phase {
            OverlayPhase::Pinned => {
                self.phase = OverlayPhase::Hidden;
                self.registry.borrow_mut().unmount_for(&self.host);
            }
            OverlayPhase::Hidden | OverlayPhase::HoverPreview => {
                self.phase = OverlayPhase::Pinned;
                self.registry.borrow_mut().mount(&self.host, &self.content);
            }
        }

        ClickResponse {
            stop_propagation: true,
            pinned: self.is_pinned(),
        }
    }

    /// The viewport scrolled or resized. While visible, recompute placement
    /// and restyle the mounted panel; hidden overlays ignore the event.
    ///
    /// A controller whose panel was evicted by another overlay's mount is
    /// reconciled to `Hidden` here instead of restyling the foreign panel.
    pub fn viewport_changed(
        &mut self,
        host_rect: Rect,
        panel_size: Size,
        viewport: Viewport,
    ) -> Option<Placement> {
        if self.phase == OverlayPhase::Hidden {
            return None;
        }

        let owns_panel = self
            .registry
            .borrow()
            .mounted_host()
            .is_some_and(|mounted| Rc::ptr_eq(&mounted, &self.host));
        if !owns_panel {
            self.phase = OverlayPhase::Hidden;
            return None;
        }

        let placement = compute_placement(host_rect, panel_size, viewport);
        if let Some(panel) = self.registry.borrow().mounted_panel() {
            panel::apply_placement(&panel, &placement);
        }
        Some(placement)
    }

    /// Force-hide, releasing the panel if this overlay holds it.
    pub fn dismiss(&mut self) {
        self.phase = OverlayPhase::Hidden;
        self.registry.borrow_mut().unmount_for(&self.host);
    }
}
