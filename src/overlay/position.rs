//! Viewport-aware overlay placement.

/// Visible viewport dimensions in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

/// An on-screen rectangle in viewport coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// Which side of the host the panel anchors to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Anchor {
    Above,
    Below,
}

/// A computed panel position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    pub anchor: Anchor,
}

/// Gap between the host and the panel.
const GAP: f64 = 10.0;
/// Minimum distance kept from either horizontal viewport edge.
const EDGE_INSET: f64 = 16.0;

/// Place the panel relative to its host: below by preference, flipped above
/// when the space below is insufficient and the space above is sufficient;
/// horizontally centered on the host and clamped within the edge inset.
pub fn compute_placement(host: Rect, panel: Size, viewport: Viewport) -> Placement {
    let space_above = host.top();
    let space_below = viewport.height - host.bottom();

    let anchor = if space_below < panel.height && space_above >= panel.height {
        Anchor::Above
    } else {
        Anchor::Below
    };

    let y = match anchor {
        Anchor::Below => host.bottom() + GAP,
        Anchor::Above => host.top() - panel.height - GAP,
    };

    let min_left = EDGE_INSET;
    let max_left = viewport.width - panel.width - EDGE_INSET;
    let x = (host.center_x() - panel.width / 2.0).clamp(min_left, max_left.max(min_left));

    Placement { x, y, anchor }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Viewport = Viewport {
        width: 1280.0,
        height: 800.0,
    };
    const PANEL: Size = Size {
        width: 400.0,
        height: 200.0,
    };

    fn host_at(y: f64) -> Rect {
        Rect {
            x: 600.0,
            y,
            width: 120.0,
            height: 20.0,
        }
    }

    #[test]
    fn prefers_below_when_there_is_room() {
        let placement = compute_placement(host_at(100.0), PANEL, VIEWPORT);
        assert_eq!(placement.anchor, Anchor::Below);
        assert_eq!(placement.y, 130.0);
    }

    #[test]
    fn flips_above_when_below_is_cramped() {
        let placement = compute_placement(host_at(700.0), PANEL, VIEWPORT);
        assert_eq!(placement.anchor, Anchor::Above);
        assert_eq!(placement.y, 700.0 - PANEL.height - 10.0);
    }

    #[test]
    fn stays_below_when_neither_side_fits() {
        let cramped = Viewport {
            width: 1280.0,
            height: 240.0,
        };
        let placement = compute_placement(host_at(110.0), PANEL, cramped);
        assert_eq!(placement.anchor, Anchor::Below);
    }

    #[test]
    fn clamps_to_horizontal_insets() {
        let host = Rect {
            x: 0.0,
            y: 100.0,
            width: 40.0,
            height: 20.0,
        };
        let placement = compute_placement(host, PANEL, VIEWPORT);
        assert_eq!(placement.x, 16.0);

        let host = Rect {
            x: 1250.0,
            y: 100.0,
            width: 40.0,
            height: 20.0,
        };
        let placement = compute_placement(host, PANEL, VIEWPORT);
        assert_eq!(placement.x, 1280.0 - 400.0 - 16.0);
    }
}
