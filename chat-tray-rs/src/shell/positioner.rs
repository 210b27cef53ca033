//! Tray-anchored window placement.
//!
//! Computes where the attached window goes so it sits centered on the tray
//! icon along the taskbar and flush against the taskbar across it, without
//! spilling out of the display's work area.

use super::geometry::{Point, Rect, Size};

/// Screen edge the tray (and so the taskbar) is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayEdge {
    Top,
    Bottom,
    Left,
    Right,
}

impl DisplayEdge {
    /// Classify the taskbar edge from the tray bounds and the work area of
    /// the display nearest the tray.
    ///
    /// The tray belongs to whichever work-area edge its center is closest
    /// to. A tray outside the work area (the usual case, since the taskbar
    /// is excluded from it) yields a negative distance for that edge, so it
    /// always wins.
    pub fn classify(tray: &Rect, work_area: &Rect) -> Self {
        let center = tray.center();
        let candidates = [
            (DisplayEdge::Bottom, work_area.bottom() - center.y),
            (DisplayEdge::Top, center.y - work_area.y),
            (DisplayEdge::Right, work_area.right() - center.x),
            (DisplayEdge::Left, center.x - work_area.x),
        ];

        let mut best = candidates[0];
        for candidate in &candidates[1..] {
            if candidate.1 < best.1 {
                best = *candidate;
            }
        }
        best.0
    }

    /// True for taskbars running along the top or bottom of the display.
    pub fn is_horizontal(self) -> bool {
        matches!(self, DisplayEdge::Top | DisplayEdge::Bottom)
    }
}

/// Top-left position for a window of `window` size anchored to `tray`.
pub fn window_position(tray: &Rect, window: Size, work_area: &Rect) -> Point {
    let edge = DisplayEdge::classify(tray, work_area);

    if edge.is_horizontal() {
        let y = match edge {
            DisplayEdge::Top => work_area.y,
            _ => work_area.bottom() - window.height,
        };

        let centered = tray.x + (tray.width - window.width) / 2;
        let x = if centered + window.width <= work_area.right() {
            centered
        } else {
            // Tray too close to the far edge: flush the window against it.
            work_area.right() - window.width
        };

        Point::new(x.max(work_area.x), y.max(work_area.y))
    } else {
        let x = match edge {
            DisplayEdge::Left => work_area.x,
            _ => work_area.right() - window.width,
        };

        let centered = tray.y + (tray.height - window.height) / 2;
        let y = if centered + window.height <= work_area.bottom() {
            centered
        } else {
            work_area.bottom() - window.height
        };

        Point::new(x.max(work_area.x), y.max(work_area.y))
    }
}
