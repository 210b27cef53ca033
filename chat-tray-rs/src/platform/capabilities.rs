//! Platform behaviour switches, resolved once at startup.

/// What the current platform's tray and window manager can do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformCapabilities {
    /// Tray reports mouse-move events, so hover-to-peek is possible
    pub hover_to_show: bool,

    /// Tray reports clicks. Without them the menu carries a Show/Hide item.
    pub tray_clicks: bool,

    /// Tray bounds are unreliable; anchor the window at the cursor instead
    pub anchor_at_cursor: bool,

    /// Re-anchor an attached window to the tray after the user resizes it
    pub reposition_on_resize: bool,

    /// Detached windows get a native frame
    pub framed_detached: bool,
}

impl PlatformCapabilities {
    pub fn current() -> Self {
        Self {
            framed_detached: !cfg!(target_os = "macos"),
            ..Self::default()
        }
    }
}

impl Default for PlatformCapabilities {
    /// The full feature set (Windows behaviour).
    fn default() -> Self {
        Self {
            hover_to_show: true,
            tray_clicks: true,
            anchor_at_cursor: false,
            reposition_on_resize: true,
            framed_detached: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_keeps_tray_hover_and_clicks() {
        let current = PlatformCapabilities::current();
        assert!(current.hover_to_show);
        assert!(current.tray_clicks);
        assert!(!current.anchor_at_cursor);
        assert!(current.reposition_on_resize);
        assert_eq!(current.framed_detached, !cfg!(target_os = "macos"));
    }
}
