//! Window visibility and placement.
//!
//! The [`VisibilityMachine`] decides when the chat window shows, hides or
//! moves, driven by tray events, window events, menu actions and its own
//! timers. Everything it touches sits behind the traits in [`handles`].

pub mod geometry;
pub mod handles;
mod machine;
pub mod positioner;
pub mod state;
pub mod timers;

pub use geometry::{Point, Rect, Size};
pub use handles::{ScreenQuery, TrayBounds, WindowFactory, WindowHandle, WindowOptions};
pub use machine::{
    Collaborators, VisibilityMachine, DEFAULT_WINDOW_SIZE, FOCUS_POLL_INTERVAL, HOVER_DEBOUNCE,
    RESIZE_SETTLE,
};
pub use positioner::DisplayEdge;
pub use state::{ShellState, Visibility};

use crate::config::ConfigError;
use thiserror::Error;

/// Window display mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowMode {
    /// Borderless window anchored to the tray icon
    #[default]
    Attached,

    /// Standard window the user moves and resizes freely
    Detached,
}

impl WindowMode {
    pub fn from_detached(detached: bool) -> Self {
        if detached {
            WindowMode::Detached
        } else {
            WindowMode::Attached
        }
    }

    pub fn is_detached(self) -> bool {
        self == WindowMode::Detached
    }
}

/// Inputs to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellEvent {
    TrayClick,
    TrayRightClick,
    TrayMouseMove,

    WindowResized,
    WindowMoved,
    WindowBlurred,
    CloseRequested,

    /// Shortcut or menu Show/Hide
    ToggleVisibility,
    ToggleFullscreen,
    ToggleStayOnTop,
    ToggleHover,
    ToggleShortcut,
    ToggleDetached,
    ToggleAutoUpdate,

    Restart,
    ResetWindowLayout,
    ResetEverything,
    Quit,
}

/// What the caller must do after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    Nothing,
    /// Pop up the tray context menu
    ShowContextMenu,
    /// Veto the pending close request; the window was hidden instead
    PreventClose,
    /// Let the window close and end the process
    Exit,
    /// Start a fresh copy of the process, then exit
    Relaunch,
    /// Register or unregister the global show/hide shortcut
    SetToggleShortcut { enabled: bool },
}

/// Shell error types.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("Preference storage failed: {0}")]
    Config(#[from] ConfigError),
}
