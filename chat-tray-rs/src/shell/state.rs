//! Shell state owned by the visibility state machine.

use super::timers::TimerToken;

/// Whether and why the window is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Hidden,
    /// Shown by hovering the tray; hides again once the cursor leaves
    Peek,
    /// Shown by a click, the shortcut, stay-on-top or a mode switch
    Pinned,
}

impl Visibility {
    pub fn is_visible(self) -> bool {
        !matches!(self, Visibility::Hidden)
    }
}

/// Process-wide shell flags.
#[derive(Debug, Default)]
pub struct ShellState {
    pub visibility: Visibility,

    /// Set only by Quit/Restart/Reset; lets the next close request through
    pub force_quit: bool,

    /// Token of the newest resize-settle timer. Hover is suppressed while set.
    pub resize_token: Option<TimerToken>,

    /// Bumped every time the window is recreated
    pub window_epoch: u64,

    /// The first window has been configured
    pub initialized: bool,
}

impl ShellState {
    /// A user resize is still settling.
    pub fn hover_suppressed(&self) -> bool {
        self.resize_token.is_some()
    }
}
