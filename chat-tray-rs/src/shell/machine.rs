//! The visibility state machine.

use super::geometry::{Point, Rect, Size};
use super::handles::{ScreenQuery, TrayBounds, WindowFactory, WindowHandle, WindowOptions};
use super::positioner;
use super::state::{ShellState, Visibility};
use super::timers::{TimerKind, TimerToken, Timers};
use super::{Reaction, ShellError, ShellEvent, WindowMode};
use crate::config::{ConfigKey, ConfigStore};
use crate::platform::PlatformCapabilities;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace};

/// Quiet period after the last tray mouse-move before tracking the cursor.
pub const HOVER_DEBOUNCE: Duration = Duration::from_millis(100);

/// Cursor check interval while the window is peeking.
pub const FOCUS_POLL_INTERVAL: Duration = Duration::from_millis(110);

/// Hover stays suppressed this long after the most recent resize.
pub const RESIZE_SETTLE: Duration = Duration::from_millis(600);

/// Initial and minimum window size.
pub const DEFAULT_WINDOW_SIZE: Size = Size::new(420, 460);

/// Everything the machine drives but does not implement.
pub struct Collaborators {
    pub config: Box<dyn ConfigStore>,
    pub screen: Box<dyn ScreenQuery>,
    pub tray: Box<dyn TrayBounds>,
    pub windows: Box<dyn WindowFactory>,
}

/// Owns the window and every show/hide/move decision made about it.
pub struct VisibilityMachine {
    config: Box<dyn ConfigStore>,
    screen: Box<dyn ScreenQuery>,
    tray: Box<dyn TrayBounds>,
    windows: Box<dyn WindowFactory>,
    window: Box<dyn WindowHandle>,
    capabilities: PlatformCapabilities,
    state: ShellState,
    timers: Timers,
}

impl VisibilityMachine {
    /// Create the first window for the persisted mode and configure it.
    pub fn new(
        collaborators: Collaborators,
        capabilities: PlatformCapabilities,
    ) -> Result<Self, ShellError> {
        let Collaborators {
            mut config,
            screen,
            tray,
            mut windows,
        } = collaborators;

        if !config.has(ConfigKey::AutoUpdate) {
            config.set(ConfigKey::AutoUpdate, true.into())?;
        }

        let mode = WindowMode::from_detached(config.flag(ConfigKey::DetachedMode));
        let window = windows.create(window_options(mode, &capabilities));

        let mut machine = Self {
            config,
            screen,
            tray,
            windows,
            window,
            capabilities,
            state: ShellState::default(),
            timers: Timers::new(),
        };
        machine.configure_window(false)?;
        Ok(machine)
    }

    pub fn mode(&self) -> WindowMode {
        WindowMode::from_detached(self.config.flag(ConfigKey::DetachedMode))
    }

    pub fn visibility(&self) -> Visibility {
        self.state.visibility
    }

    pub fn state(&self) -> &ShellState {
        &self.state
    }

    pub fn config(&self) -> &dyn ConfigStore {
        self.config.as_ref()
    }

    pub fn window(&self) -> &dyn WindowHandle {
        self.window.as_ref()
    }

    pub fn capabilities(&self) -> &PlatformCapabilities {
        &self.capabilities
    }

    /// Hover-to-peek is currently possible.
    pub fn hover_enabled(&self) -> bool {
        self.capabilities.hover_to_show && !self.config.flag(ConfigKey::DisableHover)
    }

    /// When [`VisibilityMachine::tick`] next has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    /// Feed one event through the machine.
    pub fn handle(&mut self, event: ShellEvent, now: Instant) -> Result<Reaction, ShellError> {
        trace!(?event, visibility = ?self.state.visibility, "shell event");

        match event {
            ShellEvent::TrayClick => self.on_tray_click(),
            ShellEvent::TrayRightClick => {
                if !self.mode().is_detached() {
                    self.hide_window();
                }
                return Ok(Reaction::ShowContextMenu);
            }
            ShellEvent::TrayMouseMove => self.on_tray_mouse_move(now),

            ShellEvent::WindowResized => self.on_window_resized(now)?,
            ShellEvent::WindowMoved => {
                if self.mode().is_detached() {
                    let position = self.window.bounds().position();
                    self.config.set(ConfigKey::WindowPosition, <[i32; 2]>::from(position).into())?;
                }
            }
            ShellEvent::WindowBlurred => {
                if !self.mode().is_detached() && !self.window.is_always_on_top() {
                    debug!("window lost focus, hiding");
                    self.hide_window();
                }
            }
            ShellEvent::CloseRequested => {
                if self.state.force_quit {
                    return Ok(Reaction::Exit);
                }
                self.hide_window();
                return Ok(Reaction::PreventClose);
            }

            ShellEvent::ToggleVisibility => {
                if self.window.is_visible() {
                    self.hide_window();
                } else {
                    self.show_window(Visibility::Pinned);
                }
            }
            ShellEvent::ToggleFullscreen => {
                let fullscreen = !self.window.is_fullscreen();
                self.set_fullscreen(fullscreen)?;
            }
            ShellEvent::ToggleStayOnTop => self.toggle_stay_on_top()?,
            ShellEvent::ToggleHover => {
                self.toggle_flag(ConfigKey::DisableHover)?;
            }
            ShellEvent::ToggleShortcut => {
                let enabled = self.toggle_flag(ConfigKey::ShortcutEnabled)?;
                return Ok(Reaction::SetToggleShortcut { enabled });
            }
            ShellEvent::ToggleDetached => self.toggle_detached()?,
            ShellEvent::ToggleAutoUpdate => {
                self.toggle_flag(ConfigKey::AutoUpdate)?;
            }

            ShellEvent::Restart => {
                self.begin_shutdown();
                return Ok(Reaction::Relaunch);
            }
            ShellEvent::ResetWindowLayout => {
                for key in ConfigKey::WINDOW_LAYOUT {
                    self.config.delete(key)?;
                }
                info!("window layout reset");
                self.begin_shutdown();
                return Ok(Reaction::Relaunch);
            }
            ShellEvent::ResetEverything => {
                self.config.clear()?;
                info!("all preferences reset");
                self.begin_shutdown();
                return Ok(Reaction::Relaunch);
            }
            ShellEvent::Quit => {
                info!("quit requested");
                self.begin_shutdown();
                return Ok(Reaction::Exit);
            }
        }

        Ok(Reaction::Nothing)
    }

    /// Fire every timer whose deadline has passed.
    pub fn tick(&mut self, now: Instant) {
        while let Some((kind, token)) = self.timers.pop_due(now) {
            trace!(?kind, ?token, "timer fired");
            match kind {
                TimerKind::HoverDebounce => self.on_hover_settled(now),
                TimerKind::FocusPoll => self.on_focus_poll(),
                TimerKind::ResizeSettle => self.on_resize_settled(token),
            }
        }
    }

    fn on_tray_click(&mut self) {
        if self.window.is_visible() {
            self.hide_window();
        } else {
            self.show_window(Visibility::Pinned);
        }
    }

    fn on_tray_mouse_move(&mut self, now: Instant) {
        if !self.capabilities.hover_to_show
            || self.mode().is_detached()
            || self.window.is_always_on_top()
            || self.config.flag(ConfigKey::DisableHover)
            || self.state.hover_suppressed()
        {
            return;
        }

        if !self.window.is_visible() {
            self.show_window(Visibility::Peek);
        }

        self.timers
            .schedule(TimerKind::HoverDebounce, now + HOVER_DEBOUNCE);
    }

    fn on_hover_settled(&mut self, now: Instant) {
        let cursor = self.screen.cursor_position();
        if self.tray.bounds().contains(cursor) {
            return;
        }

        // Replaces any poll already running, so there is only ever one.
        self.timers.schedule_repeating(
            TimerKind::FocusPoll,
            now + FOCUS_POLL_INTERVAL,
            FOCUS_POLL_INTERVAL,
        );
    }

    fn on_focus_poll(&mut self) {
        if self.state.visibility != Visibility::Peek || !self.window.is_visible() {
            self.timers.cancel(TimerKind::FocusPoll);
            return;
        }

        let cursor = self.screen.cursor_position();
        let over_window = self.window.bounds().contains(cursor);
        let over_tray = self.tray.bounds().contains(cursor);

        if !self.state.hover_suppressed() && !over_window && !over_tray {
            debug!(?cursor, "cursor left the peeking window");
            self.hide_window();
        }
    }

    fn on_window_resized(&mut self, now: Instant) -> Result<(), ShellError> {
        // Fullscreen transitions resize the window programmatically.
        if self.window.is_fullscreen() {
            return Ok(());
        }

        let token = self.timers.schedule(TimerKind::ResizeSettle, now + RESIZE_SETTLE);
        self.state.resize_token = Some(token);

        let size = <[i32; 2]>::from(self.window.bounds().size());
        match self.mode() {
            WindowMode::Detached => self.config.set(ConfigKey::WindowSizeDetached, size.into())?,
            WindowMode::Attached => {
                if self.capabilities.reposition_on_resize {
                    self.reposition();
                }
                self.config.set(ConfigKey::WindowSize, size.into())?;
            }
        }
        Ok(())
    }

    fn on_resize_settled(&mut self, token: TimerToken) {
        if self.state.resize_token == Some(token) {
            debug!("resize settled, hover re-enabled");
            self.state.resize_token = None;
        }
    }

    /// Flip a boolean preference and return its new value.
    fn toggle_flag(&mut self, key: ConfigKey) -> Result<bool, ShellError> {
        let value = !self.config.flag(key);
        self.config.set(key, value.into())?;
        debug!(key = key.as_str(), value, "preference toggled");
        Ok(value)
    }

    fn toggle_stay_on_top(&mut self) -> Result<(), ShellError> {
        let on_top = !self.config.flag(ConfigKey::StayOnTop);
        self.config.set(ConfigKey::StayOnTop, on_top.into())?;
        self.window.set_always_on_top(on_top);

        if self.window.is_always_on_top() {
            self.show_window(Visibility::Pinned);
        }
        Ok(())
    }

    /// Enter or leave fullscreen. Fullscreen always floats on top; leaving
    /// it restores the stay-on-top preference.
    fn set_fullscreen(&mut self, fullscreen: bool) -> Result<(), ShellError> {
        self.config.set(ConfigKey::FullScreen, fullscreen.into())?;
        self.window.set_fullscreen(fullscreen);

        let on_top = fullscreen || self.config.flag(ConfigKey::StayOnTop);
        self.window.set_always_on_top(on_top);
        Ok(())
    }

    fn toggle_detached(&mut self) -> Result<(), ShellError> {
        let detached = !self.config.flag(ConfigKey::DetachedMode);
        self.config.set(ConfigKey::DetachedMode, detached.into())?;
        info!(mode = ?self.mode(), "switching window mode");

        self.window.hide();
        self.state.visibility = Visibility::Hidden;
        self.recreate_window(detached)
    }

    /// Replace the window for the current mode. Pending timers belong to
    /// the old window and are dropped first.
    fn recreate_window(&mut self, show: bool) -> Result<(), ShellError> {
        self.timers.cancel_all();
        self.state.resize_token = None;

        self.window.destroy();
        self.state.window_epoch += 1;

        let options = window_options(self.mode(), &self.capabilities);
        self.window = self.windows.create(options);
        self.configure_window(show)
    }

    /// Apply persisted geometry and window flags to a freshly created window.
    fn configure_window(&mut self, show: bool) -> Result<(), ShellError> {
        let mode = self.mode();
        info!(?mode, epoch = self.state.window_epoch, "initialized main window");

        match mode {
            WindowMode::Detached => {
                self.restore_size(ConfigKey::WindowSizeDetached)?;
                match self.config.pair(ConfigKey::WindowPosition) {
                    Some(position) => self.window.set_position(Point::from(position)),
                    None => {
                        let position = <[i32; 2]>::from(self.window.bounds().position());
                        self.config.set(ConfigKey::WindowPosition, position.into())?;
                    }
                }
            }
            WindowMode::Attached => self.restore_size(ConfigKey::WindowSize)?,
        }

        self.state.visibility = Visibility::Hidden;
        self.window
            .set_always_on_top(self.config.flag(ConfigKey::StayOnTop));

        if self.state.initialized && (self.window.is_always_on_top() || show) {
            self.show_window(Visibility::Pinned);
        }

        let fullscreen = self.config.flag(ConfigKey::FullScreen);
        self.set_fullscreen(fullscreen)?;

        self.state.initialized = true;
        Ok(())
    }

    fn restore_size(&mut self, key: ConfigKey) -> Result<(), ShellError> {
        match self.config.pair(key) {
            Some(size) => self.window.set_size(Size::from(size)),
            None => {
                let size = <[i32; 2]>::from(self.window.bounds().size());
                self.config.set(key, size.into())?;
            }
        }
        Ok(())
    }

    /// Show the window, anchoring it to the tray first when attached.
    /// A window that is already visible is left where it is.
    fn show_window(&mut self, visibility: Visibility) {
        if self.window.is_visible() {
            if visibility == Visibility::Pinned && self.state.visibility != Visibility::Pinned {
                debug!("peeking window pinned");
                self.state.visibility = Visibility::Pinned;
            }
            return;
        }

        let detached = self.mode().is_detached();
        if !detached {
            self.reposition();
        }

        // Briefly on every workspace so it opens on the active desktop.
        self.window.set_visible_on_all_workspaces(true);
        self.window.show();
        self.window.focus();
        self.window.set_visible_on_all_workspaces(false);
        self.window.set_skip_taskbar(!detached);

        debug!(?visibility, "window shown");
        self.state.visibility = visibility;
    }

    fn hide_window(&mut self) {
        self.window.hide();
        self.timers.cancel(TimerKind::HoverDebounce);
        self.timers.cancel(TimerKind::FocusPoll);

        if self.state.visibility != Visibility::Hidden {
            debug!(from = ?self.state.visibility, "window hidden");
        }
        self.state.visibility = Visibility::Hidden;
    }

    fn reposition(&mut self) {
        let tray = self.tray_anchor();
        let size = self.window.bounds().size();
        let work_area = self.screen.work_area_near(tray.position());
        let position = positioner::window_position(&tray, size, &work_area);

        trace!(?tray, ?work_area, ?position, "anchoring window to tray");
        self.window.set_position(position);
    }

    fn tray_anchor(&self) -> Rect {
        if self.capabilities.anchor_at_cursor {
            Rect::at_point(self.screen.cursor_position())
        } else {
            self.tray.bounds()
        }
    }

    fn begin_shutdown(&mut self) {
        self.state.force_quit = true;
        self.state.resize_token = None;
        self.timers.cancel_all();
    }
}

fn window_options(mode: WindowMode, capabilities: &PlatformCapabilities) -> WindowOptions {
    WindowOptions {
        mode,
        size: DEFAULT_WINDOW_SIZE,
        min_size: DEFAULT_WINDOW_SIZE,
        decorated: mode.is_detached() && capabilities.framed_detached,
    }
}
