//! Application state and lifecycle management.
//!
//! [`ShellApp`] is the eframe app. Each frame it collects window, tray,
//! menu, shortcut and panel input, feeds it through the
//! [`VisibilityMachine`], then hands the resulting window commands to
//! eframe and schedules the next frame for the machine's timers.

use crate::config::{ConfigKey, ConfigStore};
use crate::platform::{AutoStart, GlobalHotkeys, Hotkey, PlatformCapabilities, TrackedScreen};
use crate::shell::{
    Collaborators, Point, Rect, Reaction, ScreenQuery, ShellError, ShellEvent,
    VisibilityMachine, DEFAULT_WINDOW_SIZE,
};
use crate::ui::{
    ChatPanel, MenuItemId, MenuState, PanelAction, PanelView, Theme, TrayEvent, TrayManager,
    ViewportBridge, CHAT_URL,
};
use eframe::egui;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Name of the login item.
pub const APP_NAME: &str = "ChatTray";

/// Main application state.
pub struct ShellApp {
    machine: VisibilityMachine,
    bridge: ViewportBridge,
    tray: TrayManager,
    panel: ChatPanel,
    auto_start: AutoStart,

    /// System-wide shortcuts; absent where the platform has none
    hotkeys: Option<GlobalHotkeys>,

    /// Cursor and display feed where there is no native query
    tracked_screen: Option<TrackedScreen>,
    cursor_in_window: bool,

    start_at_login: bool,

    /// Error state for UI display
    error_message: Option<String>,

    /// Close has been requested for real; stop feeding the machine
    exiting: bool,
}

impl ShellApp {
    /// Build the shell around an eframe context and a preference store.
    pub fn new(cc: &eframe::CreationContext<'_>, config: Box<dyn ConfigStore>) -> anyhow::Result<Self> {
        let ctx = cc.egui_ctx.clone();
        Theme::system(&ctx).apply(&ctx);

        let ppp = ctx.pixels_per_point();
        let initial = ctx
            .input(|i| i.viewport().outer_rect)
            .map(|r| {
                Rect::from_parts(
                    Point::new((r.min.x * ppp).round() as i32, (r.min.y * ppp).round() as i32),
                    DEFAULT_WINDOW_SIZE,
                )
            })
            .unwrap_or_else(|| Rect::from_parts(Point::default(), DEFAULT_WINDOW_SIZE));
        let bridge = ViewportBridge::new(initial, ppp);

        let capabilities = PlatformCapabilities::current();
        let (screen, tracked_screen) = platform_screen();
        let tray = TrayManager::new();

        let machine = VisibilityMachine::new(
            Collaborators {
                config,
                screen,
                tray: Box::new(tray.geometry()),
                windows: Box::new(bridge.factory()),
            },
            capabilities,
        )?;

        let auto_start = AutoStart::new(APP_NAME);
        let start_at_login = auto_start.is_enabled();

        let mut app = Self {
            machine,
            bridge,
            tray,
            panel: ChatPanel::new(),
            auto_start,
            hotkeys: None,
            tracked_screen,
            cursor_in_window: false,
            start_at_login,
            error_message: None,
            exiting: false,
        };

        let menu_state = app.menu_state();
        let wake_ctx = ctx.clone();
        app.tray
            .create(menu_state, move || wake_ctx.request_repaint())?;

        let wake_ctx = ctx.clone();
        match GlobalHotkeys::start(move || wake_ctx.request_repaint()) {
            Ok(hotkeys) => {
                let shortcut_enabled = app.machine.config().flag(ConfigKey::ShortcutEnabled);
                for hotkey in Hotkey::startup_set(shortcut_enabled) {
                    hotkeys.set_registered(hotkey, true);
                }
                app.hotkeys = Some(hotkeys);
            }
            Err(e) => warn!("global shortcuts unavailable: {e}"),
        }

        info!(mode = ?app.machine.mode(), ?capabilities, "shell ready");
        Ok(app)
    }

    fn menu_state(&self) -> MenuState {
        let config = self.machine.config();
        let capabilities = self.machine.capabilities();
        let detached = config.flag(ConfigKey::DetachedMode);

        MenuState {
            show_hide_item: !capabilities.tray_clicks,
            hover_item: capabilities.hover_to_show && !detached,
            hover_enabled: !config.flag(ConfigKey::DisableHover),
            stay_on_top: config.flag(ConfigKey::StayOnTop),
            start_at_login: self.start_at_login,
            start_at_login_supported: self.auto_start.is_supported(),
            shortcut_enabled: config.flag(ConfigKey::ShortcutEnabled),
            detached,
            fullscreen: config.flag(ConfigKey::FullScreen),
            auto_update: config.flag(ConfigKey::AutoUpdate),
        }
    }

    /// Feed one event through the machine and carry out its reaction.
    fn dispatch(&mut self, ctx: &egui::Context, event: ShellEvent, now: Instant) {
        // Once exiting, close requests must go through unopposed.
        if self.exiting {
            return;
        }

        match self.machine.handle(event, now) {
            Ok(reaction) => self.react(ctx, reaction),
            Err(e) => self.fail(ctx, e),
        }
    }

    fn react(&mut self, ctx: &egui::Context, reaction: Reaction) {
        match reaction {
            Reaction::Nothing => {}
            // The native menu opens by itself on right-click.
            Reaction::ShowContextMenu => debug!("context menu opened"),
            Reaction::PreventClose => ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose),
            Reaction::SetToggleShortcut { enabled } => {
                if let Some(hotkeys) = &self.hotkeys {
                    hotkeys.set_registered(Hotkey::ToggleWindow, enabled);
                }
            }
            Reaction::Exit => self.exit(ctx),
            Reaction::Relaunch => {
                // Release the shortcuts before the new process claims them.
                self.exit(ctx);
                relaunch();
            }
        }
    }

    /// Preference storage failures end the process.
    fn fail(&mut self, ctx: &egui::Context, e: ShellError) {
        error!("{e}");
        self.error_message = Some(e.to_string());
        self.exit(ctx);
    }

    fn exit(&mut self, ctx: &egui::Context) {
        if !self.exiting {
            info!("shutting down");
            self.exiting = true;
            self.tray.destroy();
            self.hotkeys = None;
        }
        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
    }

    fn handle_tray_event(&mut self, ctx: &egui::Context, event: TrayEvent, now: Instant) {
        if let Some(screen) = &self.tracked_screen {
            match &event {
                TrayEvent::LeftClick { position, .. }
                | TrayEvent::RightClick { position, .. }
                | TrayEvent::MouseMove { position, .. } => {
                    screen.set_cursor(Some(*position));
                    self.cursor_in_window = false;
                }
                TrayEvent::MouseLeave { .. } => screen.set_cursor(None),
                TrayEvent::MenuItemClicked { .. } => {}
            }
        }

        if let Some(shell_event) = event.shell_event() {
            self.dispatch(ctx, shell_event, now);
            return;
        }

        match event {
            TrayEvent::MenuItemClicked {
                id: MenuItemId::OpenInBrowser,
            } => open_in_browser(),
            TrayEvent::MenuItemClicked {
                id: MenuItemId::StartAtLogin,
            } => self.toggle_start_at_login(),
            _ => {}
        }
    }

    fn toggle_start_at_login(&mut self) {
        match self.auto_start.toggle() {
            Ok(enabled) => {
                self.start_at_login = enabled;
                self.error_message = None;
            }
            Err(e) => {
                warn!("could not change start at login: {e}");
                self.start_at_login = self.auto_start.is_enabled();
                self.error_message = Some(e.to_string());
            }
        }
    }

    fn handle_panel_action(&mut self, ctx: &egui::Context, action: PanelAction, now: Instant) {
        match action {
            PanelAction::OpenInBrowser => open_in_browser(),
            PanelAction::ToggleDetached => self.dispatch(ctx, ShellEvent::ToggleDetached, now),
            PanelAction::ToggleFullscreen => self.dispatch(ctx, ShellEvent::ToggleFullscreen, now),
            PanelAction::Hide => {
                if self.machine.visibility().is_visible() {
                    self.dispatch(ctx, ShellEvent::ToggleVisibility, now);
                }
            }
        }
    }

    fn hotkey_events(&self) -> Vec<ShellEvent> {
        self.hotkeys
            .as_ref()
            .map(GlobalHotkeys::poll)
            .unwrap_or_default()
    }

    /// Keep the tracked cursor current while it is over the window.
    fn track_pointer(&mut self, ctx: &egui::Context) {
        let Some(screen) = &self.tracked_screen else {
            return;
        };

        let (hover, inner, monitor) = ctx.input(|i| {
            (
                i.pointer.hover_pos(),
                i.viewport().inner_rect,
                i.viewport().monitor_size,
            )
        });
        let ppp = self.bridge.pixels_per_point();

        if let Some(monitor) = monitor {
            screen.set_work_area(Rect::new(
                0,
                0,
                (monitor.x * ppp).round() as i32,
                (monitor.y * ppp).round() as i32,
            ));
        }

        match (hover, inner) {
            (Some(pos), Some(inner)) => {
                let global = inner.min + pos.to_vec2();
                screen.set_cursor(Some(Point::new(
                    (global.x * ppp).round() as i32,
                    (global.y * ppp).round() as i32,
                )));
                self.cursor_in_window = true;
            }
            _ if self.cursor_in_window => {
                screen.set_cursor(None);
                self.cursor_in_window = false;
            }
            _ => {}
        }
    }
}

impl eframe::App for ShellApp {
    fn update(&mut self, ctx: &egui::Context, frame: &mut eframe::Frame) {
        let now = Instant::now();
        self.track_pointer(ctx);

        for event in self.bridge.sync(ctx) {
            self.dispatch(ctx, event, now);
        }
        for event in self.tray.poll() {
            self.handle_tray_event(ctx, event, now);
        }
        for event in self.hotkey_events() {
            self.dispatch(ctx, event, now);
        }

        if !self.exiting {
            self.machine.tick(now);
        }

        let config = self.machine.config();
        let view = PanelView {
            mode: self.machine.mode(),
            fullscreen: config.flag(ConfigKey::FullScreen),
            shortcut_enabled: config.flag(ConfigKey::ShortcutEnabled) && self.hotkeys.is_some(),
            error_message: self.error_message.as_deref(),
        };
        self.panel.show(ctx, view);
        for action in self.panel.take_actions() {
            self.handle_panel_action(ctx, action, now);
        }

        self.bridge.flush(ctx, frame);

        if self.exiting {
            return;
        }

        if let Err(e) = self.tray.set_menu_state(self.menu_state()) {
            warn!("failed to refresh tray menu: {e}");
        }

        if let Some(deadline) = self.machine.next_deadline() {
            ctx.request_repaint_after(deadline.saturating_duration_since(Instant::now()));
        }
    }
}

#[cfg(windows)]
fn platform_screen() -> (Box<dyn ScreenQuery>, Option<TrackedScreen>) {
    (Box::new(crate::platform::Win32Screen), None)
}

#[cfg(not(windows))]
fn platform_screen() -> (Box<dyn ScreenQuery>, Option<TrackedScreen>) {
    let screen = TrackedScreen::new();
    (Box::new(screen.clone()), Some(screen))
}

fn open_in_browser() {
    if let Err(e) = open::that(CHAT_URL) {
        warn!("failed to open browser: {e}");
    }
}

/// Start a fresh copy of this executable.
fn relaunch() {
    let exe = match std::env::current_exe() {
        Ok(exe) => exe,
        Err(e) => {
            error!("cannot locate executable for restart: {e}");
            return;
        }
    };

    let args: Vec<_> = std::env::args_os().skip(1).collect();
    match std::process::Command::new(&exe).args(args).spawn() {
        Ok(child) => info!(pid = child.id(), "relaunched"),
        Err(e) => error!(exe = %exe.display(), "relaunch failed: {e}"),
    }
}
