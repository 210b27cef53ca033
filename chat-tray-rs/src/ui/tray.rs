//! System tray icon management.
//!
//! Owns the tray icon and its context menu. Native tray and menu events
//! are forwarded into a channel the app drains each frame; the waker runs
//! right after each send.

use crate::shell::{Point, Rect, ShellEvent, TrayBounds};
use std::cell::Cell;
use std::rc::Rc;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use thiserror::Error;
use tray_icon::{
    menu::{CheckMenuItem, Menu, MenuEvent, MenuId, MenuItem, PredefinedMenuItem},
    MouseButton, MouseButtonState, TrayIcon, TrayIconBuilder, TrayIconEvent,
};

/// Events from the system tray.
#[derive(Debug, Clone, PartialEq)]
pub enum TrayEvent {
    /// Left-click on tray icon
    LeftClick { rect: Rect, position: Point },

    /// Right-click on tray icon; the native menu opens on its own
    RightClick { rect: Rect, position: Point },

    /// Cursor entered or moved over the icon
    MouseMove { rect: Rect, position: Point },

    /// Cursor left the icon
    MouseLeave { rect: Rect },

    /// Menu item selected
    MenuItemClicked { id: MenuItemId },
}

impl TrayEvent {
    /// The state machine input this event drives, if any.
    pub fn shell_event(&self) -> Option<ShellEvent> {
        match self {
            TrayEvent::LeftClick { .. } => Some(ShellEvent::TrayClick),
            TrayEvent::RightClick { .. } => Some(ShellEvent::TrayRightClick),
            TrayEvent::MouseMove { .. } => Some(ShellEvent::TrayMouseMove),
            TrayEvent::MouseLeave { .. } => None,
            TrayEvent::MenuItemClicked { id } => id.shell_event(),
        }
    }

    /// Icon bounds carried by the event.
    pub fn rect(&self) -> Option<Rect> {
        match self {
            TrayEvent::LeftClick { rect, .. }
            | TrayEvent::RightClick { rect, .. }
            | TrayEvent::MouseMove { rect, .. }
            | TrayEvent::MouseLeave { rect } => Some(*rect),
            TrayEvent::MenuItemClicked { .. } => None,
        }
    }

    fn from_native(event: TrayIconEvent) -> Option<Self> {
        match event {
            TrayIconEvent::Click {
                button: MouseButton::Left,
                button_state: MouseButtonState::Up,
                rect,
                position,
                ..
            } => Some(TrayEvent::LeftClick {
                rect: to_rect(rect),
                position: to_point(position),
            }),
            TrayIconEvent::Click {
                button: MouseButton::Right,
                button_state: MouseButtonState::Up,
                rect,
                position,
                ..
            } => Some(TrayEvent::RightClick {
                rect: to_rect(rect),
                position: to_point(position),
            }),
            TrayIconEvent::Enter { rect, position, .. }
            | TrayIconEvent::Move { rect, position, .. } => Some(TrayEvent::MouseMove {
                rect: to_rect(rect),
                position: to_point(position),
            }),
            TrayIconEvent::Leave { rect, .. } => Some(TrayEvent::MouseLeave {
                rect: to_rect(rect),
            }),
            _ => None,
        }
    }
}

fn to_rect(r: tray_icon::Rect) -> Rect {
    Rect::new(
        r.position.x.round() as i32,
        r.position.y.round() as i32,
        r.size.width as i32,
        r.size.height as i32,
    )
}

fn to_point(p: tray_icon::dpi::PhysicalPosition<f64>) -> Point {
    Point::new(p.x.round() as i32, p.y.round() as i32)
}

/// Menu item identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuItemId {
    ShowHide,
    OpenInBrowser,
    HoverToShow,
    StayOnTop,
    StartAtLogin,
    EnableShortcut,
    DetachedWindow,
    Fullscreen,
    AutoUpdate,
    Restart,
    ResetWindowLayout,
    ResetEverything,
    Quit,
}

impl MenuItemId {
    /// Items that are pure shell transitions. The rest are handled by the app.
    pub fn shell_event(self) -> Option<ShellEvent> {
        match self {
            MenuItemId::ShowHide => Some(ShellEvent::ToggleVisibility),
            MenuItemId::HoverToShow => Some(ShellEvent::ToggleHover),
            MenuItemId::StayOnTop => Some(ShellEvent::ToggleStayOnTop),
            MenuItemId::EnableShortcut => Some(ShellEvent::ToggleShortcut),
            MenuItemId::DetachedWindow => Some(ShellEvent::ToggleDetached),
            MenuItemId::Fullscreen => Some(ShellEvent::ToggleFullscreen),
            MenuItemId::AutoUpdate => Some(ShellEvent::ToggleAutoUpdate),
            MenuItemId::Restart => Some(ShellEvent::Restart),
            MenuItemId::ResetWindowLayout => Some(ShellEvent::ResetWindowLayout),
            MenuItemId::ResetEverything => Some(ShellEvent::ResetEverything),
            MenuItemId::Quit => Some(ShellEvent::Quit),
            MenuItemId::OpenInBrowser | MenuItemId::StartAtLogin => None,
        }
    }
}

/// What the context menu reflects. Rebuilt after every action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MenuState {
    /// The tray cannot report clicks, so the menu offers Show/Hide
    pub show_hide_item: bool,
    /// Hover-to-peek is possible in the current mode
    pub hover_item: bool,
    pub hover_enabled: bool,
    pub stay_on_top: bool,
    pub start_at_login: bool,
    pub start_at_login_supported: bool,
    pub shortcut_enabled: bool,
    pub detached: bool,
    pub fullscreen: bool,
    pub auto_update: bool,
}

/// Planned menu entry, before it becomes a native item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEntry {
    Item {
        id: MenuItemId,
        label: &'static str,
        enabled: bool,
    },
    Check {
        id: MenuItemId,
        label: &'static str,
        checked: bool,
        enabled: bool,
    },
    Label(String),
    Separator,
}

/// The menu for a given state, top to bottom.
pub fn menu_layout(state: &MenuState) -> Vec<MenuEntry> {
    let mut entries = Vec::new();

    if state.show_hide_item {
        entries.push(MenuEntry::Item {
            id: MenuItemId::ShowHide,
            label: "Show/Hide Window",
            enabled: true,
        });
        entries.push(MenuEntry::Separator);
    }

    entries.push(MenuEntry::Item {
        id: MenuItemId::OpenInBrowser,
        label: "Open in Browser",
        enabled: true,
    });
    entries.push(MenuEntry::Separator);

    if state.hover_item {
        entries.push(MenuEntry::Check {
            id: MenuItemId::HoverToShow,
            label: "Hover to Show",
            checked: state.hover_enabled,
            enabled: true,
        });
    }
    entries.push(MenuEntry::Check {
        id: MenuItemId::StayOnTop,
        label: "Stay on Top",
        checked: state.stay_on_top,
        enabled: true,
    });
    entries.push(MenuEntry::Check {
        id: MenuItemId::StartAtLogin,
        label: "Start at Login",
        checked: state.start_at_login,
        enabled: state.start_at_login_supported,
    });
    entries.push(MenuEntry::Check {
        id: MenuItemId::EnableShortcut,
        label: "Enable Shortcut",
        checked: state.shortcut_enabled,
        enabled: true,
    });
    entries.push(MenuEntry::Separator);

    entries.push(MenuEntry::Check {
        id: MenuItemId::DetachedWindow,
        label: "Use Detached Window",
        checked: state.detached,
        enabled: true,
    });
    entries.push(MenuEntry::Check {
        id: MenuItemId::Fullscreen,
        label: "Use Fullscreen",
        checked: state.fullscreen,
        enabled: true,
    });
    entries.push(MenuEntry::Separator);

    entries.push(MenuEntry::Label(format!("v{}", env!("CARGO_PKG_VERSION"))));
    entries.push(MenuEntry::Check {
        id: MenuItemId::AutoUpdate,
        label: "Automatic Updates",
        checked: state.auto_update,
        enabled: true,
    });
    entries.push(MenuEntry::Separator);

    for (id, label) in [
        (MenuItemId::Restart, "Restart Application"),
        (MenuItemId::ResetWindowLayout, "Reset Window Layout"),
        (MenuItemId::ResetEverything, "Reset Everything"),
    ] {
        entries.push(MenuEntry::Item {
            id,
            label,
            enabled: true,
        });
    }
    entries.push(MenuEntry::Separator);

    entries.push(MenuEntry::Item {
        id: MenuItemId::Quit,
        label: "Quit",
        enabled: true,
    });

    entries
}

/// Tray service error types.
#[derive(Debug, Error)]
pub enum TrayError {
    #[error("Failed to create tray icon: {0}")]
    CreateFailed(String),

    #[error("Failed to load icon resource: {0}")]
    IconLoadFailed(String),

    #[error("Tray icon not initialized")]
    NotInitialized,

    #[error("Failed to create menu: {0}")]
    MenuFailed(String),
}

/// Last known tray icon bounds, shared with the state machine.
#[derive(Debug, Clone, Default)]
pub struct TrayGeometry {
    rect: Rc<Cell<Rect>>,
}

impl TrayGeometry {
    pub fn set(&self, rect: Rect) {
        if rect.width > 0 && rect.height > 0 {
            self.rect.set(rect);
        }
    }
}

impl TrayBounds for TrayGeometry {
    fn bounds(&self) -> Rect {
        self.rect.get()
    }
}

/// System tray manager.
pub struct TrayManager {
    tray_icon: Option<TrayIcon>,
    event_sender: Sender<TrayEvent>,
    event_receiver: Receiver<TrayEvent>,
    menu_sender: Sender<MenuId>,
    menu_receiver: Receiver<MenuId>,
    menu_ids: Vec<(MenuId, MenuItemId)>,
    menu_state: Option<MenuState>,
    geometry: TrayGeometry,
}

impl TrayManager {
    /// Create a new TrayManager.
    pub fn new() -> Self {
        let (event_sender, event_receiver) = channel();
        let (menu_sender, menu_receiver) = channel();
        Self {
            tray_icon: None,
            event_sender,
            event_receiver,
            menu_sender,
            menu_receiver,
            menu_ids: Vec::new(),
            menu_state: None,
            geometry: TrayGeometry::default(),
        }
    }

    /// Create and show the tray icon. `wake` runs after every native
    /// tray or menu event.
    pub fn create(
        &mut self,
        menu_state: MenuState,
        wake: impl Fn() + Send + Sync + 'static,
    ) -> Result<(), TrayError> {
        let icon = crate::platform::icons::tray_icon().map_err(TrayError::IconLoadFailed)?;
        let menu = self.build_menu(&menu_state)?;

        let tray_icon = TrayIconBuilder::new()
            .with_icon(icon)
            .with_tooltip("Chat")
            .with_menu(Box::new(menu))
            .with_menu_on_left_click(false)
            .build()
            .map_err(|e| TrayError::CreateFailed(e.to_string()))?;

        if let Some(rect) = tray_icon.rect() {
            self.geometry.set(to_rect(rect));
        }
        self.tray_icon = Some(tray_icon);
        self.menu_state = Some(menu_state);

        let wake = Arc::new(wake);

        let sender = self.event_sender.clone();
        let tray_wake = Arc::clone(&wake);
        TrayIconEvent::set_event_handler(Some(move |event: TrayIconEvent| {
            if let Some(event) = TrayEvent::from_native(event) {
                let _ = sender.send(event);
                tray_wake();
            }
        }));

        let sender = self.menu_sender.clone();
        MenuEvent::set_event_handler(Some(move |event: MenuEvent| {
            let _ = sender.send(event.id);
            wake();
        }));

        tracing::info!("tray icon created");
        Ok(())
    }

    /// Drain pending tray and menu events. Call this from the event loop.
    pub fn poll(&mut self) -> Vec<TrayEvent> {
        let mut events: Vec<TrayEvent> = self.event_receiver.try_iter().collect();

        for event in &events {
            if let Some(rect) = event.rect() {
                self.geometry.set(rect);
            }
        }

        for menu_id in self.menu_receiver.try_iter() {
            match self.menu_ids.iter().find(|(native, _)| *native == menu_id) {
                Some((_, id)) => events.push(TrayEvent::MenuItemClicked { id: *id }),
                None => tracing::debug!(?menu_id, "click on a stale menu item"),
            }
        }

        events
    }

    /// Shared handle on the icon bounds.
    pub fn geometry(&self) -> TrayGeometry {
        self.geometry.clone()
    }

    /// Rebuild the context menu if anything it shows has changed.
    pub fn set_menu_state(&mut self, menu_state: MenuState) -> Result<(), TrayError> {
        if self.menu_state == Some(menu_state) {
            return Ok(());
        }

        let menu = self.build_menu(&menu_state)?;
        let tray = self.tray_icon.as_mut().ok_or(TrayError::NotInitialized)?;
        tray.set_menu(Some(Box::new(menu)));
        self.menu_state = Some(menu_state);

        tracing::trace!(?menu_state, "tray menu rebuilt");
        Ok(())
    }

    fn build_menu(&mut self, menu_state: &MenuState) -> Result<Menu, TrayError> {
        let menu = Menu::new();
        let mut ids = Vec::new();

        for entry in menu_layout(menu_state) {
            let result = match entry {
                MenuEntry::Item { id, label, enabled } => {
                    let item = MenuItem::new(label, enabled, None);
                    ids.push((item.id().clone(), id));
                    menu.append(&item)
                }
                MenuEntry::Check {
                    id,
                    label,
                    checked,
                    enabled,
                } => {
                    let item = CheckMenuItem::new(label, enabled, checked, None);
                    ids.push((item.id().clone(), id));
                    menu.append(&item)
                }
                MenuEntry::Label(text) => menu.append(&MenuItem::new(text, false, None)),
                MenuEntry::Separator => menu.append(&PredefinedMenuItem::separator()),
            };
            result.map_err(|e| TrayError::MenuFailed(e.to_string()))?;
        }

        self.menu_ids = ids;
        Ok(menu)
    }

    /// Destroy the tray icon.
    pub fn destroy(&mut self) {
        if self.tray_icon.take().is_some() {
            TrayIconEvent::set_event_handler(None::<fn(TrayIconEvent)>);
            MenuEvent::set_event_handler(None::<fn(MenuEvent)>);
            tracing::debug!("tray icon removed");
        }
    }
}

impl Default for TrayManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TrayManager {
    fn drop(&mut self) {
        self.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(entries: &[MenuEntry]) -> Vec<MenuItemId> {
        entries
            .iter()
            .filter_map(|entry| match entry {
                MenuEntry::Item { id, .. } | MenuEntry::Check { id, .. } => Some(*id),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_show_hide_only_without_tray_clicks() {
        let state = MenuState {
            hover_item: true,
            ..Default::default()
        };
        assert!(!ids(&menu_layout(&state)).contains(&MenuItemId::ShowHide));

        let state = MenuState {
            show_hide_item: true,
            ..state
        };
        let layout = menu_layout(&state);
        assert_eq!(ids(&layout)[0], MenuItemId::ShowHide);
    }

    #[test]
    fn test_hover_item_follows_mode() {
        let attached = MenuState {
            hover_item: true,
            hover_enabled: true,
            ..Default::default()
        };
        let layout = menu_layout(&attached);
        assert!(layout.contains(&MenuEntry::Check {
            id: MenuItemId::HoverToShow,
            label: "Hover to Show",
            checked: true,
            enabled: true,
        }));

        let detached = MenuState {
            hover_item: false,
            detached: true,
            ..attached
        };
        assert!(!ids(&menu_layout(&detached)).contains(&MenuItemId::HoverToShow));
    }

    #[test]
    fn test_menu_ends_with_version_and_lifecycle_items() {
        let layout = menu_layout(&MenuState::default());
        assert!(layout.contains(&MenuEntry::Label(format!("v{}", env!("CARGO_PKG_VERSION")))));

        let ids = ids(&layout);
        assert_eq!(
            &ids[ids.len() - 4..],
            &[
                MenuItemId::Restart,
                MenuItemId::ResetWindowLayout,
                MenuItemId::ResetEverything,
                MenuItemId::Quit,
            ]
        );
        assert_eq!(layout.last(), Some(&MenuEntry::Item {
            id: MenuItemId::Quit,
            label: "Quit",
            enabled: true,
        }));
    }

    #[test]
    fn test_auto_update_item_follows_version_label() {
        let state = MenuState {
            auto_update: true,
            ..Default::default()
        };
        let layout = menu_layout(&state);
        let version = layout
            .iter()
            .position(|entry| matches!(entry, MenuEntry::Label(_)))
            .expect("version label");
        assert_eq!(
            layout[version + 1],
            MenuEntry::Check {
                id: MenuItemId::AutoUpdate,
                label: "Automatic Updates",
                checked: true,
                enabled: true,
            }
        );
        assert_eq!(
            MenuItemId::AutoUpdate.shell_event(),
            Some(ShellEvent::ToggleAutoUpdate)
        );
    }

    #[test]
    fn test_app_level_items_have_no_shell_event() {
        assert_eq!(MenuItemId::OpenInBrowser.shell_event(), None);
        assert_eq!(MenuItemId::StartAtLogin.shell_event(), None);
        assert_eq!(
            MenuItemId::DetachedWindow.shell_event(),
            Some(ShellEvent::ToggleDetached)
        );
    }

    #[test]
    fn test_tray_events_map_to_shell_events() {
        let rect = Rect::new(1870, 1010, 40, 30);
        let position = Point::new(1880, 1020);

        assert_eq!(
            TrayEvent::LeftClick { rect, position }.shell_event(),
            Some(ShellEvent::TrayClick)
        );
        assert_eq!(
            TrayEvent::MouseMove { rect, position }.shell_event(),
            Some(ShellEvent::TrayMouseMove)
        );
        assert_eq!(TrayEvent::MouseLeave { rect }.shell_event(), None);
        assert_eq!(TrayEvent::MouseLeave { rect }.rect(), Some(rect));
    }

    #[test]
    fn test_empty_rects_do_not_replace_known_bounds() {
        let geometry = TrayGeometry::default();
        geometry.set(Rect::new(1870, 1010, 40, 30));
        geometry.set(Rect::new(0, 0, 0, 0));
        assert_eq!(geometry.bounds(), Rect::new(1870, 1010, 40, 30));
    }
}
