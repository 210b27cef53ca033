//! UI module for the tray icon and the chat window.
//!
//! This module provides the tray icon with its context menu, the window
//! body, and the bridge that lets the shell drive the eframe viewport.

pub mod chat_panel;
pub mod theme;
pub mod tray;
pub mod viewport;

pub use chat_panel::{ChatPanel, PanelAction, PanelView, CHAT_URL};
pub use theme::Theme;
pub use tray::{MenuItemId, MenuState, TrayError, TrayEvent, TrayGeometry, TrayManager};
pub use viewport::{ViewportBridge, ViewportFactory};
