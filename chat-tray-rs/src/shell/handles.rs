//! Seams between the state machine and the platform.
//!
//! The state machine never talks to a toolkit directly. The tray icon, the
//! native window and the screen are reached through these traits so the
//! same transitions run against eframe in the app and against recording
//! fakes in tests.

use super::geometry::{Point, Rect, Size};
use super::WindowMode;

/// The native chat window.
pub trait WindowHandle {
    fn show(&mut self);
    fn hide(&mut self);
    fn focus(&mut self);
    fn is_visible(&self) -> bool;

    /// Outer position and inner size in physical pixels.
    fn bounds(&self) -> Rect;

    /// Move without animation.
    fn set_position(&mut self, position: Point);
    fn set_size(&mut self, size: Size);

    fn set_always_on_top(&mut self, on_top: bool);
    fn is_always_on_top(&self) -> bool;

    fn set_fullscreen(&mut self, fullscreen: bool);
    fn is_fullscreen(&self) -> bool;

    fn set_visible_on_all_workspaces(&mut self, visible: bool);
    fn set_skip_taskbar(&mut self, skip: bool);

    /// Tear the window down. The handle must ignore every call afterwards.
    fn destroy(&mut self);
}

/// How a new window is built for a given mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowOptions {
    pub mode: WindowMode,
    pub size: Size,
    pub min_size: Size,
    /// Native title bar and borders
    pub decorated: bool,
}

/// Creates the native window. Mode switches replace the window entirely.
pub trait WindowFactory {
    fn create(&mut self, options: WindowOptions) -> Box<dyn WindowHandle>;
}

/// Where the tray icon currently is.
pub trait TrayBounds {
    fn bounds(&self) -> Rect;
}

/// Cursor and display geometry.
pub trait ScreenQuery {
    fn cursor_position(&self) -> Point;

    /// Work area (display minus taskbar/dock) of the display nearest `point`.
    fn work_area_near(&self, point: Point) -> Rect;
}
