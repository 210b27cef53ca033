//! The eframe root viewport as a [`WindowHandle`].
//!
//! The state machine runs inside `App::update`, where eframe only accepts
//! viewport commands for later. Handles therefore record calls into a
//! shared queue and answer queries from an optimistic copy of the window
//! state; [`ViewportBridge::flush`] turns the queue into
//! [`egui::ViewportCommand`]s and [`ViewportBridge::sync`] folds what
//! the OS actually did back in, reporting user moves and resizes.
//!
//! eframe owns a single native window, so recreating the window for a
//! mode switch re-dresses that same viewport. Handles from before the
//! switch are cut off by an epoch counter.

use crate::shell::{Point, Rect, ShellEvent, Size, WindowFactory, WindowHandle, WindowOptions};
use eframe::egui;
use std::cell::RefCell;
use std::rc::Rc;

/// Observed geometry may drift by a pixel through logical rounding.
const GEOMETRY_SLOP: i32 = 1;

#[derive(Debug, Clone, Copy, PartialEq)]
enum WindowCommand {
    Show,
    Hide,
    Focus,
    Move(Point),
    Resize(Size),
    AlwaysOnTop(bool),
    Fullscreen(bool),
    AllWorkspaces(bool),
    SkipTaskbar(bool),
    Dress(WindowOptions),
}

#[derive(Debug, Clone, Copy, Default)]
struct WindowState {
    visible: bool,
    position: Point,
    size: Size,
    on_top: bool,
    fullscreen: bool,
    focused: bool,
}

#[derive(Debug)]
struct Shared {
    epoch: u64,
    state: WindowState,
    pending: Vec<WindowCommand>,
    /// Physical pixels per logical point
    ppp: f32,
    /// What the OS reported last frame, to tell fresh changes from lag
    observed_size: Option<Size>,
    observed_position: Option<Point>,
}

impl Shared {
    fn push(&mut self, command: WindowCommand) {
        self.pending.push(command);
    }
}

/// Connects shell window handles to the eframe root viewport.
#[derive(Clone)]
pub struct ViewportBridge {
    shared: Rc<RefCell<Shared>>,
}

impl ViewportBridge {
    /// `initial` is the geometry the native window was created with.
    pub fn new(initial: Rect, ppp: f32) -> Self {
        let state = WindowState {
            position: initial.position(),
            size: initial.size(),
            ..Default::default()
        };
        Self {
            shared: Rc::new(RefCell::new(Shared {
                epoch: 0,
                state,
                pending: Vec::new(),
                ppp: sane_ppp(ppp),
                observed_size: None,
                observed_position: None,
            })),
        }
    }

    pub fn factory(&self) -> ViewportFactory {
        ViewportFactory {
            shared: Rc::clone(&self.shared),
        }
    }

    /// Current outer bounds in physical pixels.
    pub fn bounds(&self) -> Rect {
        let shared = self.shared.borrow();
        Rect::from_parts(shared.state.position, shared.state.size)
    }

    pub fn pixels_per_point(&self) -> f32 {
        self.shared.borrow().ppp
    }

    /// Fold the OS view of the window back in and report what the user
    /// did to it since the last frame.
    pub fn sync(&self, ctx: &egui::Context) -> Vec<ShellEvent> {
        let info = ctx.input(|i| i.viewport().clone());
        let mut shared = self.shared.borrow_mut();
        let mut events = Vec::new();

        if let Some(ppp) = info.native_pixels_per_point {
            shared.ppp = sane_ppp(ppp);
        }
        let ppp = shared.ppp;

        if info.close_requested() {
            events.push(ShellEvent::CloseRequested);
        }

        // Geometry of a hidden window is whatever we last asked for.
        if !shared.state.visible {
            return events;
        }

        // A report that differs from the last one but not from what was
        // commanded is the OS catching up; anything else is the user.
        if let Some(inner) = info.inner_rect {
            let size = Size::new(
                (inner.width() * ppp).round() as i32,
                (inner.height() * ppp).round() as i32,
            );
            let fresh = shared.observed_size.is_some_and(|last| !near(size, last));
            if size.width > 0 && size.height > 0 {
                if fresh && !near(size, shared.state.size) {
                    shared.state.size = size;
                    events.push(ShellEvent::WindowResized);
                }
                shared.observed_size = Some(size);
            }
        }

        if let Some(outer) = info.outer_rect {
            let position = Point::new(
                (outer.min.x * ppp).round() as i32,
                (outer.min.y * ppp).round() as i32,
            );
            let fresh = shared
                .observed_position
                .is_some_and(|last| !near_point(position, last));
            if fresh && !near_point(position, shared.state.position) {
                shared.state.position = position;
                events.push(ShellEvent::WindowMoved);
            }
            shared.observed_position = Some(position);
        }

        if let Some(focused) = info.focused {
            if shared.state.focused && !focused {
                events.push(ShellEvent::WindowBlurred);
            }
            shared.state.focused = focused;
        }

        events
    }

    /// Send everything the handles asked for since the last flush.
    pub fn flush(&self, ctx: &egui::Context, frame: &eframe::Frame) {
        let (commands, ppp) = {
            let mut shared = self.shared.borrow_mut();
            (std::mem::take(&mut shared.pending), shared.ppp)
        };

        for command in commands {
            tracing::trace!(?command, "viewport command");
            match command {
                WindowCommand::Show => ctx.send_viewport_cmd(egui::ViewportCommand::Visible(true)),
                WindowCommand::Hide => ctx.send_viewport_cmd(egui::ViewportCommand::Visible(false)),
                WindowCommand::Focus => ctx.send_viewport_cmd(egui::ViewportCommand::Focus),
                WindowCommand::Move(position) => ctx.send_viewport_cmd(
                    egui::ViewportCommand::OuterPosition(egui::pos2(
                        position.x as f32 / ppp,
                        position.y as f32 / ppp,
                    )),
                ),
                WindowCommand::Resize(size) => {
                    ctx.send_viewport_cmd(egui::ViewportCommand::InnerSize(to_logical(size, ppp)))
                }
                WindowCommand::AlwaysOnTop(on_top) => {
                    let level = if on_top {
                        egui::WindowLevel::AlwaysOnTop
                    } else {
                        egui::WindowLevel::Normal
                    };
                    ctx.send_viewport_cmd(egui::ViewportCommand::WindowLevel(level));
                }
                WindowCommand::Fullscreen(fullscreen) => {
                    ctx.send_viewport_cmd(egui::ViewportCommand::Fullscreen(fullscreen))
                }
                // winit has no virtual-desktop control; a shown window
                // already lands on the active desktop.
                WindowCommand::AllWorkspaces(_) => {}
                WindowCommand::SkipTaskbar(skip) => {
                    crate::platform::window::set_skip_taskbar(frame, skip)
                }
                WindowCommand::Dress(options) => {
                    ctx.send_viewport_cmd(egui::ViewportCommand::Decorations(options.decorated));
                    ctx.send_viewport_cmd(egui::ViewportCommand::Resizable(true));
                    ctx.send_viewport_cmd(egui::ViewportCommand::MinInnerSize(to_logical(
                        options.min_size,
                        ppp,
                    )));
                    ctx.send_viewport_cmd(egui::ViewportCommand::InnerSize(to_logical(
                        options.size,
                        ppp,
                    )));
                }
            }
        }
    }

    #[cfg(test)]
    fn take_pending(&self) -> Vec<WindowCommand> {
        std::mem::take(&mut self.shared.borrow_mut().pending)
    }
}

/// Hands out a fresh handle for each window the shell creates.
pub struct ViewportFactory {
    shared: Rc<RefCell<Shared>>,
}

impl WindowFactory for ViewportFactory {
    fn create(&mut self, options: WindowOptions) -> Box<dyn WindowHandle> {
        let epoch = {
            let mut shared = self.shared.borrow_mut();
            shared.epoch += 1;
            shared.state.size = options.size;
            shared.state.fullscreen = false;
            shared.push(WindowCommand::Dress(options));
            shared.epoch
        };
        tracing::debug!(epoch, mode = ?options.mode, decorated = options.decorated, "window created");

        Box::new(ViewportWindow {
            shared: Rc::clone(&self.shared),
            epoch,
            destroyed: false,
        })
    }
}

/// One incarnation of the chat window.
pub struct ViewportWindow {
    shared: Rc<RefCell<Shared>>,
    epoch: u64,
    destroyed: bool,
}

impl ViewportWindow {
    fn live(&self) -> bool {
        !self.destroyed && self.shared.borrow().epoch == self.epoch
    }

    fn state(&self) -> WindowState {
        if self.live() {
            self.shared.borrow().state
        } else {
            WindowState::default()
        }
    }

    fn apply(&mut self, command: WindowCommand, update: impl FnOnce(&mut WindowState)) {
        if !self.live() {
            tracing::trace!(?command, "ignoring call on a replaced window");
            return;
        }
        let mut shared = self.shared.borrow_mut();
        update(&mut shared.state);
        shared.push(command);
    }
}

impl WindowHandle for ViewportWindow {
    fn show(&mut self) {
        self.apply(WindowCommand::Show, |s| s.visible = true);
    }

    fn hide(&mut self) {
        self.apply(WindowCommand::Hide, |s| {
            s.visible = false;
            s.focused = false;
        });
    }

    fn focus(&mut self) {
        self.apply(WindowCommand::Focus, |_| {});
    }

    fn is_visible(&self) -> bool {
        self.state().visible
    }

    fn bounds(&self) -> Rect {
        let state = self.state();
        Rect::from_parts(state.position, state.size)
    }

    fn set_position(&mut self, position: Point) {
        self.apply(WindowCommand::Move(position), |s| s.position = position);
    }

    fn set_size(&mut self, size: Size) {
        self.apply(WindowCommand::Resize(size), |s| s.size = size);
    }

    fn set_always_on_top(&mut self, on_top: bool) {
        self.apply(WindowCommand::AlwaysOnTop(on_top), |s| s.on_top = on_top);
    }

    fn is_always_on_top(&self) -> bool {
        self.state().on_top
    }

    fn set_fullscreen(&mut self, fullscreen: bool) {
        self.apply(WindowCommand::Fullscreen(fullscreen), |s| {
            s.fullscreen = fullscreen
        });
    }

    fn is_fullscreen(&self) -> bool {
        self.state().fullscreen
    }

    fn set_visible_on_all_workspaces(&mut self, visible: bool) {
        self.apply(WindowCommand::AllWorkspaces(visible), |_| {});
    }

    fn set_skip_taskbar(&mut self, skip: bool) {
        self.apply(WindowCommand::SkipTaskbar(skip), |_| {});
    }

    fn destroy(&mut self) {
        if self.live() {
            let mut shared = self.shared.borrow_mut();
            shared.state.visible = false;
            shared.state.focused = false;
            shared.push(WindowCommand::Hide);
        }
        self.destroyed = true;
    }
}

fn sane_ppp(ppp: f32) -> f32 {
    if ppp.is_finite() && ppp > 0.0 {
        ppp
    } else {
        1.0
    }
}

fn to_logical(size: Size, ppp: f32) -> egui::Vec2 {
    egui::vec2(size.width as f32 / ppp, size.height as f32 / ppp)
}

fn near(a: Size, b: Size) -> bool {
    (a.width - b.width).abs() <= GEOMETRY_SLOP && (a.height - b.height).abs() <= GEOMETRY_SLOP
}

fn near_point(a: Point, b: Point) -> bool {
    (a.x - b.x).abs() <= GEOMETRY_SLOP && (a.y - b.y).abs() <= GEOMETRY_SLOP
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::WindowMode;

    fn options() -> WindowOptions {
        WindowOptions {
            mode: WindowMode::Attached,
            size: Size::new(420, 460),
            min_size: Size::new(420, 460),
            decorated: false,
        }
    }

    #[test]
    fn test_handle_answers_from_optimistic_state() {
        let bridge = ViewportBridge::new(Rect::new(0, 0, 420, 460), 1.0);
        let mut window = bridge.factory().create(options());

        window.set_position(Point::new(1500, 580));
        window.show();
        window.set_always_on_top(true);

        assert!(window.is_visible());
        assert!(window.is_always_on_top());
        assert_eq!(window.bounds(), Rect::new(1500, 580, 420, 460));
        assert_eq!(bridge.bounds(), Rect::new(1500, 580, 420, 460));

        let pending = bridge.take_pending();
        assert_eq!(pending[0], WindowCommand::Dress(options()));
        assert_eq!(pending[1], WindowCommand::Move(Point::new(1500, 580)));
        assert_eq!(pending[2], WindowCommand::Show);
    }

    #[test]
    fn test_replaced_window_goes_inert() {
        let bridge = ViewportBridge::new(Rect::new(0, 0, 420, 460), 1.0);
        let mut factory = bridge.factory();

        let mut old = factory.create(options());
        old.show();
        old.destroy();
        let mut new = factory.create(options());
        bridge.take_pending();

        old.show();
        old.set_position(Point::new(5, 5));
        assert!(bridge.take_pending().is_empty());
        assert!(!old.is_visible());
        assert!(!new.is_visible());

        new.show();
        assert!(new.is_visible());
    }

    #[test]
    fn test_stale_epoch_without_destroy_is_ignored() {
        let bridge = ViewportBridge::new(Rect::new(0, 0, 420, 460), 1.0);
        let mut factory = bridge.factory();

        let mut first = factory.create(options());
        let _second = factory.create(options());
        bridge.take_pending();

        first.hide();
        assert!(bridge.take_pending().is_empty());
    }
}
