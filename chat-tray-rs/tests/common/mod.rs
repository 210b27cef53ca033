//! Fake desktop for driving the visibility machine.
//!
//! Windows, the tray icon and the cursor share one [`Desk`]; every window
//! call lands in a log the tests can assert on.

#![allow(dead_code)]

use chat_tray_rs::config::{ConfigError, ConfigKey, ConfigStore, ConfigValue, MemoryStore};
use chat_tray_rs::platform::PlatformCapabilities;
use chat_tray_rs::shell::{
    Collaborators, Point, Reaction, Rect, ScreenQuery, ShellEvent, Size, TrayBounds,
    VisibilityMachine, WindowFactory, WindowHandle, WindowOptions,
};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

pub const WORK_AREA: Rect = Rect::new(0, 0, 1920, 1040);
pub const TRAY: Rect = Rect::new(1870, 1010, 40, 30);
pub const TRAY_CENTER: Point = Point::new(1890, 1025);
/// Where a fresh 420x460 window lands next to [`TRAY`].
pub const ANCHORED: Point = Point::new(1500, 580);
pub const FAR_AWAY: Point = Point::new(200, 200);
/// Where the OS first puts a new window.
pub const SPAWN: Point = Point::new(100, 100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Show,
    Hide,
    Focus,
    SetPosition(Point),
    SetSize(Size),
    AlwaysOnTop(bool),
    Fullscreen(bool),
    AllWorkspaces(bool),
    SkipTaskbar(bool),
    Destroy,
}

#[derive(Debug, Clone)]
pub struct FakeWindow {
    pub options: WindowOptions,
    pub visible: bool,
    pub bounds: Rect,
    pub on_top: bool,
    pub fullscreen: bool,
    pub destroyed: bool,
    /// Calls made after `destroy`
    pub calls_after_destroy: usize,
}

#[derive(Debug)]
pub struct DeskState {
    pub cursor: Point,
    pub tray: Rect,
    pub work_area: Rect,
    pub windows: Vec<FakeWindow>,
    pub calls: Vec<(usize, Call)>,
}

/// Shared fake desktop.
#[derive(Clone)]
pub struct Desk(Rc<RefCell<DeskState>>);

impl Desk {
    pub fn new() -> Self {
        Desk(Rc::new(RefCell::new(DeskState {
            cursor: TRAY_CENTER,
            tray: TRAY,
            work_area: WORK_AREA,
            windows: Vec::new(),
            calls: Vec::new(),
        })))
    }

    pub fn move_cursor(&self, point: Point) {
        self.0.borrow_mut().cursor = point;
    }

    pub fn move_tray(&self, tray: Rect) {
        self.0.borrow_mut().tray = tray;
    }

    /// The window currently in use.
    pub fn window(&self) -> FakeWindow {
        self.0
            .borrow()
            .windows
            .last()
            .cloned()
            .expect("no window created")
    }

    pub fn window_at(&self, index: usize) -> FakeWindow {
        self.0.borrow().windows[index].clone()
    }

    pub fn window_count(&self) -> usize {
        self.0.borrow().windows.len()
    }

    /// Resize the current window the way a user dragging its border would.
    pub fn user_resize(&self, size: Size) {
        let mut state = self.0.borrow_mut();
        let window = state.windows.last_mut().expect("no window created");
        window.bounds.width = size.width;
        window.bounds.height = size.height;
    }

    /// Move the current window the way a user dragging it would.
    pub fn user_move(&self, position: Point) {
        let mut state = self.0.borrow_mut();
        let window = state.windows.last_mut().expect("no window created");
        window.bounds.x = position.x;
        window.bounds.y = position.y;
    }

    /// Calls on the current window since the last [`Desk::clear_calls`].
    pub fn calls(&self) -> Vec<Call> {
        let state = self.0.borrow();
        let current = state.windows.len().saturating_sub(1);
        state
            .calls
            .iter()
            .filter(|(index, _)| *index == current)
            .map(|(_, call)| *call)
            .collect()
    }

    pub fn clear_calls(&self) {
        self.0.borrow_mut().calls.clear();
    }
}

struct FakeScreen(Desk);

impl ScreenQuery for FakeScreen {
    fn cursor_position(&self) -> Point {
        self.0 .0.borrow().cursor
    }

    fn work_area_near(&self, _point: Point) -> Rect {
        self.0 .0.borrow().work_area
    }
}

struct FakeTray(Desk);

impl TrayBounds for FakeTray {
    fn bounds(&self) -> Rect {
        self.0 .0.borrow().tray
    }
}

struct FakeFactory(Desk);

impl WindowFactory for FakeFactory {
    fn create(&mut self, options: WindowOptions) -> Box<dyn WindowHandle> {
        let mut state = self.0 .0.borrow_mut();
        state.windows.push(FakeWindow {
            options,
            visible: false,
            bounds: Rect::from_parts(SPAWN, options.size),
            on_top: false,
            fullscreen: false,
            destroyed: false,
            calls_after_destroy: 0,
        });
        Box::new(FakeHandle {
            desk: self.0.clone(),
            index: state.windows.len() - 1,
        })
    }
}

struct FakeHandle {
    desk: Desk,
    index: usize,
}

impl FakeHandle {
    fn record(&mut self, call: Call, apply: impl FnOnce(&mut FakeWindow)) {
        let mut state = self.desk.0.borrow_mut();
        state.calls.push((self.index, call));
        let window = &mut state.windows[self.index];
        if window.destroyed {
            window.calls_after_destroy += 1;
            return;
        }
        apply(window);
    }

    fn read<T>(&self, f: impl FnOnce(&FakeWindow) -> T) -> T {
        f(&self.desk.0.borrow().windows[self.index])
    }
}

impl WindowHandle for FakeHandle {
    fn show(&mut self) {
        self.record(Call::Show, |w| w.visible = true);
    }

    fn hide(&mut self) {
        self.record(Call::Hide, |w| w.visible = false);
    }

    fn focus(&mut self) {
        self.record(Call::Focus, |_| {});
    }

    fn is_visible(&self) -> bool {
        self.read(|w| w.visible)
    }

    fn bounds(&self) -> Rect {
        self.read(|w| w.bounds)
    }

    fn set_position(&mut self, position: Point) {
        self.record(Call::SetPosition(position), |w| {
            w.bounds.x = position.x;
            w.bounds.y = position.y;
        });
    }

    fn set_size(&mut self, size: Size) {
        self.record(Call::SetSize(size), |w| {
            w.bounds.width = size.width;
            w.bounds.height = size.height;
        });
    }

    fn set_always_on_top(&mut self, on_top: bool) {
        self.record(Call::AlwaysOnTop(on_top), |w| w.on_top = on_top);
    }

    fn is_always_on_top(&self) -> bool {
        self.read(|w| w.on_top)
    }

    fn set_fullscreen(&mut self, fullscreen: bool) {
        self.record(Call::Fullscreen(fullscreen), |w| w.fullscreen = fullscreen);
    }

    fn is_fullscreen(&self) -> bool {
        self.read(|w| w.fullscreen)
    }

    fn set_visible_on_all_workspaces(&mut self, visible: bool) {
        self.record(Call::AllWorkspaces(visible), |_| {});
    }

    fn set_skip_taskbar(&mut self, skip: bool) {
        self.record(Call::SkipTaskbar(skip), |_| {});
    }

    fn destroy(&mut self) {
        self.record(Call::Destroy, |w| {
            w.visible = false;
            w.destroyed = true;
        });
    }
}

/// Preference store the test keeps a handle on after the machine takes it.
#[derive(Clone, Default)]
pub struct SharedStore(Rc<RefCell<MemoryStore>>);

impl SharedStore {
    pub fn new(store: MemoryStore) -> Self {
        SharedStore(Rc::new(RefCell::new(store)))
    }

    pub fn flag(&self, key: ConfigKey) -> bool {
        self.0.borrow().flag(key)
    }

    pub fn pair(&self, key: ConfigKey) -> Option<[i32; 2]> {
        self.0.borrow().pair(key)
    }

    pub fn has(&self, key: ConfigKey) -> bool {
        self.0.borrow().has(key)
    }
}

impl ConfigStore for SharedStore {
    fn get(&self, key: ConfigKey) -> Option<ConfigValue> {
        self.0.borrow().get(key)
    }

    fn set(&mut self, key: ConfigKey, value: ConfigValue) -> Result<(), ConfigError> {
        self.0.borrow_mut().set(key, value)
    }

    fn delete(&mut self, key: ConfigKey) -> Result<(), ConfigError> {
        self.0.borrow_mut().delete(key)
    }

    fn clear(&mut self) -> Result<(), ConfigError> {
        self.0.borrow_mut().clear()
    }
}

/// A machine on a fake desk with a millisecond clock.
pub struct Harness {
    pub machine: VisibilityMachine,
    pub desk: Desk,
    pub config: SharedStore,
    start: Instant,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(MemoryStore::new())
    }

    pub fn with_config(store: MemoryStore) -> Self {
        Self::build(SharedStore::new(store), PlatformCapabilities::default())
    }

    pub fn with_capabilities(store: MemoryStore, capabilities: PlatformCapabilities) -> Self {
        Self::build(SharedStore::new(store), capabilities)
    }

    /// Start a machine on an existing store, as a relaunch would.
    pub fn relaunch(config: &SharedStore) -> Self {
        Self::build(config.clone(), PlatformCapabilities::default())
    }

    fn build(config: SharedStore, capabilities: PlatformCapabilities) -> Self {
        let desk = Desk::new();
        let machine = VisibilityMachine::new(
            Collaborators {
                config: Box::new(config.clone()),
                screen: Box::new(FakeScreen(desk.clone())),
                tray: Box::new(FakeTray(desk.clone())),
                windows: Box::new(FakeFactory(desk.clone())),
            },
            capabilities,
        )
        .expect("machine starts");

        Self {
            machine,
            desk,
            config,
            start: Instant::now(),
        }
    }

    pub fn at(&self, ms: u64) -> Instant {
        self.start + Duration::from_millis(ms)
    }

    pub fn send(&mut self, event: ShellEvent, ms: u64) -> Reaction {
        let now = self.at(ms);
        self.machine.handle(event, now).expect("event handled")
    }

    pub fn tick(&mut self, ms: u64) {
        let now = self.at(ms);
        self.machine.tick(now);
    }

    /// Advance in 10 ms steps so repeating timers fire at their own pace.
    pub fn run_until(&mut self, from_ms: u64, to_ms: u64) {
        let mut t = from_ms;
        while t <= to_ms {
            self.tick(t);
            t += 10;
        }
    }
}
