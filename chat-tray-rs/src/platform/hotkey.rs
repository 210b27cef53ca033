//! System-wide keyboard shortcuts.
//!
//! Hotkeys registered without a window belong to the thread that registered
//! them, so one listener thread owns every registration and runs a message
//! loop. The app sends it register/unregister requests and drains the
//! hotkeys it reports.

use crate::shell::ShellEvent;
use std::sync::mpsc::Receiver;
use thiserror::Error;

/// The shortcuts the app knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hotkey {
    /// Ctrl+Alt+C, only while `shortcutEnabled` is set
    ToggleWindow,
    /// Ctrl+Alt+Enter, always registered
    ToggleFullscreen,
}

impl Hotkey {
    pub const ALL: [Hotkey; 2] = [Hotkey::ToggleWindow, Hotkey::ToggleFullscreen];

    /// Registration id passed to the OS.
    pub fn id(self) -> i32 {
        match self {
            Hotkey::ToggleWindow => 1,
            Hotkey::ToggleFullscreen => 2,
        }
    }

    pub fn from_id(id: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|hotkey| hotkey.id() == id)
    }

    /// Virtual-key code of the non-modifier key.
    pub fn virtual_key(self) -> u32 {
        match self {
            Hotkey::ToggleWindow => 0x43,
            Hotkey::ToggleFullscreen => 0x0D,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Hotkey::ToggleWindow => "Ctrl+Alt+C",
            Hotkey::ToggleFullscreen => "Ctrl+Alt+Enter",
        }
    }

    pub fn shell_event(self) -> ShellEvent {
        match self {
            Hotkey::ToggleWindow => ShellEvent::ToggleVisibility,
            Hotkey::ToggleFullscreen => ShellEvent::ToggleFullscreen,
        }
    }

    /// Hotkeys to register at startup.
    pub fn startup_set(shortcut_enabled: bool) -> Vec<Hotkey> {
        Self::ALL
            .into_iter()
            .filter(|hotkey| shortcut_enabled || *hotkey != Hotkey::ToggleWindow)
            .collect()
    }
}

/// Hotkey error types.
#[derive(Debug, Error)]
pub enum HotkeyError {
    #[error("Global shortcuts are not supported on this platform")]
    Unsupported,

    #[error("Failed to start the shortcut listener: {0}")]
    ListenerFailed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Request {
    Register(Hotkey),
    Unregister(Hotkey),
    Stop,
}

/// Handle on the hotkey listener thread.
pub struct GlobalHotkeys {
    events: Receiver<Hotkey>,
    #[cfg(windows)]
    listener: win32::Listener,
}

impl GlobalHotkeys {
    /// Start the listener. `wake` runs after every reported hotkey.
    #[cfg(windows)]
    pub fn start(wake: impl Fn() + Send + 'static) -> Result<Self, HotkeyError> {
        let (sender, events) = std::sync::mpsc::channel();
        let listener =
            win32::Listener::spawn(sender, Box::new(wake)).map_err(HotkeyError::ListenerFailed)?;
        tracing::debug!("hotkey listener started");
        Ok(Self { events, listener })
    }

    #[cfg(not(windows))]
    pub fn start(wake: impl Fn() + Send + 'static) -> Result<Self, HotkeyError> {
        let _ = wake;
        Err(HotkeyError::Unsupported)
    }

    pub fn set_registered(&self, hotkey: Hotkey, registered: bool) {
        let request = if registered {
            Request::Register(hotkey)
        } else {
            Request::Unregister(hotkey)
        };
        self.request(request);
    }

    /// Drain the hotkeys pressed since the last call.
    pub fn poll(&self) -> Vec<ShellEvent> {
        self.events.try_iter().map(Hotkey::shell_event).collect()
    }

    #[cfg(windows)]
    fn request(&self, request: Request) {
        if !self.listener.send(request) {
            tracing::warn!(?request, "hotkey listener is gone");
        }
    }

    #[cfg(not(windows))]
    fn request(&self, request: Request) {
        tracing::trace!(?request, "no hotkey listener on this platform");
    }
}

#[cfg(windows)]
mod win32 {
    use super::{Hotkey, Request};
    use std::sync::mpsc::{channel, Receiver, Sender};
    use std::thread::JoinHandle;
    use windows::Win32::Foundation::{LPARAM, WPARAM};
    use windows::Win32::System::Threading::GetCurrentThreadId;
    use windows::Win32::UI::Input::KeyboardAndMouse::{
        RegisterHotKey, UnregisterHotKey, MOD_ALT, MOD_CONTROL, MOD_NOREPEAT,
    };
    use windows::Win32::UI::WindowsAndMessaging::{
        GetMessageW, PeekMessageW, PostThreadMessageW, MSG, PM_NOREMOVE, WM_APP, WM_HOTKEY,
    };

    /// Posted to the listener when requests are queued.
    const WM_REQUEST: u32 = WM_APP + 1;

    pub(super) struct Listener {
        thread_id: u32,
        requests: Sender<Request>,
        handle: Option<JoinHandle<()>>,
    }

    impl Listener {
        pub(super) fn spawn(
            events: Sender<Hotkey>,
            wake: Box<dyn Fn() + Send>,
        ) -> Result<Self, String> {
            let (requests, request_rx) = channel();
            let (ready_tx, ready_rx) = channel();

            let handle = std::thread::Builder::new()
                .name("hotkeys".into())
                .spawn(move || {
                    let mut msg = MSG::default();
                    // Creates the thread's message queue before anyone posts to it.
                    unsafe {
                        let _ = PeekMessageW(&mut msg, None, 0, 0, PM_NOREMOVE);
                    }
                    let _ = ready_tx.send(unsafe { GetCurrentThreadId() });
                    run(request_rx, events, wake);
                })
                .map_err(|e| e.to_string())?;

            let thread_id = ready_rx.recv().map_err(|e| e.to_string())?;
            Ok(Self {
                thread_id,
                requests,
                handle: Some(handle),
            })
        }

        /// Queue a request and wake the listener.
        pub(super) fn send(&self, request: Request) -> bool {
            if self.requests.send(request).is_err() {
                return false;
            }
            unsafe { PostThreadMessageW(self.thread_id, WM_REQUEST, WPARAM(0), LPARAM(0)) }
                .is_ok()
        }
    }

    impl Drop for Listener {
        fn drop(&mut self) {
            if self.send(Request::Stop) {
                if let Some(handle) = self.handle.take() {
                    let _ = handle.join();
                }
            }
        }
    }

    fn run(requests: Receiver<Request>, events: Sender<Hotkey>, wake: Box<dyn Fn() + Send>) {
        let mut registered: Vec<Hotkey> = Vec::new();
        let mut msg = MSG::default();

        loop {
            // 0 is WM_QUIT, -1 a failure.
            let status = unsafe { GetMessageW(&mut msg, None, 0, 0) };
            if status.0 <= 0 {
                break;
            }

            match msg.message {
                WM_HOTKEY => {
                    if let Some(hotkey) = Hotkey::from_id(msg.wParam.0 as i32) {
                        tracing::debug!(hotkey = hotkey.label(), "global shortcut pressed");
                        if events.send(hotkey).is_err() {
                            break;
                        }
                        wake();
                    }
                }
                WM_REQUEST => {
                    for request in requests.try_iter() {
                        match request {
                            Request::Register(hotkey) => {
                                if !registered.contains(&hotkey) && register(hotkey) {
                                    registered.push(hotkey);
                                }
                            }
                            Request::Unregister(hotkey) => {
                                if registered.contains(&hotkey) {
                                    unregister(hotkey);
                                    registered.retain(|h| *h != hotkey);
                                }
                            }
                            Request::Stop => {
                                registered.drain(..).for_each(unregister);
                                return;
                            }
                        }
                    }
                }
                _ => {}
            }
        }

        registered.drain(..).for_each(unregister);
    }

    fn register(hotkey: Hotkey) -> bool {
        let modifiers = MOD_CONTROL | MOD_ALT | MOD_NOREPEAT;

        match unsafe { RegisterHotKey(None, hotkey.id(), modifiers, hotkey.virtual_key()) } {
            Ok(()) => {
                tracing::info!(hotkey = hotkey.label(), "registered global shortcut");
                true
            }
            Err(e) => {
                tracing::error!(hotkey = hotkey.label(), "failed to register global shortcut: {e}");
                false
            }
        }
    }

    fn unregister(hotkey: Hotkey) {
        match unsafe { UnregisterHotKey(None, hotkey.id()) } {
            Ok(()) => tracing::info!(hotkey = hotkey.label(), "unregistered global shortcut"),
            Err(e) => {
                tracing::warn!(hotkey = hotkey.label(), "failed to unregister global shortcut: {e}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_map_back_to_hotkeys() {
        for hotkey in Hotkey::ALL {
            assert_eq!(Hotkey::from_id(hotkey.id()), Some(hotkey));
        }
        assert_eq!(Hotkey::from_id(0), None);
    }

    #[test]
    fn test_hotkeys_drive_window_events() {
        assert_eq!(Hotkey::ToggleWindow.shell_event(), ShellEvent::ToggleVisibility);
        assert_eq!(Hotkey::ToggleFullscreen.shell_event(), ShellEvent::ToggleFullscreen);
    }

    #[test]
    fn test_fullscreen_hotkey_registered_regardless_of_preference() {
        assert_eq!(Hotkey::startup_set(false), vec![Hotkey::ToggleFullscreen]);
        assert_eq!(
            Hotkey::startup_set(true),
            vec![Hotkey::ToggleWindow, Hotkey::ToggleFullscreen]
        );
    }
}
