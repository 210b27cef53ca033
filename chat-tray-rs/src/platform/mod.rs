//! Platform adapters.
//!
//! Capability switches, preference storage, the login item, global
//! shortcuts, screen queries, icons and the few native window calls eframe
//! does not cover.

pub mod autostart;
pub mod capabilities;
pub mod hotkey;
pub mod icons;
#[cfg(windows)]
pub mod registry;
pub mod screen;
pub mod window;

pub use autostart::{AutoStart, AutoStartError};
pub use capabilities::PlatformCapabilities;
pub use hotkey::{GlobalHotkeys, Hotkey, HotkeyError};
#[cfg(windows)]
pub use registry::RegistryStore;
#[cfg(windows)]
pub use screen::Win32Screen;
pub use screen::TrackedScreen;
