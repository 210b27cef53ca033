//! Chat Tray - Library
//!
//! A tray launcher that keeps a chat window one click (or one hover) away.
//!
//! ## Features
//!
//! - Window anchored to the tray icon, flush against the taskbar
//! - Hover the tray icon to peek at the window; it hides when the cursor leaves
//! - Detached mode: a normal movable, resizable window
//! - Stay on top and fullscreen
//! - Window geometry remembered per mode
//! - Start at login option

pub mod app;
pub mod config;
pub mod logging;
pub mod platform;
pub mod shell;
pub mod ui;

pub use app::ShellApp;
pub use config::{ConfigError, ConfigKey, ConfigStore, ConfigValue, JsonFileStore, MemoryStore};
pub use platform::PlatformCapabilities;
pub use shell::{Reaction, ShellError, ShellEvent, Visibility, VisibilityMachine, WindowMode};
