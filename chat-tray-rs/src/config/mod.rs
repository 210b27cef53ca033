//! Durable user preferences.
//!
//! Preferences are a small fixed set of keys holding either a flag or an
//! integer pair. Stores keep every value in memory and write through to
//! their backing storage on each mutation.

mod file;
mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Preference keys, named as they appear in storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConfigKey {
    /// Window is a free-floating standard window rather than tray-anchored
    DetachedMode,
    /// Keep the window above other windows
    StayOnTop,
    /// Window was last left in fullscreen
    FullScreen,
    /// Hovering the tray icon does not peek the window
    DisableHover,
    /// The global show/hide shortcut is registered
    ShortcutEnabled,
    /// Automatic update checks are allowed
    AutoUpdate,
    /// Attached window size
    WindowSize,
    /// Detached window size
    WindowSizeDetached,
    /// Detached window position
    WindowPosition,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 9] = [
        ConfigKey::DetachedMode,
        ConfigKey::StayOnTop,
        ConfigKey::FullScreen,
        ConfigKey::DisableHover,
        ConfigKey::ShortcutEnabled,
        ConfigKey::AutoUpdate,
        ConfigKey::WindowSize,
        ConfigKey::WindowSizeDetached,
        ConfigKey::WindowPosition,
    ];

    /// Keys dropped by "Reset Window Layout".
    pub const WINDOW_LAYOUT: [ConfigKey; 5] = [
        ConfigKey::WindowSizeDetached,
        ConfigKey::WindowSize,
        ConfigKey::WindowPosition,
        ConfigKey::FullScreen,
        ConfigKey::DetachedMode,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigKey::DetachedMode => "detachedMode",
            ConfigKey::StayOnTop => "stayOnTop",
            ConfigKey::FullScreen => "fullScreen",
            ConfigKey::DisableHover => "disableHover",
            ConfigKey::ShortcutEnabled => "shortcutEnabled",
            ConfigKey::AutoUpdate => "autoUpdate",
            ConfigKey::WindowSize => "windowSize",
            ConfigKey::WindowSizeDetached => "windowSizeDetached",
            ConfigKey::WindowPosition => "windowPosition",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == name)
    }
}

/// A stored preference value. Serialized as a bare JSON `true`/`false` or
/// a two-element array such as `[420, 460]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Flag(bool),
    Pair([i32; 2]),
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        ConfigValue::Flag(value)
    }
}

impl From<[i32; 2]> for ConfigValue {
    fn from(value: [i32; 2]) -> Self {
        ConfigValue::Pair(value)
    }
}

/// Configuration store error types.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to access config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize preference {key}: {source}")]
    Serialize {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to access registry: {0}")]
    RegistryAccess(String),

    #[error("Failed to write preference: {key}")]
    WriteFailed { key: &'static str },
}

/// Synchronous, durable key/value preference storage.
pub trait ConfigStore {
    fn get(&self, key: ConfigKey) -> Option<ConfigValue>;

    fn set(&mut self, key: ConfigKey, value: ConfigValue) -> Result<(), ConfigError>;

    fn delete(&mut self, key: ConfigKey) -> Result<(), ConfigError>;

    /// Remove every preference.
    fn clear(&mut self) -> Result<(), ConfigError>;

    fn has(&self, key: ConfigKey) -> bool {
        self.get(key).is_some()
    }

    /// Boolean preference; absent or non-flag values read as `false`.
    fn flag(&self, key: ConfigKey) -> bool {
        matches!(self.get(key), Some(ConfigValue::Flag(true)))
    }

    /// Integer-pair preference (sizes and positions).
    fn pair(&self, key: ConfigKey) -> Option<[i32; 2]> {
        match self.get(key) {
            Some(ConfigValue::Pair(pair)) => Some(pair),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_names_parse_back() {
        for key in ConfigKey::ALL {
            assert_eq!(ConfigKey::parse(key.as_str()), Some(key));
        }
        assert_eq!(ConfigKey::parse("currentInstance"), None);
    }

    #[test]
    fn test_value_json_shape() {
        assert_eq!(serde_json::to_string(&ConfigValue::Flag(true)).unwrap(), "true");
        assert_eq!(
            serde_json::to_string(&ConfigValue::Pair([420, 460])).unwrap(),
            "[420,460]"
        );
        assert_eq!(
            serde_json::from_str::<ConfigValue>("[-1280, 40]").unwrap(),
            ConfigValue::Pair([-1280, 40])
        );
    }

    #[test]
    fn test_typed_helpers_ignore_mismatched_values() {
        let mut store = MemoryStore::new();
        store.set(ConfigKey::StayOnTop, [1, 2].into()).unwrap();
        store.set(ConfigKey::WindowSize, true.into()).unwrap();

        assert!(!store.flag(ConfigKey::StayOnTop));
        assert_eq!(store.pair(ConfigKey::WindowSize), None);
        assert!(store.has(ConfigKey::WindowSize));
        assert!(!store.flag(ConfigKey::DisableHover));
    }
}
