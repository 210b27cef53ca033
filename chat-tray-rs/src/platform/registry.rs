//! Windows Registry preferences and startup entry.
//!
//! Preferences live under `HKCU\Software\ChatTray`, one REG_SZ value per
//! key holding the JSON-encoded preference. The "Start at Login" entry is
//! a value under the per-user `Run` key.

use crate::config::{ConfigError, ConfigKey, ConfigStore, ConfigValue};
use std::collections::BTreeMap;
use windows::core::PCWSTR;
use windows::Win32::Foundation::ERROR_FILE_NOT_FOUND;
use windows::Win32::System::Registry::{
    RegCloseKey, RegCreateKeyExW, RegDeleteValueW, RegOpenKeyExW, RegQueryValueExW, RegSetValueExW,
    HKEY, HKEY_CURRENT_USER, KEY_READ, KEY_WRITE, REG_CREATE_KEY_DISPOSITION,
    REG_OPTION_NON_VOLATILE, REG_SAM_FLAGS, REG_SZ,
};

const APP_KEY: &str = r"Software\ChatTray";
const RUN_KEY: &str = r"Software\Microsoft\Windows\CurrentVersion\Run";

fn to_wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

/// An open registry key, closed on drop.
struct RegKey(HKEY);

impl RegKey {
    fn open(path: &str, access: REG_SAM_FLAGS) -> Option<Self> {
        let path = to_wide(path);
        let mut hkey = HKEY::default();
        let result = unsafe {
            RegOpenKeyExW(
                HKEY_CURRENT_USER,
                PCWSTR::from_raw(path.as_ptr()),
                0,
                access,
                &mut hkey,
            )
        };
        result.is_ok().then_some(Self(hkey))
    }

    fn create(path: &str) -> Result<Self, ConfigError> {
        let path_wide = to_wide(path);
        let mut hkey = HKEY::default();
        let mut disposition = REG_CREATE_KEY_DISPOSITION::default();
        let result = unsafe {
            RegCreateKeyExW(
                HKEY_CURRENT_USER,
                PCWSTR::from_raw(path_wide.as_ptr()),
                0,
                PCWSTR::null(),
                REG_OPTION_NON_VOLATILE,
                KEY_READ | KEY_WRITE,
                None,
                &mut hkey,
                Some(&mut disposition),
            )
        };

        if result.is_err() {
            return Err(ConfigError::RegistryAccess(format!(
                "Failed to create key {path}: {result:?}"
            )));
        }
        Ok(Self(hkey))
    }

    /// Read a REG_SZ value. `None` if it does not exist.
    fn read_string(&self, name: &str) -> Option<String> {
        let name = to_wide(name);
        let mut data_size = 0u32;

        let result = unsafe {
            RegQueryValueExW(
                self.0,
                PCWSTR::from_raw(name.as_ptr()),
                None,
                None,
                None,
                Some(&mut data_size),
            )
        };
        if result.is_err() || data_size == 0 {
            return None;
        }

        let mut buffer = vec![0u16; (data_size as usize).div_ceil(2)];
        let result = unsafe {
            RegQueryValueExW(
                self.0,
                PCWSTR::from_raw(name.as_ptr()),
                None,
                None,
                Some(buffer.as_mut_ptr() as *mut u8),
                Some(&mut data_size),
            )
        };
        if result.is_err() {
            return None;
        }

        while buffer.last() == Some(&0) {
            buffer.pop();
        }
        Some(String::from_utf16_lossy(&buffer))
    }

    fn write_string(&self, name: &str, value: &str) -> bool {
        let name = to_wide(name);
        let value = to_wide(value);
        let result = unsafe {
            RegSetValueExW(
                self.0,
                PCWSTR::from_raw(name.as_ptr()),
                0,
                REG_SZ,
                Some(std::slice::from_raw_parts(
                    value.as_ptr() as *const u8,
                    value.len() * 2,
                )),
            )
        };
        result.is_ok()
    }

    /// Delete a value; a value that is already gone counts as deleted.
    fn delete_value(&self, name: &str) -> bool {
        let name = to_wide(name);
        let result = unsafe { RegDeleteValueW(self.0, PCWSTR::from_raw(name.as_ptr())) };
        result.is_ok() || result == ERROR_FILE_NOT_FOUND
    }
}

impl Drop for RegKey {
    fn drop(&mut self) {
        unsafe {
            let _ = RegCloseKey(self.0);
        }
    }
}

/// Registry-backed preference store.
pub struct RegistryStore {
    values: BTreeMap<ConfigKey, ConfigValue>,
}

impl RegistryStore {
    /// Load every known preference from the registry.
    pub fn open() -> Result<Self, ConfigError> {
        let key = RegKey::create(APP_KEY)?;

        let mut values = BTreeMap::new();
        for config_key in ConfigKey::ALL {
            let Some(raw) = key.read_string(config_key.as_str()) else {
                continue;
            };
            match serde_json::from_str::<ConfigValue>(&raw) {
                Ok(value) => {
                    values.insert(config_key, value);
                }
                Err(e) => {
                    tracing::warn!(key = config_key.as_str(), %raw, "ignoring unreadable preference: {e}");
                }
            }
        }

        tracing::debug!(entries = values.len(), "loaded preferences from registry");
        Ok(Self { values })
    }
}

impl ConfigStore for RegistryStore {
    fn get(&self, key: ConfigKey) -> Option<ConfigValue> {
        self.values.get(&key).copied()
    }

    fn set(&mut self, key: ConfigKey, value: ConfigValue) -> Result<(), ConfigError> {
        let raw = serde_json::to_string(&value).map_err(|source| ConfigError::Serialize {
            key: key.as_str(),
            source,
        })?;

        let reg = RegKey::create(APP_KEY)?;
        if !reg.write_string(key.as_str(), &raw) {
            return Err(ConfigError::WriteFailed { key: key.as_str() });
        }

        self.values.insert(key, value);
        Ok(())
    }

    fn delete(&mut self, key: ConfigKey) -> Result<(), ConfigError> {
        let reg = RegKey::create(APP_KEY)?;
        if !reg.delete_value(key.as_str()) {
            return Err(ConfigError::WriteFailed { key: key.as_str() });
        }

        self.values.remove(&key);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), ConfigError> {
        for key in ConfigKey::ALL {
            self.delete(key)?;
        }
        Ok(())
    }
}

/// Whether the `Run` key has an entry named `app_name`.
pub fn is_startup_enabled(app_name: &str) -> bool {
    let Some(key) = RegKey::open(RUN_KEY, KEY_READ) else {
        return false;
    };
    key.read_string(app_name).is_some_and(|path| !path.is_empty())
}

/// Add or remove the `Run` key entry pointing at the current executable.
pub fn set_startup_enabled(app_name: &str, enabled: bool) -> Result<(), String> {
    let key = RegKey::open(RUN_KEY, KEY_WRITE).ok_or("Failed to open Run key")?;

    if enabled {
        let exe_path = std::env::current_exe().map_err(|e| e.to_string())?;
        // Quoted so paths with spaces launch correctly.
        let command = format!("\"{}\"", exe_path.display());
        if !key.write_string(app_name, &command) {
            return Err(format!("Failed to write Run entry {app_name}"));
        }
    } else if !key.delete_value(app_name) {
        return Err(format!("Failed to remove Run entry {app_name}"));
    }

    Ok(())
}
