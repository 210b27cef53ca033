//! JSON file preferences.
//!
//! The file is a flat JSON object keyed by preference name. Unknown keys
//! are carried through untouched so older and newer builds can share it.

use super::{ConfigError, ConfigKey, ConfigStore, ConfigValue};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// File-backed preference store.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: Map<String, Value>,
}

impl JsonFileStore {
    pub const FILE_NAME: &'static str = "config.json";

    /// Open the store at `path`, starting empty if the file does not exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();

        let values = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => Map::new(),
            Ok(text) => serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.display().to_string(),
                source,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Map::new(),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.display().to_string(),
                    source,
                })
            }
        };

        tracing::debug!(path = %path.display(), entries = values.len(), "opened config file");
        Ok(Self { path, values })
    }

    /// Open `config.json` inside `dir`, creating the directory if needed.
    pub fn open_in(dir: &Path) -> Result<Self, ConfigError> {
        fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.display().to_string(),
            source,
        })?;
        Self::open(dir.join(Self::FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the whole map via a sibling temp file.
    fn flush(&self) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: self.path.display().to_string(),
            source,
        };

        let text = serde_json::to_string_pretty(&self.values)
            .map_err(|source| ConfigError::Serialize { key: "*", source })?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, text).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)
    }
}

impl ConfigStore for JsonFileStore {
    fn get(&self, key: ConfigKey) -> Option<ConfigValue> {
        let raw = self.values.get(key.as_str())?;
        serde_json::from_value(raw.clone()).ok()
    }

    fn set(&mut self, key: ConfigKey, value: ConfigValue) -> Result<(), ConfigError> {
        let raw = serde_json::to_value(value).map_err(|source| ConfigError::Serialize {
            key: key.as_str(),
            source,
        })?;
        self.values.insert(key.as_str().to_string(), raw);
        self.flush()
    }

    fn delete(&mut self, key: ConfigKey) -> Result<(), ConfigError> {
        if self.values.remove(key.as_str()).is_some() {
            self.flush()?;
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<(), ConfigError> {
        self.values.clear();
        self.flush()
    }
}
