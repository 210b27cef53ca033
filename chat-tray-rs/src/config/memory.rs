use super::{ConfigError, ConfigKey, ConfigStore, ConfigValue};
use std::collections::BTreeMap;

/// Non-persistent store. Used in tests and when no durable backend opens.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: BTreeMap<ConfigKey, ConfigValue>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style seed for a value.
    pub fn with(mut self, key: ConfigKey, value: impl Into<ConfigValue>) -> Self {
        self.values.insert(key, value.into());
        self
    }
}

impl ConfigStore for MemoryStore {
    fn get(&self, key: ConfigKey) -> Option<ConfigValue> {
        self.values.get(&key).copied()
    }

    fn set(&mut self, key: ConfigKey, value: ConfigValue) -> Result<(), ConfigError> {
        self.values.insert(key, value);
        Ok(())
    }

    fn delete(&mut self, key: ConfigKey) -> Result<(), ConfigError> {
        self.values.remove(&key);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), ConfigError> {
        self.values.clear();
        Ok(())
    }
}
