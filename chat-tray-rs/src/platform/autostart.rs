//! "Start at Login" toggle.

use thiserror::Error;

/// Auto-start error types.
#[derive(Debug, Error)]
pub enum AutoStartError {
    #[error("Start at login is not supported on this platform")]
    Unsupported,

    #[error("Failed to update login item: {0}")]
    UpdateFailed(String),
}

/// Login-item registration for the running executable.
#[derive(Debug, Clone)]
pub struct AutoStart {
    app_name: String,
}

impl AutoStart {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
        }
    }

    pub fn is_supported(&self) -> bool {
        cfg!(windows)
    }

    /// Current state. Probe failures count as disabled.
    pub fn is_enabled(&self) -> bool {
        match self.query() {
            Ok(enabled) => enabled,
            Err(e) => {
                tracing::warn!("auto-start check failed: {e}");
                false
            }
        }
    }

    pub fn set_enabled(&self, enabled: bool) -> Result<(), AutoStartError> {
        #[cfg(windows)]
        {
            super::registry::set_startup_enabled(&self.app_name, enabled)
                .map_err(AutoStartError::UpdateFailed)?;
            tracing::info!(enabled, "start at login updated");
            Ok(())
        }

        #[cfg(not(windows))]
        {
            let _ = enabled;
            Err(AutoStartError::Unsupported)
        }
    }

    /// Flip the current state and return the new one.
    pub fn toggle(&self) -> Result<bool, AutoStartError> {
        let enabled = !self.is_enabled();
        self.set_enabled(enabled)?;
        Ok(enabled)
    }

    fn query(&self) -> Result<bool, AutoStartError> {
        #[cfg(windows)]
        {
            Ok(super::registry::is_startup_enabled(&self.app_name))
        }

        #[cfg(not(windows))]
        {
            Err(AutoStartError::Unsupported)
        }
    }
}
