//! # mevdash-settings
//!
//! Configuration management with layered sources for the dashboard hub.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults** — [`MevdashSettings::default()`]
//! 2. **User file** — `~/.mevdash/settings.json` (deep-merged over defaults)
//! 3. **Environment variables** — `MEVDASH_*` overrides (highest priority)

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{deep_merge, load_settings, load_settings_from_path, settings_path};
pub use types::*;

use std::sync::OnceLock;

/// Global settings singleton, initialized on first access via
/// [`get_settings`].
static SETTINGS: OnceLock<MevdashSettings> = OnceLock::new();

/// Get the global settings instance.
///
/// On first call, loads settings from `~/.mevdash/settings.json` with env
/// var overrides. On subsequent calls, returns the cached value. If loading
/// fails, returns compiled defaults.
pub fn get_settings() -> &'static MevdashSettings {
    SETTINGS.get_or_init(|| load_settings().unwrap_or_default())
}

/// Initialize the global settings with a specific value.
///
/// # Errors
///
/// Returns the provided settings back if the global was already initialized.
#[allow(clippy::result_large_err)]
pub fn init_settings(settings: MevdashSettings) -> std::result::Result<(), MevdashSettings> {
    SETTINGS.set(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn re_exports_work() {
        let _settings = MevdashSettings::default();
        let _path = settings_path();
    }

    #[test]
    fn deep_merge_re_exported() {
        let a = serde_json::json!({"x": 1});
        let b = serde_json::json!({"y": 2});
        let merged = deep_merge(a, b);
        assert_eq!(merged["x"], 1);
        assert_eq!(merged["y"], 2);
    }

    #[test]
    fn default_settings_are_valid() {
        let settings = MevdashSettings::default();
        assert_eq!(settings.version, "0.1.0");
        assert_eq!(settings.server.port, 8000);
        assert_eq!(settings.hub.send_timeout_ms, 5_000);
        assert_eq!(settings.hub.session_queue_capacity, 256);
        assert_eq!(settings.logging.level, LogLevel::Info);
    }
}
