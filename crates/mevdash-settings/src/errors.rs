//! Settings error types.

use thiserror::Error;

/// Errors from loading or validating settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Settings file could not be read.
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    /// Settings file contains invalid JSON or fails schema validation.
    #[error("failed to parse settings: {0}")]
    Json(#[from] serde_json::Error),

    /// A setting has an invalid value.
    #[error("invalid setting value: {0}")]
    InvalidValue(String),
}

/// Convenience alias for settings operations.
pub type Result<T> = std::result::Result<T, SettingsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_display() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = SettingsError::from(io);
        assert!(err.to_string().contains("failed to read settings file"));
    }

    #[test]
    fn json_error_display() {
        let json_err = serde_json::from_str::<serde_json::Value>("{bad").unwrap_err();
        let err = SettingsError::from(json_err);
        assert!(err.to_string().contains("failed to parse settings"));
    }

    #[test]
    fn invalid_value_display() {
        let err = SettingsError::InvalidValue("port out of range".to_string());
        assert_eq!(err.to_string(), "invalid setting value: port out of range");
    }
}
