use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::capabilities::{HttpError, ValidatedUrl, MAX_TIMEOUT_MS};
use crate::DEFAULT_TOAST_DURATION_MS;

pub const DEFAULT_ORIGIN: &str = "https://laptop";
pub const DEFAULT_CALLBACK_PATH: &str = "/triggerServerCallback";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse panel config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("callback_path must start with '/': {0}")]
    CallbackPath(String),

    #[error("request_timeout_ms must be within 1..={MAX_TIMEOUT_MS}, got {0}")]
    Timeout(u64),

    #[error("invalid endpoint: {0}")]
    Endpoint(#[from] HttpError),
}

/// Settings supplied by the shell. Every field has a default so an empty
/// JSON object is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    pub origin: String,
    pub callback_path: String,
    pub request_timeout_ms: u64,
    pub toast_duration_ms: u64,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            origin: DEFAULT_ORIGIN.into(),
            callback_path: DEFAULT_CALLBACK_PATH.into(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            toast_duration_ms: DEFAULT_TOAST_DURATION_MS,
        }
    }
}

impl PanelConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.callback_path.starts_with('/') {
            return Err(ConfigError::CallbackPath(self.callback_path.clone()));
        }
        if self.request_timeout_ms == 0 || self.request_timeout_ms > MAX_TIMEOUT_MS {
            return Err(ConfigError::Timeout(self.request_timeout_ms));
        }
        self.endpoint()?;
        Ok(())
    }

    /// The same-origin URL every remote call is posted to.
    pub fn endpoint(&self) -> Result<ValidatedUrl, HttpError> {
        ValidatedUrl::new(format!(
            "{}{}",
            self.origin.trim_end_matches('/'),
            self.callback_path
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_uses_defaults() {
        let config = PanelConfig::from_json_str("{}").unwrap();
        assert_eq!(config, PanelConfig::default());
        assert_eq!(
            config.endpoint().unwrap().as_str(),
            "https://laptop/triggerServerCallback"
        );
    }

    #[test]
    fn test_origin_trailing_slash() {
        let config =
            PanelConfig::from_json_str(r#"{"origin": "http://127.0.0.1:8080/"}"#).unwrap();
        assert_eq!(
            config.endpoint().unwrap().as_str(),
            "http://127.0.0.1:8080/triggerServerCallback"
        );
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            PanelConfig::from_json_str(r#"{"callback_path": "nope"}"#),
            Err(ConfigError::CallbackPath(_))
        ));
        assert!(matches!(
            PanelConfig::from_json_str(r#"{"request_timeout_ms": 0}"#),
            Err(ConfigError::Timeout(0))
        ));
        assert!(matches!(
            PanelConfig::from_json_str(r#"{"origin": "ftp://laptop"}"#),
            Err(ConfigError::Endpoint(_))
        ));
        assert!(matches!(
            PanelConfig::from_json_str("not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}
