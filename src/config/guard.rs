use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Message shown when neither the caller nor the submitter supplies one
pub const DEFAULT_MESSAGE: &str = "Loading…";

/// Declarative per-submitter message attribute
pub const DEFAULT_MESSAGE_ATTRIBUTE: &str = "data-loading";

/// Busy indicator placed in front of the message on the submitter's label
pub const DEFAULT_BUSY_INDICATOR: &str =
    r#"<span class="spinner-border spinner-border-sm" role="status" aria-hidden="true"></span>"#;

const ENV_DEFAULT_MESSAGE: &str = "FORMGUARD_DEFAULT_MESSAGE";
const ENV_BUSY_TIMEOUT_MS: &str = "FORMGUARD_BUSY_TIMEOUT_MS";

/// Guard behaviour settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    pub default_message: String,
    pub message_attribute: String,
    pub busy_indicator: String,
    /// Releases a busy cycle automatically after this long; unset keeps it
    /// busy until an explicit release
    pub busy_timeout_ms: Option<u64>,
    pub selectors: Selectors,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            default_message: DEFAULT_MESSAGE.into(),
            message_attribute: DEFAULT_MESSAGE_ATTRIBUTE.into(),
            busy_indicator: DEFAULT_BUSY_INDICATOR.into(),
            busy_timeout_ms: None,
            selectors: Selectors::default(),
        }
    }
}

/// Where the browser binding finds the elements it works with
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Selectors {
    pub overlay_id: String,
    pub message_selector: String,
    pub container_id: String,
    pub row_selector: String,
    pub add_trigger_id: String,
    pub remove_trigger_class: String,
    pub control_selector: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            overlay_id: "loading-overlay".into(),
            message_selector: ".loading-message".into(),
            container_id: "items".into(),
            row_selector: ".sale-line".into(),
            add_trigger_id: "add-line".into(),
            remove_trigger_class: "remove-line".into(),
            control_selector: r#"button, input[type="submit"]"#.into(),
        }
    }
}

impl Selectors {
    fn entries(&self) -> [(&'static str, &str); 7] {
        [
            ("overlay_id", self.overlay_id.as_str()),
            ("message_selector", self.message_selector.as_str()),
            ("container_id", self.container_id.as_str()),
            ("row_selector", self.row_selector.as_str()),
            ("add_trigger_id", self.add_trigger_id.as_str()),
            ("remove_trigger_class", self.remove_trigger_class.as_str()),
            ("control_selector", self.control_selector.as_str()),
        ]
    }
}

#[derive(Debug, Error)]
pub enum GuardConfigError {
    #[error("Failed to read guard configuration from {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Malformed guard configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Default busy message must not be empty")]
    EmptyDefaultMessage,
    #[error("Message attribute name must not be empty")]
    EmptyMessageAttribute,
    #[error("Busy timeout must be greater than zero")]
    ZeroTimeout,
    #[error("Selector `{name}` must not be empty")]
    EmptySelector { name: &'static str },
    #[error("Environment variable {var} has an invalid value: {value:?}")]
    InvalidEnv { var: &'static str, value: String },
}

impl GuardConfig {
    /// Parses and validates a TOML document
    pub fn from_toml_str(raw: &str) -> Result<Self, GuardConfigError> {
        let config: GuardConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a TOML file, applies environment overrides and validates
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GuardConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| GuardConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: GuardConfig = toml::from_str(&raw)?;
        config.apply_env_overrides(|var| std::env::var(var).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults plus environment overrides
    pub fn from_env() -> Result<Self, GuardConfigError> {
        let mut config = Self::default();
        config.apply_env_overrides(|var| std::env::var(var).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Applies overrides resolved through `lookup`
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), GuardConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(message) = lookup(ENV_DEFAULT_MESSAGE) {
            self.default_message = message;
        }

        if let Some(raw) = lookup(ENV_BUSY_TIMEOUT_MS) {
            let trimmed = raw.trim();
            self.busy_timeout_ms = if trimmed.is_empty() {
                None
            } else {
                let parsed = trimmed
                    .parse::<u64>()
                    .map_err(|_| GuardConfigError::InvalidEnv {
                        var: ENV_BUSY_TIMEOUT_MS,
                        value: raw.clone(),
                    })?;
                Some(parsed)
            };
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<(), GuardConfigError> {
        if self.default_message.trim().is_empty() {
            return Err(GuardConfigError::EmptyDefaultMessage);
        }
        if self.message_attribute.trim().is_empty() {
            return Err(GuardConfigError::EmptyMessageAttribute);
        }
        if self.busy_timeout_ms == Some(0) {
            return Err(GuardConfigError::ZeroTimeout);
        }
        for (name, value) in self.selectors.entries() {
            if value.trim().is_empty() {
                return Err(GuardConfigError::EmptySelector { name });
            }
        }
        Ok(())
    }

    pub fn busy_timeout(&self) -> Option<Duration> {
        self.busy_timeout_ms.map(Duration::from_millis)
    }

    /// Busy timeout as a timer delay, capped at what a browser timer takes
    pub fn busy_timeout_delay_ms(&self) -> Option<i32> {
        self.busy_timeout_ms
            .map(|ms| i32::try_from(ms).unwrap_or(i32::MAX))
    }

    /// Picks the message for a busy cycle: an explicit non-empty message,
    /// otherwise the configured default
    pub fn resolve_message(&self, message: Option<&str>) -> String {
        match message {
            Some(text) if !text.is_empty() => text.to_string(),
            _ => self.default_message.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_sales_page_markup() {
        let config = GuardConfig::default();
        assert_eq!(config.default_message, "Loading…");
        assert_eq!(config.message_attribute, "data-loading");
        assert_eq!(config.busy_timeout(), None);
        assert_eq!(config.selectors.overlay_id, "loading-overlay");
        assert_eq!(config.selectors.row_selector, ".sale-line");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_document_gives_defaults() {
        let config = GuardConfig::from_toml_str("").unwrap();
        assert_eq!(config, GuardConfig::default());
    }

    #[test]
    fn partial_document_keeps_other_defaults() {
        let config = GuardConfig::from_toml_str(
            r#"
            default_message = "Please wait"
            busy_timeout_ms = 15000

            [selectors]
            container_id = "lines"
            "#,
        )
        .unwrap();
        assert_eq!(config.default_message, "Please wait");
        assert_eq!(config.busy_timeout(), Some(Duration::from_secs(15)));
        assert_eq!(config.selectors.container_id, "lines");
        assert_eq!(config.selectors.overlay_id, "loading-overlay");
    }

    #[test]
    fn malformed_document_is_a_parse_error() {
        let err = GuardConfig::from_toml_str("busy_timeout_ms = \"soon\"").unwrap_err();
        assert!(matches!(err, GuardConfigError::Parse(_)));
    }

    #[test]
    fn validation_rejects_unusable_values() {
        let mut config = GuardConfig::default();
        config.default_message = "   ".into();
        assert!(matches!(
            config.validate(),
            Err(GuardConfigError::EmptyDefaultMessage)
        ));

        let mut config = GuardConfig::default();
        config.message_attribute.clear();
        assert!(matches!(
            config.validate(),
            Err(GuardConfigError::EmptyMessageAttribute)
        ));

        let mut config = GuardConfig::default();
        config.busy_timeout_ms = Some(0);
        assert!(matches!(config.validate(), Err(GuardConfigError::ZeroTimeout)));

        let mut config = GuardConfig::default();
        config.selectors.row_selector.clear();
        assert!(matches!(
            config.validate(),
            Err(GuardConfigError::EmptySelector { name: "row_selector" })
        ));
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = GuardConfig::default();
        config
            .apply_env_overrides(|var| match var {
                "FORMGUARD_DEFAULT_MESSAGE" => Some("Hold on".into()),
                "FORMGUARD_BUSY_TIMEOUT_MS" => Some("2500".into()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.default_message, "Hold on");
        assert_eq!(config.busy_timeout(), Some(Duration::from_millis(2500)));
    }

    #[test]
    fn blank_timeout_override_clears_timeout() {
        let mut config = GuardConfig::default();
        config.busy_timeout_ms = Some(1000);
        config
            .apply_env_overrides(|var| (var == "FORMGUARD_BUSY_TIMEOUT_MS").then(String::new))
            .unwrap();
        assert_eq!(config.busy_timeout(), None);
    }

    #[test]
    fn invalid_timeout_override_is_rejected() {
        let mut config = GuardConfig::default();
        let err = config
            .apply_env_overrides(|var| (var == "FORMGUARD_BUSY_TIMEOUT_MS").then(|| "ten".into()))
            .unwrap_err();
        assert!(matches!(err, GuardConfigError::InvalidEnv { .. }));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = GuardConfig::load("/nonexistent/formguard.toml").unwrap_err();
        assert!(matches!(err, GuardConfigError::Io { .. }));
    }

    #[test]
    fn timer_delay_is_capped() {
        let mut config = GuardConfig::default();
        assert_eq!(config.busy_timeout_delay_ms(), None);

        config.busy_timeout_ms = Some(15_000);
        assert_eq!(config.busy_timeout_delay_ms(), Some(15_000));

        config.busy_timeout_ms = Some(u64::MAX);
        assert_eq!(config.busy_timeout_delay_ms(), Some(i32::MAX));
    }

    #[test]
    fn message_resolution_falls_back_to_default() {
        let config = GuardConfig::default();
        assert_eq!(config.resolve_message(None), "Loading…");
        assert_eq!(config.resolve_message(Some("")), "Loading…");
        assert_eq!(config.resolve_message(Some("Saving sale")), "Saving sale");
    }
}
