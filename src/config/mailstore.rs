//! Mail store API configuration.

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Mail store API configuration.
///
/// The bearer token is normally supplied via environment interpolation
/// (`bearer_token = "${GMAIL_ACCESS_TOKEN}"`) so the config file itself
/// never holds a credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MailStoreConfig {
    /// Base URL of the Gmail-style REST API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Static OAuth bearer token for API requests.
    #[serde(default)]
    pub bearer_token: String,

    /// Per-request HTTP timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for MailStoreConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            bearer_token: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "https://gmail.googleapis.com/gmail/v1".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl MailStoreConfig {
    pub(super) fn validate(&self) -> Result<(), ConfigError> {
        url::Url::parse(&self.base_url).map_err(|e| {
            ConfigError::Validation(format!(
                "mailstore.base_url is not a valid URL ({}): {e}",
                self.base_url
            ))
        })?;
        if self.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "mailstore.timeout_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MailStoreConfig::default();
        assert_eq!(config.base_url, "https://gmail.googleapis.com/gmail/v1");
        assert!(config.bearer_token.is_empty());
        assert_eq!(config.timeout_secs, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let config = MailStoreConfig {
            base_url: "not a url".into(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let config = MailStoreConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_parse_full_section() {
        let config: MailStoreConfig = toml::from_str(
            r#"
            base_url = "http://localhost:8080/gmail/v1"
            bearer_token = "token"
            timeout_secs = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.base_url, "http://localhost:8080/gmail/v1");
        assert_eq!(config.bearer_token, "token");
        assert_eq!(config.timeout_secs, 5);
    }
}
