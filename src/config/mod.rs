//! Configuration module for mailsweep.
//!
//! mailsweep is configured via a TOML file, with support for environment
//! variable interpolation using `${VAR_NAME}` syntax.
//!
//! # Example
//!
//! ```toml
//! [mailstore]
//! bearer_token = "${GMAIL_ACCESS_TOKEN}"
//!
//! [sweeps]
//! dry_run = true
//! ```

mod mailstore;
mod observability;
mod scheduler;
mod sweeps;

use std::path::{Path, PathBuf};

pub use mailstore::*;
pub use observability::*;
pub use scheduler::*;
use serde::{Deserialize, Serialize};
pub use sweeps::*;

/// Root configuration for mailsweep.
///
/// All sections are optional with defaults, so a minimal file only needs the
/// mail store token.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MailsweepConfig {
    /// Mail store API configuration.
    #[serde(default)]
    pub mailstore: MailStoreConfig,

    /// Sweep policy knobs: page size, dry-run, delays, cutoffs.
    #[serde(default)]
    pub sweeps: SweepsConfig,

    /// Trigger registry location.
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Logging configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl MailsweepConfig {
    /// Load configuration from a TOML file.
    ///
    /// Environment variables in the format `${VAR_NAME}` are expanded.
    /// Missing required variables cause an error.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(e, path.as_ref().to_path_buf()))?;
        Self::from_str(&contents)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(contents: &str) -> Result<Self, ConfigError> {
        let expanded = expand_env_vars(contents)?;
        let config: MailsweepConfig = toml::from_str(&expanded).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration for consistency and completeness.
    fn validate(&self) -> Result<(), ConfigError> {
        self.mailstore.validate()?;
        self.sweeps.validate()?;
        Ok(())
    }

    /// Default config file location (`~/.config/mailsweep/mailsweep.toml`).
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("mailsweep").join("mailsweep.toml"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {1}: {0}")]
    Io(std::io::Error, std::path::PathBuf),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),

    #[error("Configuration validation error: {0}")]
    Validation(String),
}

/// Expand `${VAR_NAME}` references, skipping anything inside a `#` comment.
fn expand_env_vars(input: &str) -> Result<String, ConfigError> {
    let re = regex::Regex::new(r"\$\{([^}]+)\}").expect("static regex");
    let mut result = String::with_capacity(input.len());

    for line in input.lines() {
        let comment_pos = line.find('#');
        let mut line_result = String::with_capacity(line.len());
        let mut last_end = 0;

        for cap in re.captures_iter(line) {
            let matched = cap.get(0).expect("whole match");
            if let Some(pos) = comment_pos
                && matched.start() >= pos
            {
                continue;
            }

            line_result.push_str(&line[last_end..matched.start()]);

            let var_name = &cap[1];
            let value = std::env::var(var_name)
                .map_err(|_| ConfigError::EnvVarNotFound(var_name.to_string()))?;
            line_result.push_str(&value);

            last_end = matched.end();
        }

        line_result.push_str(&line[last_end..]);
        result.push_str(&line_result);
        result.push('\n');
    }

    if !input.ends_with('\n') {
        result.pop();
    }

    Ok(result)
}
