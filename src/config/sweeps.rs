//! Sweep policy configuration.
//!
//! # Example
//!
//! ```toml
//! [sweeps]
//! dry_run = false
//! page_size = 200
//! continuation_delay_secs = 120
//! interval_days = 1
//! purge_after_days = 365
//! archive_after_days = 90
//! ```

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Sweep policy knobs.
///
/// These are static configuration, fixed for the lifetime of an invocation;
/// the query predicates themselves are compile-time constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SweepsConfig {
    /// If true, log what would be mutated without mutating. Query, cutoff
    /// evaluation, and continuation scheduling still run.
    /// Default: false
    #[serde(default)]
    pub dry_run: bool,

    /// Maximum number of threads processed per batch.
    /// Default: 200
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Delay before a continuation batch fires, in seconds.
    /// Default: 120 (2 minutes)
    #[serde(default = "default_continuation_delay_secs")]
    pub continuation_delay_secs: u64,

    /// Cadence of the periodic full sweep, in days.
    /// Default: 1
    #[serde(default = "default_interval_days")]
    pub interval_days: u32,

    /// Age in days past which matching threads are purged.
    /// Default: 365
    #[serde(default = "default_purge_after_days")]
    pub purge_after_days: u32,

    /// Age in days past which inbox threads are archived.
    /// Default: 90
    #[serde(default = "default_archive_after_days")]
    pub archive_after_days: u32,
}

impl Default for SweepsConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            page_size: default_page_size(),
            continuation_delay_secs: default_continuation_delay_secs(),
            interval_days: default_interval_days(),
            purge_after_days: default_purge_after_days(),
            archive_after_days: default_archive_after_days(),
        }
    }
}

fn default_page_size() -> u32 {
    200
}

fn default_continuation_delay_secs() -> u64 {
    120
}

fn default_interval_days() -> u32 {
    1
}

fn default_purge_after_days() -> u32 {
    365
}

fn default_archive_after_days() -> u32 {
    90
}

impl SweepsConfig {
    /// Continuation delay as a chrono duration.
    pub fn continuation_delay(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.continuation_delay_secs as i64)
    }

    pub(super) fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::Validation(
                "sweeps.page_size must be at least 1".into(),
            ));
        }
        if self.interval_days == 0 {
            return Err(ConfigError::Validation(
                "sweeps.interval_days must be at least 1".into(),
            ));
        }
        if self.purge_after_days == 0 || self.archive_after_days == 0 {
            return Err(ConfigError::Validation(
                "sweeps cutoffs must be at least 1 day".into(),
            ));
        }
        Ok(())
    }
}
