//! Trigger registry configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Trigger registry configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchedulerConfig {
    /// Directory holding the trigger registry.
    /// Default: the platform state directory (`~/.local/state/mailsweep`).
    #[serde(default)]
    pub state_dir: Option<PathBuf>,
}

impl SchedulerConfig {
    /// The directory to keep trigger state in, falling back from the
    /// configured path to the platform state dir, then the local data dir,
    /// then the working directory.
    pub fn resolve_state_dir(&self) -> PathBuf {
        if let Some(dir) = &self.state_dir {
            return dir.clone();
        }
        dirs::state_dir()
            .or_else(dirs::data_local_dir)
            .map(|dir| dir.join("mailsweep"))
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_state_dir_wins() {
        let config = SchedulerConfig {
            state_dir: Some(PathBuf::from("/tmp/mailsweep-test")),
        };
        assert_eq!(
            config.resolve_state_dir(),
            PathBuf::from("/tmp/mailsweep-test")
        );
    }

    #[test]
    fn test_default_resolves_somewhere() {
        let config = SchedulerConfig::default();
        assert!(!config.resolve_state_dir().as_os_str().is_empty());
    }
}
