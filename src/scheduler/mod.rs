//! Trigger scheduler collaborator boundary.
//!
//! Triggers are the cross-invocation state of the system: a periodic trigger
//! drives the daily sweep, and one-shot triggers resume a backlog that
//! exceeded one page. The scheduler does not deduplicate triggers itself;
//! the continuation manager upholds the at-most-one-pending invariant by
//! cancelling before scheduling.

mod file;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use file::FileTriggerStore;

/// A registered trigger: a logical handler name plus a firing schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trigger {
    pub id: String,
    /// Logical handler this trigger invokes when it fires.
    pub handler: String,
    pub schedule: TriggerSchedule,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TriggerSchedule {
    /// Fires once at `fire_at`. Fired one-shots persist until deleted.
    OneShot { fire_at: DateTime<Utc> },
    /// Fires every `interval_days`, next at `next_fire_at`.
    Periodic {
        interval_days: u32,
        next_fire_at: DateTime<Utc>,
    },
}

impl Trigger {
    /// Whether the trigger is due at `now`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        match &self.schedule {
            TriggerSchedule::OneShot { fire_at } => *fire_at <= now,
            TriggerSchedule::Periodic { next_fire_at, .. } => *next_fire_at <= now,
        }
    }
}

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("Trigger store IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Trigger store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Trigger not found: {0}")]
    NotFound(String),
}

pub type SchedulerResult<T> = Result<T, SchedulerError>;

#[async_trait]
pub trait TriggerScheduler: Send + Sync {
    /// Install a periodic trigger firing every `interval_days`, starting one
    /// interval from now.
    async fn create_periodic(&self, handler: &str, interval_days: u32)
    -> SchedulerResult<Trigger>;

    /// Install a one-shot trigger firing at `fire_at`.
    async fn create_one_shot(
        &self,
        handler: &str,
        fire_at: DateTime<Utc>,
    ) -> SchedulerResult<Trigger>;

    /// Enumerate every registered trigger.
    async fn list(&self) -> SchedulerResult<Vec<Trigger>>;

    /// Remove the trigger with id `id`.
    ///
    /// Deleting an unknown id is [`SchedulerError::NotFound`]; callers only
    /// delete ids they just listed, so a miss indicates registry corruption.
    async fn delete(&self, id: &str) -> SchedulerResult<()>;

    /// Record that a trigger fired at `now`: advances a periodic trigger's
    /// next fire time by one interval. One-shot triggers are left in place;
    /// they persist until explicitly deleted.
    async fn mark_fired(&self, id: &str, now: DateTime<Utc>) -> SchedulerResult<()>;
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn test_one_shot_due() {
        let now = Utc::now();
        let trigger = Trigger {
            id: "a".into(),
            handler: "sweep_more_purge".into(),
            schedule: TriggerSchedule::OneShot {
                fire_at: now - Duration::seconds(1),
            },
        };
        assert!(trigger.is_due(now));
        assert!(!trigger.is_due(now - Duration::seconds(2)));
    }

    #[test]
    fn test_periodic_due() {
        let now = Utc::now();
        let trigger = Trigger {
            id: "b".into(),
            handler: "sweep".into(),
            schedule: TriggerSchedule::Periodic {
                interval_days: 1,
                next_fire_at: now + Duration::hours(1),
            },
        };
        assert!(!trigger.is_due(now));
        assert!(trigger.is_due(now + Duration::hours(2)));
    }

    #[test]
    fn test_trigger_serde_round_trip() {
        let trigger = Trigger {
            id: "c".into(),
            handler: "sweep".into(),
            schedule: TriggerSchedule::Periodic {
                interval_days: 1,
                next_fire_at: Utc::now(),
            },
        };
        let json = serde_json::to_string(&trigger).unwrap();
        let back: Trigger = serde_json::from_str(&json).unwrap();
        assert_eq!(trigger, back);
    }
}
