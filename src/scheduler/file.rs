//! JSON-file-backed trigger registry.
//!
//! The registry is a single small document read and rewritten whole on each
//! operation, guarded by a mutex so concurrent tasks in one process cannot
//! interleave read-modify-write cycles. Writes go through a temp file and a
//! rename, so a crash mid-write never leaves a torn registry.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{SchedulerError, SchedulerResult, Trigger, TriggerSchedule, TriggerScheduler};

const REGISTRY_FILE: &str = "triggers.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct TriggerRegistry {
    #[serde(default)]
    triggers: Vec<Trigger>,
}

/// Trigger scheduler persisting its registry to a JSON file on disk.
pub struct FileTriggerStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileTriggerStore {
    /// Create a store keeping its registry under `state_dir`.
    ///
    /// The directory is created lazily on the first write.
    pub fn new(state_dir: impl AsRef<Path>) -> Self {
        Self {
            path: state_dir.as_ref().join(REGISTRY_FILE),
            lock: Mutex::new(()),
        }
    }

    fn load(&self) -> SchedulerResult<TriggerRegistry> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(TriggerRegistry::default()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, registry: &TriggerRegistry) -> SchedulerResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(registry)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, contents)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[async_trait]
impl TriggerScheduler for FileTriggerStore {
    async fn create_periodic(
        &self,
        handler: &str,
        interval_days: u32,
    ) -> SchedulerResult<Trigger> {
        let _guard = self.lock.lock().await;
        let mut registry = self.load()?;
        let trigger = Trigger {
            id: Uuid::new_v4().to_string(),
            handler: handler.to_string(),
            schedule: TriggerSchedule::Periodic {
                interval_days,
                next_fire_at: Utc::now() + Duration::days(i64::from(interval_days)),
            },
        };
        registry.triggers.push(trigger.clone());
        self.save(&registry)?;
        Ok(trigger)
    }

    async fn create_one_shot(
        &self,
        handler: &str,
        fire_at: DateTime<Utc>,
    ) -> SchedulerResult<Trigger> {
        let _guard = self.lock.lock().await;
        let mut registry = self.load()?;
        let trigger = Trigger {
            id: Uuid::new_v4().to_string(),
            handler: handler.to_string(),
            schedule: TriggerSchedule::OneShot { fire_at },
        };
        registry.triggers.push(trigger.clone());
        self.save(&registry)?;
        Ok(trigger)
    }

    async fn list(&self) -> SchedulerResult<Vec<Trigger>> {
        let _guard = self.lock.lock().await;
        Ok(self.load()?.triggers)
    }

    async fn delete(&self, id: &str) -> SchedulerResult<()> {
        let _guard = self.lock.lock().await;
        let mut registry = self.load()?;
        let before = registry.triggers.len();
        registry.triggers.retain(|t| t.id != id);
        if registry.triggers.len() == before {
            return Err(SchedulerError::NotFound(id.to_string()));
        }
        self.save(&registry)?;
        Ok(())
    }

    async fn mark_fired(&self, id: &str, now: DateTime<Utc>) -> SchedulerResult<()> {
        let _guard = self.lock.lock().await;
        let mut registry = self.load()?;
        let trigger = registry
            .triggers
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| SchedulerError::NotFound(id.to_string()))?;
        if let TriggerSchedule::Periodic {
            interval_days,
            next_fire_at,
        } = &mut trigger.schedule
        {
            // Advance from now rather than from the missed slot, so a host
            // that was down for days does not replay every missed firing.
            *next_fire_at = now + Duration::days(i64::from(*interval_days));
            self.save(&registry)?;
        }
        Ok(())
    }
}
