//! Continuation trigger bookkeeping.
//!
//! The host scheduler does not enforce uniqueness of triggers, so the
//! at-most-one-pending-continuation invariant lives here: every batch cancels
//! the pending continuation for its action before it may schedule a fresh
//! one. Scheduler failures propagate as fatal; there is no safe partial
//! state for trigger bookkeeping, so nothing is retried locally.

use std::sync::Arc;

use chrono::{Duration, Utc};

use super::ActionKind;
use crate::{
    error::SweepResult,
    scheduler::{Trigger, TriggerScheduler},
};

/// Manages the one-shot continuation triggers of both actions.
pub struct ContinuationManager {
    scheduler: Arc<dyn TriggerScheduler>,
}

impl ContinuationManager {
    pub fn new(scheduler: Arc<dyn TriggerScheduler>) -> Self {
        Self { scheduler }
    }

    /// Remove every pending continuation trigger for `action`.
    ///
    /// A no-op when none exist. Returns how many triggers were removed.
    pub async fn cancel_pending(&self, action: ActionKind) -> SweepResult<usize> {
        let handler = action.continuation_handler();
        let mut cancelled = 0;
        for trigger in self.scheduler.list().await? {
            if trigger.handler == handler {
                self.scheduler.delete(&trigger.id).await?;
                cancelled += 1;
            }
        }
        if cancelled > 0 {
            tracing::debug!(
                action = %action,
                cancelled,
                "Cancelled pending continuation triggers"
            );
        }
        Ok(cancelled)
    }

    /// Install one one-shot continuation trigger for `action` at now+`delay`.
    ///
    /// Callers must have called [`cancel_pending`](Self::cancel_pending) in
    /// the same logical step; the manager does not deduplicate against
    /// triggers it did not itself just cancel.
    pub async fn schedule_pending(&self, action: ActionKind, delay: Duration) -> SweepResult<Trigger> {
        let fire_at = Utc::now() + delay;
        let trigger = self
            .scheduler
            .create_one_shot(action.continuation_handler(), fire_at)
            .await?;
        tracing::info!(
            action = %action,
            trigger_id = %trigger.id,
            fire_at = %fire_at,
            "Scheduled continuation trigger"
        );
        Ok(trigger)
    }

    /// Remove every trigger owned by this system, the periodic sweep trigger
    /// included. Full teardown only.
    pub async fn cancel_all(&self) -> SweepResult<usize> {
        let mut removed = 0;
        for trigger in self.scheduler.list().await? {
            self.scheduler.delete(&trigger.id).await?;
            removed += 1;
        }
        Ok(removed)
    }
}
