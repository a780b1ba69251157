//! Top-level sweep sequencing and host-trigger entry points.

use std::sync::Arc;

use chrono::Utc;

use super::{ActionKind, BatchProcessor, BatchRunResult, ContinuationManager, SWEEP_HANDLER, SweepRunResult};
use crate::{
    config::SweepsConfig,
    error::SweepResult,
    mailstore::MailStore,
    scheduler::{Trigger, TriggerScheduler},
};

/// What a due trigger resolves to.
enum FiredKind {
    Sweep,
    Continuation(ActionKind),
}

/// Sequences the configured sweeps and maps host triggers to entry points.
pub struct SweepRunner {
    batches: BatchProcessor,
    continuations: ContinuationManager,
    scheduler: Arc<dyn TriggerScheduler>,
    config: SweepsConfig,
}

impl SweepRunner {
    pub fn new(
        store: Arc<dyn MailStore>,
        scheduler: Arc<dyn TriggerScheduler>,
        config: SweepsConfig,
    ) -> Self {
        Self {
            batches: BatchProcessor::new(
                store,
                ContinuationManager::new(Arc::clone(&scheduler)),
                config.clone(),
            ),
            continuations: ContinuationManager::new(Arc::clone(&scheduler)),
            scheduler,
            config,
        }
    }

    /// Run one full sweep: purge first, then archive.
    ///
    /// A purge failure aborts the sweep before archive runs; recovery is the
    /// next periodic firing, not a partial retry.
    pub async fn run_scheduled_sweep(&self) -> SweepResult<SweepRunResult> {
        let purge = self.batches.run_batch(ActionKind::Purge).await?;
        let archive = self.batches.run_batch(ActionKind::Archive).await?;

        let result = SweepRunResult { purge, archive };
        tracing::info!(
            purged = result.purge.mutated,
            archived = result.archive.mutated,
            total = result.total_mutated(),
            "Sweep complete"
        );
        Ok(result)
    }

    /// Entry point for a fired continuation trigger: one more batch of the
    /// same action.
    pub async fn run_continuation(&self, action: ActionKind) -> SweepResult<BatchRunResult> {
        self.batches.run_batch(action).await
    }

    /// Install the periodic sweep trigger. Installation-time only, not part
    /// of the per-invocation hot path.
    pub async fn install(&self) -> SweepResult<Trigger> {
        let trigger = self
            .scheduler
            .create_periodic(SWEEP_HANDLER, self.config.interval_days)
            .await?;
        tracing::info!(
            trigger_id = %trigger.id,
            interval_days = self.config.interval_days,
            "Installed periodic sweep trigger"
        );
        Ok(trigger)
    }

    /// Remove every trigger owned by this system. Full teardown.
    pub async fn uninstall(&self) -> SweepResult<usize> {
        let removed = self.continuations.cancel_all().await?;
        tracing::info!(removed, "Removed all sweep triggers");
        Ok(removed)
    }

    /// Fire every currently due trigger once. Returns how many fired.
    ///
    /// Intended to be driven by cron at a finer interval than any trigger
    /// cadence. A due periodic trigger is advanced before its sweep runs, so
    /// a persistently failing sweep cannot re-fire on every tick.
    pub async fn tick(&self) -> SweepResult<u32> {
        let now = Utc::now();
        let due: Vec<Trigger> = self
            .scheduler
            .list()
            .await?
            .into_iter()
            .filter(|t| t.is_due(now))
            .collect();

        let mut fired = 0;
        for trigger in due {
            // An earlier firing in this same tick may have cancelled this
            // trigger (a sweep cancels due continuations of its actions).
            let still_registered = self
                .scheduler
                .list()
                .await?
                .iter()
                .any(|t| t.id == trigger.id);
            if !still_registered {
                tracing::debug!(
                    trigger_id = %trigger.id,
                    "Trigger removed by an earlier firing, skipping"
                );
                continue;
            }

            let kind = if trigger.handler == SWEEP_HANDLER {
                FiredKind::Sweep
            } else if let Some(action) = ActionKind::from_continuation_handler(&trigger.handler) {
                FiredKind::Continuation(action)
            } else {
                tracing::warn!(
                    trigger_id = %trigger.id,
                    handler = %trigger.handler,
                    "Unknown trigger handler, skipping"
                );
                continue;
            };

            tracing::info!(
                trigger_id = %trigger.id,
                handler = %trigger.handler,
                "Firing due trigger"
            );
            self.scheduler.mark_fired(&trigger.id, now).await?;

            match kind {
                FiredKind::Sweep => {
                    self.run_scheduled_sweep().await?;
                }
                FiredKind::Continuation(action) => {
                    self.run_continuation(action).await?;
                }
            }
            fired += 1;
        }

        Ok(fired)
    }
}
