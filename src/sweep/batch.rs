//! Single-page batch processing.
//!
//! One batch is one bounded slice of work against an unbounded backlog: fetch
//! a page of query matches, gate each thread on the authoritative cutoff
//! instant, mutate the eligible ones, and leave behind exactly one pending
//! continuation if the page came back full.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use super::{ActionKind, BatchRunResult, ContinuationManager};
use crate::{
    config::SweepsConfig,
    error::{SweepError, SweepResult},
    mailstore::{MailStore, Thread},
};

/// Runs one page-bounded batch per invocation for a given action.
pub struct BatchProcessor {
    store: Arc<dyn MailStore>,
    continuations: ContinuationManager,
    config: SweepsConfig,
}

impl BatchProcessor {
    pub fn new(
        store: Arc<dyn MailStore>,
        continuations: ContinuationManager,
        config: SweepsConfig,
    ) -> Self {
        Self {
            store,
            continuations,
            config,
        }
    }

    /// Process one page of threads eligible for `action`.
    ///
    /// Any pending continuation for the action is cancelled up front: this
    /// invocation, whether fired by the periodic schedule or by a prior
    /// continuation, supersedes whatever follow-up was scheduled before. A
    /// full page schedules a fresh continuation before any thread is touched,
    /// so a truncated backlog is never silently dropped; the continuation is
    /// cancelled again if a mutation later fails.
    pub async fn run_batch(&self, action: ActionKind) -> SweepResult<BatchRunResult> {
        let dry_run = self.config.dry_run;
        let dry_run_msg = if dry_run { " (DRY RUN)" } else { "" };
        let cutoff_days = action.cutoff_days(&self.config);
        let page_size = self.config.page_size as usize;

        self.continuations.cancel_pending(action).await?;

        let query = format!("{} older_than:{}d", action.predicate(), cutoff_days);
        tracing::debug!(action = %action, query = %query, "Searching for eligible threads");

        let threads = self
            .store
            .search(&query, 0, page_size)
            .await
            .map_err(SweepError::Query)?;

        let mut result = BatchRunResult::default();

        // "Page is full" is the signal, not "page is non-empty": a backlog
        // that is an exact multiple of the page size costs one extra empty
        // continuation, but a stricter comparison could miss remaining work.
        if threads.len() == page_size {
            self.continuations
                .schedule_pending(action, self.config.continuation_delay())
                .await?;
            result.continuation_scheduled = true;
        }

        tracing::info!(
            action = %action,
            count = threads.len(),
            cutoff_days,
            "Processing threads{}",
            dry_run_msg
        );

        let cutoff = cutoff_instant(Utc::now(), cutoff_days);

        for thread in &threads {
            result.examined += 1;

            // The query's own age filter is only a coarse pre-filter; this
            // gate is the authoritative boundary, and it is strict.
            if !is_older_than(thread, cutoff) {
                result.skipped += 1;
                continue;
            }

            tracing::debug!(
                action = %action,
                thread_id = %thread.id,
                subject = %thread.subject,
                labels = ?thread.labels,
                last_activity_at = %thread.last_activity_at,
                "Applying {} to thread{}",
                action.mutation_op(),
                dry_run_msg
            );

            if !dry_run
                && let Err(e) = self.store.mutate(&thread.id, action.mutation_op()).await
            {
                // A failed run must not leave an orphaned follow-up chain
                // behind. Threads mutated earlier in this page stay mutated;
                // there is no rollback.
                self.continuations.cancel_pending(action).await?;
                result.continuation_scheduled = false;
                return Err(SweepError::Mutation(e));
            }

            result.mutated += 1;
        }

        tracing::info!(
            action = %action,
            examined = result.examined,
            mutated = result.mutated,
            skipped = result.skipped,
            continuation_scheduled = result.continuation_scheduled,
            "Batch complete{}",
            dry_run_msg
        );

        Ok(result)
    }
}

/// The instant separating actionable threads from ones left alone.
fn cutoff_instant(now: DateTime<Utc>, cutoff_days: u32) -> DateTime<Utc> {
    now - Duration::days(i64::from(cutoff_days))
}

/// Strictly-older gate: a thread last active exactly at the cutoff is kept.
fn is_older_than(thread: &Thread, cutoff: DateTime<Utc>) -> bool {
    thread.last_activity_at < cutoff
}
