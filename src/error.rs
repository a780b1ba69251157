//! Sweep error taxonomy.

use thiserror::Error;

use crate::{mailstore::MailStoreError, scheduler::SchedulerError};

/// Errors surfaced by a sweep invocation.
///
/// Nothing is retried or swallowed inside the core: every variant aborts the
/// current invocation and is reported to the invoking host context. Recovery
/// across invocations relies on re-triggering and on mutation idempotence.
#[derive(Debug, Error)]
pub enum SweepError {
    /// The mail store search call failed. No continuation bookkeeping has
    /// changed at this point beyond the unconditional up-front cancel.
    #[error("Mail store query failed: {0}")]
    Query(MailStoreError),

    /// A per-thread mutation failed part-way through a page. Threads mutated
    /// earlier in the page stay mutated; the just-scheduled continuation has
    /// been cancelled.
    #[error("Thread mutation failed: {0}")]
    Mutation(MailStoreError),

    /// Trigger bookkeeping failed. There is no well-defined safe fallback
    /// state for trigger state, so no compensating action is attempted.
    #[error("Trigger scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),
}

pub type SweepResult<T> = Result<T, SweepError>;
