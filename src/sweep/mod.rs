//! The sweep core: action policies, batch processing, and continuation
//! bookkeeping.
//!
//! A sweep visits threads in bounded pages. Each action kind carries a fixed
//! policy (query predicate, cutoff age, mutation), and a batch that fills its
//! page schedules a one-shot continuation so the remaining backlog is picked
//! up a couple of minutes later. Cancelling stale continuations before
//! scheduling new ones keeps at most one pending follow-up per action alive
//! between invocations.

mod batch;
mod continuation;
mod dispatcher;

pub use batch::BatchProcessor;
pub use continuation::ContinuationManager;
pub use dispatcher::SweepRunner;

use crate::{config::SweepsConfig, mailstore::MutationOp};

/// Logical handler name for the periodic full sweep.
pub const SWEEP_HANDLER: &str = "sweep";

/// The two lifecycle transitions a sweep applies.
///
/// A closed enum: every action carries its predicate, cutoff, mutation, and
/// continuation handler, so there is no "unknown action" branch anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    /// Permanently delete old promotional/update/social threads.
    Purge,
    /// Move old inbox threads out of the inbox.
    Archive,
}

impl ActionKind {
    pub const ALL: [ActionKind; 2] = [ActionKind::Purge, ActionKind::Archive];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Purge => "purge",
            ActionKind::Archive => "archive",
        }
    }

    /// Base query predicate for this action.
    ///
    /// A coarse pre-filter only: the batch processor re-checks every thread
    /// against its own cutoff instant before mutating (the store's age
    /// filter and our day arithmetic are not guaranteed to agree exactly).
    pub fn predicate(&self) -> &'static str {
        match self {
            ActionKind::Purge => {
                "-in:important -in:starred {category:updates category:promotions category:social}"
            }
            ActionKind::Archive => "in:inbox",
        }
    }

    /// The mutation applied to each eligible thread.
    pub fn mutation_op(&self) -> MutationOp {
        match self {
            ActionKind::Purge => MutationOp::Trash,
            ActionKind::Archive => MutationOp::Archive,
        }
    }

    /// Cutoff age in days, from the sweep configuration.
    pub fn cutoff_days(&self, config: &SweepsConfig) -> u32 {
        match self {
            ActionKind::Purge => config.purge_after_days,
            ActionKind::Archive => config.archive_after_days,
        }
    }

    /// Logical handler name for this action's one-shot continuation trigger.
    pub fn continuation_handler(&self) -> &'static str {
        match self {
            ActionKind::Purge => "sweep_more_purge",
            ActionKind::Archive => "sweep_more_archive",
        }
    }

    /// Inverse of [`continuation_handler`](Self::continuation_handler).
    pub fn from_continuation_handler(handler: &str) -> Option<ActionKind> {
        Self::ALL
            .into_iter()
            .find(|action| action.continuation_handler() == handler)
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Results from one batch invocation of a single action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchRunResult {
    /// Threads returned by the search and examined.
    pub examined: u64,
    /// Threads mutated (or, in dry-run, that would have been).
    pub mutated: u64,
    /// Threads matched by the query but newer than the cutoff.
    pub skipped: u64,
    /// Whether a follow-up invocation was scheduled for this action.
    pub continuation_scheduled: bool,
}

/// Results from one full sweep (purge, then archive).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepRunResult {
    pub purge: BatchRunResult,
    pub archive: BatchRunResult,
}

impl SweepRunResult {
    pub fn total_mutated(&self) -> u64 {
        self.purge.mutated + self.archive.mutated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_table() {
        let config = SweepsConfig::default();

        assert_eq!(ActionKind::Purge.cutoff_days(&config), 365);
        assert_eq!(ActionKind::Purge.mutation_op(), MutationOp::Trash);
        assert!(ActionKind::Purge.predicate().contains("category:promotions"));
        assert!(ActionKind::Purge.predicate().contains("-in:important"));

        assert_eq!(ActionKind::Archive.cutoff_days(&config), 90);
        assert_eq!(ActionKind::Archive.mutation_op(), MutationOp::Archive);
        assert_eq!(ActionKind::Archive.predicate(), "in:inbox");
    }

    #[test]
    fn test_continuation_handler_round_trip() {
        for action in ActionKind::ALL {
            assert_eq!(
                ActionKind::from_continuation_handler(action.continuation_handler()),
                Some(action)
            );
        }
        assert_eq!(ActionKind::from_continuation_handler("sweep"), None);
        assert_eq!(ActionKind::from_continuation_handler("unknown"), None);
    }

    #[test]
    fn test_handler_names_are_distinct() {
        assert_ne!(
            ActionKind::Purge.continuation_handler(),
            ActionKind::Archive.continuation_handler()
        );
        for action in ActionKind::ALL {
            assert_ne!(action.continuation_handler(), SWEEP_HANDLER);
        }
    }

    #[test]
    fn test_sweep_run_result_total() {
        let result = SweepRunResult {
            purge: BatchRunResult {
                examined: 5,
                mutated: 3,
                skipped: 2,
                continuation_scheduled: false,
            },
            archive: BatchRunResult {
                examined: 2,
                mutated: 1,
                skipped: 1,
                continuation_scheduled: true,
            },
        };
        assert_eq!(result.total_mutated(), 4);
    }
}
