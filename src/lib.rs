//! Automated mailbox lifecycle sweeps.
//!
//! mailsweep periodically archives old inbox threads and purges old
//! promotional/update/social threads from a Gmail-style mail store. The
//! eligible backlog can be far larger than one invocation may safely touch,
//! so every invocation processes a single bounded page and, when the page
//! comes back full, schedules exactly one follow-up invocation. Stale
//! follow-ups are cancelled first, so overlapping invocations never fork
//! duplicate continuation chains.
//!
//! The pieces, leaf to root:
//!
//! - [`mailstore`]: the mail store boundary (paginated search, per-thread
//!   mutation) and its Gmail REST backend.
//! - [`scheduler`]: the trigger boundary (periodic and one-shot triggers)
//!   and its file-backed registry.
//! - [`sweep`]: the core — per-action policies, the page-bounded batch
//!   processor with its strict cutoff gate, continuation bookkeeping, and
//!   the dispatcher sequencing purge then archive.

pub mod config;
pub mod error;
pub mod mailstore;
pub mod observability;
pub mod scheduler;
pub mod sweep;

#[cfg(test)]
mod tests;

pub use config::MailsweepConfig;
pub use error::{SweepError, SweepResult};
pub use sweep::{ActionKind, BatchRunResult, SweepRunResult, SweepRunner};
