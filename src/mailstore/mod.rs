//! Mail store collaborator boundary.
//!
//! The sweep core needs exactly two operations from the mail store: a
//! paginated search and a per-thread mutation. Both live on the [`MailStore`]
//! trait so the batch processor can run against the Gmail backend in
//! production and scripted stores in tests.

mod gmail;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

pub use gmail::GmailMailStore;

/// A conversation thread as seen during one batch.
///
/// Threads are owned by the mail store; this system holds them only
/// transiently while deciding whether to act on them.
#[derive(Debug, Clone)]
pub struct Thread {
    /// Store-assigned opaque identifier.
    pub id: String,
    /// Timestamp of the newest message in the thread.
    pub last_activity_at: DateTime<Utc>,
    /// Labels currently applied to the thread (logged, never acted on).
    pub labels: Vec<String>,
    /// Subject of the first message (logged, never acted on).
    pub subject: String,
}

/// Mutation applied to a single thread.
///
/// Both operations move the thread out of the location the sweep queries
/// select on, so a mutated thread no longer matches the query that found it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOp {
    /// Move the thread out of the inbox.
    Archive,
    /// Move the thread to the trash.
    Trash,
}

impl MutationOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            MutationOp::Archive => "archive",
            MutationOp::Trash => "trash",
        }
    }
}

impl std::fmt::Display for MutationOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum MailStoreError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Mail store API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to decode mail store response: {0}")]
    Decode(String),

    #[error("Unsupported mail store operation: {0}")]
    Unsupported(String),
}

pub type MailStoreResult<T> = Result<T, MailStoreError>;

#[async_trait]
pub trait MailStore: Send + Sync {
    /// Search for threads matching `query`, returning at most `limit` threads
    /// starting at `offset`, in the store's own relevance/date order.
    async fn search(
        &self,
        query: &str,
        offset: usize,
        limit: usize,
    ) -> MailStoreResult<Vec<Thread>>;

    /// Apply `op` to the thread with id `thread_id`.
    ///
    /// Must be safe to call on a thread that was already moved: the
    /// continuation logic re-runs queries across invocations and relies on
    /// idempotent mutation.
    async fn mutate(&self, thread_id: &str, op: MutationOp) -> MailStoreResult<()>;
}
