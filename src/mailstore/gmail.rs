//! Gmail REST API backend for the mail store boundary.
//!
//! Search maps to `threads.list` plus a metadata `threads.get` per result to
//! resolve last-activity timestamps, labels, and the subject. Archival
//! removes the `INBOX` label via `threads.modify`; purging moves the thread
//! to the trash via `threads.trash`. Both mutations are idempotent on the
//! Gmail side, which the sweep logic depends on.

use async_trait::async_trait;
use chrono::DateTime;
use serde::Deserialize;

use super::{MailStore, MailStoreError, MailStoreResult, MutationOp, Thread};
use crate::config::MailStoreConfig;

/// Mail store backed by the Gmail REST API.
///
/// Authenticates with a static bearer token; the base URL is configurable so
/// tests can point the client at a local mock server.
pub struct GmailMailStore {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl GmailMailStore {
    pub fn new(config: &MailStoreConfig) -> MailStoreResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.bearer_token.clone(),
        })
    }

    async fn check_status(response: reqwest::Response) -> MailStoreResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(MailStoreError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn fetch_thread(&self, id: &str) -> MailStoreResult<Thread> {
        let url = format!("{}/users/me/threads/{}", self.base_url, id);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .query(&[("format", "metadata"), ("metadataHeaders", "Subject")])
            .send()
            .await?;
        let response = Self::check_status(response).await?;
        let detail: ThreadDetail = response.json().await?;
        thread_from_detail(detail)
    }
}

#[async_trait]
impl MailStore for GmailMailStore {
    async fn search(
        &self,
        query: &str,
        offset: usize,
        limit: usize,
    ) -> MailStoreResult<Vec<Thread>> {
        // The Gmail API pages by opaque token, not offset. The batch
        // processor always asks for the first page, which needs no token.
        if offset != 0 {
            return Err(MailStoreError::Unsupported(
                "the Gmail backend only supports searches from offset 0".into(),
            ));
        }

        let max_results = limit.to_string();
        let url = format!("{}/users/me/threads", self.base_url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .query(&[("q", query), ("maxResults", max_results.as_str())])
            .send()
            .await?;
        let response = Self::check_status(response).await?;
        let list: ThreadListResponse = response.json().await?;

        // threads.list only returns ids and snippets; one metadata get per
        // thread resolves the fields the cutoff gate and logging need. Pages
        // are bounded by the configured page size, so this stays small.
        let mut threads = Vec::with_capacity(list.threads.len().min(limit));
        for thread_ref in list.threads.into_iter().take(limit) {
            threads.push(self.fetch_thread(&thread_ref.id).await?);
        }
        Ok(threads)
    }

    async fn mutate(&self, thread_id: &str, op: MutationOp) -> MailStoreResult<()> {
        let request = match op {
            MutationOp::Archive => {
                let url = format!("{}/users/me/threads/{}/modify", self.base_url, thread_id);
                self.client
                    .post(&url)
                    .bearer_auth(&self.token)
                    .json(&serde_json::json!({ "removeLabelIds": ["INBOX"] }))
            }
            MutationOp::Trash => {
                let url = format!("{}/users/me/threads/{}/trash", self.base_url, thread_id);
                self.client.post(&url).bearer_auth(&self.token)
            }
        };

        let response = request.send().await?;
        Self::check_status(response).await?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct ThreadListResponse {
    #[serde(default)]
    threads: Vec<ThreadRef>,
}

#[derive(Debug, Deserialize)]
struct ThreadRef {
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThreadDetail {
    id: String,
    #[serde(default)]
    messages: Vec<MessageMeta>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageMeta {
    /// Milliseconds since the epoch, as a string, per the Gmail wire format.
    #[serde(default)]
    internal_date: Option<String>,
    #[serde(default)]
    label_ids: Vec<String>,
    #[serde(default)]
    payload: Option<MessagePayload>,
}

#[derive(Debug, Deserialize)]
struct MessagePayload {
    #[serde(default)]
    headers: Vec<MessageHeader>,
}

#[derive(Debug, Deserialize)]
struct MessageHeader {
    name: String,
    value: String,
}

fn thread_from_detail(detail: ThreadDetail) -> MailStoreResult<Thread> {
    let last_activity_ms = detail
        .messages
        .iter()
        .filter_map(|m| m.internal_date.as_deref())
        .filter_map(|d| d.parse::<i64>().ok())
        .max()
        .ok_or_else(|| {
            MailStoreError::Decode(format!("thread {} has no message timestamps", detail.id))
        })?;

    let last_activity_at = DateTime::from_timestamp_millis(last_activity_ms).ok_or_else(|| {
        MailStoreError::Decode(format!("thread {} has an out-of-range timestamp", detail.id))
    })?;

    let mut labels = Vec::new();
    for message in &detail.messages {
        for label in &message.label_ids {
            if !labels.contains(label) {
                labels.push(label.clone());
            }
        }
    }

    let subject = detail
        .messages
        .first()
        .and_then(|m| m.payload.as_ref())
        .and_then(|p| {
            p.headers
                .iter()
                .find(|h| h.name.eq_ignore_ascii_case("Subject"))
        })
        .map(|h| h.value.clone())
        .unwrap_or_default();

    Ok(Thread {
        id: detail.id,
        last_activity_at,
        labels,
        subject,
    })
}
