//! Scripted in-memory collaborators for sweep tests.

use std::{
    collections::VecDeque,
    sync::{
        Mutex,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::{
    mailstore::{MailStore, MailStoreError, MailStoreResult, MutationOp, Thread},
    scheduler::{
        SchedulerError, SchedulerResult, Trigger, TriggerSchedule, TriggerScheduler,
    },
};

/// A thread whose newest message is `age_days` old.
pub fn thread(id: &str, age_days: i64) -> Thread {
    Thread {
        id: id.to_string(),
        last_activity_at: Utc::now() - Duration::days(age_days),
        labels: vec!["INBOX".to_string()],
        subject: format!("thread {id}"),
    }
}

/// Mail store that serves a scripted sequence of pages and records every
/// query and mutation it sees.
#[derive(Default)]
pub struct ScriptedMailStore {
    pages: Mutex<VecDeque<Vec<Thread>>>,
    pub queries: Mutex<Vec<String>>,
    pub mutations: Mutex<Vec<(String, MutationOp)>>,
    fail_mutation_on: Mutex<Option<String>>,
}

impl ScriptedMailStore {
    pub fn new(pages: Vec<Vec<Thread>>) -> Self {
        Self {
            pages: Mutex::new(pages.into()),
            ..Default::default()
        }
    }

    /// Make the mutation of the thread with this id fail.
    pub fn fail_mutation_on(&self, thread_id: &str) {
        *self.fail_mutation_on.lock().unwrap() = Some(thread_id.to_string());
    }

    pub fn recorded_queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }

    pub fn recorded_mutations(&self) -> Vec<(String, MutationOp)> {
        self.mutations.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailStore for ScriptedMailStore {
    async fn search(
        &self,
        query: &str,
        _offset: usize,
        limit: usize,
    ) -> MailStoreResult<Vec<Thread>> {
        self.queries.lock().unwrap().push(query.to_string());
        let mut page = self
            .pages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default();
        page.truncate(limit);
        Ok(page)
    }

    async fn mutate(&self, thread_id: &str, op: MutationOp) -> MailStoreResult<()> {
        if self.fail_mutation_on.lock().unwrap().as_deref() == Some(thread_id) {
            return Err(MailStoreError::Api {
                status: 500,
                message: format!("simulated failure mutating {thread_id}"),
            });
        }
        self.mutations
            .lock()
            .unwrap()
            .push((thread_id.to_string(), op));
        Ok(())
    }
}

/// In-memory trigger registry recording every installed trigger.
#[derive(Default)]
pub struct RecordingScheduler {
    triggers: Mutex<Vec<Trigger>>,
    next_id: AtomicU64,
    fail_next_create: AtomicBool,
}

impl RecordingScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preload an arbitrary trigger, as if installed by a past invocation.
    pub fn push(&self, trigger: Trigger) {
        self.triggers.lock().unwrap().push(trigger);
    }

    /// Make the next create call fail.
    pub fn fail_next_create(&self) {
        self.fail_next_create.store(true, Ordering::SeqCst);
    }

    pub fn pending_for(&self, handler: &str) -> Vec<Trigger> {
        self.triggers
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.handler == handler)
            .cloned()
            .collect()
    }

    pub fn all(&self) -> Vec<Trigger> {
        self.triggers.lock().unwrap().clone()
    }

    fn create(&self, handler: &str, schedule: TriggerSchedule) -> SchedulerResult<Trigger> {
        if self.fail_next_create.swap(false, Ordering::SeqCst) {
            return Err(SchedulerError::Io(std::io::Error::other(
                "simulated scheduler failure",
            )));
        }
        let id = format!("trigger-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        let trigger = Trigger {
            id,
            handler: handler.to_string(),
            schedule,
        };
        self.triggers.lock().unwrap().push(trigger.clone());
        Ok(trigger)
    }
}

#[async_trait]
impl TriggerScheduler for RecordingScheduler {
    async fn create_periodic(
        &self,
        handler: &str,
        interval_days: u32,
    ) -> SchedulerResult<Trigger> {
        self.create(
            handler,
            TriggerSchedule::Periodic {
                interval_days,
                next_fire_at: Utc::now() + Duration::days(i64::from(interval_days)),
            },
        )
    }

    async fn create_one_shot(
        &self,
        handler: &str,
        fire_at: DateTime<Utc>,
    ) -> SchedulerResult<Trigger> {
        self.create(handler, TriggerSchedule::OneShot { fire_at })
    }

    async fn list(&self) -> SchedulerResult<Vec<Trigger>> {
        Ok(self.all())
    }

    async fn delete(&self, id: &str) -> SchedulerResult<()> {
        let mut triggers = self.triggers.lock().unwrap();
        let before = triggers.len();
        triggers.retain(|t| t.id != id);
        if triggers.len() == before {
            return Err(SchedulerError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn mark_fired(&self, id: &str, now: DateTime<Utc>) -> SchedulerResult<()> {
        let mut triggers = self.triggers.lock().unwrap();
        let trigger = triggers
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| SchedulerError::NotFound(id.to_string()))?;
        if let TriggerSchedule::Periodic {
            interval_days,
            next_fire_at,
        } = &mut trigger.schedule
        {
            *next_fire_at = now + Duration::days(i64::from(*interval_days));
        }
        Ok(())
    }
}
