use std::{
    collections::HashSet,
    sync::atomic::{AtomicBool, AtomicU64, Ordering},
    time::Duration,
};

use async_trait::async_trait;
use invite::{RsvpRecord, name_key};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    database::{Appended, GuestDirectory, RsvpStore, StoreError},
    search::matching_names,
};

/// In-process stand-in for Redis with the same lookup, search and append rules.
#[derive(Default)]
pub struct MemoryStore {
    pub guests: Mutex<Vec<String>>,
    pub records: Mutex<Vec<RsvpRecord>>,
    pub submissions: Mutex<HashSet<Uuid>>,
    unavailable: AtomicBool,
    failing_writes: AtomicBool,
    lookups: AtomicU64,
    latency: Option<Duration>,
}

impl MemoryStore {
    pub fn with_guests<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            guests: Mutex::new(names.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    /// Every call sleeps this long before answering.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// While set, every call fails with [`StoreError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// While set, appends claim their submission id and then fail to write the record.
    pub fn set_failing_writes(&self, failing: bool) {
        self.failing_writes.store(failing, Ordering::SeqCst);
    }

    /// Guest lookups and searches that reached the store.
    pub fn lookups(&self) -> u64 {
        self.lookups.load(Ordering::SeqCst)
    }

    pub async fn records(&self) -> Vec<RsvpRecord> {
        self.records.lock().await.clone()
    }

    async fn reach(&self) -> Result<(), StoreError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store switched off".to_string()));
        }

        Ok(())
    }
}

#[async_trait]
impl GuestDirectory for MemoryStore {
    async fn find(&self, candidate: &str) -> Result<Option<String>, StoreError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.reach().await?;

        let key = name_key(candidate);
        let guests = self.guests.lock().await;

        Ok(guests.iter().find(|name| name_key(name) == key).cloned())
    }

    async fn search(&self, term: &str, limit: usize) -> Result<Vec<String>, StoreError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.reach().await?;

        let guests = self.guests.lock().await;

        Ok(matching_names(guests.iter().cloned(), term, limit))
    }
}

#[async_trait]
impl RsvpStore for MemoryStore {
    async fn append(&self, record: &RsvpRecord) -> Result<Appended, StoreError> {
        self.reach().await?;

        // Claim and write happen under one lock, like the Redis script.
        let mut submissions = self.submissions.lock().await;
        if let Some(id) = record.submission_id {
            if !submissions.insert(id) {
                return Ok(Appended::Duplicate);
            }
        }

        if self.failing_writes.load(Ordering::SeqCst) {
            if let Some(id) = record.submission_id {
                submissions.remove(&id);
            }
            return Err(StoreError::Unavailable("record write failed".to_string()));
        }

        self.records.lock().await.push(record.clone());

        Ok(Appended::Created)
    }
}
