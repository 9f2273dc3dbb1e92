//! # Redis
//!
//! Backing store for the invitation list and the RSVP records.
//!
//! ## Requirements
//!
//! - Exact, case-insensitive lookup of one guest name
//! - Substring search over a small list (a few hundred names)
//! - Append-only RSVP records, never updated or deleted here
//!
//! ## Implementation
//!
//! - Guests: one hash, `<prefix>:guests`, field is the lowercased name and value is the
//!   stored spelling. Lookup is a single `HGET`, search filters `HVALS` in process.
//! - Records: one list, `<prefix>:records`, each entry a JSON [`RsvpRecord`], `RPUSH`ed.
//! - Idempotency: `<prefix>:submission:<uuid>` claimed with `SET NX EX` and the record
//!   pushed in one Lua script, so a dropped request or a crash can never leave a claimed
//!   marker without its record. A failed push deletes the marker inside the same script.
//! - The guest hash is written out-of-band by the `seed` tool.
use std::{sync::LazyLock, time::Duration};

use async_trait::async_trait;
use invite::{RsvpRecord, name_key};
use redis::{
    AsyncCommands, Client, RedisError, Script,
    aio::{ConnectionManager, ConnectionManagerConfig},
};
use thiserror::Error;
use tokio::time::error::Elapsed;

use crate::{search::matching_names, utils::bounded};

pub const DEFAULT_PREFIX: &str = "rsvp";

// KEYS: marker, records. ARGV: ttl seconds, payload. Returns 1 if pushed, 0 if already claimed.
static APPEND_ONCE: LazyLock<Script> = LazyLock::new(|| {
    Script::new(
        r"
        if not redis.call('SET', KEYS[1], '1', 'NX', 'EX', ARGV[1]) then
            return 0
        end
        local pushed = redis.pcall('RPUSH', KEYS[2], ARGV[2])
        if type(pushed) == 'table' and pushed.err then
            redis.call('DEL', KEYS[1])
            return pushed
        end
        return 1
        ",
    )
});

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] RedisError),

    #[error("Store timed out: {0}")]
    Timeout(#[from] Elapsed),

    #[error("Malformed record: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Result of appending one record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Appended {
    Created,
    /// The submission id was already claimed; nothing was written.
    Duplicate,
}

/// Read-only view of the invitation list.
#[async_trait]
pub trait GuestDirectory: Send + Sync {
    /// Stored spelling of the guest whose name equals `candidate`, ignoring case
    /// and surrounding whitespace.
    async fn find(&self, candidate: &str) -> Result<Option<String>, StoreError>;

    /// Up to `limit` stored names containing `term`, ignoring case, in store order.
    async fn search(&self, term: &str, limit: usize) -> Result<Vec<String>, StoreError>;
}

#[async_trait]
pub trait RsvpStore: Send + Sync {
    async fn append(&self, record: &RsvpRecord) -> Result<Appended, StoreError>;
}

pub async fn init_redis(
    redis_url: &str,
    connect_timeout: Duration,
) -> Result<ConnectionManager, StoreError> {
    let config = ConnectionManagerConfig::new().set_number_of_retries(1);

    let client = Client::open(redis_url)?;
    let connection_manager = bounded(
        connect_timeout,
        async { Ok::<_, StoreError>(client.get_connection_manager_with_config(config).await?) },
    )
    .await?;

    Ok(connection_manager)
}

#[derive(Clone)]
pub struct RedisStore {
    connection: ConnectionManager,
    prefix: String,
    submission_ttl: Duration,
}

impl RedisStore {
    pub fn new(connection: ConnectionManager, prefix: &str, submission_ttl: Duration) -> Self {
        Self {
            connection,
            prefix: prefix.to_string(),
            submission_ttl,
        }
    }

    fn guests_key(&self) -> String {
        format!("{}:guests", self.prefix)
    }

    fn records_key(&self) -> String {
        format!("{}:records", self.prefix)
    }

    fn submission_key(&self, id: &uuid::Uuid) -> String {
        format!("{}:submission:{id}", self.prefix)
    }

    /// Drops the whole invitation list.
    pub async fn clear_guests(&self) -> Result<(), StoreError> {
        let mut connection = self.connection.clone();
        let _: usize = connection.del(self.guests_key()).await?;

        Ok(())
    }

    /// Adds or overwrites guests. Returns how many names were written.
    pub async fn insert_guests(&self, names: &[String]) -> Result<usize, StoreError> {
        let pairs: Vec<(String, &str)> = names
            .iter()
            .map(|name| (name_key(name), name.as_str()))
            .filter(|(key, _)| !key.is_empty())
            .collect();

        if pairs.is_empty() {
            return Ok(0);
        }

        let mut connection = self.connection.clone();
        let _: () = connection.hset_multiple(self.guests_key(), &pairs).await?;

        Ok(pairs.len())
    }

    pub async fn records(&self) -> Result<Vec<RsvpRecord>, StoreError> {
        let mut connection = self.connection.clone();
        let raw: Vec<String> = connection.lrange(self.records_key(), 0, -1).await?;

        raw.iter()
            .map(|entry| serde_json::from_str(entry).map_err(StoreError::from))
            .collect()
    }
}

#[async_trait]
impl GuestDirectory for RedisStore {
    async fn find(&self, candidate: &str) -> Result<Option<String>, StoreError> {
        let mut connection = self.connection.clone();
        let name: Option<String> = connection.hget(self.guests_key(), name_key(candidate)).await?;

        Ok(name)
    }

    async fn search(&self, term: &str, limit: usize) -> Result<Vec<String>, StoreError> {
        let mut connection = self.connection.clone();
        let names: Vec<String> = connection.hvals(self.guests_key()).await?;

        Ok(matching_names(names, term, limit))
    }
}

#[async_trait]
impl RsvpStore for RedisStore {
    async fn append(&self, record: &RsvpRecord) -> Result<Appended, StoreError> {
        let payload = serde_json::to_string(record)?;
        let mut connection = self.connection.clone();

        let Some(id) = record.submission_id else {
            let _: usize = connection.rpush(self.records_key(), payload).await?;
            return Ok(Appended::Created);
        };

        let pushed: i64 = APPEND_ONCE
            .key(self.submission_key(&id))
            .key(self.records_key())
            .arg(self.submission_ttl.as_secs().max(1))
            .arg(payload)
            .invoke_async(&mut connection)
            .await?;

        Ok(appended(pushed))
    }
}

fn appended(script_reply: i64) -> Appended {
    if script_reply == 0 {
        Appended::Duplicate
    } else {
        Appended::Created
    }
}
