//! Collaborator traits: the database connection and the key-value cache.
//!
//! Both are object-safe async traits so a [`Db`](crate::db::Db) can hold them
//! as `Arc<dyn …>`. [`MemoryCache`] is an in-process [`Cache`].

use crate::error::GateResult;
use crate::value::{Row, Value};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Result of one executed statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Statement {
    rows: Vec<Row>,
    insert_id: Option<u64>,
    affected_rows: u64,
}

impl Statement {
    pub fn new() -> Self {
        Self::default()
    }

    /// Statement that returned `rows`.
    pub fn with_rows(rows: Vec<Row>) -> Self {
        Self {
            affected_rows: rows.len() as u64,
            rows,
            insert_id: None,
        }
    }

    pub fn with_insert_id(mut self, id: u64) -> Self {
        self.insert_id = Some(id);
        self
    }

    pub fn with_affected_rows(mut self, affected: u64) -> Self {
        self.affected_rows = affected;
        self
    }

    /// All returned rows.
    pub fn fetch_all_assoc(&self) -> &[Row] {
        &self.rows
    }

    /// First returned row.
    pub fn fetch_assoc(&self) -> Option<&Row> {
        self.rows.first()
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    /// Auto-increment id generated by an INSERT; `None` when nothing was generated.
    pub fn insert_id(&self) -> Option<u64> {
        self.insert_id.filter(|id| *id != 0)
    }

    pub fn affected_rows(&self) -> u64 {
        self.affected_rows
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }
}

/// A connection to the store.
///
/// `types` carries one wire type character per parameter (`i`, `f`, `b`, `s`).
/// Preparation, timeouts and retries are the implementation's business.
#[async_trait::async_trait]
pub trait Connection: Send + Sync {
    /// Prepare, bind and execute one statement.
    async fn execute(&self, sql: &str, params: &[Value], types: &str) -> GateResult<Statement>;

    /// Execute and return every row.
    async fn fetch_all_assoc(
        &self,
        sql: &str,
        params: &[Value],
        types: &str,
    ) -> GateResult<Vec<Row>> {
        Ok(self.execute(sql, params, types).await?.into_rows())
    }
}

/// Key-value store used to memoize schema metadata.
#[async_trait::async_trait]
pub trait Cache: Send + Sync {
    async fn get(&self, key: &str) -> GateResult<Option<String>>;

    /// Store `value`; a zero `ttl` never expires.
    async fn set(&self, key: &str, value: String, ttl: Duration) -> GateResult<()>;

    /// Remove `key`, reporting whether it was present.
    async fn delete(&self, key: &str) -> GateResult<bool>;
}

#[derive(Debug)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// In-process [`Cache`] with per-entry TTL. Expired entries are pruned on every read.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.lock().values().filter(|e| !e.is_expired(now)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        // The map stays consistent even if a holder panicked.
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait::async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> GateResult<Option<String>> {
        let now = Instant::now();
        let mut entries = self.lock();
        entries.retain(|_, e| !e.is_expired(now));
        Ok(entries.get(key).map(|e| e.value.clone()))
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> GateResult<()> {
        let expires_at = (!ttl.is_zero()).then(|| Instant::now() + ttl);
        self.lock()
            .insert(key.to_string(), Entry { value, expires_at });
        Ok(())
    }

    async fn delete(&self, key: &str) -> GateResult<bool> {
        Ok(self.lock().remove(key).is_some())
    }
}
