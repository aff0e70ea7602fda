//! Posting-rights storage

use crate::error::Result;
use crate::types::{RightsRecord, SourceId, UserId};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(feature = "postgres")]
pub use postgres::PostgresRightsStore;

/// Rights store trait
///
/// Records are keyed by (source, user). Storage failures are returned as is
/// and never translated into a default right.
#[async_trait]
pub trait RightsStore: Send + Sync {
    /// Records of a user, restricted to `sources` when it is non-empty
    async fn fetch_rights(&self, user: UserId, sources: &[SourceId]) -> Result<Vec<RightsRecord>>;

    /// Records of every user on a source, ordered by user ID
    async fn fetch_source_rights(&self, source: SourceId) -> Result<Vec<RightsRecord>>;

    /// Insert or replace a record
    async fn put(&self, record: RightsRecord) -> Result<()>;
}

/// In-memory rights store implementation
pub struct InMemoryRightsStore {
    records: Arc<RwLock<HashMap<(SourceId, UserId), RightsRecord>>>,
    queries: AtomicUsize,
}

impl InMemoryRightsStore {
    /// Create a new in-memory rights store
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
            queries: AtomicUsize::new(0),
        }
    }

    /// Create a store seeded with records
    pub fn with_records(records: impl IntoIterator<Item = RightsRecord>) -> Self {
        let map: HashMap<(SourceId, UserId), RightsRecord> = records
            .into_iter()
            .map(|record| ((record.source_id, record.user_id), record))
            .collect();

        Self {
            records: Arc::new(RwLock::new(map)),
            queries: AtomicUsize::new(0),
        }
    }

    /// Number of read queries served so far
    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::Relaxed)
    }
}

impl Default for InMemoryRightsStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RightsStore for InMemoryRightsStore {
    async fn fetch_rights(&self, user: UserId, sources: &[SourceId]) -> Result<Vec<RightsRecord>> {
        self.queries.fetch_add(1, Ordering::Relaxed);

        let records = self.records.read().await;
        let mut rows: Vec<RightsRecord> = records
            .values()
            .filter(|r| r.user_id == user)
            .filter(|r| sources.is_empty() || sources.contains(&r.source_id))
            .copied()
            .collect();

        rows.sort_by_key(|r| r.source_id);
        Ok(rows)
    }

    async fn fetch_source_rights(&self, source: SourceId) -> Result<Vec<RightsRecord>> {
        self.queries.fetch_add(1, Ordering::Relaxed);

        let records = self.records.read().await;
        let mut rows: Vec<RightsRecord> = records
            .values()
            .filter(|r| r.source_id == source)
            .copied()
            .collect();

        rows.sort_by_key(|r| r.user_id);
        Ok(rows)
    }

    async fn put(&self, record: RightsRecord) -> Result<()> {
        let mut records = self.records.write().await;
        records.insert((record.source_id, record.user_id), record);
        Ok(())
    }
}
