//! Request-scoped posting-rights lookup
//!
//! `RightsLookup` reads raw per-source rights for a user from a
//! [`RightsStore`] and memoises the result per `(user, sorted sources)` for
//! as long as the lookup lives. A lookup is meant to be owned by a single
//! logical request: there is no invalidation, dropping it drops the cache.

use crate::error::Result;
use crate::store::RightsStore;
use crate::types::{Account, ContentKind, PostingRight, RightsRecord, SourceId, SourceRights, UserId};
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Rights of a user keyed by source
pub type RightsMap = BTreeMap<SourceId, SourceRights>;

/// Cache key for rights lookups
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
struct CacheKey {
    user: UserId,
    /// Sorted, deduplicated source IDs
    sources: Vec<SourceId>,
}

impl CacheKey {
    fn new(user: UserId, sources: &[SourceId]) -> Self {
        let mut sources = sources.to_vec();
        sources.sort_unstable();
        sources.dedup();

        Self { user, sources }
    }
}

/// Posting-rights lookup with per-request memoisation
pub struct RightsLookup {
    store: Arc<dyn RightsStore>,

    /// Memoised results, `None` when caching is disabled
    cache: Option<DashMap<CacheKey, RightsMap>>,

    stats: DashMap<&'static str, usize>,
}

impl RightsLookup {
    /// Create a lookup with memoisation enabled
    pub fn new(store: Arc<dyn RightsStore>) -> Self {
        Self::with_cache(store, true)
    }

    /// Create a lookup, optionally without memoisation
    pub fn with_cache(store: Arc<dyn RightsStore>, enabled: bool) -> Self {
        Self {
            store,
            cache: enabled.then(DashMap::new),
            stats: DashMap::new(),
        }
    }

    /// Rights of the account on the given sources
    ///
    /// With an empty `sources` slice every record of the user is returned.
    /// Requested sources without a record are reported as unverified for
    /// every content kind. Anonymous accounts never hit the store.
    pub async fn get_rights(&self, account: &Account, sources: &[SourceId]) -> Result<RightsMap> {
        let key = CacheKey::new(account.id, sources);

        if let Some(cache) = &self.cache {
            if let Some(cached) = cache.get(&key) {
                self.increment_stat("hits");
                return Ok(cached.clone());
            }
            self.increment_stat("misses");
        }

        let records = if account.is_anonymous() {
            debug!("Anonymous account, skipping rights store");
            Vec::new()
        } else {
            self.store.fetch_rights(account.id, &key.sources).await?
        };

        let mut rights: RightsMap = records
            .into_iter()
            .map(|record| (record.source_id, record.rights()))
            .collect();

        for &source in &key.sources {
            rights.entry(source).or_default();
        }

        debug!(
            "Loaded rights for user {} on {} source(s)",
            account.id,
            rights.len()
        );

        if let Some(cache) = &self.cache {
            cache.insert(key, rights.clone());
        }

        Ok(rights)
    }

    /// Right of the account on one source for a content kind
    pub async fn right_for(
        &self,
        account: &Account,
        source: SourceId,
        kind: ContentKind,
    ) -> Result<PostingRight> {
        let rights = self.get_rights(account, &[source]).await?;
        Ok(rights
            .get(&source)
            .map(|r| r.get(kind))
            .unwrap_or_default())
    }

    /// Every user's record on a source, ordered by user ID (not memoised)
    pub async fn rights_for_source(&self, source: SourceId) -> Result<Vec<RightsRecord>> {
        self.store.fetch_source_rights(source).await
    }

    /// Get lookup statistics
    pub fn stats(&self) -> LookupStats {
        LookupStats {
            hits: self.get_stat("hits"),
            misses: self.get_stat("misses"),
            entries: self.cache.as_ref().map(|c| c.len()).unwrap_or(0),
        }
    }

    fn increment_stat(&self, key: &'static str) {
        self.stats
            .entry(key)
            .and_modify(|count| *count += 1)
            .or_insert(1);
    }

    fn get_stat(&self, key: &'static str) -> usize {
        self.stats.get(key).map(|v| *v).unwrap_or(0)
    }
}

/// Lookup cache statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LookupStats {
    pub hits: usize,
    pub misses: usize,
    pub entries: usize,
}

impl LookupStats {
    /// Calculate cache hit rate
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryRightsStore;

    fn store() -> Arc<InMemoryRightsStore> {
        Arc::new(InMemoryRightsStore::with_records(vec![
            RightsRecord::new(1, 7)
                .with_job(PostingRight::Trusted)
                .with_training(PostingRight::Allowed),
            RightsRecord::new(2, 7).with_job(PostingRight::Blocked),
            RightsRecord::new(3, 8).with_job(PostingRight::Allowed),
        ]))
    }

    #[tokio::test]
    async fn test_synthesizes_missing_sources() {
        let lookup = RightsLookup::new(store());

        let rights = lookup.get_rights(&Account::new(7), &[1, 4]).await.unwrap();
        assert_eq!(rights.len(), 2);
        assert_eq!(rights[&1].job, PostingRight::Trusted);
        assert_eq!(rights[&4], SourceRights::default());
    }

    #[tokio::test]
    async fn test_empty_sources_returns_all_user_rows() {
        let lookup = RightsLookup::new(store());

        let rights = lookup.get_rights(&Account::new(7), &[]).await.unwrap();
        let sources: Vec<SourceId> = rights.keys().copied().collect();
        assert_eq!(sources, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_anonymous_never_queries_store() {
        let store = store();
        let lookup = RightsLookup::new(store.clone());

        let rights = lookup.get_rights(&Account::anonymous(), &[1, 2]).await.unwrap();
        assert!(rights.values().all(|r| *r == SourceRights::default()));
        assert!(lookup.get_rights(&Account::anonymous(), &[]).await.unwrap().is_empty());
        assert_eq!(store.queries(), 0);
    }

    #[tokio::test]
    async fn test_memoised_per_sorted_source_set() {
        let store = store();
        let lookup = RightsLookup::new(store.clone());
        let account = Account::new(7);

        let first = lookup.get_rights(&account, &[2, 1]).await.unwrap();
        let second = lookup.get_rights(&account, &[1, 2, 2]).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(store.queries(), 1);

        let stats = lookup.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
        assert!((stats.hit_rate() - 0.5).abs() < f64::EPSILON);

        // A different user is a different key
        lookup.get_rights(&Account::new(8), &[1, 2]).await.unwrap();
        assert_eq!(store.queries(), 2);
    }

    #[tokio::test]
    async fn test_cache_disabled() {
        let store = store();
        let lookup = RightsLookup::with_cache(store.clone(), false);
        let account = Account::new(7);

        lookup.get_rights(&account, &[1]).await.unwrap();
        lookup.get_rights(&account, &[1]).await.unwrap();
        assert_eq!(store.queries(), 2);
        assert_eq!(lookup.stats(), LookupStats::default());
    }

    #[tokio::test]
    async fn test_right_for() {
        let lookup = RightsLookup::new(store());
        let account = Account::new(7);

        assert_eq!(
            lookup.right_for(&account, 1, ContentKind::Training).await.unwrap(),
            PostingRight::Allowed
        );
        assert_eq!(
            lookup.right_for(&account, 2, ContentKind::Job).await.unwrap(),
            PostingRight::Blocked
        );
        assert_eq!(
            lookup.right_for(&account, 1, ContentKind::Report).await.unwrap(),
            PostingRight::Unverified
        );
        assert_eq!(
            lookup.right_for(&account, 99, ContentKind::Job).await.unwrap(),
            PostingRight::Unverified
        );
    }

    #[tokio::test]
    async fn test_rights_for_source() {
        let lookup = RightsLookup::new(store());

        let rows = lookup.rights_for_source(1).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].user_id, 7);
    }
}
