//! Posting-rights engine
//!
//! Owns the shared rights store and configuration, and hands out request
//! scopes. Each scope owns its own [`RightsLookup`], so memoised rights live
//! exactly as long as the request that loaded them.
//!
//! ```text
//! RightsEngine ──scope()──▶ RequestScope ──▶ RightsLookup ──▶ RightsStore
//!                               │                 ▲
//!                               ├── resolve() ────┤
//!                               └── can_edit() ───┘
//! ```

use crate::access;
use crate::config::RightsConfig;
use crate::error::Result;
use crate::lookup::{LookupStats, RightsLookup, RightsMap};
use crate::resolver::{self, ConsolidatedRight};
use crate::store::RightsStore;
use crate::types::{Account, ContentKind, ModeratedEntity, ModerationStatus, RightsRecord, SourceId};
use std::sync::Arc;
use tracing::info;

/// Main posting-rights engine
pub struct RightsEngine {
    store: Arc<dyn RightsStore>,
    config: RightsConfig,
}

impl RightsEngine {
    /// Create a new engine over the given store
    pub fn new(config: RightsConfig, store: Arc<dyn RightsStore>) -> Self {
        info!("RightsEngine initialized with cache={}", config.cache.enabled);

        Self { store, config }
    }

    /// Start a request scope with an empty lookup cache
    pub fn scope(&self) -> RequestScope {
        RequestScope {
            lookup: RightsLookup::with_cache(self.store.clone(), self.config.cache.enabled),
        }
    }

    pub fn config(&self) -> &RightsConfig {
        &self.config
    }
}

/// Rights evaluation for one logical request
pub struct RequestScope {
    lookup: RightsLookup,
}

impl RequestScope {
    /// Consolidated right of the account for a kind over a set of sources
    pub async fn resolve(
        &self,
        account: &Account,
        kind: ContentKind,
        sources: &[SourceId],
    ) -> Result<ConsolidatedRight> {
        resolver::resolve(&self.lookup, account, kind, sources).await
    }

    /// Whether the account may edit the document in the given status
    pub async fn can_edit<D>(&self, account: &Account, document: &D, status: ModerationStatus) -> Result<bool>
    where
        D: ModeratedEntity + ?Sized,
    {
        access::can_edit(&self.lookup, account, document, status).await
    }

    /// Whether the account may edit the document in its current status
    pub async fn can_edit_current<D>(&self, account: &Account, document: &D) -> Result<bool>
    where
        D: ModeratedEntity + ?Sized,
    {
        access::can_edit_current(&self.lookup, account, document).await
    }

    /// Raw per-source rights of the account
    pub async fn get_rights(&self, account: &Account, sources: &[SourceId]) -> Result<RightsMap> {
        self.lookup.get_rights(account, sources).await
    }

    /// Every user's record on a source
    pub async fn rights_for_source(&self, source: SourceId) -> Result<Vec<RightsRecord>> {
        self.lookup.rights_for_source(source).await
    }

    /// Get lookup cache statistics
    pub fn cache_stats(&self) -> LookupStats {
        self.lookup.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryRightsStore;
    use crate::types::{Document, PostingRight};

    #[tokio::test]
    async fn test_scopes_do_not_share_cache() {
        let store = Arc::new(InMemoryRightsStore::with_records(vec![
            RightsRecord::new(1, 7).with_job(PostingRight::Allowed),
        ]));
        let engine = RightsEngine::new(RightsConfig::default(), store.clone());
        let account = Account::new(7);

        let first = engine.scope();
        first.resolve(&account, ContentKind::Job, &[1]).await.unwrap();
        first.resolve(&account, ContentKind::Job, &[1]).await.unwrap();
        assert_eq!(store.queries(), 1);
        assert_eq!(first.cache_stats().hits, 1);

        // Changes made between requests are visible to the next scope
        store
            .put(RightsRecord::new(1, 7).with_job(PostingRight::Blocked))
            .await
            .unwrap();

        let stale = first.resolve(&account, ContentKind::Job, &[1]).await.unwrap();
        assert_eq!(stale.right, PostingRight::Allowed);

        let second = engine.scope();
        let fresh = second.resolve(&account, ContentKind::Job, &[1]).await.unwrap();
        assert_eq!(fresh.right, PostingRight::Blocked);
        assert_eq!(store.queries(), 2);
    }

    #[tokio::test]
    async fn test_scope_can_edit() {
        let store = Arc::new(InMemoryRightsStore::with_records(vec![
            RightsRecord::new(1, 7).with_training(PostingRight::Trusted),
        ]));
        let engine = RightsEngine::new(RightsConfig::default(), store);
        let scope = engine.scope();

        let doc = Document::new(ContentKind::Training, ModerationStatus::Published)
            .with_id(10)
            .with_owner(8)
            .with_sources(vec![1]);

        assert!(scope.can_edit_current(&Account::new(7), &doc).await.unwrap());
        assert!(!scope.can_edit_current(&Account::new(9), &doc).await.unwrap());
    }

    #[tokio::test]
    async fn test_cache_disabled_by_config() {
        let store = Arc::new(InMemoryRightsStore::new());
        let mut config = RightsConfig::default();
        config.cache.enabled = false;

        let engine = RightsEngine::new(config, store.clone());
        let scope = engine.scope();
        let account = Account::new(7);

        scope.get_rights(&account, &[1]).await.unwrap();
        scope.get_rights(&account, &[1]).await.unwrap();
        assert_eq!(store.queries(), 2);
        assert!(!engine.config().cache.enabled);
    }
}
