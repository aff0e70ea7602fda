//! # ReliefWeb Posting Rights
//!
//! Consolidation of per-source posting rights and edit-access decisions for
//! moderated content (jobs, training, reports).
//!
//! ## Features
//!
//! - **Rights lookup** with request-scoped memoisation
//! - **Consolidation** of joint-source rights (blocked veto, trusted unanimity)
//! - **Edit access** rules for owners, drafts and blocked users
//! - **Pluggable storage**: in-memory or PostgreSQL (`postgres` feature)
//!
//! ## Example
//!
//! ```rust
//! use reliefweb_rights::{
//!     Account, ContentKind, InMemoryRightsStore, PostingRight, RightsConfig, RightsEngine,
//!     RightsRecord, RightsStore,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(InMemoryRightsStore::new());
//!     store.put(RightsRecord::new(10, 7).with_job(PostingRight::Trusted)).await?;
//!
//!     let engine = RightsEngine::new(RightsConfig::default(), store);
//!     let scope = engine.scope();
//!
//!     let right = scope.resolve(&Account::new(7), ContentKind::Job, &[10]).await?;
//!     assert_eq!(right.name(), "trusted");
//!
//!     Ok(())
//! }
//! ```

pub mod access;
pub mod config;
pub mod engine;
pub mod error;
pub mod lookup;
pub mod resolver;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use access::{can_edit, can_edit_current};
pub use config::RightsConfig;
pub use engine::{RequestScope, RightsEngine};
pub use error::{Result, RightsError};
pub use lookup::{LookupStats, RightsLookup, RightsMap};
pub use resolver::{consolidate, resolve, ConsolidatedRight};
pub use store::{InMemoryRightsStore, RightsStore};
#[cfg(feature = "postgres")]
pub use store::PostgresRightsStore;
pub use types::{
    Account, ContentKind, Document, DocumentId, HasSourceReferences, ModeratedEntity,
    ModerationStatus, Ownable, PostingRight, RightsRecord, SourceId, SourceRights, UserId,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
