//! Consolidation of per-source posting rights
//!
//! A document can be posted jointly by several sources. The user's rights on
//! each of them are reduced to a single right with the following precedence:
//!
//! 1. blocked on any source
//! 2. unverified on any source
//! 3. trusted on every source
//! 4. allowed otherwise

use crate::error::Result;
use crate::lookup::RightsLookup;
use crate::types::{Account, ContentKind, PostingRight, SourceId};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use tracing::debug;

/// Consolidated right of a user over a set of sources
///
/// `sources` holds the sources that determined the right: the blocked or
/// unverified ones for those rights, every source otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsolidatedRight {
    pub right: PostingRight,
    pub sources: Vec<SourceId>,
}

impl ConsolidatedRight {
    pub fn new(right: PostingRight, sources: Vec<SourceId>) -> Self {
        Self { right, sources }
    }

    /// Unverified right over the given sources
    pub fn unverified(sources: &[SourceId]) -> Self {
        Self::new(PostingRight::Unverified, sources.to_vec())
    }

    pub fn code(&self) -> u8 {
        self.right.code()
    }

    pub fn name(&self) -> &'static str {
        self.right.name()
    }
}

impl Serialize for ConsolidatedRight {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ConsolidatedRight", 3)?;
        state.serialize_field("code", &self.code())?;
        state.serialize_field("name", self.name())?;
        state.serialize_field("sources", &self.sources)?;
        state.end()
    }
}

/// Reduce per-source rights to a single right
///
/// `right_of` is called once per entry of `sources`; the order of `sources`
/// is kept in the returned source list.
pub fn consolidate<F>(sources: &[SourceId], right_of: F) -> ConsolidatedRight
where
    F: Fn(SourceId) -> PostingRight,
{
    if sources.is_empty() {
        return ConsolidatedRight::unverified(sources);
    }

    let mut unverified = Vec::new();
    let mut blocked = Vec::new();
    let mut trusted = 0usize;

    for &source in sources {
        match right_of(source) {
            PostingRight::Unverified => unverified.push(source),
            PostingRight::Blocked => blocked.push(source),
            PostingRight::Allowed => {}
            PostingRight::Trusted => trusted += 1,
        }
    }

    if !blocked.is_empty() {
        ConsolidatedRight::new(PostingRight::Blocked, blocked)
    } else if !unverified.is_empty() {
        ConsolidatedRight::new(PostingRight::Unverified, unverified)
    } else if trusted == sources.len() {
        ConsolidatedRight::new(PostingRight::Trusted, sources.to_vec())
    } else {
        ConsolidatedRight::new(PostingRight::Allowed, sources.to_vec())
    }
}

/// Consolidated right of an account for a content kind over a set of sources
///
/// Kinds without posting rights, anonymous accounts and empty source sets
/// resolve to unverified without touching the lookup.
pub async fn resolve(
    lookup: &RightsLookup,
    account: &Account,
    kind: ContentKind,
    sources: &[SourceId],
) -> Result<ConsolidatedRight> {
    if !kind.has_posting_rights() || account.is_anonymous() || sources.is_empty() {
        return Ok(ConsolidatedRight::unverified(sources));
    }

    let rights = lookup.get_rights(account, sources).await?;
    let consolidated = consolidate(sources, |source| {
        rights
            .get(&source)
            .map(|r| r.get(kind))
            .unwrap_or_default()
    });

    debug!(
        "User {} is {} for {} on sources {:?}",
        account.id,
        consolidated.name(),
        kind,
        consolidated.sources
    );

    Ok(consolidated)
}
