//! Edit access for moderated documents
//!
//! Sources are scanned one by one instead of going through
//! [`crate::resolver::resolve`]: a single allowed or trusted source is enough
//! to edit unless another source blocks the user. Unverified sources do not
//! count against the user here.

use crate::error::Result;
use crate::lookup::RightsLookup;
use crate::types::{Account, ModeratedEntity, ModerationStatus, PostingRight};
use tracing::debug;

/// Whether `account` may edit `document` when it is in `status`
///
/// - anonymous accounts and unsaved documents are never editable
/// - a user blocked by any source may only edit their own draft
/// - otherwise the owner, or a user allowed or trusted by at least one of
///   the document's sources, may edit
pub async fn can_edit<D>(
    lookup: &RightsLookup,
    account: &Account,
    document: &D,
    status: ModerationStatus,
) -> Result<bool>
where
    D: ModeratedEntity + ?Sized,
{
    if account.is_anonymous() || document.id().is_none() {
        return Ok(false);
    }

    let owner = document
        .as_ownable()
        .and_then(|o| o.owner_id())
        .map_or(false, |id| id == account.id);

    let kind = document.kind();
    let sources = document
        .as_source_referencing()
        .map(|s| s.source_ids())
        .unwrap_or(&[]);

    let mut allowed = false;

    if kind.has_posting_rights() && !sources.is_empty() {
        for &source in sources {
            let right = lookup.right_for(account, source, kind).await?;

            if right == PostingRight::Blocked {
                debug!(
                    "User {} is blocked by source {}, owner={}, status={}",
                    account.id, source, owner, status
                );
                return Ok(owner && status == ModerationStatus::Draft);
            }

            if right.code() > PostingRight::Blocked.code() {
                allowed = true;
            }
        }
    }

    Ok(allowed || owner)
}

/// Whether `account` may edit `document` in its current moderation status
pub async fn can_edit_current<D>(lookup: &RightsLookup, account: &Account, document: &D) -> Result<bool>
where
    D: ModeratedEntity + ?Sized,
{
    can_edit(lookup, account, document, document.moderation_status()).await
}
