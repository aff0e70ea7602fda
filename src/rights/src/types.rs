//! Core posting-rights types

use crate::error::{Result, RightsError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Source (organization) identifier
pub type SourceId = u64;

/// User identifier, 0 is the anonymous user
pub type UserId = u64;

/// Document identifier
pub type DocumentId = u64;

/// Acting user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Account {
    /// User ID (0 for anonymous)
    pub id: UserId,
}

impl Account {
    /// Create an account for the given user ID
    pub fn new(id: UserId) -> Self {
        Self { id }
    }

    /// The anonymous account
    pub fn anonymous() -> Self {
        Self { id: 0 }
    }

    /// Anonymous users never hold posting rights
    pub fn is_anonymous(&self) -> bool {
        self.id == 0
    }
}

/// Kind of moderated content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Job,
    Training,
    Report,
}

impl ContentKind {
    /// Whether sources record per-user posting rights for this kind
    pub fn has_posting_rights(&self) -> bool {
        matches!(self, ContentKind::Job | ContentKind::Training)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Job => "job",
            ContentKind::Training => "training",
            ContentKind::Report => "report",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentKind {
    type Err = RightsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "job" => Ok(ContentKind::Job),
            "training" => Ok(ContentKind::Training),
            "report" => Ok(ContentKind::Report),
            other => Err(RightsError::InvalidInput(format!("Unknown content kind: {}", other))),
        }
    }
}

/// Posting right of a user for a source and content kind
///
/// The numeric codes are the values persisted in the rights store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostingRight {
    /// No decision yet (code 0)
    #[default]
    Unverified,
    /// Not allowed to post (code 1)
    Blocked,
    /// Allowed to post, content is reviewed (code 2)
    Allowed,
    /// Allowed to post, content is published directly (code 3)
    Trusted,
}

impl PostingRight {
    /// All rights in code order
    pub const ALL: [PostingRight; 4] = [
        PostingRight::Unverified,
        PostingRight::Blocked,
        PostingRight::Allowed,
        PostingRight::Trusted,
    ];

    /// Map a stored code to a right. Unknown codes read as unverified.
    pub fn from_code(code: i64) -> Self {
        Self::try_from_code(code).unwrap_or_default()
    }

    /// Map a stored code to a right, `None` for unknown codes
    pub fn try_from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(PostingRight::Unverified),
            1 => Some(PostingRight::Blocked),
            2 => Some(PostingRight::Allowed),
            3 => Some(PostingRight::Trusted),
            _ => None,
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            PostingRight::Unverified => 0,
            PostingRight::Blocked => 1,
            PostingRight::Allowed => 2,
            PostingRight::Trusted => 3,
        }
    }

    /// Machine name
    pub fn name(&self) -> &'static str {
        match self {
            PostingRight::Unverified => "unverified",
            PostingRight::Blocked => "blocked",
            PostingRight::Allowed => "allowed",
            PostingRight::Trusted => "trusted",
        }
    }

    /// Human readable label
    pub fn label(&self) -> &'static str {
        match self {
            PostingRight::Unverified => "Unverified",
            PostingRight::Blocked => "Blocked",
            PostingRight::Allowed => "Allowed",
            PostingRight::Trusted => "Trusted",
        }
    }
}

impl fmt::Display for PostingRight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PostingRight {
    type Err = RightsError;

    /// Accepts a machine name or a numeric code
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Ok(code) = s.parse::<u8>() {
            return match code {
                0..=3 => Ok(PostingRight::from_code(code as i64)),
                _ => Err(RightsError::InvalidInput(format!("Unknown posting right code: {}", code))),
            };
        }

        PostingRight::ALL
            .into_iter()
            .find(|right| right.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| RightsError::InvalidInput(format!("Unknown posting right: {}", s)))
    }
}

/// Rights of one user on one source, per content kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SourceRights {
    #[serde(default)]
    pub job: PostingRight,

    #[serde(default)]
    pub training: PostingRight,
}

impl SourceRights {
    /// Right for a content kind. Kinds without posting rights are unverified.
    pub fn get(&self, kind: ContentKind) -> PostingRight {
        match kind {
            ContentKind::Job => self.job,
            ContentKind::Training => self.training,
            ContentKind::Report => PostingRight::Unverified,
        }
    }
}

/// One row of the rights store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RightsRecord {
    pub source_id: SourceId,
    pub user_id: UserId,

    #[serde(default)]
    pub job: PostingRight,

    #[serde(default)]
    pub training: PostingRight,
}

impl RightsRecord {
    /// Create a record with both rights unverified
    pub fn new(source_id: SourceId, user_id: UserId) -> Self {
        Self {
            source_id,
            user_id,
            job: PostingRight::Unverified,
            training: PostingRight::Unverified,
        }
    }

    pub fn with_job(mut self, right: PostingRight) -> Self {
        self.job = right;
        self
    }

    pub fn with_training(mut self, right: PostingRight) -> Self {
        self.training = right;
        self
    }

    /// Set the right for a content kind; ignored for kinds without rights
    pub fn with_right(self, kind: ContentKind, right: PostingRight) -> Self {
        match kind {
            ContentKind::Job => self.with_job(right),
            ContentKind::Training => self.with_training(right),
            ContentKind::Report => self,
        }
    }

    pub fn rights(&self) -> SourceRights {
        SourceRights {
            job: self.job,
            training: self.training,
        }
    }
}

/// Moderation workflow state of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModerationStatus {
    Draft,
    Pending,
    Published,
    OnHold,
    Refused,
    Expired,
    Duplicate,
    Archive,
    Embargoed,
    ToReview,
}

impl ModerationStatus {
    pub const ALL: [ModerationStatus; 10] = [
        ModerationStatus::Draft,
        ModerationStatus::Pending,
        ModerationStatus::Published,
        ModerationStatus::OnHold,
        ModerationStatus::Refused,
        ModerationStatus::Expired,
        ModerationStatus::Duplicate,
        ModerationStatus::Archive,
        ModerationStatus::Embargoed,
        ModerationStatus::ToReview,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModerationStatus::Draft => "draft",
            ModerationStatus::Pending => "pending",
            ModerationStatus::Published => "published",
            ModerationStatus::OnHold => "on-hold",
            ModerationStatus::Refused => "refused",
            ModerationStatus::Expired => "expired",
            ModerationStatus::Duplicate => "duplicate",
            ModerationStatus::Archive => "archive",
            ModerationStatus::Embargoed => "embargoed",
            ModerationStatus::ToReview => "to-review",
        }
    }
}

impl fmt::Display for ModerationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModerationStatus {
    type Err = RightsError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        ModerationStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| RightsError::InvalidInput(format!("Unknown moderation status: {}", s)))
    }
}

/// Entity with an owner
pub trait Ownable {
    fn owner_id(&self) -> Option<UserId>;
}

/// Entity referencing sources
pub trait HasSourceReferences {
    fn source_ids(&self) -> &[SourceId];
}

/// Moderated content entity
///
/// Optional capabilities are exposed through `as_ownable` and
/// `as_source_referencing`; an entity without a capability is treated as
/// having no owner or no sources.
pub trait ModeratedEntity {
    /// Persisted ID, `None` for new entities
    fn id(&self) -> Option<DocumentId>;

    fn kind(&self) -> ContentKind;

    fn moderation_status(&self) -> ModerationStatus;

    fn as_ownable(&self) -> Option<&dyn Ownable> {
        None
    }

    fn as_source_referencing(&self) -> Option<&dyn HasSourceReferences> {
        None
    }
}

/// Moderated document (job, training or report)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Persisted ID (`None` until saved)
    #[serde(default)]
    pub id: Option<DocumentId>,

    pub kind: ContentKind,

    pub status: ModerationStatus,

    /// Owner user ID, if the document tracks ownership
    #[serde(default)]
    pub owner: Option<UserId>,

    /// Associated sources, if the document has a source field
    #[serde(default)]
    pub sources: Option<Vec<SourceId>>,
}

impl Document {
    /// Create an unsaved document without owner or sources
    pub fn new(kind: ContentKind, status: ModerationStatus) -> Self {
        Self {
            id: None,
            kind,
            status,
            owner: None,
            sources: None,
        }
    }

    pub fn with_id(mut self, id: DocumentId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_owner(mut self, owner: UserId) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn with_sources(mut self, sources: Vec<SourceId>) -> Self {
        self.sources = Some(sources);
        self
    }
}

impl Ownable for Document {
    fn owner_id(&self) -> Option<UserId> {
        self.owner
    }
}

impl HasSourceReferences for Document {
    fn source_ids(&self) -> &[SourceId] {
        self.sources.as_deref().unwrap_or(&[])
    }
}

impl ModeratedEntity for Document {
    fn id(&self) -> Option<DocumentId> {
        self.id
    }

    fn kind(&self) -> ContentKind {
        self.kind
    }

    fn moderation_status(&self) -> ModerationStatus {
        self.status
    }

    fn as_ownable(&self) -> Option<&dyn Ownable> {
        self.owner.map(|_| self as &dyn Ownable)
    }

    fn as_source_referencing(&self) -> Option<&dyn HasSourceReferences> {
        self.sources.as_ref().map(|_| self as &dyn HasSourceReferences)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_posting_right_codes() {
        for right in PostingRight::ALL {
            assert_eq!(PostingRight::from_code(right.code() as i64), right);
        }

        assert_eq!(PostingRight::from_code(42), PostingRight::Unverified);
        assert_eq!(PostingRight::from_code(-1), PostingRight::Unverified);
        assert_eq!(PostingRight::default(), PostingRight::Unverified);

        assert_eq!(PostingRight::try_from_code(0), Some(PostingRight::Unverified));
        assert_eq!(PostingRight::try_from_code(3), Some(PostingRight::Trusted));
        assert_eq!(PostingRight::try_from_code(4), None);
    }

    #[test]
    fn test_posting_right_parsing() {
        assert_eq!("trusted".parse::<PostingRight>().unwrap(), PostingRight::Trusted);
        assert_eq!("Blocked".parse::<PostingRight>().unwrap(), PostingRight::Blocked);
        assert_eq!("2".parse::<PostingRight>().unwrap(), PostingRight::Allowed);
        assert!("7".parse::<PostingRight>().is_err());
        assert!("superuser".parse::<PostingRight>().is_err());
    }

    #[test]
    fn test_posting_right_serde() {
        let json = serde_json::to_string(&PostingRight::Allowed).unwrap();
        assert_eq!(json, "\"allowed\"");
        assert_eq!(PostingRight::Trusted.label(), "Trusted");
    }

    #[test]
    fn test_content_kind() {
        assert!(ContentKind::Job.has_posting_rights());
        assert!(ContentKind::Training.has_posting_rights());
        assert!(!ContentKind::Report.has_posting_rights());
        assert_eq!(" Job ".parse::<ContentKind>().unwrap(), ContentKind::Job);
        assert!("blog".parse::<ContentKind>().is_err());
    }

    #[test]
    fn test_source_rights_per_kind() {
        let rights = RightsRecord::new(1, 2)
            .with_job(PostingRight::Trusted)
            .with_training(PostingRight::Blocked)
            .rights();

        assert_eq!(rights.get(ContentKind::Job), PostingRight::Trusted);
        assert_eq!(rights.get(ContentKind::Training), PostingRight::Blocked);
        assert_eq!(rights.get(ContentKind::Report), PostingRight::Unverified);
    }

    #[test]
    fn test_moderation_status_parsing() {
        assert_eq!("on-hold".parse::<ModerationStatus>().unwrap(), ModerationStatus::OnHold);
        assert_eq!("TO_REVIEW".parse::<ModerationStatus>().unwrap(), ModerationStatus::ToReview);
        assert_eq!(ModerationStatus::Draft.to_string(), "draft");
        assert!("deleted".parse::<ModerationStatus>().is_err());
    }

    #[test]
    fn test_document_capabilities() {
        let bare = Document::new(ContentKind::Job, ModerationStatus::Draft);
        assert!(bare.as_ownable().is_none());
        assert!(bare.as_source_referencing().is_none());

        let doc = Document::new(ContentKind::Job, ModerationStatus::Draft)
            .with_id(5)
            .with_owner(9)
            .with_sources(vec![1, 2]);

        assert_eq!(doc.as_ownable().and_then(|o| o.owner_id()), Some(9));
        assert_eq!(doc.as_source_referencing().map(|s| s.source_ids()), Some(&[1, 2][..]));
    }

    #[test]
    fn test_account() {
        assert!(Account::anonymous().is_anonymous());
        assert!(Account::default().is_anonymous());
        assert!(!Account::new(3).is_anonymous());
    }
}
