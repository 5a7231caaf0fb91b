//! Collaborator contracts consumed by the validation core.
//!
//! # Purpose and responsibility
//! The core owns no state. Everything it needs to know about the catalog
//! (providers, collections, groups, existing ACLs, token owners) is read
//! through [`CatalogLookups`].
//!
//! # Key invariants and assumptions
//! - Every method is a read; implementations must not mutate on lookup.
//! - Failures surface as [`DependencyError`](crate::DependencyError) and are
//!   never converted into validation messages by the core.
use crate::errors::LookupResult;
use crate::model::{Acl, Group, IdentityType};
use async_trait::async_trait;

/// Per-request inputs that are not part of the validated document.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Raw caller token; `None` means an anonymous (guest) caller.
    pub token: Option<String>,
}

impl RequestContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }
}

/// Filter for ACL searches. Unset fields do not constrain the result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AclSearchCriteria {
    pub provider_id: Option<String>,
    pub identity_type: Option<IdentityType>,
    pub target: Option<String>,
    /// Group concept id or user type that must receive some permission.
    pub permitted_group: Option<String>,
    pub limit: Option<usize>,
}

impl AclSearchCriteria {
    pub fn for_provider(provider_id: impl Into<String>) -> Self {
        Self {
            provider_id: Some(provider_id.into()),
            ..Self::default()
        }
    }

    pub fn matches(&self, acl: &Acl) -> bool {
        if let Some(provider_id) = &self.provider_id {
            if acl.identity.provider_id() != Some(provider_id.as_str()) {
                return false;
            }
        }
        if let Some(identity_type) = self.identity_type {
            if acl.identity_type() != identity_type {
                return false;
            }
        }
        if let Some(target) = &self.target {
            if acl.identity.target() != Some(target.as_str()) {
                return false;
            }
        }
        if let Some(sid) = &self.permitted_group {
            if !acl.permitted_sids().iter().any(|permitted| permitted == sid) {
                return false;
            }
        }
        true
    }
}

/// Filter for group searches. Unset fields do not constrain the result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupSearchCriteria {
    pub provider_id: Option<String>,
    pub member: Option<String>,
    /// Case-insensitive exact name match.
    pub name: Option<String>,
    pub concept_ids: Vec<String>,
    pub limit: Option<usize>,
}

impl GroupSearchCriteria {
    pub fn with_member(member: impl Into<String>) -> Self {
        Self {
            member: Some(member.into()),
            ..Self::default()
        }
    }

    pub fn matches(&self, concept_id: &str, group: &Group) -> bool {
        if let Some(provider_id) = &self.provider_id {
            if group.provider_id.as_deref() != Some(provider_id.as_str()) {
                return false;
            }
        }
        if let Some(member) = &self.member {
            if !group.has_member(member) {
                return false;
            }
        }
        if let Some(name) = &self.name {
            if !group.name.eq_ignore_ascii_case(name) {
                return false;
            }
        }
        if !self.concept_ids.is_empty() && !self.concept_ids.iter().any(|id| id == concept_id) {
            return false;
        }
        true
    }
}

/// Group search hit.
///
/// `members` confirms membership when computing security identifiers and
/// `provider_id` scopes group administration checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSummary {
    pub concept_id: String,
    pub provider_id: Option<String>,
    pub members: Vec<String>,
}

#[async_trait]
pub trait CatalogLookups: Send + Sync {
    async fn collection_exists(&self, provider_id: &str, entry_title: &str) -> LookupResult<bool>;
    async fn provider_exists(&self, provider_id: &str) -> LookupResult<bool>;
    async fn list_providers(&self) -> LookupResult<Vec<String>>;
    async fn group_exists(&self, concept_id: &str) -> LookupResult<bool>;
    async fn search_groups(&self, criteria: &GroupSearchCriteria)
    -> LookupResult<Vec<GroupSummary>>;
    /// Resolve a caller token to a user id.
    async fn resolve_user(&self, token: &str) -> LookupResult<String>;
    async fn search_acls(&self, criteria: &AclSearchCriteria) -> LookupResult<Vec<Acl>>;
}
