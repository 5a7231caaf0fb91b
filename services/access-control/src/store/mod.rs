//! Storage contracts for groups, ACLs, providers and collections.
//!
//! # Purpose
//! Defines the store trait handlers and the collaborator adapter use, plus the
//! revisioned records it returns.
//!
//! # Key invariants
//! - Concept ids are allocated by the store and never reused.
//! - Every mutation bumps the concept's revision; deletes write a tombstone
//!   revision and later reads report not-found.
use async_trait::async_trait;
use catalog_acl::{Acl, AclSearchCriteria, Group, GroupSearchCriteria};
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

pub mod index;
pub mod memory;

#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Suffix of allocated concept ids, `CMR` in `AG1-CMR`.
    pub concept_suffix: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            concept_suffix: "CMR".to_string(),
        }
    }
}

/// Concept id and revision produced by a write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct ConceptRevision {
    pub concept_id: String,
    pub revision_id: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredGroup {
    pub concept_id: String,
    pub revision_id: u64,
    pub revision_date: DateTime<Utc>,
    pub group: Group,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredAcl {
    pub concept_id: String,
    pub revision_id: u64,
    pub revision_date: DateTime<Utc>,
    pub acl: Acl,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait AccessControlStore: Send + Sync {
    async fn add_provider(&self, provider_id: &str) -> StoreResult<()>;
    async fn list_providers(&self) -> StoreResult<Vec<String>>;
    async fn provider_exists(&self, provider_id: &str) -> StoreResult<bool>;
    async fn add_collection(&self, provider_id: &str, entry_title: &str) -> StoreResult<()>;
    async fn collection_exists(&self, provider_id: &str, entry_title: &str) -> StoreResult<bool>;

    async fn create_group(&self, group: Group) -> StoreResult<ConceptRevision>;
    async fn get_group(&self, concept_id: &str) -> StoreResult<StoredGroup>;
    /// Replace mutable group fields; members are left untouched.
    async fn update_group(&self, concept_id: &str, group: Group) -> StoreResult<ConceptRevision>;
    /// Tombstone the group and every single-instance ACL targeting it.
    async fn delete_group(&self, concept_id: &str) -> StoreResult<ConceptRevision>;
    async fn add_members(&self, concept_id: &str, members: Vec<String>)
    -> StoreResult<ConceptRevision>;
    async fn remove_members(
        &self,
        concept_id: &str,
        members: Vec<String>,
    ) -> StoreResult<ConceptRevision>;
    async fn search_groups(&self, criteria: &GroupSearchCriteria) -> StoreResult<Vec<StoredGroup>>;

    async fn create_acl(&self, acl: Acl) -> StoreResult<ConceptRevision>;
    async fn get_acl(&self, concept_id: &str) -> StoreResult<StoredAcl>;
    async fn update_acl(&self, concept_id: &str, acl: Acl) -> StoreResult<ConceptRevision>;
    async fn delete_acl(&self, concept_id: &str) -> StoreResult<ConceptRevision>;
    async fn search_acls(&self, criteria: &AclSearchCriteria) -> StoreResult<Vec<StoredAcl>>;

    async fn health_check(&self) -> StoreResult<()>;
    fn backend_name(&self) -> &'static str;
}
