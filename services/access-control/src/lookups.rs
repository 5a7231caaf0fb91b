//! Store-backed implementation of the validation collaborators.
use crate::store::{AccessControlStore, StoreError};
use async_trait::async_trait;
use catalog_acl::lookups::GroupSummary;
use catalog_acl::{
    Acl, AclSearchCriteria, CatalogLookups, DependencyError, GroupSearchCriteria, LookupResult,
};
use std::collections::HashMap;
use std::sync::Arc;

/// Maps caller tokens to user ids.
#[derive(Debug, Clone, Default)]
pub struct TokenTable {
    tokens: HashMap<String, String>,
}

impl TokenTable {
    pub fn new(tokens: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            tokens: tokens.into_iter().collect(),
        }
    }

    pub fn user_for(&self, token: &str) -> Option<&str> {
        self.tokens.get(token).map(String::as_str)
    }
}

fn dependency_error(err: StoreError) -> DependencyError {
    match err {
        StoreError::Unexpected(err) => DependencyError::Unexpected(err),
        other => DependencyError::Unexpected(anyhow::Error::new(other)),
    }
}

pub struct StoreLookups {
    store: Arc<dyn AccessControlStore + Send + Sync>,
    tokens: Arc<TokenTable>,
}

impl StoreLookups {
    pub fn new(store: Arc<dyn AccessControlStore + Send + Sync>, tokens: Arc<TokenTable>) -> Self {
        Self { store, tokens }
    }
}

#[async_trait]
impl CatalogLookups for StoreLookups {
    async fn collection_exists(&self, provider_id: &str, entry_title: &str) -> LookupResult<bool> {
        self.store
            .collection_exists(provider_id, entry_title)
            .await
            .map_err(dependency_error)
    }

    async fn provider_exists(&self, provider_id: &str) -> LookupResult<bool> {
        self.store
            .provider_exists(provider_id)
            .await
            .map_err(dependency_error)
    }

    async fn list_providers(&self) -> LookupResult<Vec<String>> {
        self.store.list_providers().await.map_err(dependency_error)
    }

    async fn group_exists(&self, concept_id: &str) -> LookupResult<bool> {
        match self.store.get_group(concept_id).await {
            Ok(_) => Ok(true),
            Err(StoreError::NotFound(_)) => Ok(false),
            Err(err) => Err(dependency_error(err)),
        }
    }

    async fn search_groups(
        &self,
        criteria: &GroupSearchCriteria,
    ) -> LookupResult<Vec<GroupSummary>> {
        let groups = self
            .store
            .search_groups(criteria)
            .await
            .map_err(dependency_error)?;
        Ok(groups
            .into_iter()
            .map(|stored| GroupSummary {
                concept_id: stored.concept_id,
                provider_id: stored.group.provider_id,
                members: stored.group.members,
            })
            .collect())
    }

    async fn resolve_user(&self, token: &str) -> LookupResult<String> {
        self.tokens
            .user_for(token)
            .map(str::to_string)
            .ok_or_else(|| DependencyError::Unavailable {
                service: "token",
                message: "token does not exist".to_string(),
            })
    }

    async fn search_acls(&self, criteria: &AclSearchCriteria) -> LookupResult<Vec<Acl>> {
        let acls = self
            .store
            .search_acls(criteria)
            .await
            .map_err(dependency_error)?;
        Ok(acls.into_iter().map(|stored| stored.acl).collect())
    }
}
