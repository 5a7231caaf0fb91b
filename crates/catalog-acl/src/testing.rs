//! In-crate fake collaborator used by unit tests.
use crate::errors::{DependencyError, LookupResult};
use crate::lookups::{
    AclSearchCriteria, CatalogLookups, GroupSearchCriteria, GroupSummary,
};
use crate::model::{
    Acl, CatalogItemIdentity, CollectionIdentifier, Grantee, Group, GroupPermission, Identity,
    ProviderIdentity, SingleInstanceIdentity, UserType,
};
use crate::permission::Permission;
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Default)]
pub struct FakeLookups {
    providers: BTreeSet<String>,
    collections: BTreeSet<(String, String)>,
    groups: Vec<(String, Group)>,
    tokens: HashMap<String, String>,
    acls: Vec<Acl>,
    unavailable: bool,
    loose_group_search: bool,
    acl_searches: AtomicUsize,
}

impl FakeLookups {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_provider(mut self, provider_id: &str) -> Self {
        self.providers.insert(provider_id.to_string());
        self
    }

    pub fn with_collection(mut self, provider_id: &str, entry_title: &str) -> Self {
        self.collections
            .insert((provider_id.to_string(), entry_title.to_string()));
        self
    }

    pub fn with_group(mut self, concept_id: &str, provider_id: Option<&str>, members: &[&str]) -> Self {
        self.groups.push((
            concept_id.to_string(),
            Group {
                name: concept_id.to_string(),
                provider_id: provider_id.map(str::to_string),
                description: "test group".to_string(),
                legacy_guid: None,
                members: members.iter().map(|m| m.to_string()).collect(),
            },
        ));
        self
    }

    pub fn with_token(mut self, token: &str, user: &str) -> Self {
        self.tokens.insert(token.to_string(), user.to_string());
        self
    }

    pub fn with_acl(mut self, acl: Acl) -> Self {
        self.acls.push(acl);
        self
    }

    /// Every lookup fails as if the backing service were down.
    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }

    /// Group search ignores the member filter, like a fuzzy index would.
    pub fn loose_group_search(mut self) -> Self {
        self.loose_group_search = true;
        self
    }

    pub fn acl_searches(&self) -> usize {
        self.acl_searches.load(Ordering::SeqCst)
    }

    fn check(&self) -> LookupResult<()> {
        if self.unavailable {
            return Err(DependencyError::Unavailable {
                service: "search",
                message: "connection refused".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogLookups for FakeLookups {
    async fn collection_exists(&self, provider_id: &str, entry_title: &str) -> LookupResult<bool> {
        self.check()?;
        Ok(self
            .collections
            .contains(&(provider_id.to_string(), entry_title.to_string())))
    }

    async fn provider_exists(&self, provider_id: &str) -> LookupResult<bool> {
        self.check()?;
        Ok(self.providers.contains(provider_id))
    }

    async fn list_providers(&self) -> LookupResult<Vec<String>> {
        self.check()?;
        Ok(self.providers.iter().cloned().collect())
    }

    async fn group_exists(&self, concept_id: &str) -> LookupResult<bool> {
        self.check()?;
        Ok(self.groups.iter().any(|(id, _)| id == concept_id))
    }

    async fn search_groups(
        &self,
        criteria: &GroupSearchCriteria,
    ) -> LookupResult<Vec<GroupSummary>> {
        self.check()?;
        Ok(self
            .groups
            .iter()
            .filter(|(id, group)| {
                if self.loose_group_search {
                    let unfiltered = GroupSearchCriteria {
                        member: None,
                        ..criteria.clone()
                    };
                    return unfiltered.matches(id, group);
                }
                criteria.matches(id, group)
            })
            .map(|(id, group)| GroupSummary {
                concept_id: id.clone(),
                provider_id: group.provider_id.clone(),
                members: group.members.clone(),
            })
            .collect())
    }

    async fn resolve_user(&self, token: &str) -> LookupResult<String> {
        self.check()?;
        self.tokens
            .get(token)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("token [{token}] does not exist").into())
    }

    async fn search_acls(&self, criteria: &AclSearchCriteria) -> LookupResult<Vec<Acl>> {
        self.check()?;
        self.acl_searches.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .acls
            .iter()
            .filter(|acl| criteria.matches(acl))
            .cloned()
            .collect())
    }
}

pub fn group_grant(group_id: &str, permissions: &[Permission]) -> GroupPermission {
    GroupPermission {
        grantee: Grantee::Group {
            group_id: group_id.to_string(),
        },
        permissions: permissions.to_vec(),
    }
}

pub fn user_type_grant(user_type: UserType, permissions: &[Permission]) -> GroupPermission {
    GroupPermission {
        grantee: Grantee::UserType { user_type },
        permissions: permissions.to_vec(),
    }
}

pub fn provider_acl(provider_id: &str, target: &str, grants: Vec<GroupPermission>) -> Acl {
    Acl::new(
        Identity::Provider(ProviderIdentity {
            provider_id: provider_id.to_string(),
            target: target.to_string(),
        }),
        grants,
    )
}

pub fn group_management_acl(target_id: &str, grants: Vec<GroupPermission>) -> Acl {
    Acl::new(
        Identity::SingleInstance(SingleInstanceIdentity {
            target_id: target_id.to_string(),
            target: "GROUP_MANAGEMENT".to_string(),
        }),
        grants,
    )
}

/// Catalog-item ACL applicable to collections, with the given entry titles.
pub fn catalog_item_acl(provider_id: &str, entry_titles: &[&str]) -> Acl {
    Acl::new(
        Identity::CatalogItem(CatalogItemIdentity {
            name: "test catalog item".to_string(),
            provider_id: provider_id.to_string(),
            collection_applicable: true,
            collection_identifier: Some(CollectionIdentifier {
                entry_titles: entry_titles.iter().map(|t| t.to_string()).collect(),
                access_value: None,
                temporal: None,
            }),
            granule_applicable: false,
            granule_identifier: None,
        }),
        vec![user_type_grant(UserType::Guest, &[Permission::Read])],
    )
}
