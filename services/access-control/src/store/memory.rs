//! In-memory implementation of the access-control store.
//!
//! # Purpose
//! Implements [`AccessControlStore`] with `HashMap`s guarded by
//! `tokio::sync::RwLock`, for local development, tests and single-process
//! deployments.
//!
//! # Durability and consistency
//! - Not durable: all state is lost on restart.
//! - Authoritative records and the search index are separate structures.
//!   Every write updates the record first and then indexes the resulting
//!   revision while still holding the record lock, so the index never lags
//!   behind a completed write.
//!
//! # Metrics
//! Keeps `access_control_groups_total` and `access_control_acls_total` gauges
//! current and counts group mutations by operation. Membership edits that
//! change nothing keep the current revision and are not counted.
use crate::observability::{
    ACLS_TOTAL, GROUPS_TOTAL, GroupMutation, record_group_mutation, record_live_documents,
};
use super::index::{AclIndexBody, IndexedDocument, SearchIndex};
use super::{
    AccessControlStore, ConceptRevision, StoreConfig, StoreError, StoreResult, StoredAcl,
    StoredGroup,
};
use async_trait::async_trait;
use catalog_acl::{Acl, AclSearchCriteria, Group, GroupSearchCriteria, Identity};
use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

/// Latest revision of a concept, tombstones included.
#[derive(Debug, Clone)]
struct Record<T> {
    seq: u64,
    revision_id: u64,
    revision_date: DateTime<Utc>,
    deleted: bool,
    value: T,
}

impl<T> Record<T> {
    fn new(seq: u64, value: T) -> Self {
        Self {
            seq,
            revision_id: 1,
            revision_date: Utc::now(),
            deleted: false,
            value,
        }
    }

    fn bump(&mut self) {
        self.revision_id += 1;
        self.revision_date = Utc::now();
    }

    fn tombstone(&mut self) {
        self.bump();
        self.deleted = true;
    }

    fn document<B>(&self, concept_id: &str, body: B) -> IndexedDocument<B> {
        IndexedDocument {
            concept_id: concept_id.to_string(),
            seq: self.seq,
            revision_id: self.revision_id,
            revision_date: self.revision_date,
            deleted: self.deleted,
            body,
        }
    }

    fn revision(&self, concept_id: &str) -> ConceptRevision {
        ConceptRevision {
            concept_id: concept_id.to_string(),
            revision_id: self.revision_id,
        }
    }
}

pub struct InMemoryStore {
    config: StoreConfig,
    providers: Arc<RwLock<BTreeSet<String>>>,
    /// `(provider_id, entry_title)` pairs.
    collections: Arc<RwLock<BTreeSet<(String, String)>>>,
    groups: Arc<RwLock<HashMap<String, Record<Group>>>>,
    acls: Arc<RwLock<HashMap<String, Record<Acl>>>>,
    group_index: Arc<RwLock<SearchIndex<Group>>>,
    acl_index: Arc<RwLock<SearchIndex<AclIndexBody>>>,
    next_group_seq: AtomicU64,
    next_acl_seq: AtomicU64,
}

impl InMemoryStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            providers: Arc::new(RwLock::new(BTreeSet::new())),
            collections: Arc::new(RwLock::new(BTreeSet::new())),
            groups: Arc::new(RwLock::new(HashMap::new())),
            acls: Arc::new(RwLock::new(HashMap::new())),
            group_index: Arc::new(RwLock::new(SearchIndex::new())),
            acl_index: Arc::new(RwLock::new(SearchIndex::new())),
            next_group_seq: AtomicU64::new(1),
            next_acl_seq: AtomicU64::new(1),
        }
    }

    fn allocate(&self, prefix: &str, counter: &AtomicU64) -> (u64, String) {
        let seq = counter.fetch_add(1, Ordering::SeqCst);
        (seq, format!("{prefix}{seq}-{}", self.config.concept_suffix))
    }

    async fn index_group(&self, concept_id: &str, record: &Record<Group>) {
        let mut index = self.group_index.write().await;
        index.index(record.document(concept_id, record.value.clone()));
        record_live_documents(GROUPS_TOTAL, index.live_count());
    }

    async fn index_acl(&self, concept_id: &str, record: &Record<Acl>) {
        let mut index = self.acl_index.write().await;
        index.index(record.document(concept_id, AclIndexBody::from_acl(record.value.clone())));
        record_live_documents(ACLS_TOTAL, index.live_count());
    }

    /// Tombstone live single-instance ACLs that govern `group_id`.
    async fn delete_acls_targeting(&self, group_id: &str) {
        let mut acls = self.acls.write().await;
        for (concept_id, record) in acls.iter_mut() {
            let targets_group = matches!(
                &record.value.identity,
                Identity::SingleInstance(identity) if identity.target_id == group_id
            );
            if targets_group && !record.deleted {
                record.tombstone();
                tracing::info!(%concept_id, group_id, "deleted acl targeting deleted group");
                self.index_acl(concept_id, record).await;
            }
        }
    }
}

fn live<'a, T>(records: &'a HashMap<String, Record<T>>, concept_id: &str) -> StoreResult<&'a Record<T>> {
    records
        .get(concept_id)
        .filter(|record| !record.deleted)
        .ok_or_else(|| StoreError::NotFound(concept_id.to_string()))
}

fn live_mut<'a, T>(
    records: &'a mut HashMap<String, Record<T>>,
    concept_id: &str,
) -> StoreResult<&'a mut Record<T>> {
    records
        .get_mut(concept_id)
        .filter(|record| !record.deleted)
        .ok_or_else(|| StoreError::NotFound(concept_id.to_string()))
}

fn group_scope(provider_id: Option<&str>) -> String {
    match provider_id {
        Some(provider_id) => format!("provider [{provider_id}]"),
        None => "the system level".to_string(),
    }
}

#[async_trait]
impl AccessControlStore for InMemoryStore {
    async fn add_provider(&self, provider_id: &str) -> StoreResult<()> {
        self.providers.write().await.insert(provider_id.to_string());
        Ok(())
    }

    async fn list_providers(&self) -> StoreResult<Vec<String>> {
        Ok(self.providers.read().await.iter().cloned().collect())
    }

    async fn provider_exists(&self, provider_id: &str) -> StoreResult<bool> {
        Ok(self.providers.read().await.contains(provider_id))
    }

    async fn add_collection(&self, provider_id: &str, entry_title: &str) -> StoreResult<()> {
        if !self.provider_exists(provider_id).await? {
            return Err(StoreError::NotFound(format!("provider {provider_id}")));
        }
        self.collections
            .write()
            .await
            .insert((provider_id.to_string(), entry_title.to_string()));
        Ok(())
    }

    async fn collection_exists(&self, provider_id: &str, entry_title: &str) -> StoreResult<bool> {
        Ok(self
            .collections
            .read()
            .await
            .contains(&(provider_id.to_string(), entry_title.to_string())))
    }

    async fn create_group(&self, mut group: Group) -> StoreResult<ConceptRevision> {
        group.dedupe_members();
        let mut groups = self.groups.write().await;
        let existing = groups.iter().find(|(_, record)| {
            !record.deleted
                && record.value.provider_id == group.provider_id
                && record.value.name.eq_ignore_ascii_case(&group.name)
        });
        if let Some((concept_id, _)) = existing {
            return Err(StoreError::Conflict(format!(
                "A group with name [{}] already exists with concept id [{concept_id}] for {}",
                group.name,
                group_scope(group.provider_id.as_deref())
            )));
        }

        let (seq, concept_id) = self.allocate("AG", &self.next_group_seq);
        let record = Record::new(seq, group);
        self.index_group(&concept_id, &record).await;
        let revision = record.revision(&concept_id);
        groups.insert(concept_id, record);
        record_group_mutation(GroupMutation::Created);
        Ok(revision)
    }

    async fn get_group(&self, concept_id: &str) -> StoreResult<StoredGroup> {
        let groups = self.groups.read().await;
        let record = live(&groups, concept_id)?;
        Ok(StoredGroup {
            concept_id: concept_id.to_string(),
            revision_id: record.revision_id,
            revision_date: record.revision_date,
            group: record.value.clone(),
        })
    }

    async fn update_group(&self, concept_id: &str, group: Group) -> StoreResult<ConceptRevision> {
        let mut groups = self.groups.write().await;
        let record = live_mut(&mut groups, concept_id)?;
        let members = std::mem::take(&mut record.value.members);
        record.value = Group { members, ..group };
        record.bump();
        self.index_group(concept_id, record).await;
        record_group_mutation(GroupMutation::Updated);
        Ok(record.revision(concept_id))
    }

    async fn delete_group(&self, concept_id: &str) -> StoreResult<ConceptRevision> {
        let revision = {
            let mut groups = self.groups.write().await;
            let record = live_mut(&mut groups, concept_id)?;
            record.tombstone();
            self.index_group(concept_id, record).await;
            record.revision(concept_id)
        };
        self.delete_acls_targeting(concept_id).await;
        record_group_mutation(GroupMutation::Deleted);
        Ok(revision)
    }

    async fn add_members(
        &self,
        concept_id: &str,
        members: Vec<String>,
    ) -> StoreResult<ConceptRevision> {
        let mut groups = self.groups.write().await;
        let record = live_mut(&mut groups, concept_id)?;
        if record.value.add_members(members) == 0 {
            return Ok(record.revision(concept_id));
        }
        record.bump();
        self.index_group(concept_id, record).await;
        record_group_mutation(GroupMutation::MembersAdded);
        Ok(record.revision(concept_id))
    }

    async fn remove_members(
        &self,
        concept_id: &str,
        members: Vec<String>,
    ) -> StoreResult<ConceptRevision> {
        let mut groups = self.groups.write().await;
        let record = live_mut(&mut groups, concept_id)?;
        if record.value.remove_members(members) == 0 {
            return Ok(record.revision(concept_id));
        }
        record.bump();
        self.index_group(concept_id, record).await;
        record_group_mutation(GroupMutation::MembersRemoved);
        Ok(record.revision(concept_id))
    }

    async fn search_groups(&self, criteria: &GroupSearchCriteria) -> StoreResult<Vec<StoredGroup>> {
        let index = self.group_index.read().await;
        Ok(index
            .search(|doc| criteria.matches(&doc.concept_id, &doc.body), criteria.limit)
            .into_iter()
            .map(|doc| StoredGroup {
                concept_id: doc.concept_id.clone(),
                revision_id: doc.revision_id,
                revision_date: doc.revision_date,
                group: doc.body.clone(),
            })
            .collect())
    }

    async fn create_acl(&self, acl: Acl) -> StoreResult<ConceptRevision> {
        let mut acls = self.acls.write().await;
        let key = acl.identity.uniqueness_key();
        let existing = acls
            .iter()
            .find(|(_, record)| !record.deleted && record.value.identity.uniqueness_key() == key);
        if let Some((concept_id, _)) = existing {
            return Err(StoreError::Conflict(format!(
                "An ACL for [{key}] already exists with concept id [{concept_id}]"
            )));
        }

        let (seq, concept_id) = self.allocate("ACL", &self.next_acl_seq);
        let record = Record::new(seq, acl);
        self.index_acl(&concept_id, &record).await;
        let revision = record.revision(&concept_id);
        acls.insert(concept_id, record);
        Ok(revision)
    }

    async fn get_acl(&self, concept_id: &str) -> StoreResult<StoredAcl> {
        let acls = self.acls.read().await;
        let record = live(&acls, concept_id)?;
        Ok(StoredAcl {
            concept_id: concept_id.to_string(),
            revision_id: record.revision_id,
            revision_date: record.revision_date,
            acl: record.value.clone(),
        })
    }

    async fn update_acl(&self, concept_id: &str, acl: Acl) -> StoreResult<ConceptRevision> {
        let mut acls = self.acls.write().await;
        let key = acl.identity.uniqueness_key();
        let clash = acls.iter().find(|(other_id, record)| {
            other_id.as_str() != concept_id
                && !record.deleted
                && record.value.identity.uniqueness_key() == key
        });
        if let Some((other_id, _)) = clash {
            return Err(StoreError::Conflict(format!(
                "An ACL for [{key}] already exists with concept id [{other_id}]"
            )));
        }

        let record = live_mut(&mut acls, concept_id)?;
        record.value = acl;
        record.bump();
        self.index_acl(concept_id, record).await;
        Ok(record.revision(concept_id))
    }

    async fn delete_acl(&self, concept_id: &str) -> StoreResult<ConceptRevision> {
        let mut acls = self.acls.write().await;
        let record = live_mut(&mut acls, concept_id)?;
        record.tombstone();
        self.index_acl(concept_id, record).await;
        Ok(record.revision(concept_id))
    }

    async fn search_acls(&self, criteria: &AclSearchCriteria) -> StoreResult<Vec<StoredAcl>> {
        let index = self.acl_index.read().await;
        Ok(index
            .search(|doc| doc.body.matches(criteria), criteria.limit)
            .into_iter()
            .map(|doc| StoredAcl {
                concept_id: doc.concept_id.clone(),
                revision_id: doc.revision_id,
                revision_date: doc.revision_date,
                acl: doc.body.acl.clone(),
            })
            .collect())
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
