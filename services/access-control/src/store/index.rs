//! Revisioned search index.
//!
//! # Purpose
//! Holds the searchable view of groups and ACLs. Documents carry the
//! concept's revision and a write only applies when its revision is greater
//! than or equal to the indexed one, so a slow writer can never roll a
//! document back.
//!
//! # Notes
//! ACL documents denormalize identity type, target, provider and permitted
//! security identifiers so searches never re-derive them from the ACL body.
use catalog_acl::{Acl, AclSearchCriteria, IdentityType};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct IndexedDocument<T> {
    pub concept_id: String,
    /// Allocation order of the concept id; search results are sorted by it.
    pub seq: u64,
    pub revision_id: u64,
    pub revision_date: DateTime<Utc>,
    pub deleted: bool,
    pub body: T,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexOutcome {
    Applied,
    /// The index already holds a newer revision; the write was dropped.
    Stale,
}

#[derive(Debug)]
pub struct SearchIndex<T> {
    docs: HashMap<String, IndexedDocument<T>>,
}

impl<T> Default for SearchIndex<T> {
    fn default() -> Self {
        Self {
            docs: HashMap::new(),
        }
    }
}

impl<T> SearchIndex<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index(&mut self, doc: IndexedDocument<T>) -> IndexOutcome {
        if let Some(existing) = self.docs.get(&doc.concept_id) {
            if existing.revision_id > doc.revision_id {
                tracing::debug!(
                    concept_id = %doc.concept_id,
                    indexed = existing.revision_id,
                    incoming = doc.revision_id,
                    "skipping stale index write"
                );
                return IndexOutcome::Stale;
            }
        }
        self.docs.insert(doc.concept_id.clone(), doc);
        IndexOutcome::Applied
    }

    pub fn search<F>(&self, predicate: F, limit: Option<usize>) -> Vec<&IndexedDocument<T>>
    where
        F: Fn(&IndexedDocument<T>) -> bool,
    {
        let mut hits: Vec<_> = self
            .docs
            .values()
            .filter(|doc| !doc.deleted && predicate(doc))
            .collect();
        hits.sort_by_key(|doc| doc.seq);
        if let Some(limit) = limit {
            hits.truncate(limit);
        }
        hits
    }

    pub fn live_count(&self) -> usize {
        self.docs.values().filter(|doc| !doc.deleted).count()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AclIndexBody {
    pub identity_type: IdentityType,
    pub target: Option<String>,
    pub provider_id: Option<String>,
    pub permitted_sids: Vec<String>,
    pub acl: Acl,
}

impl AclIndexBody {
    pub fn from_acl(acl: Acl) -> Self {
        Self {
            identity_type: acl.identity_type(),
            target: acl.identity.target().map(str::to_string),
            provider_id: acl.identity.provider_id().map(str::to_string),
            permitted_sids: acl.permitted_sids(),
            acl,
        }
    }

    pub fn matches(&self, criteria: &AclSearchCriteria) -> bool {
        if criteria.provider_id.is_some() && criteria.provider_id != self.provider_id {
            return false;
        }
        if criteria
            .identity_type
            .is_some_and(|identity_type| identity_type != self.identity_type)
        {
            return false;
        }
        if criteria.target.is_some() && criteria.target != self.target {
            return false;
        }
        if let Some(sid) = &criteria.permitted_group {
            if !self.permitted_sids.contains(sid) {
                return false;
            }
        }
        true
    }
}
