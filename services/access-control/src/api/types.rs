//! HTTP API request/response types.
//!
//! # Purpose
//! Defines payload shapes for the access-control REST API and OpenAPI schema
//! generation. ACL documents pass through as opaque JSON objects.
use crate::store::{StoredAcl, StoredGroup};
use catalog_acl::{AclDocument, Group};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct HealthStatus {
    pub status: String,
    pub backend: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
pub struct FieldErrors {
    /// Dotted field path; empty for document-level messages.
    pub path: String,
    pub errors: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    pub request_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldErrors>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct GroupRequest {
    pub name: String,
    #[serde(default)]
    pub provider_id: Option<String>,
    pub description: String,
    #[serde(default)]
    pub legacy_guid: Option<String>,
    /// Initial members; ignored on update.
    #[serde(default)]
    pub members: Vec<String>,
}

impl GroupRequest {
    pub fn into_group(self) -> Group {
        let mut group = Group {
            name: self.name,
            provider_id: self.provider_id,
            description: self.description,
            legacy_guid: self.legacy_guid,
            members: self.members,
        };
        group.dedupe_members();
        group
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct GroupResponse {
    pub concept_id: String,
    pub revision_id: u64,
    pub revision_date: DateTime<Utc>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legacy_guid: Option<String>,
    pub members: Vec<String>,
}

impl From<StoredGroup> for GroupResponse {
    fn from(stored: StoredGroup) -> Self {
        Self {
            concept_id: stored.concept_id,
            revision_id: stored.revision_id,
            revision_date: stored.revision_date,
            name: stored.group.name,
            provider_id: stored.group.provider_id,
            description: stored.group.description,
            legacy_guid: stored.group.legacy_guid,
            members: stored.group.members,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct GroupListResponse {
    pub hits: usize,
    pub items: Vec<GroupResponse>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct AclResponse {
    pub concept_id: String,
    pub revision_id: u64,
    pub revision_date: DateTime<Utc>,
    pub identity_type: String,
    #[schema(value_type = Object)]
    pub acl: AclDocument,
}

impl From<StoredAcl> for AclResponse {
    fn from(stored: StoredAcl) -> Self {
        Self {
            concept_id: stored.concept_id,
            revision_id: stored.revision_id,
            revision_date: stored.revision_date,
            identity_type: stored.acl.identity_type().to_string(),
            acl: stored.acl.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct AclListResponse {
    pub hits: usize,
    pub items: Vec<AclResponse>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct ProviderListResponse {
    pub items: Vec<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GroupSearchParams {
    pub provider_id: Option<String>,
    /// User id that must be a member.
    pub member: Option<String>,
    /// Case-insensitive exact name.
    pub name: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AclSearchParams {
    pub provider_id: Option<String>,
    /// `system_identity`, `provider_identity`, `single_instance_identity` or
    /// `catalog_item_identity`; the short forms without `_identity` also work.
    pub identity_type: Option<String>,
    pub target: Option<String>,
    /// Group concept id or user type (`guest`, `registered`).
    pub permitted_group: Option<String>,
    pub limit: Option<usize>,
}
