//! ACL model definitions.
//!
//! # Purpose
//! Defines the identity variants, catalog-item identifiers, and group-permission
//! entries that make up an ACL, plus the wire document they are decoded from.
//!
//! # Key invariants
//! - An [`Acl`] always carries exactly one identity variant. The wire form
//!   ([`AclDocument`]) may carry zero or several; conversion rejects both.
//! - Identity type is derived from the variant and never stored separately.
use crate::permission::Permission;
use crate::validator::{FieldPath, ValidationErrors};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const SYSTEM_IDENTITY: &str = "system_identity";
pub const PROVIDER_IDENTITY: &str = "provider_identity";
pub const SINGLE_INSTANCE_IDENTITY: &str = "single_instance_identity";
pub const CATALOG_ITEM_IDENTITY: &str = "catalog_item_identity";

/// Identity-type tag derived from the populated identity variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IdentityType {
    #[serde(rename = "system_identity")]
    System,
    #[serde(rename = "provider_identity")]
    Provider,
    #[serde(rename = "single_instance_identity")]
    SingleInstance,
    #[serde(rename = "catalog_item_identity")]
    CatalogItem,
}

impl IdentityType {
    /// Field name of the identity variant in the ACL document.
    pub fn field_name(self) -> &'static str {
        match self {
            IdentityType::System => SYSTEM_IDENTITY,
            IdentityType::Provider => PROVIDER_IDENTITY,
            IdentityType::SingleInstance => SINGLE_INSTANCE_IDENTITY,
            IdentityType::CatalogItem => CATALOG_ITEM_IDENTITY,
        }
    }

    /// Human readable name used in diagnostics.
    pub fn display_name(self) -> &'static str {
        match self {
            IdentityType::System => "System",
            IdentityType::Provider => "Provider",
            IdentityType::SingleInstance => "Single instance",
            IdentityType::CatalogItem => "Catalog item",
        }
    }
}

impl std::fmt::Display for IdentityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.field_name())
    }
}

impl std::str::FromStr for IdentityType {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            SYSTEM_IDENTITY | "system" => Ok(IdentityType::System),
            PROVIDER_IDENTITY | "provider" => Ok(IdentityType::Provider),
            SINGLE_INSTANCE_IDENTITY | "single_instance" => Ok(IdentityType::SingleInstance),
            CATALOG_ITEM_IDENTITY | "catalog_item" => Ok(IdentityType::CatalogItem),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemIdentity {
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderIdentity {
    pub provider_id: String,
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleInstanceIdentity {
    /// Concept id of the group this ACL governs.
    pub target_id: String,
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItemIdentity {
    pub name: String,
    pub provider_id: String,
    #[serde(default)]
    pub collection_applicable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_identifier: Option<CollectionIdentifier>,
    #[serde(default)]
    pub granule_applicable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub granule_identifier: Option<GranuleIdentifier>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionIdentifier {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entry_titles: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_value: Option<AccessValueRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temporal: Option<TemporalRange>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GranuleIdentifier {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_value: Option<AccessValueRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temporal: Option<TemporalRange>,
}

/// Range of catalog access values an ACL applies to.
///
/// Valid when either `include_undefined_value` is true and neither bound is
/// set, or it is false/absent and at least one bound is set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccessValueRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_undefined_value: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemporalRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_date: Option<DateTime<Utc>>,
}

/// Exactly one identity variant of an ACL.
#[derive(Debug, Clone, PartialEq)]
pub enum Identity {
    System(SystemIdentity),
    Provider(ProviderIdentity),
    SingleInstance(SingleInstanceIdentity),
    CatalogItem(CatalogItemIdentity),
}

impl Identity {
    pub fn identity_type(&self) -> IdentityType {
        match self {
            Identity::System(_) => IdentityType::System,
            Identity::Provider(_) => IdentityType::Provider,
            Identity::SingleInstance(_) => IdentityType::SingleInstance,
            Identity::CatalogItem(_) => IdentityType::CatalogItem,
        }
    }

    /// Symbolic target, absent for catalog-item identities.
    pub fn target(&self) -> Option<&str> {
        match self {
            Identity::System(identity) => Some(&identity.target),
            Identity::Provider(identity) => Some(&identity.target),
            Identity::SingleInstance(identity) => Some(&identity.target),
            Identity::CatalogItem(_) => None,
        }
    }

    pub fn provider_id(&self) -> Option<&str> {
        match self {
            Identity::Provider(identity) => Some(&identity.provider_id),
            Identity::CatalogItem(identity) => Some(&identity.provider_id),
            Identity::System(_) | Identity::SingleInstance(_) => None,
        }
    }

    /// Key that two ACLs share when they govern the same thing.
    pub fn uniqueness_key(&self) -> String {
        match self {
            Identity::System(identity) => format!("system:{}", identity.target),
            Identity::Provider(identity) => {
                format!("provider:{}:{}", identity.provider_id, identity.target)
            }
            Identity::SingleInstance(identity) => {
                format!("single:{}:{}", identity.target_id, identity.target)
            }
            Identity::CatalogItem(identity) => {
                format!("catalog:{}:{}", identity.provider_id, identity.name)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    Guest,
    Registered,
}

impl UserType {
    pub fn as_str(self) -> &'static str {
        match self {
            UserType::Guest => "guest",
            UserType::Registered => "registered",
        }
    }
}

/// Who a group-permission entry grants to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Grantee {
    Group { group_id: String },
    UserType { user_type: UserType },
}

impl Grantee {
    /// Security identifier this entry matches against.
    pub fn sid(&self) -> &str {
        match self {
            Grantee::Group { group_id } => group_id,
            Grantee::UserType { user_type } => user_type.as_str(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupPermission {
    #[serde(flatten)]
    pub grantee: Grantee,
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

/// ACL document as it arrives on the wire, before identity resolution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AclDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_identity: Option<SystemIdentity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_identity: Option<ProviderIdentity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub single_instance_identity: Option<SingleInstanceIdentity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_item_identity: Option<CatalogItemIdentity>,
    #[serde(default)]
    pub group_permissions: Vec<GroupPermission>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legacy_guid: Option<String>,
}

impl AclDocument {
    /// Resolve the identity type from whichever identity field is populated.
    ///
    /// Returns `None` when no identity field is set. When several are set the
    /// first in declaration order wins; [`Acl::from_document`] rejects that
    /// case before anything relies on it.
    pub fn identity_type(&self) -> Option<IdentityType> {
        if self.system_identity.is_some() {
            Some(IdentityType::System)
        } else if self.provider_identity.is_some() {
            Some(IdentityType::Provider)
        } else if self.single_instance_identity.is_some() {
            Some(IdentityType::SingleInstance)
        } else if self.catalog_item_identity.is_some() {
            Some(IdentityType::CatalogItem)
        } else {
            None
        }
    }

    fn populated_identities(&self) -> Vec<&'static str> {
        let mut populated = Vec::new();
        if self.system_identity.is_some() {
            populated.push(SYSTEM_IDENTITY);
        }
        if self.provider_identity.is_some() {
            populated.push(PROVIDER_IDENTITY);
        }
        if self.single_instance_identity.is_some() {
            populated.push(SINGLE_INSTANCE_IDENTITY);
        }
        if self.catalog_item_identity.is_some() {
            populated.push(CATALOG_ITEM_IDENTITY);
        }
        populated
    }
}

/// Validated ACL with exactly one identity variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "AclDocument", into = "AclDocument")]
pub struct Acl {
    pub identity: Identity,
    pub group_permissions: Vec<GroupPermission>,
    pub legacy_guid: Option<String>,
}

impl Acl {
    pub fn new(identity: Identity, group_permissions: Vec<GroupPermission>) -> Self {
        Self {
            identity,
            group_permissions,
            legacy_guid: None,
        }
    }

    pub fn identity_type(&self) -> IdentityType {
        self.identity.identity_type()
    }

    /// Convert a wire document, requiring exactly one identity variant.
    pub fn from_document(document: AclDocument) -> Result<Self, ValidationErrors> {
        let populated = document.populated_identities();
        let AclDocument {
            system_identity,
            provider_identity,
            single_instance_identity,
            catalog_item_identity,
            group_permissions,
            legacy_guid,
        } = document;
        let identity = match (
            system_identity,
            provider_identity,
            single_instance_identity,
            catalog_item_identity,
        ) {
            (Some(identity), None, None, None) => Identity::System(identity),
            (None, Some(identity), None, None) => Identity::Provider(identity),
            (None, None, Some(identity), None) => Identity::SingleInstance(identity),
            (None, None, None, Some(identity)) => Identity::CatalogItem(identity),
            _ => {
                let message = if populated.is_empty() {
                    "one of system_identity, provider_identity, single_instance_identity, or \
                     catalog_item_identity must be specified"
                        .to_string()
                } else {
                    format!(
                        "only one identity may be specified, found [{}]",
                        populated.join(", ")
                    )
                };
                let mut errors = ValidationErrors::new();
                errors.add(&FieldPath::root(), message);
                return Err(errors);
            }
        };
        Ok(Self {
            identity,
            group_permissions,
            legacy_guid,
        })
    }

    /// All security identifiers that receive any permission from this ACL.
    pub fn permitted_sids(&self) -> Vec<String> {
        let mut sids: Vec<String> = Vec::new();
        for entry in &self.group_permissions {
            let sid = entry.grantee.sid();
            if !entry.permissions.is_empty() && !sids.iter().any(|known| known == sid) {
                sids.push(sid.to_string());
            }
        }
        sids
    }
}

impl TryFrom<AclDocument> for Acl {
    type Error = ValidationErrors;

    fn try_from(document: AclDocument) -> Result<Self, Self::Error> {
        Acl::from_document(document)
    }
}

impl From<Acl> for AclDocument {
    fn from(acl: Acl) -> Self {
        let mut document = AclDocument {
            group_permissions: acl.group_permissions,
            legacy_guid: acl.legacy_guid,
            ..AclDocument::default()
        };
        match acl.identity {
            Identity::System(identity) => document.system_identity = Some(identity),
            Identity::Provider(identity) => document.provider_identity = Some(identity),
            Identity::SingleInstance(identity) => {
                document.single_instance_identity = Some(identity)
            }
            Identity::CatalogItem(identity) => document.catalog_item_identity = Some(identity),
        }
        document
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_resolves_identity_type() {
        let document = AclDocument {
            provider_identity: Some(ProviderIdentity {
                provider_id: "PROV1".to_string(),
                target: "GROUP".to_string(),
            }),
            ..AclDocument::default()
        };
        assert_eq!(document.identity_type(), Some(IdentityType::Provider));
        assert_eq!(AclDocument::default().identity_type(), None);
    }

    #[test]
    fn from_document_rejects_missing_identity() {
        let errors = Acl::from_document(AclDocument::default()).expect_err("no identity");
        let messages = errors.get(&FieldPath::root()).expect("root errors");
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("must be specified"));
    }

    #[test]
    fn from_document_rejects_multiple_identities() {
        let document = AclDocument {
            system_identity: Some(SystemIdentity {
                target: "GROUP".to_string(),
            }),
            provider_identity: Some(ProviderIdentity {
                provider_id: "PROV1".to_string(),
                target: "GROUP".to_string(),
            }),
            ..AclDocument::default()
        };
        let errors = Acl::from_document(document).expect_err("two identities");
        let messages = errors.get(&FieldPath::root()).expect("root errors");
        assert!(messages[0].contains("system_identity, provider_identity"));
    }

    #[test]
    fn acl_deserializes_from_wire_json() {
        let acl: Acl = serde_json::from_value(serde_json::json!({
            "catalog_item_identity": {
                "name": "All collections",
                "provider_id": "PROV1",
                "collection_applicable": true,
                "collection_identifier": {
                    "entry_titles": ["dataset one"],
                    "access_value": { "min_value": 1.0, "max_value": 10.0 },
                    "temporal": {
                        "start_date": "2000-01-01T00:00:00Z",
                        "stop_date": "2010-01-01T00:00:00Z"
                    }
                }
            },
            "group_permissions": [
                { "user_type": "guest", "permissions": ["read"] },
                { "group_id": "AG1-CMR", "permissions": ["read", "order"] }
            ]
        }))
        .expect("acl");

        assert_eq!(acl.identity_type(), IdentityType::CatalogItem);
        assert_eq!(acl.identity.provider_id(), Some("PROV1"));
        assert_eq!(acl.identity.target(), None);
        assert_eq!(acl.permitted_sids(), vec!["guest", "AG1-CMR"]);
        match &acl.group_permissions[1].grantee {
            Grantee::Group { group_id } => assert_eq!(group_id, "AG1-CMR"),
            other => panic!("unexpected grantee {other:?}"),
        }
    }

    #[test]
    fn acl_serializes_back_to_single_identity_field() {
        let acl = Acl::new(
            Identity::System(SystemIdentity {
                target: "ANY_ACL".to_string(),
            }),
            vec![GroupPermission {
                grantee: Grantee::UserType {
                    user_type: UserType::Registered,
                },
                permissions: vec![Permission::Read],
            }],
        );
        let value = serde_json::to_value(&acl).expect("json");
        assert_eq!(value["system_identity"]["target"], "ANY_ACL");
        assert!(value.get("provider_identity").is_none());
        assert_eq!(value["group_permissions"][0]["user_type"], "registered");
    }

    #[test]
    fn identity_type_parses_short_and_field_names() {
        assert_eq!(
            "provider".parse::<IdentityType>().ok(),
            Some(IdentityType::Provider)
        );
        assert_eq!(
            "catalog_item_identity".parse::<IdentityType>().ok(),
            Some(IdentityType::CatalogItem)
        );
        assert!("group".parse::<IdentityType>().is_err());
    }
}
