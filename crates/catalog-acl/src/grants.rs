//! Permission grant table.
//!
//! # Purpose
//! Declares which permissions may be granted for each (identity type, target)
//! pair.
//!
//! # Key invariants
//! - Catalog-item identities have no entries; anything may be granted there.
//! - A pair missing from the table yields an empty slice, which callers treat
//!   as "no restriction" rather than "nothing grantable".
use crate::model::IdentityType;
use crate::model::IdentityType::{Provider, SingleInstance, System};
use crate::permission::Permission;
use crate::permission::Permission::{Create, Delete, Read, Update};

type GrantEntry = (IdentityType, &'static str, &'static [Permission]);

static GRANTABLE_PERMISSIONS: &[GrantEntry] = &[
    (SingleInstance, "GROUP_MANAGEMENT", &[Update, Delete]),
    (Provider, "AUDIT_REPORT", &[Read]),
    (Provider, "OPTION_ASSIGNMENT", &[Create, Read, Delete]),
    (Provider, "OPTION_DEFINITION", &[Create, Delete]),
    (Provider, "OPTION_DEFINITION_DEPRECATION", &[Create]),
    (Provider, "DATASET_INFORMATION", &[Read]),
    (Provider, "PROVIDER_HOLDINGS", &[Read]),
    (Provider, "EXTENDED_SERVICE", &[Create, Update, Delete]),
    (Provider, "PROVIDER_ORDER", &[Read]),
    (Provider, "PROVIDER_ORDER_RESUBMISSION", &[Create]),
    (Provider, "PROVIDER_ORDER_ACCEPTANCE", &[Create]),
    (Provider, "PROVIDER_ORDER_REJECTION", &[Create]),
    (Provider, "PROVIDER_ORDER_CLOSURE", &[Create]),
    (Provider, "PROVIDER_ORDER_TRACKING_ID", &[Update]),
    (Provider, "PROVIDER_INFORMATION", &[Update]),
    (Provider, "PROVIDER_CONTEXT", &[Read]),
    (Provider, "AUTHENTICATOR_DEFINITION", &[Create, Delete]),
    (Provider, "PROVIDER_POLICIES", &[Read, Update, Delete]),
    (Provider, "USER", &[Read]),
    (Provider, "GROUP", &[Create, Read]),
    (Provider, "PROVIDER_OBJECT_ACL", &[Create, Read, Update, Delete]),
    (Provider, "CATALOG_ITEM_ACL", &[Create, Read, Update, Delete]),
    (Provider, "INGEST_MANAGEMENT_ACL", &[Read, Update]),
    (Provider, "DATA_QUALITY_SUMMARY_DEFINITION", &[Create, Update, Delete]),
    (Provider, "DATA_QUALITY_SUMMARY_ASSIGNMENT", &[Create, Delete]),
    (Provider, "PROVIDER_CALENDAR_EVENT", &[Create, Update, Delete]),
    (System, "SYSTEM_AUDIT_REPORT", &[Read]),
    (System, "METRIC_DATA_POINT_SAMPLE", &[Read]),
    (System, "SYSTEM_INITIALIZER", &[Create]),
    (System, "ARCHIVE_RECORD", &[Delete]),
    (System, "ERROR_MESSAGE", &[Update]),
    (System, "TOKEN", &[Read, Delete]),
    (System, "TOKEN_REVOCATION", &[Create]),
    (System, "EXTENDED_SERVICE_ACTIVATION", &[Create]),
    (System, "ORDER_AND_ORDER_ITEMS", &[Read, Delete]),
    (System, "PROVIDER", &[Create, Delete]),
    (System, "TAG_GROUP", &[Create, Update, Delete]),
    (System, "TAXONOMY", &[Create]),
    (System, "TAXONOMY_ENTRY", &[Create]),
    (System, "USER_CONTEXT", &[Read]),
    (System, "USER", &[Read, Update, Delete]),
    (System, "GROUP", &[Create, Read]),
    (System, "ANY_ACL", &[Create, Read, Update, Delete]),
    (System, "EVENT_NOTIFICATION", &[Delete]),
    (System, "EXTENDED_SERVICE", &[Delete]),
    (System, "SYSTEM_OPTION_DEFINITION", &[Create, Delete]),
    (System, "SYSTEM_OPTION_DEFINITION_DEPRECATION", &[Create]),
    (System, "INGEST_MANAGEMENT_ACL", &[Read, Update]),
    (System, "SYSTEM_CALENDAR_EVENT", &[Create, Update, Delete]),
];

/// Permissions grantable for `(identity_type, target)`.
///
/// Empty when the pair is not declared; an empty result means the grantable
/// check is skipped.
pub fn grantable_permissions(identity_type: IdentityType, target: &str) -> &'static [Permission] {
    GRANTABLE_PERMISSIONS
        .iter()
        .find(|(kind, name, _)| *kind == identity_type && *name == target)
        .map(|(_, _, permissions)| *permissions)
        .unwrap_or(&[])
}
