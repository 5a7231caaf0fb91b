//! Permission checks against existing ACLs.
//!
//! # Purpose and responsibility
//! Decides whether the caller holds a permission by scanning the ACLs that
//! govern a target and intersecting their grants with the caller's security
//! identifiers. Creating a catalog-item ACL, creating a group, and changing
//! an existing group or ACL are all gated this way.
//!
//! # Key invariants and assumptions
//! - Denial by default: no matching grant means no permission.
//! - Grants are read from the ACL search on every call, so a check always
//!   observes the latest indexed ACLs.
use crate::errors::{AclError, AclResult, LookupResult};
use crate::lookups::{AclSearchCriteria, CatalogLookups, GroupSearchCriteria, RequestContext};
use crate::model::{
    Acl, CATALOG_ITEM_IDENTITY, CatalogItemIdentity, Group, Identity, IdentityType,
};
use crate::permission::Permission;
use crate::sids::{current_user, security_identifiers};
use crate::validator::{FieldPath, ValidationErrors};
use std::collections::BTreeSet;
use tracing::debug;

pub const CATALOG_ITEM_ACL_TARGET: &str = "CATALOG_ITEM_ACL";
pub const GROUP_TARGET: &str = "GROUP";
pub const GROUP_MANAGEMENT_TARGET: &str = "GROUP_MANAGEMENT";
pub const ANY_ACL_TARGET: &str = "ANY_ACL";

/// Which ACLs a permission check reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantScope<'a> {
    System,
    Provider(&'a str),
    /// ACLs whose single-instance identity names this group concept id.
    SingleInstance(&'a str),
}

impl GrantScope<'_> {
    fn criteria(&self) -> AclSearchCriteria {
        match self {
            GrantScope::System => AclSearchCriteria {
                identity_type: Some(IdentityType::System),
                ..AclSearchCriteria::default()
            },
            GrantScope::Provider(provider_id) => AclSearchCriteria::for_provider(*provider_id),
            GrantScope::SingleInstance(_) => AclSearchCriteria {
                identity_type: Some(IdentityType::SingleInstance),
                ..AclSearchCriteria::default()
            },
        }
    }

    fn covers(&self, identity: &Identity) -> bool {
        match (self, identity) {
            (GrantScope::System, Identity::System(_)) => true,
            (GrantScope::Provider(provider_id), Identity::Provider(identity)) => {
                identity.provider_id == *provider_id
            }
            (GrantScope::SingleInstance(target_id), Identity::SingleInstance(identity)) => {
                identity.target_id == *target_id
            }
            _ => false,
        }
    }
}

impl std::fmt::Display for GrantScope<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GrantScope::System => f.write_str("system"),
            GrantScope::Provider(provider_id) => write!(f, "provider-id [{provider_id}]"),
            GrantScope::SingleInstance(target_id) => write!(f, "group [{target_id}]"),
        }
    }
}

/// Union of permissions granted to any of `sids` on `target` within `scope`.
pub async fn granted_permissions(
    lookups: &dyn CatalogLookups,
    sids: &[String],
    scope: GrantScope<'_>,
    target: &str,
) -> LookupResult<BTreeSet<Permission>> {
    let acls = lookups.search_acls(&scope.criteria()).await?;
    let mut granted = BTreeSet::new();
    for acl in acls
        .iter()
        .filter(|acl| scope.covers(&acl.identity) && acl.identity.target() == Some(target))
    {
        for entry in &acl.group_permissions {
            if sids.iter().any(|sid| sid == entry.grantee.sid()) {
                granted.extend(entry.permissions.iter().copied());
            }
        }
    }
    debug!(%scope, target, granted = ?granted, "collected granted permissions");
    Ok(granted)
}

pub async fn has_permission(
    lookups: &dyn CatalogLookups,
    sids: &[String],
    scope: GrantScope<'_>,
    target: &str,
    permission: Permission,
) -> LookupResult<bool> {
    Ok(granted_permissions(lookups, sids, scope, target)
        .await?
        .contains(&permission))
}

/// Caller must hold `create` on the provider's `CATALOG_ITEM_ACL` target.
///
/// Errors are reported at the `catalog_item_identity` path.
pub async fn validate_target_provider_grants_create(
    lookups: &dyn CatalogLookups,
    context: &RequestContext,
    identity: &CatalogItemIdentity,
) -> LookupResult<ValidationErrors> {
    let user = current_user(lookups, context).await?;
    let sids = security_identifiers(lookups, &user).await?;
    let scope = GrantScope::Provider(&identity.provider_id);
    if has_permission(lookups, &sids, scope, CATALOG_ITEM_ACL_TARGET, Permission::Create).await? {
        return Ok(ValidationErrors::new());
    }
    Ok(ValidationErrors::single(
        FieldPath::new([CATALOG_ITEM_IDENTITY]),
        format!(
            "User [{user}] does not have permission to create a catalog item ACL for provider-id [{}]",
            identity.provider_id
        ),
    ))
}

/// Caller must hold `create` on `GROUP` for the group's scope.
///
/// Provider groups are also creatable by holders of the system grant.
pub async fn validate_group_create_permission(
    lookups: &dyn CatalogLookups,
    context: &RequestContext,
    group: &Group,
) -> AclResult<()> {
    let user = current_user(lookups, context).await?;
    let sids = security_identifiers(lookups, &user).await?;

    if let Some(provider_id) = group.provider_id.as_deref() {
        let scope = GrantScope::Provider(provider_id);
        if has_permission(lookups, &sids, scope, GROUP_TARGET, Permission::Create).await? {
            return Ok(());
        }
    }
    if has_permission(lookups, &sids, GrantScope::System, GROUP_TARGET, Permission::Create).await? {
        return Ok(());
    }

    let scope = match group.provider_id.as_deref() {
        Some(provider_id) => GrantScope::Provider(provider_id),
        None => GrantScope::System,
    };
    Err(AclError::PermissionDenied(format!(
        "User [{user}] does not have permission to create a group for {scope}"
    )))
}

/// Provider owning a group, `None` for system groups and unknown ids.
async fn group_provider(
    lookups: &dyn CatalogLookups,
    concept_id: &str,
) -> LookupResult<Option<String>> {
    let criteria = GroupSearchCriteria {
        concept_ids: vec![concept_id.to_string()],
        ..GroupSearchCriteria::default()
    };
    Ok(lookups
        .search_groups(&criteria)
        .await?
        .into_iter()
        .next()
        .and_then(|summary| summary.provider_id))
}

/// Caller may change the group `concept_id` with `permission`.
///
/// Accepted grants, in order:
/// - `permission` on the group's single-instance `GROUP_MANAGEMENT` ACL;
/// - `create` on `GROUP` for the owning provider;
/// - `create` on the system `GROUP` target.
///
/// `GROUP` only grants `create` and `read`, so its `create` holders act as
/// administrators of every group in that scope.
pub async fn validate_group_mutation_permission(
    lookups: &dyn CatalogLookups,
    context: &RequestContext,
    concept_id: &str,
    permission: Permission,
) -> AclResult<()> {
    let user = current_user(lookups, context).await?;
    let sids = security_identifiers(lookups, &user).await?;

    let scope = GrantScope::SingleInstance(concept_id);
    if has_permission(lookups, &sids, scope, GROUP_MANAGEMENT_TARGET, permission).await? {
        return Ok(());
    }
    if let Some(provider_id) = group_provider(lookups, concept_id).await? {
        let scope = GrantScope::Provider(&provider_id);
        if has_permission(lookups, &sids, scope, GROUP_TARGET, Permission::Create).await? {
            return Ok(());
        }
    }
    if has_permission(lookups, &sids, GrantScope::System, GROUP_TARGET, Permission::Create).await? {
        return Ok(());
    }

    Err(AclError::PermissionDenied(format!(
        "User [{user}] does not have permission to {permission} group [{concept_id}]"
    )))
}

/// Caller may change an existing ACL with `permission`.
///
/// Catalog-item ACLs accept the provider's `CATALOG_ITEM_ACL` grant; every
/// ACL accepts the system `ANY_ACL` grant.
pub async fn validate_acl_mutation_permission(
    lookups: &dyn CatalogLookups,
    context: &RequestContext,
    acl: &Acl,
    permission: Permission,
) -> AclResult<()> {
    let user = current_user(lookups, context).await?;
    let sids = security_identifiers(lookups, &user).await?;

    if let Identity::CatalogItem(identity) = &acl.identity {
        let scope = GrantScope::Provider(&identity.provider_id);
        if has_permission(lookups, &sids, scope, CATALOG_ITEM_ACL_TARGET, permission).await? {
            return Ok(());
        }
    }
    if has_permission(lookups, &sids, GrantScope::System, ANY_ACL_TARGET, permission).await? {
        return Ok(());
    }

    let scope = match &acl.identity {
        Identity::CatalogItem(identity) => GrantScope::Provider(&identity.provider_id),
        _ => GrantScope::System,
    };
    Err(AclError::PermissionDenied(format!(
        "User [{user}] does not have permission to {permission} {} ACLs for {scope}",
        acl.identity_type().display_name().to_lowercase()
    )))
}
