//! Grantable-permission check.
use crate::grants::grantable_permissions;
use crate::model::Acl;
use crate::permission::{Permission, join_permissions};
use crate::validator::{FieldPath, ValidationErrors};

pub const GROUP_PERMISSIONS: &str = "group_permissions";

/// Reject permissions the grant table does not allow for the ACL's target.
///
/// Skipped for catalog-item identities and for targets absent from the table.
/// At most one message is produced per ACL, listing every rejected permission
/// next to the allowed set.
pub fn validate_grantable_permissions(acl: &Acl) -> ValidationErrors {
    let Some(target) = acl.identity.target() else {
        return ValidationErrors::new();
    };
    let identity_type = acl.identity_type();
    let grantable = grantable_permissions(identity_type, target);
    if grantable.is_empty() {
        return ValidationErrors::new();
    }

    let mut rejected: Vec<Permission> = Vec::new();
    for permission in acl
        .group_permissions
        .iter()
        .flat_map(|entry| entry.permissions.iter())
    {
        if !grantable.contains(permission) && !rejected.contains(permission) {
            rejected.push(*permission);
        }
    }
    if rejected.is_empty() {
        return ValidationErrors::new();
    }

    ValidationErrors::single(
        FieldPath::new([GROUP_PERMISSIONS]),
        format!(
            "{} ACL cannot have [{}] permission for target [{}], only [{}] are grantable",
            identity_type.display_name(),
            join_permissions(&rejected),
            target,
            join_permissions(grantable),
        ),
    )
}
