//! ACL validation and permission-grant model for the catalog access-control
//! service.
//!
//! # Purpose and responsibility
//! Decides whether a proposed ACL or group may be saved: structural rules on
//! catalog-item identifiers, the grantable-permission table, and the
//! self-referential authorization check that gates ACL and group creation on
//! grants held in existing ACLs.
//!
//! # Key invariants and assumptions
//! - The crate holds no state. Catalog facts are read through
//!   [`CatalogLookups`], implemented by the service.
//! - Validation failures and collaborator failures are distinct
//!   ([`AclError::Validation`] vs [`AclError::Dependency`]).
//! - All validation errors of one save are reported together.
pub mod authorization;
pub mod errors;
pub mod grantable;
pub mod grants;
pub mod groups;
pub mod lookups;
pub mod model;
pub mod permission;
pub mod rules;
pub mod sids;
pub mod validation;
pub mod validator;

#[cfg(test)]
pub(crate) mod testing;

pub use authorization::{validate_acl_mutation_permission, validate_group_mutation_permission};
pub use errors::{AclError, AclResult, DependencyError, LookupResult};
pub use grantable::validate_grantable_permissions;
pub use grants::grantable_permissions;
pub use groups::{validate_group, validate_group_create};
pub use lookups::{
    AclSearchCriteria, CatalogLookups, GroupSearchCriteria, GroupSummary, RequestContext,
};
pub use model::{Acl, AclDocument, Group, Identity, IdentityType};
pub use permission::Permission;
pub use validation::{SaveOperation, validate_acl};
pub use validator::{FieldPath, ValidationErrors, Validator};
