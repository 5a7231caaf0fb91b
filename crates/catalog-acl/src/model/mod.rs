//! Access-control data model.
//!
//! # Purpose
//! Re-exports the ACL and group records validated by this crate.
mod acl;
mod group;

pub use acl::{
    AccessValueRange, Acl, AclDocument, CATALOG_ITEM_IDENTITY, CatalogItemIdentity,
    CollectionIdentifier, GranuleIdentifier, Grantee, GroupPermission, Identity, IdentityType,
    PROVIDER_IDENTITY, ProviderIdentity, SINGLE_INSTANCE_IDENTITY, SYSTEM_IDENTITY,
    SingleInstanceIdentity, SystemIdentity, TemporalRange, UserType,
};
pub use group::Group;
