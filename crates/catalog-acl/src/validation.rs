//! ACL save validation.
//!
//! # Purpose and responsibility
//! Runs every ACL rule group for a create or update and reports all failures
//! together.
//!
//! # Key invariants and assumptions
//! - Order is fixed: provider existence, structural rules, create
//!   authorization (create only), grantable permissions.
//! - Rule groups never short-circuit each other; a failing group still lets
//!   the later groups run.
//! - Collaborator failures abort with [`AclError::Dependency`] and are never
//!   folded into the validation report.
//! - No side effects: the same call may be repeated freely.
use crate::authorization::validate_target_provider_grants_create;
use crate::errors::{AclError, AclResult, LookupResult};
use crate::grantable::validate_grantable_permissions;
use crate::lookups::{CatalogLookups, RequestContext};
use crate::model::{Acl, Identity};
use crate::rules::{ValidationFacts, acl_validator};
use crate::validator::{FieldPath, ValidationErrors};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOperation {
    Create,
    Update,
}

impl SaveOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            SaveOperation::Create => "create",
            SaveOperation::Update => "update",
        }
    }
}

impl std::fmt::Display for SaveOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validate an ACL about to be saved.
#[tracing::instrument(
    skip_all,
    fields(operation = %operation, identity_type = %acl.identity_type())
)]
pub async fn validate_acl(
    lookups: &dyn CatalogLookups,
    context: &RequestContext,
    acl: &Acl,
    operation: SaveOperation,
) -> AclResult<()> {
    let mut errors = validate_provider_exists(lookups, acl).await?;

    let facts = gather_facts(lookups, acl).await?;
    errors.merge(acl_validator().validate(&facts, acl));

    if operation == SaveOperation::Create {
        if let Identity::CatalogItem(identity) = &acl.identity {
            errors.merge(validate_target_provider_grants_create(lookups, context, identity).await?);
        }
    }

    errors.merge(validate_grantable_permissions(acl));

    if errors.is_empty() {
        debug!("acl accepted");
        Ok(())
    } else {
        debug!(errors = %errors, "acl rejected");
        Err(AclError::Validation(errors))
    }
}

async fn validate_provider_exists(
    lookups: &dyn CatalogLookups,
    acl: &Acl,
) -> LookupResult<ValidationErrors> {
    let Some(provider_id) = acl.identity.provider_id() else {
        return Ok(ValidationErrors::new());
    };
    if lookups.provider_exists(provider_id).await? {
        return Ok(ValidationErrors::new());
    }
    Ok(ValidationErrors::single(
        FieldPath::new([acl.identity_type().field_name(), "provider_id"]),
        format!("No provider exists with provider_id [{provider_id}]"),
    ))
}

/// Fetch what the structural rules need to know about the catalog.
async fn gather_facts(lookups: &dyn CatalogLookups, acl: &Acl) -> LookupResult<ValidationFacts> {
    let mut facts = ValidationFacts {
        provider_id: acl.identity.provider_id().map(str::to_string),
        ..ValidationFacts::default()
    };
    match &acl.identity {
        Identity::CatalogItem(identity) => {
            let titles = identity
                .collection_identifier
                .iter()
                .flat_map(|identifier| identifier.entry_titles.iter());
            for title in titles {
                if lookups.collection_exists(&identity.provider_id, title).await? {
                    facts.existing_entry_titles.insert(title.clone());
                }
            }
        }
        Identity::SingleInstance(identity) => {
            facts.target_group_exists = lookups.group_exists(&identity.target_id).await?;
        }
        Identity::System(_) | Identity::Provider(_) => {}
    }
    Ok(facts)
}
