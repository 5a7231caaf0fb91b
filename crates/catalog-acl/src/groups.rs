//! Group save validation.
//!
//! Field rules run through the same validator interpreter as ACLs. Creation
//! additionally requires a `GROUP` create grant for the group's scope.
use crate::authorization::validate_group_create_permission;
use crate::errors::{AclError, AclResult};
use crate::lookups::{CatalogLookups, RequestContext};
use crate::model::Group;
use crate::validator::Validator;
use std::sync::OnceLock;
use tracing::debug;

/// Catalog state the group rules consult.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupFacts {
    pub provider_exists: bool,
}

type GroupValidator = Validator<GroupFacts, Group>;

static GROUP_VALIDATOR: OnceLock<GroupValidator> = OnceLock::new();

fn group_validator() -> &'static GroupValidator {
    GROUP_VALIDATOR.get_or_init(|| {
        Validator::all(vec![
            Validator::field("name", name, Validator::leaf(name_length)),
            Validator::when_present(
                "provider_id",
                provider_id,
                Validator::all(vec![
                    Validator::leaf(provider_id_length),
                    Validator::leaf(provider_exists),
                ]),
            ),
            Validator::field("description", description, Validator::leaf(description_length)),
            Validator::when_present("legacy_guid", legacy_guid, Validator::leaf(legacy_guid_length)),
        ])
    })
}

fn name(group: &Group) -> &String {
    &group.name
}

fn provider_id(group: &Group) -> Option<&String> {
    group.provider_id.as_ref()
}

fn description(group: &Group) -> &String {
    &group.description
}

fn legacy_guid(group: &Group) -> Option<&String> {
    group.legacy_guid.as_ref()
}

/// Blank values count as length zero.
fn length_errors(field: &str, value: &str, max: usize) -> Vec<String> {
    let length = if value.trim().is_empty() {
        0
    } else {
        value.chars().count()
    };
    if (1..=max).contains(&length) {
        Vec::new()
    } else {
        vec![format!(
            "{field} length must be between 1 and {max} characters, was {length}"
        )]
    }
}

fn name_length(_: &GroupFacts, value: &String) -> Vec<String> {
    length_errors("name", value, 100)
}

fn provider_id_length(_: &GroupFacts, value: &String) -> Vec<String> {
    length_errors("provider_id", value, 50)
}

fn description_length(_: &GroupFacts, value: &String) -> Vec<String> {
    length_errors("description", value, 255)
}

fn legacy_guid_length(_: &GroupFacts, value: &String) -> Vec<String> {
    length_errors("legacy_guid", value, 50)
}

fn provider_exists(facts: &GroupFacts, value: &String) -> Vec<String> {
    if facts.provider_exists {
        Vec::new()
    } else {
        vec![format!("No provider exists with provider_id [{value}]")]
    }
}

/// Validate group fields. Used for both create and update.
pub async fn validate_group(lookups: &dyn CatalogLookups, group: &Group) -> AclResult<()> {
    let provider_exists = match group.provider_id.as_deref() {
        Some(provider_id) => lookups.provider_exists(provider_id).await?,
        None => true,
    };
    let errors = group_validator().validate(&GroupFacts { provider_exists }, group);
    if errors.is_empty() {
        Ok(())
    } else {
        debug!(group = %group.name, errors = %errors, "group rejected");
        Err(AclError::Validation(errors))
    }
}

/// Validate a new group and the caller's right to create it.
#[tracing::instrument(skip_all, fields(group = %group.name))]
pub async fn validate_group_create(
    lookups: &dyn CatalogLookups,
    context: &RequestContext,
    group: &Group,
) -> AclResult<()> {
    validate_group(lookups, group).await?;
    validate_group_create_permission(lookups, context, group).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authorization::GROUP_TARGET;
    use crate::model::UserType;
    use crate::permission::Permission;
    use crate::testing::{FakeLookups, provider_acl, user_type_grant};
    use crate::validator::FieldPath;

    fn group(provider_id: Option<&str>) -> Group {
        Group {
            name: "Curators".to_string(),
            provider_id: provider_id.map(str::to_string),
            description: "Collection curators".to_string(),
            legacy_guid: None,
            members: Vec::new(),
        }
    }

    fn field_errors(result: AclResult<()>) -> crate::validator::ValidationErrors {
        match result {
            Err(AclError::Validation(errors)) => errors,
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn valid_groups_pass() {
        let lookups = FakeLookups::new().with_provider("PROV1");
        validate_group(&lookups, &group(None)).await.expect("system group");
        validate_group(&lookups, &group(Some("PROV1")))
            .await
            .expect("provider group");
    }

    #[tokio::test]
    async fn field_lengths_accumulate() {
        let lookups = FakeLookups::new();
        let mut invalid = group(None);
        invalid.name = "   ".to_string();
        invalid.description = "d".repeat(256);
        invalid.legacy_guid = Some("g".repeat(51));

        let errors = field_errors(validate_group(&lookups, &invalid).await);
        assert_eq!(errors.len(), 3);
        assert_eq!(
            errors.get(&FieldPath::new(["name"])),
            Some(&["name length must be between 1 and 100 characters, was 0".to_string()][..])
        );
        assert!(errors.get(&FieldPath::new(["description"])).is_some());
        assert!(errors.get(&FieldPath::new(["legacy_guid"])).is_some());
    }

    #[tokio::test]
    async fn lengths_count_characters() {
        let lookups = FakeLookups::new();
        let mut wide = group(None);
        wide.name = "é".repeat(100);
        validate_group(&lookups, &wide).await.expect("100 characters");
    }

    #[tokio::test]
    async fn provider_must_exist() {
        let lookups = FakeLookups::new();
        let errors = field_errors(validate_group(&lookups, &group(Some("PROV9"))).await);
        assert_eq!(
            errors.get(&FieldPath::new(["provider_id"])),
            Some(&["No provider exists with provider_id [PROV9]".to_string()][..])
        );
    }

    #[tokio::test]
    async fn create_checks_fields_before_permission() {
        let lookups = FakeLookups::new();
        let result = validate_group_create(&lookups, &RequestContext::anonymous(), &group(Some("PROV9"))).await;
        assert!(matches!(result, Err(AclError::Validation(_))));

        let lookups = FakeLookups::new().with_provider("PROV1");
        let result = validate_group_create(&lookups, &RequestContext::anonymous(), &group(Some("PROV1"))).await;
        assert!(matches!(result, Err(AclError::PermissionDenied(_))));
    }

    #[tokio::test]
    async fn create_with_grant_passes() {
        let lookups = FakeLookups::new().with_provider("PROV1").with_acl(provider_acl(
            "PROV1",
            GROUP_TARGET,
            vec![user_type_grant(UserType::Guest, &[Permission::Create])],
        ));
        validate_group_create(&lookups, &RequestContext::anonymous(), &group(Some("PROV1")))
            .await
            .expect("granted");
    }
}
