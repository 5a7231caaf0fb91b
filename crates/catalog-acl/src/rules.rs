//! Structural rules for ACL documents.
//!
//! # Purpose and responsibility
//! Builds the validator tree run against every saved ACL. Rules are nested by
//! identity variant, so only the subtree of the populated variant executes.
//!
//! # Key invariants and assumptions
//! - Rules never call collaborators. Anything they need from the catalog is
//!   fetched beforehand into [`ValidationFacts`].
//! - Access-value ranges are valid in exactly one of two shapes; the two
//!   messages below are mutually exclusive.
use crate::model::{
    Acl, AccessValueRange, CATALOG_ITEM_IDENTITY, CatalogItemIdentity, CollectionIdentifier,
    GranuleIdentifier, Identity, SINGLE_INSTANCE_IDENTITY, SingleInstanceIdentity,
    TemporalRange,
};
use crate::validator::Validator;
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// Catalog state the structural rules consult, gathered before they run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationFacts {
    /// Provider the ACL is scoped to, if any.
    pub provider_id: Option<String>,
    /// Entry titles confirmed to exist under `provider_id`.
    pub existing_entry_titles: BTreeSet<String>,
    /// Whether the single-instance target group exists.
    pub target_group_exists: bool,
}

pub const COLLECTION_APPLICABLE_REQUIRED: &str =
    "collection_applicable must be true when collection_identifier is specified";
pub const GRANULE_APPLICABLE_REQUIRED: &str =
    "granule_applicable must be true when granule_identifier is specified";
pub const APPLICABILITY_REQUIRED: &str = "when catalog_item_identity is specified, one or both \
     of collection_applicable or granule_applicable must be true";
pub const UNDEFINED_WITH_BOUNDS: &str =
    "min_value and/or max_value must not be specified if include_undefined_value is true";
pub const BOUNDS_REQUIRED: &str =
    "min_value and/or max_value must be specified when include_undefined_value is false";

type AclValidator = Validator<ValidationFacts, Acl>;

static ACL_VALIDATOR: OnceLock<AclValidator> = OnceLock::new();

/// Validator tree for a whole ACL.
pub fn acl_validator() -> &'static AclValidator {
    ACL_VALIDATOR.get_or_init(|| {
        Validator::all(vec![
            Validator::when_present(
                CATALOG_ITEM_IDENTITY,
                catalog_item_identity,
                catalog_item_validator(),
            ),
            Validator::when_present(
                SINGLE_INSTANCE_IDENTITY,
                single_instance_identity,
                Validator::field("target_id", target_id, Validator::leaf(target_group_exists)),
            ),
        ])
    })
}

fn catalog_item_validator() -> Validator<ValidationFacts, CatalogItemIdentity> {
    Validator::all(vec![
        Validator::leaf(collection_applicable_when_identified),
        Validator::leaf(granule_applicable_when_identified),
        Validator::leaf(some_applicability),
        Validator::when_present(
            "collection_identifier",
            collection_identifier,
            Validator::all(vec![
                Validator::field("entry_titles", entry_titles, Validator::leaf(entry_titles_exist)),
                Validator::when_present(
                    "access_value",
                    collection_access_value,
                    Validator::leaf(access_value_shape),
                ),
                Validator::when_present(
                    "temporal",
                    collection_temporal,
                    Validator::leaf(temporal_order),
                ),
            ]),
        ),
        Validator::when_present(
            "granule_identifier",
            granule_identifier,
            Validator::all(vec![
                Validator::when_present(
                    "access_value",
                    granule_access_value,
                    Validator::leaf(access_value_shape),
                ),
                Validator::when_present("temporal", granule_temporal, Validator::leaf(temporal_order)),
            ]),
        ),
    ])
}

fn catalog_item_identity(acl: &Acl) -> Option<&CatalogItemIdentity> {
    match &acl.identity {
        Identity::CatalogItem(identity) => Some(identity),
        _ => None,
    }
}

fn single_instance_identity(acl: &Acl) -> Option<&SingleInstanceIdentity> {
    match &acl.identity {
        Identity::SingleInstance(identity) => Some(identity),
        _ => None,
    }
}

fn target_id(identity: &SingleInstanceIdentity) -> &String {
    &identity.target_id
}

fn collection_identifier(identity: &CatalogItemIdentity) -> Option<&CollectionIdentifier> {
    identity.collection_identifier.as_ref()
}

fn granule_identifier(identity: &CatalogItemIdentity) -> Option<&GranuleIdentifier> {
    identity.granule_identifier.as_ref()
}

fn entry_titles(identifier: &CollectionIdentifier) -> &Vec<String> {
    &identifier.entry_titles
}

fn collection_access_value(identifier: &CollectionIdentifier) -> Option<&AccessValueRange> {
    identifier.access_value.as_ref()
}

fn collection_temporal(identifier: &CollectionIdentifier) -> Option<&TemporalRange> {
    identifier.temporal.as_ref()
}

fn granule_access_value(identifier: &GranuleIdentifier) -> Option<&AccessValueRange> {
    identifier.access_value.as_ref()
}

fn granule_temporal(identifier: &GranuleIdentifier) -> Option<&TemporalRange> {
    identifier.temporal.as_ref()
}

fn collection_applicable_when_identified(
    _: &ValidationFacts,
    identity: &CatalogItemIdentity,
) -> Vec<String> {
    if identity.collection_identifier.is_some() && !identity.collection_applicable {
        vec![COLLECTION_APPLICABLE_REQUIRED.to_string()]
    } else {
        Vec::new()
    }
}

fn granule_applicable_when_identified(
    _: &ValidationFacts,
    identity: &CatalogItemIdentity,
) -> Vec<String> {
    if identity.granule_identifier.is_some() && !identity.granule_applicable {
        vec![GRANULE_APPLICABLE_REQUIRED.to_string()]
    } else {
        Vec::new()
    }
}

fn some_applicability(_: &ValidationFacts, identity: &CatalogItemIdentity) -> Vec<String> {
    if identity.collection_applicable || identity.granule_applicable {
        Vec::new()
    } else {
        vec![APPLICABILITY_REQUIRED.to_string()]
    }
}

fn entry_titles_exist(facts: &ValidationFacts, titles: &Vec<String>) -> Vec<String> {
    let provider_id = facts.provider_id.as_deref().unwrap_or_default();
    titles
        .iter()
        .filter(|title| !facts.existing_entry_titles.contains(*title))
        .map(|title| {
            format!("Collection with entry title [{title}] does not exist in provider [{provider_id}]")
        })
        .collect()
}

/// Exactly one of the two messages applies to an invalid range.
pub fn access_value_shape(_: &ValidationFacts, range: &AccessValueRange) -> Vec<String> {
    let has_bound = range.min_value.is_some() || range.max_value.is_some();
    match (range.include_undefined_value.unwrap_or(false), has_bound) {
        (true, true) => vec![UNDEFINED_WITH_BOUNDS.to_string()],
        (false, false) => vec![BOUNDS_REQUIRED.to_string()],
        _ => Vec::new(),
    }
}

/// Equal dates are accepted; only a start after the stop is rejected.
pub fn temporal_order(_: &ValidationFacts, range: &TemporalRange) -> Vec<String> {
    match (range.start_date, range.stop_date) {
        (Some(start), Some(stop)) if start > stop => vec![format!(
            "start_date [{}] must not be after stop_date [{}]",
            start.to_rfc3339(),
            stop.to_rfc3339()
        )],
        _ => Vec::new(),
    }
}

fn target_group_exists(facts: &ValidationFacts, target_id: &String) -> Vec<String> {
    if facts.target_group_exists {
        Vec::new()
    } else {
        vec![format!("Group with concept id [{target_id}] does not exist")]
    }
}
