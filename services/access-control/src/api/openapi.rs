//! OpenAPI schema aggregation for the access-control API.
use crate::api::{
    acls, groups, providers, system,
    types::{
        AclListResponse, AclResponse, ErrorResponse, FieldErrors, GroupListResponse,
        GroupRequest, GroupResponse, HealthStatus, ProviderListResponse,
    },
};
use crate::store::ConceptRevision;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "access-control",
        version = "v1",
        description = "Catalog access-control HTTP API"
    ),
    paths(
        system::system_health,
        providers::list_providers,
        groups::create_group,
        groups::search_groups,
        groups::get_group,
        groups::update_group,
        groups::delete_group,
        groups::list_members,
        groups::add_members,
        groups::remove_members,
        acls::create_acl,
        acls::search_acls,
        acls::get_acl,
        acls::update_acl,
        acls::delete_acl
    ),
    components(schemas(
        HealthStatus,
        ErrorResponse,
        FieldErrors,
        ConceptRevision,
        ProviderListResponse,
        GroupRequest,
        GroupResponse,
        GroupListResponse,
        AclResponse,
        AclListResponse
    )),
    tags(
        (name = "system", description = "Health endpoints"),
        (name = "providers", description = "Provider discovery"),
        (name = "groups", description = "Group management and membership"),
        (name = "acls", description = "Access control list management")
    )
)]
pub struct ApiDoc;
