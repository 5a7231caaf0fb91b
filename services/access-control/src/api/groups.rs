//! Group API handlers.
//!
//! # Purpose
//! Group CRUD, membership edits and search. Creation is validated and
//! authorized by the core. Updates, deletes and membership edits first load
//! the group, so an unknown id is a 404, then require a group administration
//! grant. Updates may not move a group to another name or provider.
use crate::api::error::{
    ApiError, api_conflict, api_internal, api_not_found, api_validation_errors,
};
use crate::api::types::{GroupListResponse, GroupRequest, GroupResponse, GroupSearchParams};
use crate::api::{api_acl_error, request_context};
use crate::app::AppState;
use crate::store::{ConceptRevision, StoreError, StoredGroup};
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use catalog_acl::{FieldPath, GroupSearchCriteria, Permission, ValidationErrors};

fn group_not_found(concept_id: &str) -> ApiError {
    api_not_found(&format!(
        "Group could not be found with concept id [{concept_id}]"
    ))
}

fn group_store_error(concept_id: &str, action: &str, err: StoreError) -> ApiError {
    match err {
        StoreError::NotFound(_) => group_not_found(concept_id),
        StoreError::Conflict(message) => api_conflict("already_exists", &message),
        err => api_internal(&format!("failed to {action} group"), &err),
    }
}

async fn load_group(state: &AppState, concept_id: &str) -> Result<StoredGroup, ApiError> {
    state
        .store
        .get_group(concept_id)
        .await
        .map_err(|err| group_store_error(concept_id, "load", err))
}

/// Load the group and check the caller may change it with `permission`.
async fn authorized_group(
    state: &AppState,
    headers: &HeaderMap,
    concept_id: &str,
    permission: Permission,
) -> Result<StoredGroup, ApiError> {
    let context = request_context(state, headers)?;
    let stored = load_group(state, concept_id).await?;
    catalog_acl::validate_group_mutation_permission(
        state.lookups.as_ref(),
        &context,
        concept_id,
        permission,
    )
    .await
    .map_err(api_acl_error)?;
    Ok(stored)
}

#[utoipa::path(
    post,
    path = "/v1/groups",
    tag = "groups",
    request_body = GroupRequest,
    responses(
        (status = 201, description = "Group created", body = ConceptRevision),
        (status = 400, description = "Group failed validation", body = crate::api::types::ErrorResponse),
        (status = 401, description = "Unknown token", body = crate::api::types::ErrorResponse),
        (status = 403, description = "Caller may not create this group", body = crate::api::types::ErrorResponse),
        (status = 409, description = "Group name already in use", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn create_group(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<GroupRequest>,
) -> Result<(StatusCode, Json<ConceptRevision>), ApiError> {
    let context = request_context(&state, &headers)?;
    let group = body.into_group();
    catalog_acl::validate_group_create(state.lookups.as_ref(), &context, &group)
        .await
        .map_err(api_acl_error)?;
    match state.store.create_group(group).await {
        Ok(revision) => {
            tracing::info!(concept_id = %revision.concept_id, "group created");
            Ok((StatusCode::CREATED, Json(revision)))
        }
        Err(StoreError::Conflict(message)) => Err(api_conflict("already_exists", &message)),
        Err(err) => Err(api_internal("failed to create group", &err)),
    }
}

#[utoipa::path(
    get,
    path = "/v1/groups",
    tag = "groups",
    params(GroupSearchParams),
    responses(
        (status = 200, description = "Matching groups", body = GroupListResponse)
    )
)]
pub(crate) async fn search_groups(
    State(state): State<AppState>,
    Query(params): Query<GroupSearchParams>,
) -> Result<Json<GroupListResponse>, ApiError> {
    let criteria = GroupSearchCriteria {
        provider_id: params.provider_id,
        member: params.member,
        name: params.name,
        concept_ids: Vec::new(),
        limit: Some(params.limit.unwrap_or(state.search_limit)),
    };
    let groups = state
        .store
        .search_groups(&criteria)
        .await
        .map_err(|err| api_internal("failed to search groups", &err))?;
    let items: Vec<GroupResponse> = groups.into_iter().map(GroupResponse::from).collect();
    Ok(Json(GroupListResponse {
        hits: items.len(),
        items,
    }))
}

#[utoipa::path(
    get,
    path = "/v1/groups/{concept_id}",
    tag = "groups",
    params(
        ("concept_id" = String, Path, description = "Group concept id")
    ),
    responses(
        (status = 200, description = "Group", body = GroupResponse),
        (status = 404, description = "Group not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn get_group(
    Path(concept_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<GroupResponse>, ApiError> {
    Ok(Json(load_group(&state, &concept_id).await?.into()))
}

#[utoipa::path(
    put,
    path = "/v1/groups/{concept_id}",
    tag = "groups",
    params(
        ("concept_id" = String, Path, description = "Group concept id")
    ),
    request_body = GroupRequest,
    responses(
        (status = 200, description = "Group updated", body = ConceptRevision),
        (status = 400, description = "Group failed validation", body = crate::api::types::ErrorResponse),
        (status = 401, description = "Unknown token", body = crate::api::types::ErrorResponse),
        (status = 403, description = "Caller may not update this group", body = crate::api::types::ErrorResponse),
        (status = 404, description = "Group not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn update_group(
    Path(concept_id): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<GroupRequest>,
) -> Result<Json<ConceptRevision>, ApiError> {
    let existing = authorized_group(&state, &headers, &concept_id, Permission::Update).await?;
    let group = body.into_group();

    let mut errors = ValidationErrors::new();
    if group.name != existing.group.name {
        errors.add(
            &FieldPath::new(["name"]),
            format!(
                "Group name cannot be modified from [{}] to [{}]",
                existing.group.name, group.name
            ),
        );
    }
    if group.provider_id != existing.group.provider_id {
        errors.add(
            &FieldPath::new(["provider_id"]),
            format!(
                "Group provider id cannot be modified from [{}] to [{}]",
                existing.group.provider_id.as_deref().unwrap_or("SYSTEM"),
                group.provider_id.as_deref().unwrap_or("SYSTEM")
            ),
        );
    }
    if !errors.is_empty() {
        return Err(api_validation_errors(&errors));
    }

    catalog_acl::validate_group(state.lookups.as_ref(), &group)
        .await
        .map_err(api_acl_error)?;
    let revision = state
        .store
        .update_group(&concept_id, group)
        .await
        .map_err(|err| group_store_error(&concept_id, "update", err))?;
    Ok(Json(revision))
}

#[utoipa::path(
    delete,
    path = "/v1/groups/{concept_id}",
    tag = "groups",
    params(
        ("concept_id" = String, Path, description = "Group concept id")
    ),
    responses(
        (status = 200, description = "Group deleted", body = ConceptRevision),
        (status = 401, description = "Unknown token", body = crate::api::types::ErrorResponse),
        (status = 403, description = "Caller may not delete this group", body = crate::api::types::ErrorResponse),
        (status = 404, description = "Group not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn delete_group(
    Path(concept_id): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ConceptRevision>, ApiError> {
    authorized_group(&state, &headers, &concept_id, Permission::Delete).await?;
    let revision = state
        .store
        .delete_group(&concept_id)
        .await
        .map_err(|err| group_store_error(&concept_id, "delete", err))?;
    tracing::info!(concept_id = %concept_id, "group deleted");
    Ok(Json(revision))
}

#[utoipa::path(
    get,
    path = "/v1/groups/{concept_id}/members",
    tag = "groups",
    params(
        ("concept_id" = String, Path, description = "Group concept id")
    ),
    responses(
        (status = 200, description = "Group members", body = [String]),
        (status = 404, description = "Group not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn list_members(
    Path(concept_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(load_group(&state, &concept_id).await?.group.members))
}

#[utoipa::path(
    post,
    path = "/v1/groups/{concept_id}/members",
    tag = "groups",
    params(
        ("concept_id" = String, Path, description = "Group concept id")
    ),
    request_body = [String],
    responses(
        (status = 200, description = "Members added", body = ConceptRevision),
        (status = 401, description = "Unknown token", body = crate::api::types::ErrorResponse),
        (status = 403, description = "Caller may not edit this group", body = crate::api::types::ErrorResponse),
        (status = 404, description = "Group not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn add_members(
    Path(concept_id): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(members): Json<Vec<String>>,
) -> Result<Json<ConceptRevision>, ApiError> {
    authorized_group(&state, &headers, &concept_id, Permission::Update).await?;
    let revision = state
        .store
        .add_members(&concept_id, members)
        .await
        .map_err(|err| group_store_error(&concept_id, "update members of", err))?;
    Ok(Json(revision))
}

#[utoipa::path(
    delete,
    path = "/v1/groups/{concept_id}/members",
    tag = "groups",
    params(
        ("concept_id" = String, Path, description = "Group concept id")
    ),
    request_body = [String],
    responses(
        (status = 200, description = "Members removed", body = ConceptRevision),
        (status = 401, description = "Unknown token", body = crate::api::types::ErrorResponse),
        (status = 403, description = "Caller may not edit this group", body = crate::api::types::ErrorResponse),
        (status = 404, description = "Group not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn remove_members(
    Path(concept_id): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(members): Json<Vec<String>>,
) -> Result<Json<ConceptRevision>, ApiError> {
    authorized_group(&state, &headers, &concept_id, Permission::Update).await?;
    let revision = state
        .store
        .remove_members(&concept_id, members)
        .await
        .map_err(|err| group_store_error(&concept_id, "update members of", err))?;
    Ok(Json(revision))
}
