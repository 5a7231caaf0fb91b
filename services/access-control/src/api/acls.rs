//! ACL API handlers.
//!
//! # Purpose
//! ACL CRUD and search. Every create and update runs the full validation
//! pipeline before the store is touched; each outcome is counted. Creating a
//! catalog-item ACL is authorized inside validation; creating any other ACL
//! requires the system `ANY_ACL` grant once the document is valid. Updates and
//! deletes require the matching permission over the stored ACL.
use crate::api::error::{
    ApiError, api_conflict, api_internal, api_not_found, api_validation_error,
    api_validation_errors,
};
use crate::api::types::{AclListResponse, AclResponse, AclSearchParams};
use crate::api::{api_acl_error, request_context};
use crate::app::AppState;
use crate::observability::record_acl_validation;
use crate::store::{ConceptRevision, StoreError, StoredAcl};
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use catalog_acl::{
    Acl, AclDocument, AclError, AclSearchCriteria, Identity, IdentityType, Permission,
    RequestContext, SaveOperation,
};

fn acl_not_found(concept_id: &str) -> ApiError {
    api_not_found(&format!("ACL could not be found with concept id [{concept_id}]"))
}

fn acl_store_error(concept_id: &str, action: &str, err: StoreError) -> ApiError {
    match err {
        StoreError::NotFound(_) => acl_not_found(concept_id),
        StoreError::Conflict(message) => api_conflict("already_exists", &message),
        err => api_internal(&format!("failed to {action} acl"), &err),
    }
}

/// Load the ACL and check the caller may change it with `permission`.
async fn authorized_acl(
    state: &AppState,
    context: &RequestContext,
    concept_id: &str,
    permission: Permission,
) -> Result<StoredAcl, ApiError> {
    let stored = state
        .store
        .get_acl(concept_id)
        .await
        .map_err(|err| acl_store_error(concept_id, "load", err))?;
    catalog_acl::validate_acl_mutation_permission(
        state.lookups.as_ref(),
        context,
        &stored.acl,
        permission,
    )
    .await
    .map_err(api_acl_error)?;
    Ok(stored)
}

/// Resolve the document and run the validation pipeline for one save.
async fn validated_acl(
    state: &AppState,
    context: &RequestContext,
    document: AclDocument,
    operation: SaveOperation,
) -> Result<Acl, ApiError> {
    let acl = match Acl::from_document(document) {
        Ok(acl) => acl,
        Err(errors) => {
            record_acl_validation(operation.as_str(), "rejected");
            return Err(api_validation_errors(&errors));
        }
    };
    let outcome = catalog_acl::validate_acl(state.lookups.as_ref(), context, &acl, operation).await;
    match outcome {
        Ok(()) => {
            record_acl_validation(operation.as_str(), "accepted");
            Ok(acl)
        }
        Err(err) => {
            let label = match &err {
                AclError::Dependency(_) => "error",
                AclError::Validation(_) | AclError::PermissionDenied(_) => "rejected",
            };
            record_acl_validation(operation.as_str(), label);
            Err(api_acl_error(err))
        }
    }
}

#[utoipa::path(
    post,
    path = "/v1/acls",
    tag = "acls",
    responses(
        (status = 201, description = "ACL created", body = ConceptRevision),
        (status = 400, description = "ACL failed validation", body = crate::api::types::ErrorResponse),
        (status = 401, description = "Unknown token", body = crate::api::types::ErrorResponse),
        (status = 403, description = "Caller may not create this ACL", body = crate::api::types::ErrorResponse),
        (status = 409, description = "An ACL with this identity exists", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn create_acl(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(document): Json<AclDocument>,
) -> Result<(StatusCode, Json<ConceptRevision>), ApiError> {
    let context = request_context(&state, &headers)?;
    let acl = validated_acl(&state, &context, document, SaveOperation::Create).await?;
    if !matches!(acl.identity, Identity::CatalogItem(_)) {
        catalog_acl::validate_acl_mutation_permission(
            state.lookups.as_ref(),
            &context,
            &acl,
            Permission::Create,
        )
        .await
        .map_err(api_acl_error)?;
    }
    match state.store.create_acl(acl).await {
        Ok(revision) => {
            tracing::info!(concept_id = %revision.concept_id, "acl created");
            Ok((StatusCode::CREATED, Json(revision)))
        }
        Err(StoreError::Conflict(message)) => Err(api_conflict("already_exists", &message)),
        Err(err) => Err(api_internal("failed to create acl", &err)),
    }
}

#[utoipa::path(
    get,
    path = "/v1/acls",
    tag = "acls",
    params(AclSearchParams),
    responses(
        (status = 200, description = "Matching ACLs", body = AclListResponse),
        (status = 400, description = "Invalid search parameter", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn search_acls(
    State(state): State<AppState>,
    Query(params): Query<AclSearchParams>,
) -> Result<Json<AclListResponse>, ApiError> {
    let identity_type = match params.identity_type.as_deref() {
        Some(value) => Some(value.parse::<IdentityType>().map_err(|_| {
            api_validation_error(&format!("identity_type [{value}] is not a valid identity type"))
        })?),
        None => None,
    };
    let criteria = AclSearchCriteria {
        provider_id: params.provider_id,
        identity_type,
        target: params.target,
        permitted_group: params.permitted_group,
        limit: Some(params.limit.unwrap_or(state.search_limit)),
    };
    let acls = state
        .store
        .search_acls(&criteria)
        .await
        .map_err(|err| api_internal("failed to search acls", &err))?;
    let items: Vec<AclResponse> = acls.into_iter().map(AclResponse::from).collect();
    Ok(Json(AclListResponse {
        hits: items.len(),
        items,
    }))
}

#[utoipa::path(
    get,
    path = "/v1/acls/{concept_id}",
    tag = "acls",
    params(
        ("concept_id" = String, Path, description = "ACL concept id")
    ),
    responses(
        (status = 200, description = "ACL", body = AclResponse),
        (status = 404, description = "ACL not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn get_acl(
    Path(concept_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<AclResponse>, ApiError> {
    let stored = state
        .store
        .get_acl(&concept_id)
        .await
        .map_err(|err| acl_store_error(&concept_id, "load", err))?;
    Ok(Json(stored.into()))
}

#[utoipa::path(
    put,
    path = "/v1/acls/{concept_id}",
    tag = "acls",
    params(
        ("concept_id" = String, Path, description = "ACL concept id")
    ),
    responses(
        (status = 200, description = "ACL updated", body = ConceptRevision),
        (status = 400, description = "ACL failed validation", body = crate::api::types::ErrorResponse),
        (status = 401, description = "Unknown token", body = crate::api::types::ErrorResponse),
        (status = 403, description = "Caller may not update this ACL", body = crate::api::types::ErrorResponse),
        (status = 404, description = "ACL not found", body = crate::api::types::ErrorResponse),
        (status = 409, description = "An ACL with this identity exists", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn update_acl(
    Path(concept_id): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(document): Json<AclDocument>,
) -> Result<Json<ConceptRevision>, ApiError> {
    let context = request_context(&state, &headers)?;
    let stored = authorized_acl(&state, &context, &concept_id, Permission::Update).await?;
    let acl = validated_acl(&state, &context, document, SaveOperation::Update).await?;
    if acl.identity != stored.acl.identity {
        catalog_acl::validate_acl_mutation_permission(
            state.lookups.as_ref(),
            &context,
            &acl,
            Permission::Update,
        )
        .await
        .map_err(api_acl_error)?;
    }
    let revision = state
        .store
        .update_acl(&concept_id, acl)
        .await
        .map_err(|err| acl_store_error(&concept_id, "update", err))?;
    Ok(Json(revision))
}

#[utoipa::path(
    delete,
    path = "/v1/acls/{concept_id}",
    tag = "acls",
    params(
        ("concept_id" = String, Path, description = "ACL concept id")
    ),
    responses(
        (status = 200, description = "ACL deleted", body = ConceptRevision),
        (status = 401, description = "Unknown token", body = crate::api::types::ErrorResponse),
        (status = 403, description = "Caller may not delete this ACL", body = crate::api::types::ErrorResponse),
        (status = 404, description = "ACL not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn delete_acl(
    Path(concept_id): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ConceptRevision>, ApiError> {
    let context = request_context(&state, &headers)?;
    authorized_acl(&state, &context, &concept_id, Permission::Delete).await?;
    let revision = state
        .store
        .delete_acl(&concept_id)
        .await
        .map_err(|err| acl_store_error(&concept_id, "delete", err))?;
    tracing::info!(concept_id = %concept_id, "acl deleted");
    Ok(Json(revision))
}
