//! Provider listing.
use crate::api::error::{ApiError, api_dependency};
use crate::api::types::ProviderListResponse;
use crate::app::AppState;
use axum::Json;
use axum::extract::State;
use catalog_acl::CatalogLookups;

#[utoipa::path(
    get,
    path = "/v1/providers",
    tag = "providers",
    responses(
        (status = 200, description = "Known providers", body = ProviderListResponse),
        (status = 500, description = "Provider registry unavailable", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn list_providers(
    State(state): State<AppState>,
) -> Result<Json<ProviderListResponse>, ApiError> {
    let items = state
        .lookups
        .list_providers()
        .await
        .map_err(|err| api_dependency(&err))?;
    Ok(Json(ProviderListResponse { items }))
}
