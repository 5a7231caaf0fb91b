//! Access-control HTTP application wiring.
//!
//! # Purpose
//! Builds the Axum router, configures middleware, and defines the shared
//! application state injected into handlers.
use crate::api;
use crate::api::openapi::ApiDoc;
use crate::lookups::{StoreLookups, TokenTable};
use crate::observability;
use crate::store::AccessControlStore;
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_opentelemetry::OpenTelemetrySpanExt;
use utoipa::OpenApi;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn AccessControlStore + Send + Sync>,
    /// Validation collaborators backed by `store` and `tokens`.
    pub lookups: Arc<StoreLookups>,
    pub tokens: Arc<TokenTable>,
    /// Page size for searches that do not pass `limit`.
    pub search_limit: usize,
}

impl AppState {
    pub fn new(
        store: Arc<dyn AccessControlStore + Send + Sync>,
        tokens: TokenTable,
        search_limit: usize,
    ) -> Self {
        let tokens = Arc::new(tokens);
        let lookups = Arc::new(StoreLookups::new(store.clone(), tokens.clone()));
        Self {
            store,
            lookups,
            tokens,
            search_limit,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let trace_layer =
        TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
            let parent = observability::trace_context_from_headers(request.headers());
            let span = tracing::info_span!(
                "http.request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version()
            );
            span.set_parent(parent);
            span
        });

    Router::new()
        .route(
            "/v1/system/health",
            axum::routing::get(api::system::system_health),
        )
        .route(
            "/v1/providers",
            axum::routing::get(api::providers::list_providers),
        )
        .route(
            "/v1/groups",
            axum::routing::get(api::groups::search_groups).post(api::groups::create_group),
        )
        .route(
            "/v1/groups/:concept_id",
            axum::routing::get(api::groups::get_group)
                .put(api::groups::update_group)
                .delete(api::groups::delete_group),
        )
        .route(
            "/v1/groups/:concept_id/members",
            axum::routing::get(api::groups::list_members)
                .post(api::groups::add_members)
                .delete(api::groups::remove_members),
        )
        .route(
            "/v1/acls",
            axum::routing::get(api::acls::search_acls).post(api::acls::create_acl),
        )
        .route(
            "/v1/acls/:concept_id",
            axum::routing::get(api::acls::get_acl)
                .put(api::acls::update_acl)
                .delete(api::acls::delete_acl),
        )
        .merge(
            utoipa_swagger_ui::SwaggerUi::new("/docs").url("/v1/openapi.json", ApiDoc::openapi()),
        )
        .layer(trace_layer)
        .with_state(state)
}
