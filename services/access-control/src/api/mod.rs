//! Access-control HTTP API module.
//!
//! # Purpose
//! Exposes route handler modules and the helpers they share: caller token
//! resolution and the mapping of validation outcomes onto HTTP errors.
pub mod acls;
pub mod error;
pub mod groups;
pub mod openapi;
pub mod providers;
pub mod system;
pub mod types;

use crate::api::error::{
    ApiError, api_dependency, api_forbidden, api_unauthorized, api_validation_errors,
};
use crate::app::AppState;
use axum::http::HeaderMap;
use catalog_acl::{AclError, RequestContext};

/// Headers checked for the caller token, in order.
pub const TOKEN_HEADERS: [&str; 2] = ["authorization", "echo-token"];

/// Build the request context from the caller token headers.
///
/// A missing token means a guest caller. A token that is present but unknown
/// is rejected here so validation never runs for it.
pub(crate) fn request_context(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<RequestContext, ApiError> {
    let Some(value) = TOKEN_HEADERS.iter().find_map(|name| headers.get(*name)) else {
        return Ok(RequestContext::anonymous());
    };
    let raw = value
        .to_str()
        .map_err(|_| api_unauthorized("token header is not valid text"))?;
    let token = raw.strip_prefix("Bearer ").unwrap_or(raw).trim();
    if token.is_empty() {
        return Ok(RequestContext::anonymous());
    }
    if state.tokens.user_for(token).is_none() {
        return Err(api_unauthorized("Token does not exist"));
    }
    Ok(RequestContext::with_token(token))
}

pub(crate) fn api_acl_error(err: AclError) -> ApiError {
    match err {
        AclError::Validation(errors) => api_validation_errors(&errors),
        AclError::PermissionDenied(message) => api_forbidden(&message),
        AclError::Dependency(err) => api_dependency(&err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookups::TokenTable;
    use crate::store::StoreConfig;
    use crate::store::memory::InMemoryStore;
    use axum::http::{HeaderValue, StatusCode};
    use catalog_acl::{DependencyError, FieldPath, ValidationErrors};
    use std::sync::Arc;

    fn state() -> AppState {
        AppState::new(
            Arc::new(InMemoryStore::new(StoreConfig::default())),
            TokenTable::new([("tok-1".to_string(), "alice".to_string())]),
            10,
        )
    }

    #[test]
    fn missing_token_is_guest() {
        let context = request_context(&state(), &HeaderMap::new()).expect("context");
        assert!(context.token.is_none());
    }

    #[test]
    fn known_token_from_either_header() {
        let state = state();
        for name in TOKEN_HEADERS {
            let mut headers = HeaderMap::new();
            headers.insert(name, HeaderValue::from_static("tok-1"));
            let context = request_context(&state, &headers).expect("context");
            assert_eq!(context.token.as_deref(), Some("tok-1"));
        }

        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer tok-1"));
        let context = request_context(&state, &headers).expect("bearer");
        assert_eq!(context.token.as_deref(), Some("tok-1"));
    }

    #[test]
    fn unknown_token_is_unauthorized() {
        let mut headers = HeaderMap::new();
        headers.insert("echo-token", HeaderValue::from_static("nope"));
        let err = request_context(&state(), &headers).expect_err("unknown");
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn acl_errors_map_to_statuses() {
        let validation = api_acl_error(AclError::Validation(ValidationErrors::single(
            FieldPath::new(["group_permissions"]),
            "bad",
        )));
        assert_eq!(validation.status, StatusCode::BAD_REQUEST);
        assert_eq!(validation.body.errors[0].path, "group_permissions");

        let denied = api_acl_error(AclError::PermissionDenied("no".to_string()));
        assert_eq!(denied.status, StatusCode::FORBIDDEN);

        let dependency = api_acl_error(AclError::Dependency(DependencyError::Unexpected(
            anyhow::anyhow!("down"),
        )));
        assert_eq!(dependency.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
