#![allow(dead_code)]

use access_control::app::{AppState, build_router};
use access_control::config::{DEFAULT_SEARCH_LIMIT, SeedData};
use access_control::lookups::TokenTable;
use access_control::seed::apply_seed;
use access_control::store::StoreConfig;
use access_control::store::memory::InMemoryStore;
use catalog_acl::Group;
use std::sync::Arc;

pub const ADMIN_TOKEN: &str = "admin-token";
pub const USER_TOKEN: &str = "user-token";
/// System administrators group, created first by the seed.
pub const SYSTEM_ADMINS: &str = "AG1-CMR";
/// PROV1 administrators group.
pub const PROV1_ADMINS: &str = "AG2-CMR";

pub type TestApp = axum::routing::RouterIntoService<axum::body::Body, ()>;

pub async fn read_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

fn group(name: &str, provider_id: Option<&str>, members: &[&str]) -> Group {
    Group {
        name: name.to_string(),
        provider_id: provider_id.map(str::to_string),
        description: format!("{name} group"),
        legacy_guid: None,
        members: members.iter().map(|member| member.to_string()).collect(),
    }
}

/// Two providers, one collection, an `admin` with system group and ACL rights
/// and PROV1 catalog-item ACL rights, and `bob` with no grants.
pub fn seed() -> SeedData {
    let mut seed = SeedData::default();
    seed.providers = vec!["PROV1".to_string(), "PROV2".to_string()];
    seed.collections
        .insert("PROV1".to_string(), vec!["dataset one".to_string()]);
    seed.tokens
        .insert(ADMIN_TOKEN.to_string(), "admin".to_string());
    seed.tokens.insert(USER_TOKEN.to_string(), "bob".to_string());
    seed.groups = vec![
        group("Administrators", None, &["admin"]),
        group("PROV1 Admins", Some("PROV1"), &["admin"]),
    ];
    seed.acls = serde_json::from_value(serde_json::json!([
        {
            "system_identity": { "target": "GROUP" },
            "group_permissions": [
                { "group_id": SYSTEM_ADMINS, "permissions": ["create", "read"] }
            ]
        },
        {
            "system_identity": { "target": "ANY_ACL" },
            "group_permissions": [
                { "group_id": SYSTEM_ADMINS, "permissions": ["create", "read", "update", "delete"] }
            ]
        },
        {
            "provider_identity": { "provider_id": "PROV1", "target": "CATALOG_ITEM_ACL" },
            "group_permissions": [
                { "group_id": PROV1_ADMINS, "permissions": ["create", "read", "update", "delete"] }
            ]
        }
    ]))
    .expect("seed acls");
    seed
}

pub async fn seeded_app() -> TestApp {
    let seed = seed();
    let store = Arc::new(InMemoryStore::new(StoreConfig::default()));
    apply_seed(store.as_ref(), &seed).await.expect("seed");
    let state = AppState::new(store, TokenTable::new(seed.tokens), DEFAULT_SEARCH_LIMIT);
    build_router(state).into_service()
}

/// Messages reported at `path` in a validation error body.
pub fn messages_at<'a>(payload: &'a serde_json::Value, path: &str) -> Vec<&'a str> {
    payload["errors"]
        .as_array()
        .into_iter()
        .flatten()
        .filter(|entry| entry["path"] == path)
        .flat_map(|entry| entry["errors"].as_array().into_iter().flatten())
        .filter_map(|message| message.as_str())
        .collect()
}
