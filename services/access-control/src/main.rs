//! Catalog access-control HTTP service entry point.
//!
//! # Purpose
//! Wires configuration, storage, seed data and the HTTP router, then serves
//! the API alongside the metrics listener.
use access_control::app::{AppState, build_router};
use access_control::config::AccessControlConfig;
use access_control::lookups::TokenTable;
use access_control::observability;
use access_control::seed::apply_seed;
use access_control::store::memory::InMemoryStore;
use access_control::store::{AccessControlStore, StoreConfig};
use anyhow::Context;
use std::future::Future;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AccessControlConfig::from_env_or_yaml().context("access control config")?;
    run_with_shutdown(config, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
}

async fn run_with_shutdown<F>(config: AccessControlConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let metrics_handle = observability::init_observability("access-control")?;
    let state = build_state(&config).await?;
    let metrics_task = tokio::spawn(observability::serve_metrics(
        metrics_handle,
        config.metrics_bind,
    ));

    let app = build_router(state.clone());
    let addr = config.bind_addr;
    tracing::info!(%addr, backend = state.store.backend_name(), "access control listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tokio::pin!(shutdown);
    tokio::select! {
        result = axum::serve(listener, app.into_make_service()) => {
            result?;
        }
        _ = &mut shutdown => {}
    }

    metrics_task.abort();
    let _ = metrics_task.await;
    Ok(())
}

async fn build_state(config: &AccessControlConfig) -> anyhow::Result<AppState> {
    let store: Arc<dyn AccessControlStore + Send + Sync> =
        Arc::new(InMemoryStore::new(StoreConfig::default()));
    apply_seed(store.as_ref(), &config.seed)
        .await
        .context("apply seed data")?;
    let tokens = TokenTable::new(config.seed.tokens.clone());
    Ok(AppState::new(store, tokens, config.search_limit))
}
