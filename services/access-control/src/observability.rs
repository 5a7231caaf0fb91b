//! Observability wiring for the access-control service.
//!
//! # Purpose
//! Initializes tracing, OpenTelemetry propagation and the Prometheus metrics
//! endpoint, and names the service's metrics in one place.
//!
//! # Notes
//! Initialization is guarded by `OnceLock` so repeated calls in tests are
//! harmless.
use anyhow::Context;
use metrics_exporter_prometheus::PrometheusBuilder;
use metrics_exporter_prometheus::PrometheusHandle;
use opentelemetry::KeyValue;
use opentelemetry::global;
use opentelemetry::propagation::Extractor;
use opentelemetry::trace::TracerProvider;
use opentelemetry_sdk::Resource;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub const ACL_VALIDATIONS_TOTAL: &str = "access_control_acl_validations_total";
pub const GROUP_MUTATIONS_TOTAL: &str = "access_control_group_mutations_total";
pub const GROUPS_TOTAL: &str = "access_control_groups_total";
pub const ACLS_TOTAL: &str = "access_control_acls_total";

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
static OBS_INIT: OnceLock<()> = OnceLock::new();
static PROPAGATOR_INIT: OnceLock<()> = OnceLock::new();

pub fn init_observability(service_name: &str) -> anyhow::Result<PrometheusHandle> {
    OBS_INIT.get_or_init(|| {
        global::set_text_map_propagator(
            opentelemetry_sdk::propagation::TraceContextPropagator::new(),
        );

        let provider = build_tracer_provider(service_name);
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let registry = tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer());
        if let Some(provider) = provider {
            let tracer = provider.tracer(service_name.to_string());
            let _ = registry
                .with(tracing_opentelemetry::layer().with_tracer(tracer))
                .try_init();
        } else {
            let _ = registry.try_init();
        }
    });

    install_metrics_recorder()
}

fn build_tracer_provider(
    service_name: &str,
) -> Option<opentelemetry_sdk::trace::SdkTracerProvider> {
    let resource = Resource::builder_empty()
        .with_attributes(resource_attributes(service_name))
        .build();
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .build()
        .ok()?;
    Some(
        opentelemetry_sdk::trace::SdkTracerProvider::builder()
            .with_batch_exporter(exporter)
            .with_resource(resource)
            .build(),
    )
}

fn resource_attributes(service_name: &str) -> Vec<KeyValue> {
    let mut attrs = vec![KeyValue::new("service.name", service_name.to_string())];
    if let Ok(value) =
        std::env::var("ACCESS_CONTROL_INSTANCE_ID").or_else(|_| std::env::var("HOSTNAME"))
    {
        attrs.push(KeyValue::new("service.instance.id", value));
    }
    if let Ok(value) = std::env::var("DEPLOYMENT_ENVIRONMENT") {
        attrs.push(KeyValue::new("deployment.environment", value));
    }
    attrs
}

pub fn trace_context_from_headers(headers: &axum::http::HeaderMap) -> opentelemetry::Context {
    PROPAGATOR_INIT.get_or_init(|| {
        global::set_text_map_propagator(
            opentelemetry_sdk::propagation::TraceContextPropagator::new(),
        );
    });
    global::get_text_map_propagator(|prop| prop.extract(&HeaderMapExtractor(headers)))
}

struct HeaderMapExtractor<'a>(&'a axum::http::HeaderMap);

impl Extractor for HeaderMapExtractor<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|value| value.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(|name| name.as_str()).collect()
    }
}

/// Count one ACL validation by operation and outcome.
pub fn record_acl_validation(operation: &'static str, outcome: &'static str) {
    metrics::counter!(
        ACL_VALIDATIONS_TOTAL,
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);
}

/// Group change that produced a new revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupMutation {
    Created,
    Updated,
    Deleted,
    MembersAdded,
    MembersRemoved,
}

impl GroupMutation {
    pub fn as_str(self) -> &'static str {
        match self {
            GroupMutation::Created => "created",
            GroupMutation::Updated => "updated",
            GroupMutation::Deleted => "deleted",
            GroupMutation::MembersAdded => "members_added",
            GroupMutation::MembersRemoved => "members_removed",
        }
    }
}

pub fn record_group_mutation(mutation: GroupMutation) {
    metrics::counter!(GROUP_MUTATIONS_TOTAL, "op" => mutation.as_str()).increment(1);
}

/// Publish the number of live documents in a search index.
pub fn record_live_documents(gauge: &'static str, count: usize) {
    metrics::gauge!(gauge).set(count as f64);
}

pub async fn serve_metrics(handle: PrometheusHandle, addr: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    serve_metrics_with_listener(handle, listener, std::future::pending()).await
}

async fn serve_metrics_with_listener<F>(
    handle: PrometheusHandle,
    listener: tokio::net::TcpListener,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = axum::Router::new().route(
        "/metrics",
        axum::routing::get(move || async move { handle.render() }),
    );
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown)
        .await
}

fn install_metrics_recorder() -> anyhow::Result<PrometheusHandle> {
    if let Some(handle) = METRICS_HANDLE.get() {
        return Ok(handle.clone());
    }
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .context("install metrics recorder")?;
    let _ = METRICS_HANDLE.set(handle.clone());
    Ok(handle)
}
