//! Log/trace subscriber setup and the resource attributes attached to it.

use crate::config::TelemetryConfig;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub const DEFAULT_DIRECTIVES: &str = "demo_api=info,tower_http=info,hyper=warn";

/// Attributes describing this process, reported once at startup so every
/// collector sees which instance produced the signals that follow.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceResource {
    pub service_name: String,
    pub service_version: String,
    pub deployment_environment: String,
    pub service_instance_id: String,
}

impl ServiceResource {
    pub fn from_config(config: &TelemetryConfig) -> Self {
        Self {
            service_name: config.service_name.clone(),
            service_version: config.service_version.clone(),
            deployment_environment: config.environment.clone(),
            service_instance_id: instance_id(),
        }
    }
}

/// Pod name under Kubernetes, machine hostname elsewhere.
fn instance_id() -> String {
    std::env::var("HOSTNAME")
        .ok()
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Install the global subscriber. `RUST_LOG` takes precedence over the defaults.
pub fn initialize_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));

    let registry = tracing_subscriber::registry().with(env_filter);
    let layer = fmt::layer().with_target(true).with_level(true);

    registry.with(layer).init();
}

/// Record the resource attributes and the collector endpoint.
pub fn announce(resource: &ServiceResource, config: &TelemetryConfig) {
    tracing::info!(
        service.name = %resource.service_name,
        service.version = %resource.service_version,
        deployment.environment = %resource.deployment_environment,
        service.instance.id = %resource.service_instance_id,
        otlp_endpoint = %config.otlp_endpoint,
        "telemetry configuration"
    );
}
