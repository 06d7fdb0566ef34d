use crate::error::PressureError;
use crate::memory::PressureConfig;
use crate::memory::generator::{
    DEFAULT_CHUNK_COUNT, DEFAULT_CHUNK_SIZE_BYTES, DEFAULT_INTER_CHUNK_DELAY,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

/// Environment variable naming the OTLP collector endpoint.
pub const OTLP_ENDPOINT_ENV: &str = "OTEL_EXPORTER_OTLP_ENDPOINT";

pub const DEFAULT_OTLP_ENDPOINT: &str =
    "http://otel-opentelemetry-collector.observability.svc.cluster.local:4317";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration build error: {0}")]
    Build(#[from] config::ConfigError),
    #[error("Invalid configuration: {0}")]
    Validation(String),
}

#[derive(Clone, Debug, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "default_service_version")]
    pub service_version: String,
    /// Reported as `deployment.environment`.
    #[serde(default = "default_environment")]
    pub environment: String,
    /// Collector address. Overridden by `OTEL_EXPORTER_OTLP_ENDPOINT` when set.
    #[serde(default = "default_otlp_endpoint")]
    pub otlp_endpoint: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            service_version: default_service_version(),
            environment: default_environment(),
            otlp_endpoint: default_otlp_endpoint(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct MemoryConfig {
    #[serde(default = "default_chunk_size_bytes")]
    pub chunk_size_bytes: usize,
    #[serde(default = "default_chunk_count")]
    pub chunk_count: usize,
    #[serde(default = "default_inter_chunk_delay_ms")]
    pub inter_chunk_delay_ms: u64,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            chunk_size_bytes: default_chunk_size_bytes(),
            chunk_count: default_chunk_count(),
            inter_chunk_delay_ms: default_inter_chunk_delay_ms(),
        }
    }
}

impl MemoryConfig {
    pub fn pressure_config(&self) -> PressureConfig {
        PressureConfig {
            chunk_size_bytes: self.chunk_size_bytes,
            chunk_count: self.chunk_count,
            inter_chunk_delay: Duration::from_millis(self.inter_chunk_delay_ms),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            telemetry: TelemetryConfig::default(),
            memory: MemoryConfig::default(),
        }
    }
}

impl AppConfig {
    /// Check the values serde cannot: address syntax and the memory run shape.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bind_address.parse::<SocketAddr>().map_err(|e| {
            ConfigError::Validation(format!(
                "bind_address {:?} is not a socket address: {e}",
                self.bind_address
            ))
        })?;
        self.memory
            .pressure_config()
            .validate()
            .map_err(|e| match e {
                PressureError::InvalidConfiguration(msg) => {
                    ConfigError::Validation(format!("memory.{msg}"))
                }
                other => ConfigError::Validation(other.to_string()),
            })?;
        if self.telemetry.otlp_endpoint.trim().is_empty() {
            return Err(ConfigError::Validation(
                "telemetry.otlp_endpoint must not be empty".into(),
            ));
        }
        Ok(())
    }
}

fn default_bind_address() -> String {
    "0.0.0.0:8080".into()
}

fn default_service_name() -> String {
    "demo-api".into()
}

fn default_service_version() -> String {
    env!("CARGO_PKG_VERSION").into()
}

fn default_environment() -> String {
    "Production".into()
}

fn default_otlp_endpoint() -> String {
    DEFAULT_OTLP_ENDPOINT.into()
}

fn default_chunk_size_bytes() -> usize {
    DEFAULT_CHUNK_SIZE_BYTES
}

fn default_chunk_count() -> usize {
    DEFAULT_CHUNK_COUNT
}

fn default_inter_chunk_delay_ms() -> u64 {
    DEFAULT_INTER_CHUNK_DELAY.as_millis() as u64
}

/// Load application configuration from an optional `config.yaml` + environment overrides.
///
/// Nested keys are overridden with double underscores (e.g. `MEMORY__CHUNK_COUNT=4`).
/// `OTEL_EXPORTER_OTLP_ENDPOINT` maps onto `telemetry.otlp_endpoint`; when it is
/// unset the built-in collector address is used.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from("config.yaml")
}

/// Same as [`load_config`] with an explicit file path. A missing file is not an error.
pub fn load_config_from(path: &str) -> Result<AppConfig, ConfigError> {
    use config::{Config, Environment, File};
    let otlp_override = std::env::var(OTLP_ENDPOINT_ENV)
        .ok()
        .filter(|v| !v.trim().is_empty());

    let cfg = Config::builder()
        .add_source(File::with_name(path).required(false))
        .add_source(Environment::default().separator("__"))
        .set_override_option("telemetry.otlp_endpoint", otlp_override)?
        .build()?;

    let app: AppConfig = cfg.try_deserialize()?;
    app.validate()?;
    Ok(app)
}

/// Convenience helper for binaries wanting panic-on-error behaviour.
pub fn load_config_or_panic() -> AppConfig {
    match load_config() {
        Ok(c) => c,
        Err(e) => panic!("Failed to load configuration: {e}"),
    }
}
