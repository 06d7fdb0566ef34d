//! Demonstration HTTP service for observability stacks.
//!
//! Besides the usual liveness and ping endpoints it exposes `/memory`, which
//! deliberately grows the resident memory of the process until a container
//! memory limit gets it OOM-killed and restarted.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::memory::{PressureGenerator, RetentionStore};

pub mod api;
pub mod config;
pub mod error;
pub mod memory;
pub mod telemetry;

#[derive(Clone, Debug)]
pub struct AppResources {
    pub config: Arc<AppConfig>,
    pub generator: PressureGenerator,
}

impl AppResources {
    /// Wire a generator using the configured memory settings to `store`.
    pub fn new(config: AppConfig, store: RetentionStore) -> Self {
        let generator = PressureGenerator::new(config.memory.pressure_config(), store);
        Self {
            config: Arc::new(config),
            generator,
        }
    }
}
