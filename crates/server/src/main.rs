use demo_api::AppResources;
use demo_api::api::start_webserver;
use demo_api::config::load_config_or_panic;
use demo_api::memory::RetentionStore;
use demo_api::telemetry::{ServiceResource, announce, initialize_tracing};

#[tokio::main]
async fn main() -> color_eyre::eyre::Result<()> {
    color_eyre::install()?;

    // A missing .env file is fine; the environment and config.yaml still apply.
    let _ = dotenvy::dotenv();

    initialize_tracing();

    let config = load_config_or_panic();
    let resource = ServiceResource::from_config(&config.telemetry);
    announce(&resource, &config.telemetry);

    let pressure = config.memory.pressure_config();
    tracing::info!(
        chunk_size_bytes = pressure.chunk_size_bytes,
        chunk_count = pressure.chunk_count,
        delay_ms = config.memory.inter_chunk_delay_ms,
        target_mib = pressure.target_mib(),
        "memory pressure configuration"
    );

    // Lives until the process exits; everything /memory allocates ends up here.
    let store = RetentionStore::new();
    let resources = AppResources::new(config, store);

    start_webserver(resources).await?;
    Ok(())
}
