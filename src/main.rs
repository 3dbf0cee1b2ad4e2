use devbridge_core::config::BridgeConfig;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    devbridge_core::util::init_logging();

    // Defaults, then .devbridge.toml in the working directory, then DEVBRIDGE_* env vars
    let config = BridgeConfig::load()?;

    info!(
        "Starting devbridge on port {} (root {})",
        config.port,
        config.root.display()
    );

    devbridge_core::server::run_server(config).await
}
