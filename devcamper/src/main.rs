use std::process::ExitCode;

use devcamper::config::Config;
use devcamper::server::{build_state, serve};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> ExitCode {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Environment misconfigured: {e}");
            return ExitCode::FAILURE;
        }
    };

    info!("Initializing state...");
    let state = match build_state(&config).await {
        Ok(state) => state,
        Err(e) => {
            error!("Failed to open store: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = serve(&config, state).await {
        error!("Server error: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
