use std::process::ExitCode;

use clap::Parser;
use tickerdeck_core::{build_provider, Clock, CoreError, InMemoryRepository, MarketService};
use tickerdeck_web::{router, AppState, Config, StartupError};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    match run(Config::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(%error, "tickerdeck stopped");
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> Result<(), StartupError> {
    let service_config = config.service_config()?;
    let provider = build_provider(config.provider, config.upstream_timeout_ms);
    let service = MarketService::new(provider, service_config, Clock::System);

    let repository = if config.demo_data {
        InMemoryRepository::with_demo_data().map_err(CoreError::from)?
    } else {
        InMemoryRepository::new()
    };

    let app = router(AppState::new(service, repository));
    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    tracing::info!(
        addr = %config.bind,
        provider = %config.provider,
        synthetic_seed = ?config.synthetic_seed,
        "tickerdeck listening"
    );
    axum::serve(listener, app).await?;
    Ok(())
}
