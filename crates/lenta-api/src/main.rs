mod constants;
mod error;
mod handlers;
mod setup;
mod state;

use lenta_core::Config;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;

    let (_state, router, worker_shutdown) = setup::initialize_app(&config).await?;

    setup::start_server(&config, router, worker_shutdown).await?;

    Ok(())
}
