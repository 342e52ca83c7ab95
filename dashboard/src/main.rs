use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

use tutor_dashboard::config::DashboardConfig;
use tutor_dashboard::error::DashboardError;

#[tokio::main]
async fn main() -> Result<(), DashboardError> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        eprintln!("tracing init failed: {e}");
    }

    let config = DashboardConfig::parse();
    let addr = format!("127.0.0.1:{}", config.port);
    let backend = config.backend_url.clone();
    let state = config.into_state()?;
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, %backend, "dashboard listening");
    tutor_dashboard::run(listener, state).await
}
