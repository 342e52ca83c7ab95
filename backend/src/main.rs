use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

use tutor_backend::config::BackendConfig;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        eprintln!("tracing init failed: {e}");
    }

    let config = BackendConfig::parse();
    let addr = format!("127.0.0.1:{}", config.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "backend listening");
    tutor_backend::run(listener, config.into_state()).await
}
