use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use group_fund_server::backend::{create_router, initialize_backend};
use group_fund_server::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging; RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::load()?;
    let app_state = initialize_backend(&config).await?;
    let app = create_router(app_state, &config.client_origin)?;

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Starting server on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
