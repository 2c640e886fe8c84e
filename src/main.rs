mod agent;
mod config;
mod core;
mod history;
mod knowledge;
mod llm;
mod logging;
mod server;
mod state;
mod tools;

use anyhow::Context;
use tokio::net::TcpListener;

use crate::config::AppConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("Failed to load configuration")?;
    logging::init(&config.log_dir);

    let bind_addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    let addr = listener.local_addr()?;
    tracing::info!("Listening on {}", addr);

    let state = AppState::initialize(config);
    tracing::info!(
        "Knowledge base configured with {} sources",
        state.config.knowledge_sources.len()
    );
    let app = server::router::router(state);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
