use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use oracle_chat::{
    config::Config,
    routes,
    services::{llm::OpenAiClient, rate_limiter, session_manager},
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;
    oracle_chat::init_tracing(config.debug);

    if config.is_development() {
        tracing::info!("running in development mode - minimal security features");
    } else {
        tracing::info!("running in production mode - full security features");
    }
    if !config.rate_limits.enabled {
        tracing::info!("rate limiting disabled for development");
    }
    if config.trust_proxy {
        tracing::info!("rate limiting keyed on X-Forwarded-For");
    }

    let model = OpenAiClient::new(
        config.openai_api_key.clone(),
        config.openai_model.clone(),
        config.openai_base_url.clone(),
    )?;
    let port = config.port;
    let state = AppState::new(config, Arc::new(model));
    session_manager::spawn_purge_task(state.sessions.clone(), Duration::from_secs(60));
    rate_limiter::spawn_purge_task(state.limiter.clone(), Duration::from_secs(60));

    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("failed to bind port {port}"))?;

    tracing::info!("starting application on port {port}");
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;
    Ok(())
}
