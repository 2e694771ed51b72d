// src/routes/mod.rs
pub mod chat;
pub mod pages;

use std::net::SocketAddr;

use crate::error::AppError;
use crate::security;
use crate::state::AppState;
use axum::{
    Router,
    extract::{ConnectInfo, Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use chat::chat_handler;
use pages::{health_handler, home_handler, not_found_handler};
use tower_http::trace::TraceLayer;

pub fn create_router(state: AppState) -> Router {
    let env = state.config.environment;

    let router = Router::new()
        .route("/", get(home_handler))
        .route("/chat", post(chat_handler))
        .route("/health", get(health_handler))
        .fallback(not_found_handler)
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit));

    security::apply(router, env)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Client identity for rate limiting: the peer address, or the first
/// forwarded hop when the deployment sits behind a trusted proxy.
fn client_key(req: &Request, trust_proxy: bool) -> String {
    if trust_proxy {
        let forwarded = req
            .headers()
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());
        if let Some(ip) = forwarded {
            return ip.to_string();
        }
    }
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

async fn rate_limit(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let limits = &state.config.rate_limits;
    let (scope, limits) = match req.uri().path() {
        "/" => ("home", &limits.home),
        "/chat" => ("chat", &limits.chat),
        _ => ("default", &limits.default),
    };
    let client = client_key(&req, state.config.trust_proxy);

    if !state.limiter.check(scope, &client, limits).await {
        tracing::warn!(%client, scope, "rate limit exceeded");
        return Err(AppError::RateLimited);
    }
    Ok(next.run(req).await)
}
