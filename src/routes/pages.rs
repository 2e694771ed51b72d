// src/routes/pages.rs
use axum::{Json, extract::State, http::Uri, response::Html};
use axum_extra::extract::cookie::SignedCookieJar;

use crate::{error::AppError, message::HealthResponse, state::AppState};

use super::chat::{resolve_session, seed_persona};

const CHAT_PAGE: &str = include_str!("../../templates/chatbot.html");

pub async fn home_handler(
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> (SignedCookieJar, Html<&'static str>) {
    tracing::info!("homepage accessed");
    let (jar, session_id) = resolve_session(&state, jar).await;
    if !state.sessions.has_records(&session_id).await {
        seed_persona(&state, &session_id).await;
        tracing::debug!("initialized new session with default messages");
    }
    (jar, Html(CHAT_PAGE))
}

pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    tracing::debug!("health check endpoint accessed");
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Local::now().to_rfc3339(),
        port: state.config.port,
        debug_mode: state.config.debug,
        environment: state.config.environment.as_str().to_string(),
    })
}

pub async fn not_found_handler(uri: Uri) -> AppError {
    tracing::warn!(%uri, "404 error");
    AppError::NotFound
}
