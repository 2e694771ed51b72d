// src/state.rs
use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;

use crate::config::Config;
use crate::services::chatbot::ConversationStep;
use crate::services::llm::ChatModel;
use crate::services::rate_limiter::RateLimiter;
use crate::services::session_manager::SessionManager;

/// Everything a request handler needs, built once at startup and cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub step: ConversationStep,
    pub sessions: SessionManager,
    pub limiter: RateLimiter,
    pub cookie_key: Key,
}

impl AppState {
    pub fn new(config: Config, model: Arc<dyn ChatModel>) -> Self {
        let cookie_key = match &config.secret_key {
            Some(secret) => Key::derive_from(secret.as_bytes()),
            None => {
                tracing::warn!("SECRET_KEY not set, sessions will not survive a restart");
                Key::generate()
            }
        };
        Self {
            step: ConversationStep::new(model),
            sessions: SessionManager::new(config.session_lifetime),
            limiter: RateLimiter::new(config.rate_limits.enabled),
            cookie_key,
            config: Arc::new(config),
        }
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}
