// src/routes/chat.rs
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use axum_extra::extract::cookie::{Cookie, SameSite, SignedCookieJar};

use crate::{
    error::AppError,
    message::{ChatRequest, ChatResponse, Message},
    services::{
        chatbot::{ConversationState, ORACLE_PERSONA, StepOutcome},
        session_codec,
    },
    state::AppState,
};

pub const SESSION_COOKIE: &str = "oracle_session";
pub const NEW_CHAT_SENTINEL: &str = "__new_chat__";
pub const MAX_MESSAGE_CHARS: usize = 500;
const SILENT_ORACLE: &str = "The oracle remains silent...";

/// Resolve the caller's session id from the signed cookie, issuing a new one if absent.
pub async fn resolve_session(state: &AppState, jar: SignedCookieJar) -> (SignedCookieJar, String) {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        let id = state.sessions.ensure_session(cookie.value()).await;
        return (jar, id);
    }

    let id = state.sessions.create_session().await;
    let cookie = Cookie::build((SESSION_COOKIE, id.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(!state.config.is_development());
    (jar.add(cookie), id)
}

/// Store a transcript holding only the oracle persona.
pub async fn seed_persona(state: &AppState, session_id: &str) {
    let records = session_codec::encode(&[Message::system(ORACLE_PERSONA)]);
    state.sessions.set_records(session_id, records).await;
}

/// Trimmed user text, or the client error describing why it was refused.
fn validate(payload: Result<Json<ChatRequest>, JsonRejection>) -> Result<String, AppError> {
    let Json(request) = payload.map_err(|rejection| match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            tracing::warn!("invalid content type received");
            AppError::UnsupportedMediaType
        }
        other => {
            tracing::warn!(error = %other, "malformed chat payload");
            AppError::BadRequest("Invalid JSON payload".to_string())
        }
    })?;

    let message = request.message.trim();
    if message.is_empty() {
        tracing::warn!("empty message received");
        return Err(AppError::BadRequest("No message received".to_string()));
    }
    let len = message.chars().count();
    if len > MAX_MESSAGE_CHARS {
        tracing::warn!(len, "message too long");
        return Err(AppError::BadRequest("Message too long".to_string()));
    }
    Ok(message.to_string())
}

pub async fn chat_handler(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<(SignedCookieJar, Json<ChatResponse>), AppError> {
    let user_message = validate(payload)?;
    let (jar, session_id) = resolve_session(&state, jar).await;

    if user_message == NEW_CHAT_SENTINEL {
        tracing::info!("new chat session requested");
        state.sessions.clear(&session_id).await;
        seed_persona(&state, &session_id).await;
        let response = ChatResponse { response: "Chat reset successfully".to_string() };
        return Ok((jar, Json(response)));
    }

    let records = state.sessions.get_records(&session_id).await.unwrap_or_default();
    let mut messages =
        session_codec::decode(&records).map_err(|e| AppError::Internal(e.to_string()))?;
    if messages.is_empty() {
        tracing::debug!("no messages in session, initializing with persona");
        messages.push(Message::system(ORACLE_PERSONA));
    }

    tracing::info!(len = user_message.chars().count(), "processing chat message");
    let outcome = state
        .step
        .advance(ConversationState::new(messages), user_message)
        .await;
    if let StepOutcome::Failed { error, .. } = &outcome {
        tracing::warn!(%error, "answering with fallback reply");
    }
    let conversation = outcome.into_state();

    state
        .sessions
        .set_records(&session_id, session_codec::encode(&conversation.messages))
        .await;

    let reply = match conversation.last_ai_reply() {
        Some(content) => {
            tracing::debug!(len = content.len(), "generated response");
            content.to_string()
        }
        None => {
            tracing::warn!("no AI response generated");
            SILENT_ORACLE.to_string()
        }
    };

    Ok((jar, Json(ChatResponse { response: reply })))
}
