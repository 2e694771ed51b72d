#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Request, Response, header};
use oracle_chat::config::Config;
use oracle_chat::message::Message;
use oracle_chat::routes::create_router;
use oracle_chat::services::llm::{ChatModel, LlmError};
use oracle_chat::state::AppState;

/// In-process stand-in for the hosted model.
#[derive(Default)]
pub struct ScriptedModel {
    pub fail: bool,
    pub calls: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedModel {
    pub fn replying() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self { fail: true, ..Self::default() })
    }

    pub fn calls(&self) -> Vec<Vec<Message>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn invoke(&self, messages: &[Message]) -> Result<Message, LlmError> {
        let mut calls = self.calls.lock().unwrap();
        calls.push(messages.to_vec());
        if self.fail {
            return Err(LlmError::Http { status: 500, body: "upstream down".to_string() });
        }
        Ok(Message::ai(format!("The stars answer #{}", calls.len())))
    }
}

pub fn test_config() -> Config {
    Config::for_development("sk-test")
}

pub fn app_with(config: Config, model: Arc<ScriptedModel>) -> (AppState, Router) {
    let state = AppState::new(config, model);
    let router = create_router(state.clone());
    (state, router)
}

pub fn chat_request(body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/chat")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

/// Tag a request as arriving from `ip`, as `into_make_service_with_connect_info` would.
pub fn from_peer(mut req: Request<Body>, ip: &str) -> Request<Body> {
    let addr: SocketAddr = format!("{ip}:40000").parse().unwrap();
    req.extensions_mut().insert(ConnectInfo(addr));
    req
}

/// `name=value` part of the response's Set-Cookie header, ready to send back.
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
