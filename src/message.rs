// src/message.rs
use std::fmt;

use serde::{Deserialize, Serialize};

/// Who authored a message in the transcript.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    System,
    Human,
    Ai,
}

impl Role {
    /// Tag stored in the `type` field of a session record.
    pub fn as_tag(&self) -> &'static str {
        match self {
            Role::System => "SystemMessage",
            Role::Human => "HumanMessage",
            Role::Ai => "AIMessage",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "SystemMessage" => Some(Role::System),
            "HumanMessage" => Some(Role::Human),
            "AIMessage" => Some(Role::Ai),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// One entry of a chat transcript.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Message {
    System(String),
    Human(String),
    Ai(String),
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Message::System(content.into())
    }

    pub fn human(content: impl Into<String>) -> Self {
        Message::Human(content.into())
    }

    pub fn ai(content: impl Into<String>) -> Self {
        Message::Ai(content.into())
    }

    pub fn new(role: Role, content: impl Into<String>) -> Self {
        match role {
            Role::System => Message::System(content.into()),
            Role::Human => Message::Human(content.into()),
            Role::Ai => Message::Ai(content.into()),
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Message::System(_) => Role::System,
            Message::Human(_) => Role::Human,
            Message::Ai(_) => Role::Ai,
        }
    }

    pub fn content(&self) -> &str {
        match self {
            Message::System(c) | Message::Human(c) | Message::Ai(c) => c,
        }
    }
}

#[derive(Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
}

#[derive(Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub port: u16,
    pub debug_mode: bool,
    pub environment: String,
}
