// src/services/chatbot.rs
use std::sync::Arc;

use crate::message::Message;
use crate::services::llm::{ChatModel, LlmError};

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful AI assistant.";
/// System prompt for the web oracle.
pub const ORACLE_PERSONA: &str =
    "You are a mythological oracle, speaking with ancient wisdom and mystical knowledge.";
pub const FALLBACK_REPLY: &str = "I apologize, I encountered an error. Please try again.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Running,
    Ended,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConversationState {
    pub messages: Vec<Message>,
    pub should_continue: bool,
}

impl ConversationState {
    pub fn new(messages: Vec<Message>) -> Self {
        Self { messages, should_continue: true }
    }

    pub fn phase(&self) -> Phase {
        if self.should_continue { Phase::Running } else { Phase::Ended }
    }

    pub fn end(&mut self) {
        self.should_continue = false;
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Content of the most recent AI message, if any.
    pub fn last_ai_reply(&self) -> Option<&str> {
        self.messages.iter().rev().find_map(|m| match m {
            Message::Ai(content) => Some(content.as_str()),
            _ => None,
        })
    }
}

/// Result of one step. Both variants carry the advanced state; on failure
/// its last message is [`FALLBACK_REPLY`].
#[derive(Debug)]
pub enum StepOutcome {
    Replied(ConversationState),
    Failed { state: ConversationState, error: LlmError },
}

impl StepOutcome {
    pub fn state(&self) -> &ConversationState {
        match self {
            StepOutcome::Replied(state) | StepOutcome::Failed { state, .. } => state,
        }
    }

    pub fn into_state(self) -> ConversationState {
        match self {
            StepOutcome::Replied(state) | StepOutcome::Failed { state, .. } => state,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, StepOutcome::Failed { .. })
    }
}

fn seed_if_empty(state: &mut ConversationState) {
    if state.messages.is_empty() {
        state.push(Message::system(DEFAULT_SYSTEM_PROMPT));
    }
}

/// Advances a conversation by asking the model for exactly one reply.
#[derive(Clone)]
pub struct ConversationStep {
    model: Arc<dyn ChatModel>,
}

impl ConversationStep {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }

    /// Append one human turn and run the step on it.
    pub async fn advance(&self, mut state: ConversationState, human: impl Into<String>) -> StepOutcome {
        seed_if_empty(&mut state);
        state.push(Message::human(human));
        self.run(state).await
    }

    pub async fn run(&self, mut state: ConversationState) -> StepOutcome {
        seed_if_empty(&mut state);

        match self.model.invoke(&state.messages).await {
            Ok(reply) => {
                state.push(reply);
                StepOutcome::Replied(state)
            }
            Err(error) => {
                tracing::error!(%error, "model call failed");
                state.push(Message::ai(FALLBACK_REPLY));
                StepOutcome::Failed { state, error }
            }
        }
    }
}
