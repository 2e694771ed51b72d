// src/services/session_codec.rs
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::message::{Message, Role};

/// Storable form of a single message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("unknown message type {role:?} at record {index}")]
    UnknownRole { index: usize, role: String },
}

pub fn encode(messages: &[Message]) -> Vec<SessionRecord> {
    messages
        .iter()
        .map(|m| SessionRecord {
            kind: m.role().as_tag().to_string(),
            content: m.content().to_string(),
        })
        .collect()
}

/// Rebuild messages from stored records. Fails on the first record whose
/// type is not one of the three known tags.
pub fn decode(records: &[SessionRecord]) -> Result<Vec<Message>, CodecError> {
    records
        .iter()
        .enumerate()
        .map(|(index, r)| match Role::from_tag(&r.kind) {
            Some(role) => Ok(Message::new(role, r.content.clone())),
            None => Err(CodecError::UnknownRole { index, role: r.kind.clone() }),
        })
        .collect()
}

/// Like [`decode`], but skips unknown records instead of failing.
pub fn decode_lossy(records: &[SessionRecord]) -> Vec<Message> {
    records
        .iter()
        .filter_map(|r| match Role::from_tag(&r.kind) {
            Some(role) => Some(Message::new(role, r.content.clone())),
            None => {
                tracing::warn!(kind = %r.kind, "dropping session record with unknown type");
                None
            }
        })
        .collect()
}
