// src/services/mod.rs
pub mod chatbot;
pub mod llm;
pub mod rate_limiter;
pub mod session_codec;
pub mod session_manager;
