//! Terminal chat against the same conversation step the web app uses.
//! Type `quit` to leave.

use std::sync::Arc;

use anyhow::Context;
use oracle_chat::{
    config::Config,
    message::Message,
    services::{
        chatbot::{ConversationState, ConversationStep, Phase},
        llm::OpenAiClient,
    },
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

const CONSOLE_PROMPT: &str = "You are a helpful AI assistant. You are given a conversation history \
    and a new message. You need to respond to the new message based on the conversation history. \
    Be cheerful and friendly.";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let config = Config::from_lookup(|key| std::env::var(key).ok())
        .context("failed to load configuration")?;
    oracle_chat::init_tracing(config.debug);

    let model = OpenAiClient::new(config.openai_api_key, config.openai_model, config.openai_base_url)?;
    let step = ConversationStep::new(Arc::new(model));

    let mut state = ConversationState::new(vec![Message::system(CONSOLE_PROMPT)]);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while state.phase() == Phase::Running {
        stdout.write_all(b"\nYou: ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            state.end();
            break;
        };
        if line.trim().eq_ignore_ascii_case("quit") {
            state.end();
            break;
        }

        state = step.advance(state, line).await.into_state();
        if let Some(Message::Ai(reply)) = state.messages.last() {
            stdout.write_all(format!("\nAI: {reply}\n").as_bytes()).await?;
        }
    }

    stdout.write_all(b"\nGoodbye!\n").await?;
    stdout.flush().await?;
    Ok(())
}
