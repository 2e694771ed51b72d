mod common;

use common::ScriptedModel;
use oracle_chat::message::Message;
use oracle_chat::services::chatbot::{
    ConversationState, ConversationStep, DEFAULT_SYSTEM_PROMPT, FALLBACK_REPLY, Phase, StepOutcome,
};
use oracle_chat::services::llm::LlmError;
use oracle_chat::services::session_codec::{decode, encode};

#[tokio::test]
async fn test_fresh_conversation_order() {
    let step = ConversationStep::new(ScriptedModel::replying());

    let outcome = step.advance(ConversationState::new(vec![]), "hi").await;

    assert!(matches!(outcome, StepOutcome::Replied(_)));
    let state = outcome.into_state();
    assert_eq!(
        state.messages,
        vec![
            Message::system(DEFAULT_SYSTEM_PROMPT),
            Message::human("hi"),
            Message::ai("The stars answer #1"),
        ]
    );
    assert_eq!(state.phase(), Phase::Running);
}

#[tokio::test]
async fn test_failure_is_distinguishable() {
    let model = ScriptedModel::failing();
    let step = ConversationStep::new(model.clone());
    let state = ConversationState::new(vec![Message::system("oracle"), Message::human("hi")]);

    let outcome = step.run(state).await;

    match &outcome {
        StepOutcome::Failed { error: LlmError::Http { status, .. }, state } => {
            assert_eq!(*status, 500);
            assert_eq!(state.last_ai_reply(), Some(FALLBACK_REPLY));
            assert!(state.should_continue);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(model.calls().len(), 1);
}

#[tokio::test]
async fn test_multi_turn_through_storage() {
    let model = ScriptedModel::replying();
    let step = ConversationStep::new(model.clone());

    let mut records = encode(&[Message::system("oracle")]);
    for question in ["first", "second", "third"] {
        let messages = decode(&records).unwrap();
        let state = step.advance(ConversationState::new(messages), question).await.into_state();
        records = encode(&state.messages);
    }

    let transcript = decode(&records).unwrap();
    assert_eq!(transcript.len(), 7);
    assert_eq!(transcript.last(), Some(&Message::ai("The stars answer #3")));
    // every call sees the whole transcript so far
    assert_eq!(model.calls()[2].len(), 6);
}

#[test]
fn test_end_stops_the_loop() {
    let mut state = ConversationState::new(vec![]);
    assert_eq!(state.phase(), Phase::Running);
    state.end();
    assert_eq!(state.phase(), Phase::Ended);
}
