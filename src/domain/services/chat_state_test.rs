use anyhow::anyhow;

use super::Admission;
use super::ChatState;
use super::ExchangeOutcome;
use super::FetchOutcome;
use super::SEND_FAILED_MESSAGE;
use crate::domain::models::AgentResponse;
use crate::domain::models::Message;
use crate::domain::models::MessageStore;
use crate::domain::models::PersistedState;
use crate::domain::models::Role;
use crate::domain::models::Size;

fn reply(output: &str) -> AgentResponse {
    return AgentResponse {
        output: Some(output.to_string()),
        ..AgentResponse::default()
    };
}

#[test]
fn it_rejects_blank_content() {
    let mut state = ChatState::default();
    assert_eq!(state.admit(""), Admission::Rejected);
    assert_eq!(state.admit(" \t\n"), Admission::Rejected);
    assert!(state.session.messages.is_empty());
    assert!(!state.session.is_loading);
}

#[test]
fn it_dispatches_when_idle() {
    let mut state = ChatState::default();
    state.session.error = Some("old".to_string());

    let (plan, user_message) = match state.admit("  Hi ") {
        Admission::Dispatch(plan, user_message) => (plan, user_message),
        other => panic!("unexpected admission {other:?}"),
    };

    assert_eq!(plan.content, "Hi");
    assert!(plan.is_first_turn());
    assert!(plan.history.is_none());
    assert_eq!(user_message.role, Role::User);
    assert_eq!(user_message.content, "Hi");
    assert!(state.session.is_loading);
    assert!(state.session.error.is_none());
}

#[test]
fn it_queues_while_loading() {
    let mut state = ChatState::default();
    state.admit("A");

    match state.admit("B") {
        Admission::Queued(queued) => assert_eq!(queued.content, "B"),
        other => panic!("unexpected admission {other:?}"),
    }
    assert_eq!(state.session.queued_messages.len(), 1);
    assert_eq!(state.session.messages.len(), 1);
}

#[test]
fn it_builds_history_from_messages_before_the_new_one() {
    let mut state = ChatState::default();
    state.restore(PersistedState {
        messages: vec![Message::new(Role::User, "Earlier")],
        ..PersistedState::default()
    });

    let plan = match state.admit("Now") {
        Admission::Dispatch(plan, _) => plan,
        other => panic!("unexpected admission {other:?}"),
    };

    assert_eq!(plan.history.map(|history| return history.len()), Some(1));
}

#[test]
fn it_hands_off_to_queued_messages_without_releasing() {
    let mut state = ChatState::default();
    let plan = match state.admit("A") {
        Admission::Dispatch(plan, _) => plan,
        other => panic!("unexpected admission {other:?}"),
    };
    state.admit("B");

    state.complete_exchange(&plan, Ok(reply("reply-A")));
    let (next, user_message) = state.take_next().unwrap();

    assert_eq!(next.content, "B");
    assert_eq!(user_message.content, "B");
    assert!(state.session.is_loading);
    assert!(matches!(state.admit("C"), Admission::Queued(_)));

    state.complete_exchange(&next, Ok(reply("reply-B")));
    let (last, _) = state.take_next().unwrap();
    state.complete_exchange(&last, Ok(reply("reply-C")));
    assert!(state.take_next().is_none());
    assert!(!state.session.is_loading);

    let contents = state
        .session
        .messages
        .as_slice()
        .iter()
        .map(|message| return message.content.to_string())
        .collect::<Vec<String>>();
    assert_eq!(
        contents,
        vec!["A", "reply-A", "B", "reply-B", "C", "reply-C"]
    );
}

#[test]
fn it_records_failures() {
    let mut state = ChatState::default();
    let mut plan = match state.admit("A") {
        Admission::Dispatch(plan, _) => plan,
        other => panic!("unexpected admission {other:?}"),
    };
    state.adopt_created_session(&mut plan, "conv_1");

    let outcome = state.complete_exchange(&plan, Err(anyhow!("timed out")));

    match outcome {
        ExchangeOutcome::Failed(message) => {
            assert_eq!(message.role, Role::Assistant);
            assert_eq!(message.content, SEND_FAILED_MESSAGE);
        }
        other => panic!("unexpected outcome {other:?}"),
    }
    assert_eq!(state.session.error, Some("timed out".to_string()));
    assert_eq!(state.session.conversation_id, Some("conv_1".to_string()));
    assert!(state.take_next().is_none());
    assert!(!state.session.is_loading);
}

#[test]
fn it_discards_stale_completions() {
    let mut state = ChatState::default();
    let mut plan = match state.admit("A") {
        Admission::Dispatch(plan, _) => plan,
        other => panic!("unexpected admission {other:?}"),
    };

    state.replace(None, MessageStore::default());
    state.adopt_created_session(&mut plan, "conv_1");
    assert!(state.session.conversation_id.is_none());

    let mut late = reply("late");
    late.conversation_id = Some("conv_1".to_string());
    assert_eq!(
        state.complete_exchange(&plan, Ok(late)),
        ExchangeOutcome::Discarded
    );
    assert!(state.session.messages.is_empty());
    assert!(state.session.conversation_id.is_none());

    assert!(state.take_next().is_none());
    assert!(!state.session.is_loading);
}

#[test]
fn it_applies_only_the_latest_fetch() {
    let mut state = ChatState::default();
    let first = state.begin_fetch();
    let second = state.begin_fetch();

    let newer = MessageStore::new(vec![Message::new(Role::User, "Newer")]);
    assert_eq!(
        state.complete_fetch(second, "conv_new", Ok(newer)),
        FetchOutcome::Applied
    );
    assert!(state.session.is_loading);

    let older = MessageStore::new(vec![Message::new(Role::User, "Older")]);
    assert_eq!(
        state.complete_fetch(first, "conv_old", Ok(older)),
        FetchOutcome::Discarded
    );
    assert!(!state.session.is_loading);
    assert_eq!(state.session.conversation_id, Some("conv_new".to_string()));
    assert_eq!(state.session.messages.as_slice()[0].content, "Newer");
}

#[test]
fn it_keeps_state_when_fetch_fails() {
    let mut state = ChatState::default();
    state.replace(
        Some("conv_1".to_string()),
        MessageStore::new(vec![Message::new(Role::User, "Kept")]),
    );

    let ticket = state.begin_fetch();
    assert!(state.session.is_loading);
    assert_eq!(
        state.complete_fetch(ticket, "conv_2", Err(anyhow!("404"))),
        FetchOutcome::Failed
    );

    assert_eq!(state.session.error, Some("404".to_string()));
    assert_eq!(state.session.conversation_id, Some("conv_1".to_string()));
    assert_eq!(state.session.messages.len(), 1);
    assert!(!state.session.is_loading);
}

#[test]
fn it_resumes_queue_after_fetch() {
    let mut state = ChatState::default();
    let ticket = state.begin_fetch();
    assert!(matches!(state.admit("Waiting"), Admission::Queued(_)));
    assert!(state.resume().is_none());

    state.complete_fetch(ticket, "conv_2", Err(anyhow!("offline")));
    let (plan, _) = state.resume().unwrap();

    assert_eq!(plan.content, "Waiting");
    assert!(state.session.is_loading);
    assert!(state.session.queued_messages.is_empty());
}

#[test]
fn it_snapshots_and_restores() {
    let mut state = ChatState::default();
    state.visibility.is_open = true;
    state.visibility.is_fullscreen = true;
    state.visibility.size = Size {
        width: 500,
        height: 700,
    };
    state.admit("A");
    state.admit("B");

    let snapshot = state.snapshot();
    assert!(snapshot.is_open);
    assert_eq!(snapshot.messages.len(), 1);

    let mut restored = ChatState::default();
    restored.restore(snapshot.clone());
    assert_eq!(restored.snapshot(), snapshot);
    assert!(!restored.visibility.is_fullscreen);
    assert!(!restored.session.is_loading);
    assert!(restored.session.queued_messages.is_empty());
}
