//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::*;
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_state() -> impl Strategy<Value = SessionState> {
    prop_oneof![Just(SessionState::Idle), Just(SessionState::Sending)]
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        3 => "[ a-z]{0,12}".prop_map(|text| Event::Submit { text }),
        1 => Just(Event::Reset),
        2 => "[a-z]{1,12}".prop_map(|text| Event::ReplyReceived { text }),
        2 => "[a-z0-9 ]{1,12}".prop_map(|error| Event::ReplyFailed { error }),
    ]
}

fn requests_reply(result: &TransitionResult) -> bool {
    result.effects.contains(&Effect::RequestReply)
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// Rejected events never change anything, so the session can drop them
    #[test]
    fn prop_only_idle_submit_requests_reply(state in arb_state(), event in arb_event()) {
        let is_submit = matches!(event, Event::Submit { .. });
        if let Ok(result) = transition(state, event) {
            if requests_reply(&result) {
                prop_assert_eq!(state, SessionState::Idle);
                prop_assert!(is_submit);
                prop_assert_eq!(result.new_state, SessionState::Sending);
            }
        }
    }

    #[test]
    fn prop_sending_rejects_all_input(event in arb_event()) {
        let is_input = matches!(event, Event::Submit { .. } | Event::Reset);
        let result = transition(SessionState::Sending, event);
        if is_input {
            prop_assert_eq!(result, Err(TransitionError::Busy));
        } else {
            prop_assert_eq!(result.map(|r| r.new_state), Ok(SessionState::Idle));
        }
    }

    /// Driving the machine with arbitrary events never has more than one
    /// request outstanding, and `Sending` means exactly one is.
    #[test]
    fn prop_single_flight(events in proptest::collection::vec(arb_event(), 0..50)) {
        let mut state = SessionState::Idle;
        let mut outstanding = 0u32;

        for event in events {
            let completes = matches!(event, Event::ReplyReceived { .. } | Event::ReplyFailed { .. });
            if let Ok(result) = transition(state, event) {
                if requests_reply(&result) {
                    outstanding += 1;
                }
                if completes {
                    outstanding -= 1;
                }
                state = result.new_state;
            }
            prop_assert!(outstanding <= 1);
            prop_assert_eq!(state.is_busy(), outstanding == 1);
        }
    }

    #[test]
    fn prop_user_content_is_trimmed_and_non_empty(text in "[ a-z\t\n]{0,20}") {
        match transition(SessionState::Idle, Event::Submit { text: text.clone() }) {
            Ok(result) => {
                let appended = result.effects.iter().find_map(|e| match e {
                    Effect::AppendMessage { content, .. } => Some(content.clone()),
                    _ => None,
                });
                let content = appended.expect("submit appends the user message");
                prop_assert_eq!(content.as_str(), text.trim());
                prop_assert!(!content.is_empty());
            }
            Err(err) => {
                prop_assert_eq!(err, TransitionError::BlankInput);
                prop_assert!(text.trim().is_empty());
            }
        }
    }
}
