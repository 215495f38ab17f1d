//! Property-based tests for the turn controller

use super::*;
use crate::completion::RequestMessage;
use crate::session::Role;
use proptest::prelude::*;
use std::iter;

fn arb_mode() -> impl Strategy<Value = InputMode> {
    prop_oneof![Just(InputMode::Batch), Just(InputMode::Stream)]
}

fn arb_message() -> impl Strategy<Value = String> {
    "[ ]{0,2}[a-zA-Z0-9?!.]{1,10}( [a-zA-Z0-9?!.]{1,10}){0,3}[ \n]{0,2}"
}

fn arb_blank() -> impl Strategy<Value = String> {
    "[ \t\n]{0,8}"
}

fn arb_outcome() -> impl Strategy<Value = Result<String, CompletionError>> {
    prop_oneof![
        "[a-zA-Z ]{1,20}".prop_map(Ok::<String, CompletionError>),
        "[a-z ]{1,20}".prop_map(|m| Err(CompletionError::new(m))),
    ]
}

proptest! {
    #[test]
    fn successful_turns_alternate_and_resend_history(
        mode in arb_mode(),
        messages in prop::collection::vec(arb_message(), 0..12)
    ) {
        let mut controller = TurnController::new(mode, ChatSettings::default());
        let seeded = controller.store().len();
        prop_assert_eq!(seeded, usize::from(mode == InputMode::Stream));

        for (k, message) in messages.iter().enumerate() {
            let ticket = controller.submit_text(message).expect("non-blank input should submit");
            let generation = ticket.generation;

            let expected: Vec<RequestMessage> =
                iter::once(RequestMessage::new(Role::System, DEFAULT_SYSTEM_PROMPT))
                    .chain(controller.store().all()[..seeded + 2 * k].iter().map(RequestMessage::from))
                    .chain(iter::once(RequestMessage::new(Role::User, message.trim())))
                    .collect();
            prop_assert_eq!(ticket.request.messages, expected);

            let reply = format!("reply {k}");
            prop_assert!(controller.complete(generation, Ok(reply)));
        }

        let turns = controller.store().all();
        prop_assert_eq!(turns.len(), seeded + 2 * messages.len());
        if seeded == 1 {
            prop_assert_eq!(&turns[0], &Turn::welcome());
        }
        for (i, turn) in turns[seeded..].iter().enumerate() {
            let expected = if i % 2 == 0 { Role::User } else { Role::Assistant };
            prop_assert_eq!(turn.role(), expected);
        }
        prop_assert_eq!(controller.store().replay_entries().len(), messages.len());
    }

    #[test]
    fn every_outcome_adds_exactly_two_turns(
        mode in arb_mode(),
        steps in prop::collection::vec((arb_message(), arb_outcome()), 1..10)
    ) {
        let mut controller = TurnController::new(mode, ChatSettings::default());
        let seeded = controller.store().len();

        for (message, outcome) in steps {
            let before = controller.store().len();
            let failure = outcome.as_ref().err().map(ToString::to_string);
            let ticket = controller.submit_text(&message).expect("ticket");
            prop_assert!(controller.complete(ticket.generation, outcome));

            let turns = controller.store().all();
            prop_assert_eq!(turns.len(), before + 2);
            prop_assert_eq!(turns[before].role(), Role::User);
            prop_assert_eq!(turns[before + 1].role(), Role::Assistant);
            if let Some(failure) = failure {
                prop_assert!(turns[before + 1].content().contains(&failure));
            }
        }

        prop_assert_eq!(
            controller.store().replay_entries().len(),
            (controller.store().len() - seeded) / 2
        );
    }

    #[test]
    fn blank_input_changes_nothing(mode in arb_mode(), blank in arb_blank()) {
        let mut controller = TurnController::new(mode, ChatSettings::default());
        let before = controller.render();

        prop_assert!(controller.submit_text(&blank).is_none());
        controller.draft_mut().push_str(&blank);
        prop_assert!(controller.submit().is_none());

        prop_assert_eq!(controller.state(), TurnState::Idle);
        prop_assert_eq!(controller.render(), before);
    }

    #[test]
    fn reset_clears_both_histories_and_drops_late_results(
        mode in arb_mode(),
        messages in prop::collection::vec(arb_message(), 1..8),
        leave_in_flight in any::<bool>()
    ) {
        let mut controller = TurnController::new(mode, ChatSettings::default());
        for message in &messages {
            let ticket = controller.submit_text(message).expect("ticket");
            controller.complete(ticket.generation, Ok("ok".to_string()));
        }
        let late = if leave_in_flight {
            controller.submit_text("pending").map(|t| t.generation)
        } else {
            None
        };

        controller.reset();
        if let Some(generation) = late {
            prop_assert!(!controller.complete(generation, Ok("late".to_string())));
        }

        let view = controller.render();
        prop_assert!(view.turns.is_empty());
        prop_assert!(view.history.is_empty());
        prop_assert!(view.pending_query.is_none());
        prop_assert!(!view.in_flight);
    }
}
