//! Property-based tests for the dialogue state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::transition::*;
use super::*;
use crate::conflicts::ConflictedFile;
use crate::llm::ToolUse;
use crate::tools::VIEW_FILE_CONTENTS;
use proptest::prelude::*;
use serde_json::json;

// ============================================================================
// Test Helpers
// ============================================================================

fn test_context(path: &str, max_turns: Option<u32>) -> DialogueContext {
    DialogueContext::new(ConflictedFile::new(path, "<<<<<<< HEAD\n"), "a", "b")
        .with_max_turns(max_turns)
}

fn requests_llm(result: &TransitionResult) -> bool {
    result.effects.contains(&Effect::RequestLlm)
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_path() -> impl Strategy<Value = String> {
    "[a-z]{1,8}(/[a-z]{1,8}){0,3}\\.[a-z]{1,4}"
}

/// Free text that never contains the sentinel phrase or a fence
fn arb_question() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ?.,\n]{0,120}[a-zA-Z0-9?]"
}

fn arb_body() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 {}();=<>\n]{0,200}"
}

fn arb_max_turns() -> impl Strategy<Value = Option<u32>> {
    prop_oneof![Just(None), (1u32..10).prop_map(Some)]
}

fn arb_live_state() -> impl Strategy<Value = DialogueState> {
    prop_oneof![
        Just(DialogueState::Init),
        (1u32..20).prop_map(|turn| DialogueState::AwaitingReply { turn }),
        (1u32..20, arb_path())
            .prop_map(|(turn, filename)| DialogueState::ToolExecuting { turn, filename }),
        (1u32..20, arb_question())
            .prop_map(|(turn, question)| DialogueState::AwaitingHuman { turn, question }),
    ]
}

fn arb_terminal_state() -> impl Strategy<Value = DialogueState> {
    prop_oneof![
        arb_body().prop_map(|content| DialogueState::Resolved { content }),
        Just(DialogueState::Aborted),
        Just(DialogueState::Exhausted),
        arb_question().prop_map(|reply| DialogueState::MalformedResolution { reply }),
    ]
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        Just(Event::Start),
        arb_question().prop_map(|text| Event::LlmReply {
            content: Some(text),
            tool_uses: vec![]
        }),
        arb_path().prop_map(|filename| Event::ToolComplete {
            filename,
            output: crate::tools::ToolOutput::success("x"),
        }),
        arb_question().prop_map(|text| Event::HumanInput { text }),
        Just(Event::InputClosed),
    ]
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// A well-formed resolution yields exactly the fenced body, whatever the
    /// preamble.
    #[test]
    fn prop_resolution_extracts_body(
        preamble in arb_question(),
        body in arb_body(),
        turn in 1u32..50,
    ) {
        let text = format!("{preamble}\nUpdating the file!\n```\n{body}\n```");
        let result = transition(
            &DialogueState::AwaitingReply { turn },
            &test_context("a.txt", None),
            Event::LlmReply { content: Some(text), tool_uses: vec![] },
        ).unwrap();
        prop_assert!(!requests_llm(&result));
        prop_assert_eq!(result.new_state, DialogueState::Resolved { content: body });
    }

    /// Plain text without the sentinel or a tool call always reaches the human.
    #[test]
    fn prop_plain_text_routes_to_human(
        text in arb_question(),
        turn in 1u32..50,
        max_turns in arb_max_turns(),
    ) {
        prop_assume!(!text.is_empty());
        let result = transition(
            &DialogueState::AwaitingReply { turn },
            &test_context("a.txt", max_turns),
            Event::LlmReply { content: Some(text.clone()), tool_uses: vec![] },
        ).unwrap();
        prop_assert_eq!(
            result.new_state,
            DialogueState::AwaitingHuman { turn, question: text.clone() }
        );
        prop_assert_eq!(result.effects, vec![Effect::AskHuman { question: text }]);
    }

    /// Asking to view the file under resolution never reaches the gateway.
    #[test]
    fn prop_self_view_never_executes(
        path in arb_path(),
        prefix in prop::sample::select(vec!["", "./", "lib/../", "a/b/../../", "./x/../"]),
        turn in 1u32..50,
        max_turns in arb_max_turns(),
    ) {
        let requested = format!("{prefix}{path}");
        let result = transition(
            &DialogueState::AwaitingReply { turn },
            &test_context(&path, max_turns),
            Event::LlmReply {
                content: None,
                tool_uses: vec![ToolUse::new("c", VIEW_FILE_CONTENTS, json!({ "filename": requested }))],
            },
        ).unwrap();
        let executes = result.effects.iter().any(|e| matches!(e, Effect::ExecuteTool { .. }));
        let rejected = result.effects.contains(&Effect::append_assistant(SELF_VIEW_REJECTION));
        let tool_state = matches!(result.new_state, DialogueState::ToolExecuting { .. });
        prop_assert!(!executes);
        prop_assert!(rejected);
        prop_assert!(!tool_state);
    }

    /// Viewing any other file is dispatched exactly once.
    #[test]
    fn prop_other_file_executes_once(
        path in arb_path(),
        other in arb_path(),
        turn in 1u32..50,
    ) {
        prop_assume!(path != other);
        let result = transition(
            &DialogueState::AwaitingReply { turn },
            &test_context(&path, None),
            Event::LlmReply {
                content: None,
                tool_uses: vec![ToolUse::new("c", VIEW_FILE_CONTENTS, json!({ "filename": other }))],
            },
        ).unwrap();
        let executions = result.effects.iter()
            .filter(|e| matches!(e, Effect::ExecuteTool { .. }))
            .count();
        prop_assert_eq!(executions, 1);
        prop_assert!(!requests_llm(&result));
    }

    /// `exit` aborts from any pending question and appends nothing.
    #[test]
    fn prop_exit_aborts(question in arb_question(), turn in 1u32..50) {
        let result = transition(
            &DialogueState::AwaitingHuman { turn, question },
            &test_context("a.txt", None),
            Event::HumanInput { text: EXIT_COMMAND.to_string() },
        ).unwrap();
        prop_assert_eq!(result.new_state, DialogueState::Aborted);
        prop_assert!(result.effects.is_empty());
    }

    /// Every transition that goes back to the transport advances the turn by
    /// one, and none does so past the ceiling.
    #[test]
    fn prop_turns_respect_ceiling(
        turn in 1u32..20,
        max in 1u32..20,
        answer in arb_question(),
    ) {
        prop_assume!(answer.trim() != EXIT_COMMAND);
        let ctx = test_context("a.txt", Some(max));
        let result = transition(
            &DialogueState::AwaitingHuman { turn, question: "?".to_string() },
            &ctx,
            Event::HumanInput { text: answer },
        ).unwrap();
        if turn >= max {
            prop_assert!(!requests_llm(&result));
            prop_assert_eq!(&result.new_state, &DialogueState::Exhausted);
        } else {
            prop_assert!(requests_llm(&result));
            prop_assert_eq!(&result.new_state, &DialogueState::AwaitingReply { turn: turn + 1 });
        }
    }

    /// Terminal states accept no further events.
    #[test]
    fn prop_terminal_states_are_final(state in arb_terminal_state(), event in arb_event()) {
        prop_assert!(transition(&state, &test_context("a.txt", None), event).is_err());
    }

    /// Live states never emit more than one effect that produces an event.
    #[test]
    fn prop_at_most_one_pending_io(state in arb_live_state(), event in arb_event()) {
        if let Ok(result) = transition(&state, &test_context("a.txt", None), event) {
            let io = result.effects.iter()
                .filter(|e| matches!(
                    e,
                    Effect::RequestLlm | Effect::ExecuteTool { .. } | Effect::AskHuman { .. }
                ))
                .count();
            prop_assert!(io <= 1);
        }
    }
}
