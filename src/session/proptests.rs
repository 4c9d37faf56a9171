//! Property-based tests for the session controller
//!
//! Random action sequences against a mock model; the invariants below must
//! hold after every step.

use super::*;
use crate::llm::testing::MockLlmClient;
use crate::llm::{LlmError, LlmResponse};
use proptest::prelude::*;
use std::collections::HashSet;

#[derive(Debug, Clone)]
enum Action {
    Submit(String),
    SubmitFailing(String),
    StageImage,
    NewChat,
    Open(u32),
    Clear,
}

fn arb_action() -> impl Strategy<Value = Action> {
    prop_oneof![
        4 => "[a-z ]{0,12}".prop_map(Action::Submit),
        1 => "[a-z]{1,8}".prop_map(Action::SubmitFailing),
        1 => Just(Action::StageImage),
        2 => Just(Action::NewChat),
        2 => (1u32..6).prop_map(Action::Open),
        1 => Just(Action::Clear),
    ]
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap()
}

fn photo() -> Bitmap {
    Bitmap::from_rgb(1, 1, vec![7; 3]).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Every action either applies fully or leaves the working copy as it
    /// was; ids are never reused and the view always matches the state.
    #[test]
    fn prop_actions_keep_session_consistent(actions in proptest::collection::vec(arb_action(), 0..30)) {
        let rt = runtime();
        let mock = Arc::new(MockLlmClient::new("mock"));
        let mut session = Session::new(mock.clone());
        let mut ever_issued: HashSet<ConversationId> = HashSet::new();

        for action in actions {
            let before = session.current().len();
            let had_image = session.pending_image().is_some();

            match action {
                Action::Submit(text) => {
                    let rejected = text.trim().is_empty() && !had_image;
                    if !rejected {
                        mock.queue_response(LlmResponse::from_text("reply"));
                    }
                    let result = rt.block_on(session.submit(&text));
                    if rejected {
                        prop_assert!(matches!(result, Err(SessionError::Validation)));
                        prop_assert_eq!(session.current().len(), before);
                    } else {
                        prop_assert!(result.is_ok());
                        prop_assert_eq!(session.current().len(), before + 1);
                        prop_assert!(session.pending_image().is_none());
                    }
                }
                Action::SubmitFailing(text) => {
                    mock.queue_error(LlmError::server_error("boom"));
                    let result = rt.block_on(session.submit(&text));
                    prop_assert!(matches!(result, Err(SessionError::ModelRequest(_))));
                    prop_assert_eq!(session.current().len(), before);
                    prop_assert_eq!(session.pending_image().is_some(), had_image);
                }
                Action::StageImage => {
                    session.stage_image(photo());
                    prop_assert!(session.pending_image().is_some());
                }
                Action::NewChat => {
                    let archived_before = session.conversation_ids().len();
                    let reopened = session.viewing().filter(|_| session.mode() == ViewMode::ChatHistory);
                    match session.start_new_chat() {
                        None => {
                            prop_assert_eq!(before, 0);
                            prop_assert_eq!(session.conversation_ids().len(), archived_before);
                        }
                        Some(id) => {
                            match reopened {
                                Some(open) => prop_assert_eq!(id, open),
                                None => prop_assert!(ever_issued.insert(id), "id {} reused", id),
                            }
                            prop_assert!(session.current().is_empty());
                            prop_assert_eq!(session.mode(), ViewMode::NewChat);
                            prop_assert_eq!(session.viewing(), None);
                        }
                    }
                }
                Action::Open(raw) => {
                    let id = ConversationId::new(raw);
                    let known = session.conversation_ids().contains(&id);
                    let result = session.open_conversation(id);
                    if known {
                        prop_assert!(result.is_ok());
                        prop_assert_eq!(session.mode(), ViewMode::ChatHistory);
                        prop_assert_eq!(session.viewing(), Some(id));
                    } else {
                        prop_assert!(matches!(result, Err(SessionError::NotFound(_))));
                        prop_assert_eq!(session.current().len(), before);
                    }
                }
                Action::Clear => {
                    let mode = session.mode();
                    session.clear_history();
                    prop_assert!(session.current().is_empty());
                    prop_assert!(session.conversation_ids().is_empty());
                    prop_assert_eq!(session.mode(), mode);
                }
            }

            let view = session.view();
            prop_assert_eq!(view.exchanges.len(), session.current().len());
            prop_assert_eq!(view.pending_image, session.pending_image().is_some());
            prop_assert!(view.conversations.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
