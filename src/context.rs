//! Prompt assembly for a new turn
//!
//! The model is stateless; each request carries the last few exchanges as
//! plain `User:` / `Bot:` lines ahead of the new input.

use crate::store::Exchange;

/// How many prior exchanges are replayed into the prompt
pub const CONTEXT_EXCHANGES: usize = 3;

/// Build the prompt for `input` from the tail of `history`.
///
/// Every line is separated by a blank line; the new input is always last.
pub fn build_prompt(history: &[Exchange], input: &str) -> String {
    let start = history.len().saturating_sub(CONTEXT_EXCHANGES);
    let mut lines: Vec<String> = history[start..]
        .iter()
        .flat_map(|exchange| {
            [
                format!("User: {}", exchange.input()),
                format!("Bot: {}", exchange.response()),
            ]
        })
        .collect();
    lines.push(format!("User: {input}"));
    lines.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn history(n: usize) -> Vec<Exchange> {
        (1..=n)
            .map(|i| Exchange::new(format!("q{i}"), format!("a{i}"), None))
            .collect()
    }

    #[test]
    fn no_history_is_just_the_input() {
        assert_eq!(build_prompt(&[], "hello"), "User: hello");
    }

    #[test]
    fn short_history_is_replayed_in_full() {
        assert_eq!(
            build_prompt(&history(2), "next"),
            "User: q1\n\nBot: a1\n\nUser: q2\n\nBot: a2\n\nUser: next"
        );
    }

    #[test]
    fn only_last_three_are_kept() {
        let prompt = build_prompt(&history(5), "next");
        assert!(!prompt.contains("q1"));
        assert!(!prompt.contains("q2"));
        assert!(prompt.starts_with("User: q3\n\nBot: a3"));
        assert!(prompt.ends_with("Bot: a5\n\nUser: next"));
    }

    #[test]
    fn long_texts_are_not_truncated() {
        let long = "x".repeat(10_000);
        let items = vec![Exchange::new(long.clone(), long.clone(), None)];
        let prompt = build_prompt(&items, &long);
        assert_eq!(prompt.matches(&long).count(), 3);
    }

    proptest! {
        #[test]
        fn prop_window_is_min_n_3_oldest_first(
            turns in proptest::collection::vec(("[a-z ]{0,12}", "[a-z ]{0,12}"), 0..8),
            input in "[a-z ]{0,12}",
        ) {
            let items: Vec<Exchange> = turns
                .iter()
                .map(|(q, a)| Exchange::new(q.clone(), a.clone(), None))
                .collect();
            let prompt = build_prompt(&items, &input);
            let segments: Vec<&str> = prompt.split("\n\n").collect();

            let kept = items.len().min(CONTEXT_EXCHANGES);
            prop_assert_eq!(segments.len(), kept * 2 + 1);

            let tail = &items[items.len() - kept..];
            for (i, exchange) in tail.iter().enumerate() {
                prop_assert_eq!(segments[i * 2].to_string(), format!("User: {}", exchange.input()));
                prop_assert_eq!(segments[i * 2 + 1].to_string(), format!("Bot: {}", exchange.response()));
            }
            prop_assert_eq!(segments[kept * 2].to_string(), format!("User: {input}"));
        }
    }
}
