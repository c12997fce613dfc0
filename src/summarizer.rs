//! Extractive summaries: pick a few representative sentences from a body.

use crate::models::{Sentiment, SummaryResult};

pub const DEFAULT_MAX_POINTS: usize = 3;

/// Fragments shorter than this (after trimming) are not sentences.
const MIN_SENTENCE_CHARS: usize = 3;

pub fn sentences(body: &str) -> Vec<&str> {
    body.split('.')
        .map(str::trim)
        .filter(|s| s.chars().count() >= MIN_SENTENCE_CHARS)
        .collect()
}

/// Summarize `body` into at most `max_points` key points.
///
/// When there are more sentences than `max_points`, only the first, middle
/// and last sentences are candidates, taken in that order up to the budget.
pub fn summarize(body: &str, max_points: usize) -> SummaryResult {
    let all = sentences(body);

    let key_points: Vec<String> = if all.len() <= max_points {
        all.iter().map(|s| s.to_string()).collect()
    } else {
        select_indices(all.len(), max_points)
            .into_iter()
            .map(|i| all[i].to_string())
            .collect()
    };

    SummaryResult {
        summary: format!("Key points from email: {} main items", key_points.len()),
        key_points,
        sentiment: Sentiment::Neutral,
    }
}

fn select_indices(count: usize, max_points: usize) -> Vec<usize> {
    let mut picked = vec![0, count / 2, count - 1];
    picked.truncate(max_points);
    picked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_body_keeps_every_sentence() {
        let result = summarize("First point here. Second point here.", DEFAULT_MAX_POINTS);
        assert_eq!(result.key_points, vec!["First point here", "Second point here"]);
        assert_eq!(result.summary, "Key points from email: 2 main items");
        assert_eq!(result.sentiment, Sentiment::Neutral);
    }

    #[test]
    fn test_long_body_picks_first_middle_last() {
        let body = "One one. Two two. Three three. Four four. Five five. Six six.";
        let result = summarize(body, 3);
        // middle index is 6 / 2 = 3
        assert_eq!(result.key_points, vec!["One one", "Four four", "Six six"]);
    }

    #[test]
    fn test_drops_empty_and_tiny_fragments() {
        let result = summarize("Invoice is due... a. Pay now.", 3);
        assert_eq!(result.key_points, vec!["Invoice is due", "Pay now"]);
    }

    #[test]
    fn test_point_count_never_exceeds_budget_or_anchors() {
        let body = "Aaa. Bbb. Ccc. Ddd. Eee. Fff. Ggg.";
        for max in 0..=9 {
            let expected = if max >= 7 { 7 } else { max.min(3) };
            let result = summarize(body, max);
            assert_eq!(result.key_points.len(), expected, "max_points = {}", max);
        }
    }

    #[test]
    fn test_small_budget_keeps_leading_anchors() {
        let body = "Aaa. Bbb. Ccc. Ddd. Eee.";
        assert_eq!(summarize(body, 0).key_points, Vec::<String>::new());
        assert_eq!(summarize(body, 1).key_points, vec!["Aaa"]);
        assert_eq!(summarize(body, 2).key_points, vec!["Aaa", "Ccc"]);
    }

    #[test]
    fn test_large_budget_still_returns_three_anchors() {
        let body = "Aaa. Bbb. Ccc. Ddd. Eee. Fff.";
        assert_eq!(
            summarize(body, 4).key_points,
            vec!["Aaa", "Ddd", "Fff"]
        );
    }

    #[test]
    fn test_empty_body() {
        let result = summarize("", DEFAULT_MAX_POINTS);
        assert!(result.key_points.is_empty());
        assert_eq!(result.summary, "Key points from email: 0 main items");
    }
}
