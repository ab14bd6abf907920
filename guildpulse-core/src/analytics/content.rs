//! Content, lexical diversity, and sentiment summaries.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use super::stats::{mean_and_population_std, upper_median};
use crate::types::{DailyTotals, FamilyRows, SentimentRow, TokenDiversityRow};

/// Sentiment block of the content summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentSummary {
    /// Scored messages / total messages
    pub coverage: f64,
    /// Mean of per-user mean compound scores; `None` without scored users
    pub compound_mean: Option<f64>,
    /// Upper median of per-user mean compound scores
    pub compound_median: Option<f64>,
}

/// Content block of the activity report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentStats {
    pub total_messages: u64,
    pub total_words: u64,
    pub words_per_msg_mean: f64,
    pub words_per_msg_median: f64,
    pub url_rate: f64,
    /// User id -> distinct tokens / words (type-token ratio)
    pub lexical_diversity_by_user: BTreeMap<i64, f64>,
    pub sentiment: SentimentSummary,
}

/// Build the content summary from daily totals, token counts, and sentiment.
pub fn content_stats(
    totals: &[DailyTotals],
    tokens: &[TokenDiversityRow],
    sentiment: &FamilyRows<SentimentRow>,
) -> ContentStats {
    let total_messages: u64 = totals.iter().map(|t| t.messages).sum();
    let total_words: u64 = totals.iter().map(|t| t.words).sum();
    let url_messages: u64 = totals.iter().map(|t| t.url_messages).sum();

    let words_per_msg: Vec<f64> = totals
        .iter()
        .filter(|t| t.messages > 0)
        .map(|t| t.words as f64 / t.messages as f64)
        .collect();
    let (words_per_msg_mean, _) = mean_and_population_std(&words_per_msg);
    let words_per_msg_median = upper_median(&words_per_msg).unwrap_or(0.0);

    let distinct_by_user: HashMap<i64, u64> = tokens
        .iter()
        .map(|row| (row.user_id, row.distinct_tokens))
        .collect();
    let lexical_diversity_by_user = totals
        .iter()
        .map(|t| {
            let distinct = distinct_by_user.get(&t.user_id).copied().unwrap_or(0);
            let ratio = if t.words == 0 {
                0.0
            } else {
                distinct as f64 / t.words as f64
            };
            (t.user_id, ratio)
        })
        .collect();

    ContentStats {
        total_messages,
        total_words,
        words_per_msg_mean,
        words_per_msg_median,
        url_rate: ratio(url_messages, total_messages),
        lexical_diversity_by_user,
        sentiment: sentiment_summary(sentiment.rows(), total_messages),
    }
}

fn sentiment_summary(rows: &[SentimentRow], total_messages: u64) -> SentimentSummary {
    let scored: u64 = rows.iter().map(|r| r.scored).sum();
    let per_user: Vec<f64> = rows
        .iter()
        .filter(|r| r.scored > 0)
        .map(|r| (r.compound_sum / r.scored as f64).clamp(-1.0, 1.0))
        .collect();

    let compound_mean = if per_user.is_empty() {
        None
    } else {
        Some(mean_and_population_std(&per_user).0)
    };

    SentimentSummary {
        coverage: ratio(scored, total_messages),
        compound_mean,
        compound_median: upper_median(&per_user),
    }
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn totals(user_id: i64, messages: u64, words: u64, url_messages: u64) -> DailyTotals {
        DailyTotals {
            user_id,
            messages,
            words,
            url_messages,
        }
    }

    fn sentiment(user_id: i64, scored: u64, compound_sum: f64) -> SentimentRow {
        SentimentRow {
            user_id,
            scored,
            compound_sum,
        }
    }

    #[test]
    fn test_empty_window() {
        let stats = content_stats(&[], &[], &FamilyRows::Absent);
        assert_eq!(stats.total_messages, 0);
        assert_eq!(stats.total_words, 0);
        assert_eq!(stats.words_per_msg_mean, 0.0);
        assert_eq!(stats.words_per_msg_median, 0.0);
        assert_eq!(stats.url_rate, 0.0);
        assert!(stats.lexical_diversity_by_user.is_empty());
        assert_eq!(
            stats.sentiment,
            SentimentSummary {
                coverage: 0.0,
                compound_mean: None,
                compound_median: None
            }
        );
    }

    #[test]
    fn test_zero_message_user_excluded_from_samples() {
        let stats = content_stats(
            &[totals(1, 10, 100, 2), totals(2, 0, 0, 3)],
            &[],
            &FamilyRows::Absent,
        );

        assert_eq!(stats.words_per_msg_mean, 10.0);
        assert_eq!(stats.words_per_msg_median, 10.0);
        // Url messages from both users over messages from both users
        assert_eq!(stats.url_rate, 0.5);
        assert_eq!(stats.lexical_diversity_by_user[&2], 0.0);
    }

    #[test]
    fn test_words_per_msg_median_takes_upper_middle() {
        let stats = content_stats(
            &[
                totals(1, 1, 2, 0),
                totals(2, 1, 4, 0),
                totals(3, 1, 6, 0),
                totals(4, 1, 8, 0),
            ],
            &[],
            &FamilyRows::Absent,
        );
        assert_eq!(stats.words_per_msg_mean, 5.0);
        assert_eq!(stats.words_per_msg_median, 6.0);
    }

    #[test]
    fn test_lexical_diversity() {
        let stats = content_stats(
            &[totals(1, 5, 50, 0), totals(2, 5, 20, 0)],
            &[
                TokenDiversityRow { user_id: 1, distinct_tokens: 25 },
                TokenDiversityRow { user_id: 3, distinct_tokens: 99 },
            ],
            &FamilyRows::Absent,
        );

        assert_eq!(stats.lexical_diversity_by_user.len(), 2);
        assert_eq!(stats.lexical_diversity_by_user[&1], 0.5);
        assert_eq!(stats.lexical_diversity_by_user[&2], 0.0);
    }

    #[test]
    fn test_sentiment_summary() {
        let stats = content_stats(
            &[totals(1, 10, 10, 0), totals(2, 10, 10, 0)],
            &[],
            &FamilyRows::Present(vec![
                sentiment(1, 4, 2.0),
                // Mean compound above 1 is clamped
                sentiment(2, 1, 3.0),
                sentiment(3, 0, 0.0),
            ]),
        );

        assert_eq!(stats.sentiment.coverage, 0.25);
        assert_eq!(stats.sentiment.compound_mean, Some(0.75));
        assert_eq!(stats.sentiment.compound_median, Some(1.0));
    }

    #[test]
    fn test_present_but_unscored_sentiment_is_null() {
        let stats = content_stats(
            &[totals(1, 10, 10, 0)],
            &[],
            &FamilyRows::Present(vec![sentiment(1, 0, 0.0)]),
        );
        assert_eq!(stats.sentiment.coverage, 0.0);
        assert_eq!(stats.sentiment.compound_mean, None);
        assert_eq!(stats.sentiment.compound_median, None);
    }
}
