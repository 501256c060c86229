use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::{Dataset, Sentiment};

/// Headline numbers over the whole dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStatistics {
    pub count: usize,
    /// Mean score rounded to 2 decimals; absent for an empty dataset
    pub mean_score: Option<f64>,
    /// Most frequent label; ties go to the label seen first in the file
    pub modal_sentiment: Option<Sentiment>,
}

/// Number of reviews giving one score value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreCount {
    pub score: i64,
    pub count: usize,
}

/// Share of one label in the dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentShare {
    pub sentiment: Sentiment,
    pub count: usize,
    /// Percentage rounded to 1 decimal
    pub percent: f64,
}

/// Everything the statistics panel shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsPanel {
    pub summary: SummaryStatistics,
    pub score_distribution: Vec<ScoreCount>,
    pub sentiment_distribution: Vec<SentimentShare>,
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Label counts in first-seen order.
fn label_counts(dataset: &Dataset) -> Vec<(Sentiment, usize)> {
    let mut counts: Vec<(Sentiment, usize)> = Vec::new();
    for r in &dataset.records {
        match counts.iter_mut().find(|(s, _)| *s == r.sentiment) {
            Some((_, n)) => *n += 1,
            None => counts.push((r.sentiment, 1)),
        }
    }
    counts
}

pub fn summarize(dataset: &Dataset) -> SummaryStatistics {
    let count = dataset.len();
    let mean_score = if count == 0 {
        None
    } else {
        let sum: i128 = dataset.records.iter().map(|r| i128::from(r.score)).sum();
        Some(round_to(sum as f64 / count as f64, 2))
    };

    // Strictly-greater keeps the earliest label on ties.
    let mut modal: Option<(Sentiment, usize)> = None;
    for (sentiment, n) in label_counts(dataset) {
        if modal.map_or(true, |(_, best)| n > best) {
            modal = Some((sentiment, n));
        }
    }

    SummaryStatistics {
        count,
        mean_score,
        modal_sentiment: modal.map(|(s, _)| s),
    }
}

/// Review count per score value, ascending by score.
pub fn score_distribution(dataset: &Dataset) -> Vec<ScoreCount> {
    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for r in &dataset.records {
        *counts.entry(r.score).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|(score, count)| ScoreCount { score, count })
        .collect()
}

/// Label shares, largest first; equal counts keep first-seen order.
pub fn sentiment_distribution(dataset: &Dataset) -> Vec<SentimentShare> {
    let total = dataset.len();
    let mut counts = label_counts(dataset);
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .map(|(sentiment, count)| SentimentShare {
            sentiment,
            count,
            percent: round_to(count as f64 * 100.0 / total as f64, 1),
        })
        .collect()
}

pub fn stats_panel(dataset: &Dataset) -> StatsPanel {
    StatsPanel {
        summary: summarize(dataset),
        score_distribution: score_distribution(dataset),
        sentiment_distribution: sentiment_distribution(dataset),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ReviewRecord;
    use chrono::NaiveDate;

    fn dataset(rows: &[(i64, Sentiment)]) -> Dataset {
        let at = NaiveDate::from_ymd_opt(2023, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        Dataset::new(
            rows.iter()
                .map(|&(score, sentiment)| ReviewRecord {
                    at,
                    score,
                    sentiment,
                    content: None,
                    user_name: None,
                })
                .collect(),
        )
    }

    #[test]
    fn mean_is_rounded_to_two_decimals() {
        let ds = dataset(&[
            (5, Sentiment::Positive),
            (4, Sentiment::Positive),
            (4, Sentiment::Neutral),
        ]);
        let summary = summarize(&ds);
        assert_eq!(summary.count, 3);
        // 13 / 3 = 4.333...
        assert_eq!(summary.mean_score, Some(4.33));
        assert_eq!(summary.modal_sentiment, Some(Sentiment::Positive));
    }

    #[test]
    fn mode_ties_go_to_first_seen_label() {
        let ds = dataset(&[
            (1, Sentiment::Negative),
            (5, Sentiment::Positive),
            (5, Sentiment::Positive),
            (2, Sentiment::Negative),
        ]);
        assert_eq!(summarize(&ds).modal_sentiment, Some(Sentiment::Negative));
    }

    #[test]
    fn mean_of_extreme_scores_does_not_overflow() {
        let ds = dataset(&[(i64::MAX, Sentiment::Positive), (i64::MAX, Sentiment::Positive)]);
        assert_eq!(summarize(&ds).mean_score, Some(i64::MAX as f64));
    }

    #[test]
    fn empty_dataset_has_no_mean_or_mode() {
        let summary = summarize(&Dataset::default());
        assert_eq!(summary.count, 0);
        assert_eq!(summary.mean_score, None);
        assert_eq!(summary.modal_sentiment, None);
        assert!(sentiment_distribution(&Dataset::default()).is_empty());
    }

    #[test]
    fn score_counts_are_sorted_by_score() {
        let ds = dataset(&[
            (5, Sentiment::Positive),
            (1, Sentiment::Negative),
            (5, Sentiment::Positive),
            (3, Sentiment::Neutral),
        ]);
        let dist = score_distribution(&ds);
        assert_eq!(
            dist,
            vec![
                ScoreCount { score: 1, count: 1 },
                ScoreCount { score: 3, count: 1 },
                ScoreCount { score: 5, count: 2 },
            ]
        );
    }

    #[test]
    fn sentiment_shares_sum_to_total() {
        let ds = dataset(&[
            (3, Sentiment::Neutral),
            (5, Sentiment::Positive),
            (5, Sentiment::Positive),
            (1, Sentiment::Negative),
            (4, Sentiment::Positive),
            (2, Sentiment::Negative),
        ]);
        let shares = sentiment_distribution(&ds);
        assert_eq!(shares[0].sentiment, Sentiment::Positive);
        assert_eq!(shares[0].percent, 50.0);
        assert_eq!(shares[1].sentiment, Sentiment::Negative);
        assert_eq!(shares[2].percent, 16.7);
        assert_eq!(shares.iter().map(|s| s.count).sum::<usize>(), ds.len());
    }
}
