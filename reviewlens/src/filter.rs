//! Sentiment filtering and the yearly mean-score table behind the area chart.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::error::{DashboardError, Result};
use crate::model::{Dataset, ReviewRecord, Sentiment};

/// Mean score for one (year, sentiment) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlyAggregate {
    pub year: i32,
    pub sentiment: Sentiment,
    pub mean_score: f64,
    pub reviews: usize,
}

/// Result of one filter interaction: the table rows and the chart data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilteredView {
    pub selected: Vec<Sentiment>,
    pub records: Vec<ReviewRecord>,
    pub yearly: Vec<YearlyAggregate>,
}

/// Turn user-supplied labels into a selection, keeping the first occurrence of
/// each label. Blank labels are skipped; unknown labels are a validation error.
pub fn parse_selection<S: AsRef<str>>(labels: &[S]) -> Result<Vec<Sentiment>> {
    let mut selected = Vec::new();
    for label in labels.iter().filter(|l| !l.as_ref().trim().is_empty()) {
        let sentiment: Sentiment = label
            .as_ref()
            .parse()
            .map_err(|e| DashboardError::validation(format!("{}", e)))?;
        if !selected.contains(&sentiment) {
            selected.push(sentiment);
        }
    }
    Ok(selected)
}

/// Records whose sentiment is selected, sorted by sentiment and then by file order.
pub fn filter_by_sentiment(records: &[ReviewRecord], selected: &[Sentiment]) -> Result<Vec<ReviewRecord>> {
    if selected.is_empty() {
        return Err(DashboardError::validation("select at least one sentiment"));
    }

    let mut subset: Vec<ReviewRecord> = records
        .iter()
        .filter(|r| selected.contains(&r.sentiment))
        .cloned()
        .collect();
    // Stable sort keeps file order within a label.
    subset.sort_by_key(|r| r.sentiment);
    Ok(subset)
}

/// Mean score per (year, sentiment), ordered by year then sentiment.
pub fn yearly_mean_scores(records: &[ReviewRecord]) -> Vec<YearlyAggregate> {
    let mut groups: BTreeMap<(i32, Sentiment), (i128, usize)> = BTreeMap::new();
    for r in records {
        let entry = groups.entry((r.year(), r.sentiment)).or_insert((0, 0));
        entry.0 += i128::from(r.score);
        entry.1 += 1;
    }

    groups
        .into_iter()
        .map(|((year, sentiment), (sum, count))| YearlyAggregate {
            year,
            sentiment,
            mean_score: sum as f64 / count as f64,
            reviews: count,
        })
        .collect()
}

/// Filter the dataset and build the yearly table in one pass over the selection.
pub fn filter_and_aggregate(dataset: &Dataset, selected: &[Sentiment]) -> Result<FilteredView> {
    let records = filter_by_sentiment(&dataset.records, selected)?;
    let yearly = yearly_mean_scores(&records);
    debug!(
        selected = ?selected,
        rows = records.len(),
        groups = yearly.len(),
        "filtered reviews"
    );
    Ok(FilteredView {
        selected: selected.to_vec(),
        records,
        yearly,
    })
}
