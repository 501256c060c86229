//! Plain-text rendering of the dashboard sections for the terminal.
//!
//! Each section renders independently; a failing section is replaced by a
//! one-line error so the rest of the report still prints.

use std::fmt::Write;
use std::path::Path;

use crate::classifier::{Classification, Classifier};
use crate::error::DashboardError;
use crate::filter::{self, FilteredView};
use crate::loader;
use crate::stats::{self, ScoreCount, SentimentShare, SummaryStatistics};

const BAR_WIDTH: usize = 40;
const CONTENT_WIDTH: usize = 60;

fn heading(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n{}\n{}", title, "=".repeat(title.chars().count()));
}

fn truncate(text: &str, width: usize) -> String {
    let flat = text.replace(['\n', '\r'], " ");
    if flat.chars().count() <= width {
        flat
    } else {
        let mut cut: String = flat.chars().take(width.saturating_sub(3)).collect();
        cut.push_str("...");
        cut
    }
}

pub fn render_error(err: &DashboardError) -> String {
    format!("error: {}\n", err)
}

/// Filtered review table followed by the yearly mean-score table.
pub fn render_filtered(view: &FilteredView, max_rows: usize) -> String {
    let mut out = String::new();
    let selected: Vec<_> = view.selected.iter().map(|s| s.as_str()).collect();
    heading(&mut out, &format!("Reviews ({})", selected.join(", ")));

    let _ = writeln!(out, "{:<9} {:<19} {:>5}  {}", "sentiment", "at", "score", "content");
    for r in view.records.iter().take(max_rows) {
        let _ = writeln!(
            out,
            "{:<9} {:<19} {:>5}  {}",
            r.sentiment.as_str(),
            r.at.format("%Y-%m-%d %H:%M:%S"),
            r.score,
            truncate(r.content.as_deref().unwrap_or(""), CONTENT_WIDTH)
        );
    }
    if view.records.len() > max_rows {
        let _ = writeln!(out, "... {} more rows", view.records.len() - max_rows);
    }

    heading(&mut out, "Mean score per year");
    let _ = writeln!(out, "{:<6} {:<9} {:>10} {:>8}", "year", "sentiment", "mean", "reviews");
    for a in &view.yearly {
        let _ = writeln!(
            out,
            "{:<6} {:<9} {:>10.2} {:>8}",
            a.year,
            a.sentiment.as_str(),
            a.mean_score,
            a.reviews
        );
    }
    out
}

pub fn render_score_distribution(dist: &[ScoreCount]) -> String {
    let mut out = String::new();
    heading(&mut out, "Score distribution");
    let max = dist.iter().map(|d| d.count).max().unwrap_or(0);
    for d in dist {
        let len = if max == 0 { 0 } else { d.count * BAR_WIDTH / max };
        let _ = writeln!(out, "{:>3} | {:<width$} {}", d.score, "#".repeat(len), d.count, width = BAR_WIDTH);
    }
    out
}

pub fn render_sentiment_distribution(shares: &[SentimentShare]) -> String {
    let mut out = String::new();
    heading(&mut out, "Sentiment distribution");
    for s in shares {
        let _ = writeln!(out, "{:<9} {:>5.1}%  ({})", s.sentiment.as_str(), s.percent, s.count);
    }
    out
}

pub fn render_summary(summary: &SummaryStatistics) -> String {
    let mut out = String::new();
    heading(&mut out, "Summary");
    let _ = writeln!(out, "Reviews: {}", summary.count);
    match summary.mean_score {
        Some(mean) => {
            let _ = writeln!(out, "Mean score: {:.2}", mean);
        }
        None => {
            let _ = writeln!(out, "Mean score: n/a");
        }
    }
    match summary.modal_sentiment {
        Some(s) => {
            let _ = writeln!(out, "Most frequent sentiment: {}", s);
        }
        None => {
            let _ = writeln!(out, "Most frequent sentiment: n/a");
        }
    }
    out
}

pub fn render_classification(result: &Classification) -> String {
    let mut out = String::new();
    heading(&mut out, "Text sentiment");
    let _ = writeln!(out, "Sentiment: {}", result.label);
    let _ = writeln!(out, "Polarity: {:.3}", result.polarity);
    out
}

/// The whole dashboard: filtered table, charts, summary and, when given, the
/// classification of `text`.
pub fn render_dashboard(
    title: &str,
    data_path: &Path,
    labels: &[String],
    max_rows: usize,
    text: Option<&str>,
    classifier: &Classifier,
) -> String {
    let mut out = format!("{}\n", title);

    match loader::load_reviews(data_path) {
        Ok(dataset) => {
            let view = filter::parse_selection(labels)
                .and_then(|selected| filter::filter_and_aggregate(&dataset, &selected));
            match view {
                Ok(view) => out.push_str(&render_filtered(&view, max_rows)),
                Err(e) => out.push_str(&render_error(&e)),
            }

            let panel = stats::stats_panel(&dataset);
            out.push_str(&render_score_distribution(&panel.score_distribution));
            out.push_str(&render_sentiment_distribution(&panel.sentiment_distribution));
            out.push_str(&render_summary(&panel.summary));
        }
        Err(e) => out.push_str(&render_error(&e)),
    }

    if let Some(text) = text {
        match classifier.classify(text) {
            Ok(result) => out.push_str(&render_classification(&result)),
            Err(e) => out.push_str(&render_error(&e)),
        }
    }
    out
}
