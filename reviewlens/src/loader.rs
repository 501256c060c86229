//! Review CSV loading and the per-path dataset cache.

use std::collections::HashMap;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{DashboardError, Result};
use crate::model::{Dataset, ReviewRecord, Sentiment};

const REQUIRED_COLUMNS: [&str; 3] = ["at", "score", "sentiment"];

/// Store ratings are whole stars.
pub const SCORE_RANGE: std::ops::RangeInclusive<i64> = 1..=5;

/// Row shape of the scraped CSV. Columns not listed here are ignored.
#[derive(Debug, Deserialize)]
struct RawReview {
    at: String,
    score: String,
    sentiment: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(rename = "userName", default)]
    user_name: Option<String>,
}

impl RawReview {
    fn into_record(self, line: u64) -> Result<ReviewRecord> {
        let at = parse_timestamp(&self.at).ok_or_else(|| DashboardError::Parse {
            line,
            message: format!("unparseable timestamp '{}' in column 'at'", self.at),
        })?;
        let score = parse_score(&self.score).ok_or_else(|| DashboardError::Parse {
            line,
            message: format!(
                "invalid score '{}' (expected a whole number from {} to {})",
                self.score,
                SCORE_RANGE.start(),
                SCORE_RANGE.end()
            ),
        })?;
        let sentiment: Sentiment = self.sentiment.parse().map_err(|e| DashboardError::Parse {
            line,
            message: format!("{}", e),
        })?;

        Ok(ReviewRecord {
            at,
            score,
            sentiment,
            content: self.content.filter(|c| !c.is_empty()),
            user_name: self.user_name.filter(|u| !u.is_empty()),
        })
    }
}

/// Parse the `at` column. Offsets are dropped without normalisation: the
/// wall-clock time as written is kept.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_local());
    }
    if let Ok(dt) = DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(dt.naive_local());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

// Accepts "4" as well as "4.0". Fractional or out-of-range values are rejected.
fn parse_score(value: &str) -> Option<i64> {
    let value = value.trim();
    let score = match value.parse::<i64>() {
        Ok(n) => n,
        Err(_) => {
            let f = value.parse::<f64>().ok()?;
            let (lo, hi) = (*SCORE_RANGE.start() as f64, *SCORE_RANGE.end() as f64);
            if f.fract() != 0.0 || !(lo..=hi).contains(&f) {
                return None;
            }
            f as i64
        }
    };
    SCORE_RANGE.contains(&score).then_some(score)
}

fn io_error(err: io::Error, path: &Path) -> DashboardError {
    match err.kind() {
        io::ErrorKind::NotFound => DashboardError::FileNotFound(path.to_path_buf()),
        io::ErrorKind::ConnectionRefused
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::NotConnected
        | io::ErrorKind::TimedOut => DashboardError::Connection(err.to_string()),
        _ => DashboardError::Io(err),
    }
}

fn csv_error(err: csv::Error, path: &Path) -> DashboardError {
    let line = err.position().map(|p| p.line()).unwrap_or(0);
    let message = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(e) => io_error(e, path),
        _ => DashboardError::Parse { line, message },
    }
}

/// Read and validate a review CSV from any reader.
pub fn read_reviews<R: io::Read>(reader: R, path: &Path) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(reader);
    let headers = reader.headers().map_err(|e| csv_error(e, path))?.clone();

    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(DashboardError::Parse {
                line: 1,
                message: format!("missing required column '{}'", column),
            });
        }
    }

    let mut records = Vec::new();
    for result in reader.records() {
        let row = result.map_err(|e| csv_error(e, path))?;
        let line = row.position().map(|p| p.line()).unwrap_or(0);
        let raw: RawReview = row
            .deserialize(Some(&headers))
            .map_err(|e| DashboardError::Parse {
                line,
                message: e.to_string(),
            })?;
        records.push(raw.into_record(line)?);
    }

    Ok(Dataset::new(records))
}

/// Load reviews from a CSV file on disk.
pub fn load_reviews<P: AsRef<Path>>(path: P) -> Result<Dataset> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| io_error(e, path))?;
    let dataset = read_reviews(file, path)?;
    info!(path = %path.display(), records = dataset.len(), "loaded review file");
    Ok(dataset)
}

/// Datasets memoized by path. The first access reads the file; later accesses
/// share the same `Arc`. Failed loads are not cached.
#[derive(Debug, Default)]
pub struct ReviewCache {
    entries: Mutex<HashMap<PathBuf, Arc<Dataset>>>,
}

impl ReviewCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PathBuf, Arc<Dataset>>> {
        // Entries are immutable once inserted, so a poisoned map is still consistent.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn get_or_load<P: AsRef<Path>>(&self, path: P) -> Result<Arc<Dataset>> {
        let path = path.as_ref();
        if let Some(dataset) = self.get(path) {
            debug!(path = %path.display(), "review cache hit");
            return Ok(dataset);
        }

        let dataset = Arc::new(load_reviews(path)?);
        let mut entries = self.lock();
        // Another caller may have loaded the same path meanwhile; keep the first.
        let entry = entries
            .entry(path.to_path_buf())
            .or_insert_with(|| dataset.clone());
        Ok(entry.clone())
    }

    /// Cached dataset for `path`, without touching the filesystem.
    pub fn get<P: AsRef<Path>>(&self, path: P) -> Option<Arc<Dataset>> {
        self.lock().get(path.as_ref()).cloned()
    }

    /// Drop the cached dataset for `path`. Returns whether an entry existed.
    pub fn invalidate<P: AsRef<Path>>(&self, path: P) -> bool {
        self.lock().remove(path.as_ref()).is_some()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
