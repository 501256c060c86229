use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Closed sentiment vocabulary.
///
/// Variant order matches the alphabetical order of both the English and the
/// Indonesian labels, so sorting by `Sentiment` sorts by label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Negative,
    Neutral,
    Positive,
}

impl Sentiment {
    pub const ALL: [Sentiment; 3] = [Sentiment::Negative, Sentiment::Neutral, Sentiment::Positive];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
            Sentiment::Positive => "positive",
        }
    }

    /// Map a polarity score to a label by its sign.
    pub fn from_polarity(polarity: f64) -> Self {
        if polarity > 0.0 {
            Sentiment::Positive
        } else if polarity < 0.0 {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSentiment(pub String);

impl fmt::Display for UnknownSentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown sentiment label '{}'", self.0)
    }
}

impl std::error::Error for UnknownSentiment {}

impl FromStr for Sentiment {
    type Err = UnknownSentiment;

    /// Accepts English labels and the Indonesian ones used by the scraped dataset.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "positive" | "positif" => Ok(Sentiment::Positive),
            "neutral" | "netral" => Ok(Sentiment::Neutral),
            "negative" | "negatif" => Ok(Sentiment::Negative),
            _ => Err(UnknownSentiment(s.to_string())),
        }
    }
}

/// One scraped review.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewRecord {
    pub at: NaiveDateTime,
    pub score: i64,
    pub sentiment: Sentiment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
}

impl ReviewRecord {
    /// Calendar year of the timestamp as written (no timezone adjustment).
    pub fn year(&self) -> i32 {
        self.at.year()
    }
}

/// The full review set, in file order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dataset {
    pub records: Vec<ReviewRecord>,
}

impl Dataset {
    pub fn new(records: Vec<ReviewRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct labels present, in first-seen order.
    pub fn labels(&self) -> Vec<Sentiment> {
        let mut seen = Vec::new();
        for r in &self.records {
            if !seen.contains(&r.sentiment) {
                seen.push(r.sentiment);
            }
        }
        seen
    }
}
