//! Lexicon-based polarity scoring for free-text reviews.
//!
//! Each sentiment-bearing word contributes its lexicon polarity, scaled by a
//! preceding intensifier ("very good") or a trailing one ("bagus banget"), and
//! multiplied by -0.5 when a negation appears within the negation window before
//! it. The text's polarity is the mean contribution, clamped to [-1, 1]. Text
//! without any sentiment-bearing word scores exactly 0.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::debug;

use common::ClassifierConfig;

use crate::error::{DashboardError, Result};
use crate::model::Sentiment;
use crate::stats::round_to;

const NEGATION_FACTOR: f64 = -0.5;
const DEFAULT_NEGATION_WINDOW: usize = 3;

const POLARITIES: &[(&str, f64)] = &[
    // English, positive
    ("good", 0.7),
    ("great", 0.8),
    ("excellent", 1.0),
    ("awesome", 1.0),
    ("best", 1.0),
    ("perfect", 1.0),
    ("wonderful", 1.0),
    ("amazing", 0.6),
    ("fantastic", 0.4),
    ("beautiful", 0.85),
    ("happy", 0.8),
    ("nice", 0.6),
    ("love", 0.5),
    ("loved", 0.7),
    ("better", 0.5),
    ("interesting", 0.5),
    ("satisfying", 0.5),
    ("easy", 0.43),
    ("enjoy", 0.4),
    ("enjoyable", 0.4),
    ("smooth", 0.4),
    ("cool", 0.35),
    ("fun", 0.3),
    ("helpful", 0.3),
    // English, negative
    ("terrible", -1.0),
    ("awful", -1.0),
    ("horrible", -1.0),
    ("worst", -1.0),
    ("boring", -1.0),
    ("hate", -0.8),
    ("annoying", -0.8),
    ("stupid", -0.8),
    ("disappointed", -0.75),
    ("bad", -0.7),
    ("ugly", -0.7),
    ("disappointing", -0.6),
    ("useless", -0.5),
    ("difficult", -0.5),
    ("wrong", -0.5),
    ("buggy", -0.5),
    ("laggy", -0.5),
    ("expensive", -0.5),
    ("sad", -0.5),
    ("crash", -0.5),
    ("crashes", -0.5),
    ("worse", -0.4),
    ("poor", -0.4),
    ("broken", -0.4),
    ("error", -0.4),
    ("slow", -0.3),
    ("waste", -0.2),
    // Indonesian, positive
    ("sempurna", 1.0),
    ("terbaik", 1.0),
    ("mantap", 0.8),
    ("hebat", 0.8),
    ("bagus", 0.7),
    ("keren", 0.6),
    ("seru", 0.6),
    ("senang", 0.6),
    ("suka", 0.5),
    ("baik", 0.5),
    ("menarik", 0.5),
    ("asik", 0.5),
    ("asyik", 0.5),
    // Indonesian, negative
    ("benci", -0.8),
    ("parah", -0.8),
    ("membosankan", -0.8),
    ("kecewa", -0.75),
    ("jelek", -0.7),
    ("buruk", -0.7),
    ("bosan", -0.6),
    ("payah", -0.6),
    ("susah", -0.5),
    ("sulit", -0.5),
    ("rusak", -0.5),
    ("lemot", -0.4),
    ("lambat", -0.3),
];

const INTENSIFIERS: &[(&str, f64)] = &[
    ("extremely", 1.5),
    ("super", 1.4),
    ("very", 1.3),
    ("really", 1.2),
    ("so", 1.2),
    ("too", 1.2),
    ("quite", 1.1),
    ("somewhat", 0.8),
    ("slightly", 0.6),
    ("sangat", 1.3),
    ("amat", 1.3),
    ("agak", 0.7),
];

// Indonesian intensifiers follow the word they modify.
const TRAILING_INTENSIFIERS: &[(&str, f64)] = &[("banget", 1.3), ("sekali", 1.3), ("bgt", 1.3)];

const NEGATIONS: &[&str] = &[
    "not", "no", "never", "neither", "nor", "without", "cannot", "tidak", "tak", "bukan", "gak",
    "ga", "nggak", "enggak", "belum",
];

/// Word lists the scorer consults.
#[derive(Debug, Clone)]
pub struct Lexicon {
    polarities: HashMap<String, f64>,
    intensifiers: HashMap<String, f64>,
    trailing_intensifiers: HashMap<String, f64>,
    negations: HashSet<String>,
}

impl Lexicon {
    pub fn builtin() -> Self {
        let owned = |pairs: &[(&str, f64)]| {
            pairs
                .iter()
                .map(|(w, v)| (w.to_string(), *v))
                .collect::<HashMap<_, _>>()
        };
        Self {
            polarities: owned(POLARITIES),
            intensifiers: owned(INTENSIFIERS),
            trailing_intensifiers: owned(TRAILING_INTENSIFIERS),
            negations: NEGATIONS.iter().map(|w| w.to_string()).collect(),
        }
    }

    /// Add or override polarity entries. Values are clamped to [-1, 1].
    pub fn with_entries<I>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (String, f64)>,
    {
        for (word, value) in entries {
            self.polarities
                .insert(word.to_lowercase(), value.clamp(-1.0, 1.0));
        }
        self
    }

    pub fn polarity(&self, word: &str) -> Option<f64> {
        self.polarities.get(word).copied()
    }

    fn intensifier(&self, word: &str) -> Option<f64> {
        self.intensifiers.get(word).copied()
    }

    fn trailing_intensifier(&self, word: &str) -> Option<f64> {
        self.trailing_intensifiers.get(word).copied()
    }

    fn is_negation(&self, word: &str) -> bool {
        self.negations.contains(word) || word.ends_with("n't")
    }

    pub fn len(&self) -> usize {
        self.polarities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polarities.is_empty()
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Outcome of classifying one text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    /// Polarity in [-1, 1], rounded to 3 decimals
    pub polarity: f64,
    pub label: Sentiment,
}

fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .replace('\u{2019}', "'")
        .split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|t| t.trim_matches('\''))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Stateless polarity classifier.
#[derive(Debug, Clone)]
pub struct Classifier {
    lexicon: Lexicon,
    negation_window: usize,
}

impl Classifier {
    pub fn new() -> Self {
        Self {
            lexicon: Lexicon::builtin(),
            negation_window: DEFAULT_NEGATION_WINDOW,
        }
    }

    pub fn from_config(config: Option<&ClassifierConfig>) -> Self {
        let mut classifier = Self::new();
        if let Some(cfg) = config {
            if let Some(window) = cfg.negation_window {
                classifier = classifier.with_negation_window(window);
            }
            if !cfg.lexicon.is_empty() {
                let lexicon = classifier.lexicon.clone().with_entries(cfg.lexicon.clone());
                classifier = classifier.with_lexicon(lexicon);
            }
        }
        classifier
    }

    pub fn with_lexicon(mut self, lexicon: Lexicon) -> Self {
        self.lexicon = lexicon;
        self
    }

    pub fn with_negation_window(mut self, window: usize) -> Self {
        self.negation_window = window;
        self
    }

    /// Raw polarity of `text` in [-1, 1].
    pub fn polarity(&self, text: &str) -> f64 {
        let tokens = tokenize(text);

        let mut contributions: Vec<f64> = Vec::new();
        let mut modifier = 1.0;
        // Tokens remaining in which a negation still applies.
        let mut negation_left = 0usize;
        let mut last_was_sentiment = false;

        for token in &tokens {
            if self.lexicon.is_negation(token) {
                negation_left = self.negation_window;
                modifier = 1.0;
                last_was_sentiment = false;
                continue;
            }

            if let Some(factor) = self.lexicon.trailing_intensifier(token) {
                if last_was_sentiment {
                    if let Some(last) = contributions.last_mut() {
                        *last *= factor;
                    }
                    last_was_sentiment = false;
                    continue;
                }
            }

            if let Some(factor) = self.lexicon.intensifier(token) {
                modifier = factor;
                last_was_sentiment = false;
                continue;
            }

            match self.lexicon.polarity(token) {
                Some(base) => {
                    let mut score = base * modifier;
                    if negation_left > 0 {
                        score *= NEGATION_FACTOR;
                        negation_left = 0;
                    }
                    contributions.push(score);
                    last_was_sentiment = true;
                }
                None => {
                    negation_left = negation_left.saturating_sub(1);
                    last_was_sentiment = false;
                }
            }
            modifier = 1.0;
        }

        if contributions.is_empty() {
            return 0.0;
        }
        let mean = contributions.iter().sum::<f64>() / contributions.len() as f64;
        mean.clamp(-1.0, 1.0)
    }

    /// Classify `text`. Blank input is a validation error and yields no result.
    /// The label follows the sign of the unrounded polarity.
    pub fn classify(&self, text: &str) -> Result<Classification> {
        if text.trim().is_empty() {
            return Err(DashboardError::validation("enter some text first"));
        }

        let polarity = self.polarity(text);
        let label = Sentiment::from_polarity(polarity);
        debug!(polarity, label = %label, "classified text");

        Ok(Classification {
            polarity: round_to(polarity, 3),
            label,
        })
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}
