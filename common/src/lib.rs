/*!
common/src/lib.rs

Shared configuration types for ReviewLens.

This file provides:
- Config data structures (deserialized from TOML)
- An async loader for a TOML config file
- Default/override merging so a shipped `config.default.toml` can be partially overridden
*/

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Default review file, relative to the working directory.
pub const DEFAULT_DATA_PATH: &str = "hasil_scrapping_WOA.csv";

/// Review data source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Path to the scraped reviews CSV (e.g. "hasil_scrapping_WOA.csv")
    pub path: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_DATA_PATH.to_string(),
        }
    }
}

/// Dashboard presentation defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    pub title: Option<String>,
    /// Sentiment labels selected when the user has not picked any yet
    pub default_sentiments: Option<Vec<String>>,
}

/// HTTP server binding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind: Option<String>,
    pub port: Option<u16>,
}

/// Text classifier tuning
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// How many tokens a negation reaches forward
    pub negation_window: Option<usize>,
    /// Extra lexicon entries (word -> polarity); these override built-in entries
    #[serde(default)]
    pub lexicon: HashMap<String, f64>,
}

/// Top-level application configuration (deserialized from config.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,
    pub dashboard: Option<DashboardConfig>,
    pub server: Option<ServerConfig>,
    pub classifier: Option<ClassifierConfig>,
}

impl Config {
    /// Load configuration from a TOML file asynchronously.
    ///
    /// Example:
    ///   let cfg = Config::from_file("config.toml").await?;
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = tokio::fs::read_to_string(path.as_ref())
            .await
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let cfg: Config = toml::from_str(&data).context("Failed to parse TOML configuration")?;
        Ok(cfg)
    }

    /// Load configuration with an optional default file and an optional override file.
    /// If both are present, they are merged (override takes precedence).
    /// Missing files are skipped, so with neither present the built-in defaults apply.
    pub async fn load_with_defaults(default_path: Option<&Path>, override_path: Option<&Path>) -> Result<Self> {
        let mut config_value = toml::Value::Table(toml::map::Map::new());

        if let Some(path) = default_path {
            if path.exists() {
                let data = tokio::fs::read_to_string(path).await
                    .with_context(|| format!("Failed to read default config: {}", path.display()))?;
                let val: toml::Value = toml::from_str(&data)
                    .context("Failed to parse default configuration")?;
                merge_toml(&mut config_value, val);
            }
        }

        if let Some(path) = override_path {
            if path.exists() {
                let data = tokio::fs::read_to_string(path).await
                    .with_context(|| format!("Failed to read override config: {}", path.display()))?;
                let val: toml::Value = toml::from_str(&data)
                    .context("Failed to parse override configuration")?;
                merge_toml(&mut config_value, val);
            }
        }

        let cfg: Config = config_value.try_into().context("Failed to parse merged configuration")?;
        Ok(cfg)
    }

    pub fn title(&self) -> &str {
        self.dashboard
            .as_ref()
            .and_then(|d| d.title.as_deref())
            .unwrap_or("Analisis Sentimen World of Airports")
    }

    /// Labels pre-selected in the sentiment filter.
    pub fn default_sentiments(&self) -> Vec<String> {
        self.dashboard
            .as_ref()
            .and_then(|d| d.default_sentiments.clone())
            .unwrap_or_else(|| vec!["positive".to_string(), "neutral".to_string()])
    }

    pub fn bind_address(&self) -> &str {
        self.server
            .as_ref()
            .and_then(|s| s.bind.as_deref())
            .unwrap_or("127.0.0.1")
    }

    pub fn port(&self) -> u16 {
        self.server.as_ref().and_then(|s| s.port).unwrap_or(8000)
    }
}

fn merge_toml(a: &mut toml::Value, b: toml::Value) {
    match (a, b) {
        (toml::Value::Table(a_map), toml::Value::Table(b_map)) => {
            for (k, v) in b_map {
                if let Some(a_val) = a_map.get_mut(&k) {
                    merge_toml(a_val, v);
                } else {
                    a_map.insert(k, v);
                }
            }
        }
        (a_val, b_val) => *a_val = b_val,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn config_from_string() {
        let toml = r#"
            [data]
            path = "data/reviews.csv"

            [dashboard]
            default_sentiments = ["negatif"]

            [classifier.lexicon]
            mantap = 0.8
        "#;

        let cfg: Config = toml::from_str(toml).expect("parse config");
        assert_eq!(cfg.data.path, "data/reviews.csv");
        assert_eq!(cfg.default_sentiments(), vec!["negatif".to_string()]);
        assert_eq!(cfg.classifier.as_ref().unwrap().lexicon.get("mantap"), Some(&0.8));
        assert_eq!(cfg.port(), 8000);
    }

    #[test]
    fn empty_config_uses_defaults() {
        let cfg: Config = toml::from_str("").expect("parse empty config");
        assert_eq!(cfg.data.path, DEFAULT_DATA_PATH);
        assert_eq!(cfg.default_sentiments(), vec!["positive", "neutral"]);
        assert_eq!(cfg.bind_address(), "127.0.0.1");
    }

    #[tokio::test]
    async fn override_file_wins_over_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let default_path = dir.path().join("config.default.toml");
        let override_path = dir.path().join("config.toml");

        fs::write(
            &default_path,
            "[server]\nbind = \"0.0.0.0\"\nport = 8000\n\n[data]\npath = \"a.csv\"\n",
        )
        .expect("write default");
        fs::write(&override_path, "[server]\nport = 9090\n").expect("write override");

        let cfg = Config::load_with_defaults(Some(&default_path), Some(&override_path))
            .await
            .expect("load merged config");
        assert_eq!(cfg.bind_address(), "0.0.0.0");
        assert_eq!(cfg.port(), 9090);
        assert_eq!(cfg.data.path, "a.csv");
    }

    #[tokio::test]
    async fn missing_files_are_skipped() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("nope.toml");
        let cfg = Config::load_with_defaults(Some(&missing), None)
            .await
            .expect("defaults only");
        assert_eq!(cfg.data.path, DEFAULT_DATA_PATH);
    }

    #[tokio::test]
    async fn from_file_reports_parse_errors() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("broken.toml");
        fs::write(&path, "[data\npath = ").expect("write broken");
        assert!(Config::from_file(&path).await.is_err());
    }
}
