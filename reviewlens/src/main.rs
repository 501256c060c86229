/*
reviewlens - single-binary main.rs
Prints the review dashboard to the terminal, classifies free text, or serves the same data as a JSON API.
*/

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use common::Config;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use reviewlens::classifier::Classifier;
use reviewlens::loader::ReviewCache;
use reviewlens::server::{launch_rocket, AppState};
use reviewlens::report;

#[derive(Parser, Debug)]
#[command(name = "reviewlens", about = "Sentiment dashboard for scraped app reviews")]
struct Args {
    /// Path to config.toml
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Review CSV to use instead of `data.path` from the config
    #[arg(long, value_name = "FILE", global = true)]
    data: Option<PathBuf>,

    /// Override log level (info, debug, warn, error)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the dashboard (default)
    Report {
        /// Sentiment labels to show; repeat for several. Defaults come from the config.
        #[arg(long = "sentiment", value_name = "LABEL")]
        sentiments: Vec<String>,

        /// Maximum table rows to print
        #[arg(long, default_value_t = 20)]
        rows: usize,

        /// Also classify this text
        #[arg(long)]
        text: Option<String>,
    },
    /// Classify a piece of text
    Classify {
        text: String,
    },
    /// Serve the dashboard data as a JSON API
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI args
    let args = Args::parse();

    // Initialize logging
    let env_filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(env_filter).init();

    let config = load_config(args.config.as_ref()).await?;
    let data_path = args
        .data
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.data.path));

    let command = args.command.unwrap_or(Command::Report {
        sentiments: Vec::new(),
        rows: 20,
        text: None,
    });

    match command {
        Command::Report { sentiments, rows, text } => {
            let labels = if sentiments.is_empty() {
                config.default_sentiments()
            } else {
                sentiments
            };
            let classifier = Classifier::from_config(config.classifier.as_ref());
            print!(
                "{}",
                report::render_dashboard(
                    config.title(),
                    &data_path,
                    &labels,
                    rows,
                    text.as_deref(),
                    &classifier
                )
            );
        }
        Command::Classify { text } => {
            let classifier = Classifier::from_config(config.classifier.as_ref());
            match classifier.classify(&text) {
                Ok(result) => print!("{}", report::render_classification(&result)),
                Err(e) => print!("{}", report::render_error(&e)),
            }
        }
        Command::Serve => {
            let cache = Arc::new(ReviewCache::new());
            // Warm the cache so a bad path shows up in the log at startup.
            if let Err(e) = cache.get_or_load(&data_path) {
                error!(%e, path = %data_path.display(), "review data not available yet");
            }
            let state = AppState::new(Arc::new(config), data_path, cache)?;
            launch_rocket(state).await?;
        }
    }

    Ok(())
}

/// Resolve `config.default.toml` plus the override (`--config` or `./config.toml`).
async fn load_config(explicit: Option<&PathBuf>) -> Result<Config> {
    let default_path = PathBuf::from("config.default.toml");

    let override_path = if let Some(p) = explicit {
        if !p.exists() {
            error!(path = ?p, "specified config file not found");
            return Err(anyhow::anyhow!("Config file not found: {}", p.display()));
        }
        Some(p.clone())
    } else {
        let p = PathBuf::from("config.toml");
        if p.exists() { Some(p) } else { None }
    };

    let config = Config::load_with_defaults(
        if default_path.exists() { Some(&default_path) } else { None },
        override_path.as_deref(),
    )
    .await?;
    info!(default = ?default_path, override_file = ?override_path, "configuration loaded");
    Ok(config)
}
