use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{get, post, routes, Build, Rocket, State};
use serde::{Deserialize, Serialize};

use common::Config;

use crate::classifier::{Classification, Classifier};
use crate::error::DashboardError;
use crate::filter::{self, FilteredView};
use crate::loader::ReviewCache;
use crate::model::{Dataset, Sentiment};
use crate::stats::{self, StatsPanel};

/// Application state stored inside Rocket managed state.
#[derive(Clone)]
pub struct AppState {
    pub started_at: DateTime<Utc>,
    pub config: Arc<Config>,
    pub data_path: PathBuf,
    pub cache: Arc<ReviewCache>,
    pub classifier: Arc<Classifier>,
    /// `dashboard.default_sentiments`, parsed once so a bad config fails at startup.
    pub default_selection: Vec<Sentiment>,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        data_path: PathBuf,
        cache: Arc<ReviewCache>,
    ) -> crate::error::Result<Self> {
        let default_selection = filter::parse_selection(&config.default_sentiments())?;
        if default_selection.is_empty() {
            return Err(DashboardError::validation(
                "dashboard.default_sentiments must name at least one sentiment",
            ));
        }
        let classifier = Classifier::from_config(config.classifier.as_ref());
        Ok(Self {
            started_at: Utc::now(),
            config,
            data_path,
            cache,
            classifier: Arc::new(classifier),
            default_selection,
        })
    }

    // CSV parsing is blocking file io, so a cold load runs off the async workers.
    async fn dataset(&self) -> Result<Arc<Dataset>, ApiError> {
        if let Some(dataset) = self.cache.get(&self.data_path) {
            return Ok(dataset);
        }
        let cache = self.cache.clone();
        let path = self.data_path.clone();
        rocket::tokio::task::spawn_blocking(move || cache.get_or_load(&path))
            .await
            .map_err(|e| DashboardError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))?
            .map_err(Into::into)
    }
}

/// JSON error body: `{ "kind": "...", "error": "..." }`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    kind: &'static str,
    error: String,
}

type ApiError = (Status, Json<ErrorBody>);

impl From<DashboardError> for (Status, Json<ErrorBody>) {
    fn from(err: DashboardError) -> Self {
        let status = match &err {
            DashboardError::Validation(_) => Status::UnprocessableEntity,
            DashboardError::FileNotFound(_) => Status::NotFound,
            DashboardError::Connection(_) => Status::ServiceUnavailable,
            DashboardError::Parse { .. } | DashboardError::Io(_) => Status::InternalServerError,
        };
        if status == Status::InternalServerError {
            tracing::error!(%err, "request failed");
        } else {
            tracing::warn!(%err, "request rejected");
        }
        (
            status,
            Json(ErrorBody {
                kind: err.kind(),
                error: err.to_string(),
            }),
        )
    }
}

/// Response structure for `/api/v1/status`.
#[derive(Serialize)]
struct StatusResponse {
    status: &'static str,
    title: String,
    uptime_seconds: i64,
    data_path: String,
    data_loaded: bool,
}

#[derive(Serialize)]
struct SentimentsResponse {
    available: Vec<Sentiment>,
    default_selection: Vec<Sentiment>,
}

/// Request body for the filter endpoint.
#[derive(Deserialize)]
struct FilterRequest {
    #[serde(default)]
    sentiments: Vec<String>,
}

/// Request body for the classify endpoint.
#[derive(Deserialize)]
struct ClassifyRequest {
    #[serde(default)]
    text: String,
}

#[get("/health")]
async fn health() -> &'static str {
    "OK"
}

/// Status endpoint returning uptime and whether the review file is loaded.
#[get("/api/v1/status")]
async fn status(state: &State<AppState>) -> Json<StatusResponse> {
    let uptime = (Utc::now() - state.started_at).num_seconds();
    Json(StatusResponse {
        status: "ok",
        title: state.config.title().to_string(),
        uptime_seconds: uptime,
        data_path: state.data_path.display().to_string(),
        data_loaded: state.cache.get(&state.data_path).is_some(),
    })
}

/// Labels present in the dataset (first-seen order) plus the default selection.
#[get("/api/v1/sentiments")]
async fn sentiments(state: &State<AppState>) -> Result<Json<SentimentsResponse>, ApiError> {
    let dataset = state.dataset().await?;
    Ok(Json(SentimentsResponse {
        available: dataset.labels(),
        default_selection: state.default_selection.clone(),
    }))
}

/// Filtered view using the configured default selection.
#[get("/api/v1/reviews")]
async fn default_reviews(state: &State<AppState>) -> Result<Json<FilteredView>, ApiError> {
    let dataset = state.dataset().await?;
    Ok(Json(filter::filter_and_aggregate(&dataset, &state.default_selection)?))
}

#[post("/api/v1/reviews/filter", data = "<body>")]
async fn filter_reviews(
    state: &State<AppState>,
    body: Json<FilterRequest>,
) -> Result<Json<FilteredView>, ApiError> {
    let selected = filter::parse_selection(&body.sentiments)?;
    let dataset = state.dataset().await?;
    Ok(Json(filter::filter_and_aggregate(&dataset, &selected)?))
}

#[get("/api/v1/stats")]
async fn stats_panel(state: &State<AppState>) -> Result<Json<StatsPanel>, ApiError> {
    let dataset = state.dataset().await?;
    Ok(Json(stats::stats_panel(&dataset)))
}

#[post("/api/v1/classify", data = "<body>")]
async fn classify(
    state: &State<AppState>,
    body: Json<ClassifyRequest>,
) -> Result<Json<Classification>, ApiError> {
    Ok(Json(state.classifier.classify(&body.text)?))
}

/// Build the Rocket instance without launching it (tests drive it through a local client).
pub fn build_rocket(state: AppState) -> Rocket<Build> {
    let fig = rocket::Config::figment()
        .merge(("address", state.config.bind_address().to_string()))
        .merge(("port", state.config.port()));

    rocket::custom(fig).manage(state).mount(
        "/",
        routes![
            health,
            status,
            sentiments,
            default_reviews,
            filter_reviews,
            stats_panel,
            classify,
        ],
    )
}

pub async fn launch_rocket(state: AppState) -> Result<()> {
    tracing::info!(
        address = state.config.bind_address(),
        port = state.config.port(),
        "Starting Rocket HTTP server"
    );
    build_rocket(state)
        .launch()
        .await
        .map_err(|e| anyhow!("Rocket failed: {}", e))?;

    tracing::info!("Rocket HTTP server has shut down");
    Ok(())
}
