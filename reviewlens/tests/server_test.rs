use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use common::Config;
use reviewlens::loader::ReviewCache;
use reviewlens::server::{build_rocket, AppState};
use rocket::http::Status;
use rocket::local::asynchronous::Client;
use serde_json::{json, Value};

const REVIEWS: &str = "\
userName,content,score,at,sentiment
Ana,seru,5,2022-03-14 08:12:55,positif
Budi,banyak iklan,1,2022-07-01 19:40:02,negatif
Citra,lumayan,3,2023-11-20 10:00:00,netral
Dodi,keren,3,2023-01-02 06:30:00,positif
";

// Helper to build a client over a review file in a temp dir
async fn setup_client(dir: &tempfile::TempDir, with_file: bool) -> (Client, PathBuf) {
    let path = dir.path().join("reviews.csv");
    if with_file {
        fs::write(&path, REVIEWS).expect("write reviews");
    }
    let state = AppState::new(
        Arc::new(Config::default()),
        path.clone(),
        Arc::new(ReviewCache::new()),
    )
    .expect("default config is valid");
    let client = Client::tracked(build_rocket(state))
        .await
        .expect("valid rocket instance");
    (client, path)
}

#[tokio::test]
async fn health_and_status() {
    let dir = tempfile::tempdir().unwrap();
    let (client, _) = setup_client(&dir, true).await;

    let response = client.get("/health").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(response.into_string().await.as_deref(), Some("OK"));

    let status: Value = client
        .get("/api/v1/status")
        .dispatch()
        .await
        .into_json()
        .await
        .expect("status json");
    assert_eq!(status["status"], "ok");
    // Nothing has asked for the data yet.
    assert_eq!(status["data_loaded"], false);
}

#[tokio::test]
async fn default_reviews_use_configured_selection() {
    let dir = tempfile::tempdir().unwrap();
    let (client, _) = setup_client(&dir, true).await;

    let response = client.get("/api/v1/reviews").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    let view: Value = response.into_json().await.expect("view json");

    assert_eq!(view["selected"], json!(["positive", "neutral"]));
    let records = view["records"].as_array().expect("records");
    assert_eq!(records.len(), 3);
    assert_eq!(records[0]["sentiment"], "neutral");
    assert_eq!(view["yearly"].as_array().map(|a| a.len()), Some(3));
}

#[tokio::test]
async fn filter_endpoint_validates_selection() {
    let dir = tempfile::tempdir().unwrap();
    let (client, _) = setup_client(&dir, true).await;

    let response = client
        .post("/api/v1/reviews/filter")
        .json(&json!({ "sentiments": ["negatif"] }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let view: Value = response.into_json().await.expect("view json");
    assert_eq!(view["records"].as_array().map(|a| a.len()), Some(1));
    assert_eq!(view["yearly"][0]["mean_score"], 1.0);

    let response = client
        .post("/api/v1/reviews/filter")
        .json(&json!({ "sentiments": [] }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::UnprocessableEntity);
    let body: Value = response.into_json().await.expect("error json");
    assert_eq!(body["kind"], "validation");

    let response = client
        .post("/api/v1/reviews/filter")
        .json(&json!({ "sentiments": ["grumpy"] }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::UnprocessableEntity);
}

#[tokio::test]
async fn stats_panel_and_sentiments() {
    let dir = tempfile::tempdir().unwrap();
    let (client, _) = setup_client(&dir, true).await;

    let stats: Value = client
        .get("/api/v1/stats")
        .dispatch()
        .await
        .into_json()
        .await
        .expect("stats json");
    assert_eq!(stats["summary"]["count"], 4);
    assert_eq!(stats["summary"]["mean_score"], 3.0);
    assert_eq!(stats["summary"]["modal_sentiment"], "positive");
    assert_eq!(stats["score_distribution"][0], json!({ "score": 1, "count": 1 }));
    assert_eq!(stats["sentiment_distribution"][0]["percent"], 50.0);

    let labels: Value = client
        .get("/api/v1/sentiments")
        .dispatch()
        .await
        .into_json()
        .await
        .expect("labels json");
    assert_eq!(labels["available"], json!(["positive", "negative", "neutral"]));

    let status: Value = client
        .get("/api/v1/status")
        .dispatch()
        .await
        .into_json()
        .await
        .expect("status json");
    assert_eq!(status["data_loaded"], true);
}

#[tokio::test]
async fn classify_endpoint() {
    let dir = tempfile::tempdir().unwrap();
    let (client, _) = setup_client(&dir, false).await;

    let result: Value = client
        .post("/api/v1/classify")
        .json(&json!({ "text": "terrible awful bad" }))
        .dispatch()
        .await
        .into_json()
        .await
        .expect("classification json");
    assert_eq!(result["label"], "negative");
    assert!(result["polarity"].as_f64().unwrap() < 0.0);

    let response = client
        .post("/api/v1/classify")
        .json(&json!({ "text": "   " }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::UnprocessableEntity);
}

#[tokio::test]
async fn missing_file_is_404_and_server_keeps_serving() {
    let dir = tempfile::tempdir().unwrap();
    let (client, path) = setup_client(&dir, false).await;

    let response = client.get("/api/v1/stats").dispatch().await;
    assert_eq!(response.status(), Status::NotFound);
    let body: Value = response.into_json().await.expect("error json");
    assert_eq!(body["kind"], "file_not_found");

    // Once the file shows up the next request loads it.
    fs::write(&path, REVIEWS).unwrap();
    let response = client.get("/api/v1/stats").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
}

#[tokio::test]
async fn malformed_file_is_500_parse() {
    let dir = tempfile::tempdir().unwrap();
    let (client, path) = setup_client(&dir, false).await;
    fs::write(&path, "score,at,sentiment\n5,2023-01-01,positif\n4,yesterday,positif\n").unwrap();

    let response = client.get("/api/v1/reviews").dispatch().await;
    assert_eq!(response.status(), Status::InternalServerError);
    let body: Value = response.into_json().await.expect("error json");
    assert_eq!(body["kind"], "parse");
    assert!(body["error"].as_str().unwrap().contains("line 3"));

    // An out-of-range score is a parse failure too, not a crash.
    fs::write(&path, "score,at,sentiment\n1e300,2023-01-01,positif\n").unwrap();
    let response = client.get("/api/v1/stats").dispatch().await;
    assert_eq!(response.status(), Status::InternalServerError);

    // The server is still up.
    let response = client.get("/health").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
}
