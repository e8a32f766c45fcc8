use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use configuration::DashboardSettings;
use dashboard::{AppState, router};
use loader::DataLoader;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tower::ServiceExt;

fn fixture_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../fixtures/sample")
}

fn state_for(dir: &Path) -> AppState {
    AppState {
        loader: DataLoader::new(dir),
        dashboard: DashboardSettings::default(),
    }
}

async fn get(state: AppState, uri: &str) -> (StatusCode, String) {
    let response = router(state)
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn get_json(state: AppState, uri: &str) -> (StatusCode, Value) {
    let (status, body) = get(state, uri).await;
    (status, serde_json::from_str(&body).unwrap())
}

#[tokio::test]
async fn health_check() {
    let (status, body) = get(state_for(&fixture_dir()), "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");
}

#[tokio::test]
async fn page_renders_every_section() {
    let response = router(state_for(&fixture_dir()))
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/html"));

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let page = String::from_utf8(bytes.to_vec()).unwrap();
    for heading in [
        "E-commerce Analytics Dashboard",
        "Key Performance Indicators",
        "Performance Analytics",
        "Customer Experience Metrics",
        "Total Revenue",
        "Average Delivery Time",
    ] {
        assert!(page.contains(heading), "missing {heading}");
    }
    assert_eq!(page.matches("<svg").count(), 4);
    assert!(page.contains(r#"onchange="this.form.submit()""#));
    // 2023 is absent from the fixture, so the latest year is preselected.
    assert!(page.contains(r#"<option value="2018" selected>"#));
}

#[tokio::test]
async fn dashboard_json_for_a_month() {
    let (status, view) = get_json(
        state_for(&fixture_dir()),
        "/api/dashboard?year=2017&month=5&status=all",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["period"], "2017-05");
    assert_eq!(view["row_count"], 20);
    assert_eq!(view["kpis"][0]["value"], "$5K");
    assert_eq!(view["kpis"][1]["value"], "12");
    assert_eq!(view["categories"]["bars"][0]["label"], "sports_leisure");
    assert_eq!(view["empty_message"], Value::Null);
}

#[tokio::test]
async fn empty_selection_is_not_an_error() {
    let (status, view) = get_json(
        state_for(&fixture_dir()),
        "/api/dashboard?year=2016&month=10&status=canceled",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["row_count"], 0);
    assert_eq!(view["kpis"][0]["value"], "$0");
    assert_eq!(view["kpis"][2]["value"], "N/A");
    assert!(view["empty_message"].is_string());
}

#[tokio::test]
async fn month_without_orders_keeps_the_month() {
    let (status, view) = get_json(
        state_for(&fixture_dir()),
        "/api/dashboard?year=2018&month=2&status=all",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["period"], "2018-02");
    assert_eq!(view["selection"]["month"], 2);
    assert_eq!(view["row_count"], 0);
    assert!(view["empty_message"].is_string());
}

#[tokio::test]
async fn filter_options_follow_the_year() {
    let (status, options) = get_json(state_for(&fixture_dir()), "/api/filters?year=2018").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(options["years"], serde_json::json!([2016, 2017, 2018]));
    let months: Vec<u64> = options["months"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["value"].as_u64().unwrap())
        .collect();
    assert_eq!(months, [1, 3, 4, 5, 7, 8]);
    assert_eq!(options["months"][0]["label"], "01 - Jan");
    assert_eq!(options["statuses"].as_array().unwrap().len(), 8);
}

#[tokio::test]
async fn bad_filter_is_a_bad_request() {
    let (status, body) = get(state_for(&fixture_dir()), "/?year=twenty").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("year must be a number"));

    let (status, body) = get_json(state_for(&fixture_dir()), "/api/dashboard?month=13").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("month"));
}

#[tokio::test]
async fn missing_data_is_service_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let (status, body) = get_json(state_for(dir.path()), "/api/dashboard").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["error"].as_str().unwrap().contains("Data unavailable"));

    let (status, page) = get(state_for(dir.path()), "/").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(page.contains("The dashboard could not be rendered."));
}

#[tokio::test]
async fn malformed_data_is_unprocessable() {
    let dir = tempfile::tempdir().unwrap();
    for entry in fs::read_dir(fixture_dir()).unwrap() {
        let path = entry.unwrap().path();
        fs::copy(&path, dir.path().join(path.file_name().unwrap())).unwrap();
    }
    let items = dir.path().join("order_items_dataset.csv");
    let contents = fs::read_to_string(&items).unwrap().replacen("414.64", "cheap", 1);
    fs::write(&items, contents).unwrap();

    let (status, body) = get_json(state_for(dir.path()), "/api/dashboard").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("order items"));
}
