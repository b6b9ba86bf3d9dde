//! End-to-end routes against a local stand-in for the table store

use axum::{
    body::{to_bytes, Body},
    extract::State,
    http::{header, Request, StatusCode},
    routing::get,
    Json, Router,
};
use sales_dashboard::api::{create_router, DashboardService};
use sales_dashboard::config::StoreArgs;
use sales_dashboard::pipeline::PipelineOptions;
use sales_dashboard::store::StoreClient;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceExt;

const TABLE: &str = "amdk_sales";

#[derive(Clone)]
struct FakeStore {
    rows: Arc<Value>,
    hits: Arc<AtomicUsize>,
}

async fn serve_rows(State(store): State<FakeStore>) -> Json<Value> {
    store.hits.fetch_add(1, Ordering::SeqCst);
    Json((*store.rows).clone())
}

/// Serve `rows` at /rest/v1/amdk_sales and return the base URL and hit counter
async fn spawn_store(rows: Value) -> (String, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let state = FakeStore {
        rows: Arc::new(rows),
        hits: hits.clone(),
    };
    let app = Router::new()
        .route(&format!("/rest/v1/{}", TABLE), get(serve_rows))
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), hits)
}

fn store_args(url: Option<String>) -> StoreArgs {
    StoreArgs {
        store_url: url,
        store_key: Some("test-key".into()),
        table: TABLE.into(),
        timeout_secs: 2,
    }
}

fn router_for(url: Option<String>) -> Router {
    let store = StoreClient::new(&store_args(url)).unwrap();
    let service = DashboardService::new(store, PipelineOptions::default(), Duration::from_secs(600));
    create_router(Arc::new(service))
}

fn live_rows() -> Value {
    json!([
        {"transaksi_date": "2025-01-05", "total_sales": 100, "quantity": 2, "region": "Jakarta",
         "product_name": "Galon 19L", "jumlah_tanggungan": 1, "plafon_kredit": 2000000, "status_lancar": "Lancar"},
        {"transaksi_date": "2025-01-20", "total_sales": "50", "quantity": 1, "region": "Bandung",
         "product_name": "Botol 600ml", "jumlah_tanggungan": 4, "plafon_kredit": 500000, "status_lancar": "Macet"},
        {"transaksi_date": "2025-02-11", "total_sales": 200, "quantity": 3, "region": "Jakarta",
         "product_name": "Galon 19L", "jumlah_tanggungan": 0, "plafon_kredit": 3000000, "status_lancar": "Lancar"},
        {"transaksi_date": "2025-03-02", "total_sales": 260.5, "quantity": 4, "region": "Surabaya",
         "product_name": "Cup 240ml", "jumlah_tanggungan": 5, "plafon_kredit": 300000, "status_lancar": "Macet"},
        {"transaksi_date": "not a date", "total_sales": 10}
    ])
}

async fn get_body(app: Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let (status, body) = get_body(app, uri).await;
    (status, serde_json::from_str(&body).unwrap())
}

#[tokio::test]
async fn test_page_renders_live_data() {
    let (url, hits) = spawn_store(live_rows()).await;
    let (status, html) = get_body(router_for(Some(url)), "/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Projected Apr 2025"));
    assert!(html.contains("Jakarta"));
    assert!(html.contains("1 of 5 rows were skipped"));
    assert!(!html.contains("sample data"));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_summary_reports_live_origin() {
    let (url, _) = spawn_store(live_rows()).await;
    let (status, body) = get_json(router_for(Some(url)), "/api/v1/summary").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["origin"], "live");
    assert_eq!(body["table"], TABLE);
    assert_eq!(body["fetched_rows"], 5);
    assert_eq!(body["rejected_rows"], 1);
    assert_eq!(body["kpis"]["transaction_count"], 4);
    assert_eq!(body["kpis"]["total_sales"], 610.5);
    assert_eq!(body["forecast"]["state"], "ready");
}

#[tokio::test]
async fn test_empty_table_falls_back_to_sample() {
    let (url, _) = spawn_store(json!([])).await;
    let (status, body) = get_json(router_for(Some(url)), "/api/v1/summary").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["origin"], "sample");
    let warnings = body["warnings"].as_array().unwrap();
    assert!(warnings
        .iter()
        .any(|w| w.as_str().unwrap().contains("returned no rows")));
}

#[tokio::test]
async fn test_unreachable_store_still_serves_page() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let (status, html) = get_body(router_for(Some(format!("http://{}", addr))), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("sample data"));
}

#[tokio::test]
async fn test_missing_credentials_serves_sample() {
    let (status, body) = get_json(router_for(None), "/api/v1/summary").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["origin"], "sample");
    assert_eq!(body["fetched_rows"], 0);
}

#[tokio::test]
async fn test_unknown_breakdown_is_not_found() {
    let (url, _) = spawn_store(live_rows()).await;
    let app = router_for(Some(url));

    let (status, body) = get_json(app.clone(), "/api/v1/breakdown/region").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["categories"][0]["label"], "Jakarta");

    let (status, _) = get_json(app, "/api/v1/breakdown/weather").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_risk_classify_rejects_bad_input() {
    let (url, _) = spawn_store(live_rows()).await;
    let app = router_for(Some(url));

    let (status, _) = get_json(app.clone(), "/api/v1/risk/classify?amount=abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get_json(app.clone(), "/api/v1/risk/classify?dependents=-1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = get_json(app, "/api/v1/risk/classify?amount=1000000&dependents=1").await;
    assert_eq!(status, StatusCode::OK);
    let confidence = body["assessment"]["confidence"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&confidence));
}

#[tokio::test]
async fn test_refresh_refetches() {
    let (url, hits) = spawn_store(live_rows()).await;
    let app = router_for(Some(url));

    get_body(app.clone(), "/").await;
    get_body(app.clone(), "/api/v1/monthly").await;
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/refresh")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(hits.load(Ordering::SeqCst), 2);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/refresh")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(response.status().is_redirection());
    assert_eq!(response.headers()[header::LOCATION], "/");
}

#[tokio::test]
async fn test_monthly_csv_export() {
    let (url, _) = spawn_store(live_rows()).await;
    let response = router_for(Some(url))
        .oneshot(
            Request::builder()
                .uri("/api/v1/export/monthly.csv")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/csv; charset=utf-8"
    );
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = String::from_utf8(bytes.to_vec()).unwrap();
    assert_eq!(body.lines().count(), 4);
    assert!(body.lines().nth(1).unwrap().starts_with("2025-01,Jan 2025,150.0,3.0,2,"));
}

#[tokio::test]
async fn test_health_reports_cache_ttl() {
    let (status, body) = get_json(router_for(None), "/api/v1/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["table"], TABLE);
    assert_eq!(body["cache_ttl_secs"], 600);
}

#[tokio::test]
async fn test_risk_page_without_input_shows_form() {
    let (url, _) = spawn_store(live_rows()).await;
    let (status, html) = get_body(router_for(Some(url)), "/risk").await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains(r#"action="/risk""#));
    assert!(html.contains(r#"name="amount" min="0" step="any" value="5000000""#));
    assert!(!html.contains("Prediction:"));
}

#[tokio::test]
async fn test_risk_page_shows_classification() {
    let (url, _) = spawn_store(live_rows()).await;
    let (status, html) = get_body(
        router_for(Some(url)),
        "/risk?amount=1000000&dependents=1&credit_limit=2500000",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Prediction:"));
    assert!(html.contains("Confidence:"));
    assert!(html.contains(r#"value="2500000""#));
}

#[tokio::test]
async fn test_risk_page_reports_invalid_input() {
    let (url, _) = spawn_store(live_rows()).await;
    let (status, html) = get_body(router_for(Some(url)), "/risk?amount=lots").await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("amount must be a number"));
    assert!(!html.contains("Prediction:"));
}
