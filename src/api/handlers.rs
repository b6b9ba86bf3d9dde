//! HTTP handlers for the dashboard page and the JSON API
//!
//! These handlers use the shared DashboardService.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

use super::page::{render_page, RiskPanel};
use super::service::DashboardService;
use crate::error::DashboardError;
use crate::forecast::ForecastState;
use crate::models::{CategoryAggregate, Kpis, MonthKey, SalesRecord};
use crate::pipeline::DataOrigin;
use crate::risk::{RiskAssessment, RiskInput};

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
pub struct SummaryResponse {
    pub origin: DataOrigin,
    pub table: String,
    pub fetched_at: String,
    pub fetched_rows: usize,
    pub rejected_rows: usize,
    pub warnings: Vec<String>,
    pub kpis: Kpis,
    pub forecast: ForecastState,
}

#[derive(Serialize)]
pub struct MonthlyResponse {
    pub month: MonthKey,
    pub label: String,
    pub total_amount: f64,
    pub total_quantity: f64,
    pub count: usize,
    pub trend: Option<f64>,
}

#[derive(Serialize)]
pub struct BreakdownResponse {
    pub dimension: String,
    pub categories: Vec<CategoryAggregate>,
}

#[derive(Serialize)]
pub struct RiskResponse {
    pub input: RiskInput,
    pub assessment: RiskAssessment,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: impl Into<String>) -> ApiError {
    (status, Json(ErrorResponse { error: error.into() }))
}

// ============================================================================
// Query Parameters
// ============================================================================

#[derive(Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

/// Risk form fields; blank or missing ones fall back to the form defaults
#[derive(Debug, Default, Deserialize)]
pub struct RiskQuery {
    pub amount: Option<String>,
    pub dependents: Option<String>,
    pub credit_limit: Option<String>,
}

fn form_number(value: Option<&str>, name: &str, default: f64) -> Result<f64, DashboardError> {
    match value.map(str::trim) {
        None | Some("") => Ok(default),
        Some(s) => s
            .parse::<f64>()
            .map_err(|_| DashboardError::InvalidInput(format!("{} must be a number", name))),
    }
}

impl RiskQuery {
    pub fn is_empty(&self) -> bool {
        [&self.amount, &self.dependents, &self.credit_limit]
            .iter()
            .all(|v| v.as_deref().map_or(true, |s| s.trim().is_empty()))
    }

    pub fn to_input(&self) -> Result<RiskInput, DashboardError> {
        let defaults = RiskInput::default();
        let input = RiskInput {
            amount: form_number(self.amount.as_deref(), "amount", defaults.amount)?,
            dependents: form_number(self.dependents.as_deref(), "dependents", defaults.dependents)?,
            credit_limit: form_number(
                self.credit_limit.as_deref(),
                "credit_limit",
                defaults.credit_limit,
            )?,
        };
        input.validate()?;
        Ok(input)
    }
}

// ============================================================================
// Handlers
// ============================================================================

pub type AppState = Arc<DashboardService>;

/// GET /
pub async fn index(State(service): State<AppState>) -> Html<String> {
    let snapshot = service.snapshot().await;
    Html(render_page(
        &snapshot,
        service.table(),
        &RiskPanel::Form(RiskInput::default()),
    ))
}

/// GET /risk?amount=..&dependents=..&credit_limit=..
pub async fn risk_page(
    State(service): State<AppState>,
    Query(params): Query<RiskQuery>,
) -> Html<String> {
    let snapshot = service.snapshot().await;
    let panel = match params.to_input() {
        Ok(input) if params.is_empty() => RiskPanel::Form(input),
        Ok(input) => match snapshot.risk.model().map(|model| model.classify(&input)) {
            Some(Ok(assessment)) => RiskPanel::Result(input, assessment),
            Some(Err(e)) => RiskPanel::Error(input, format!("Risk model error: {}", e)),
            None => RiskPanel::Form(input),
        },
        Err(e) => RiskPanel::Error(RiskInput::default(), e.to_string()),
    };
    Html(render_page(&snapshot, service.table(), &panel))
}

/// POST /refresh
pub async fn refresh_page(State(service): State<AppState>) -> Redirect {
    service.invalidate().await;
    Redirect::to("/")
}

/// GET /api/v1/health
pub async fn health(State(service): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "table": service.table(),
        "cache_ttl_secs": service.cache_ttl().as_secs(),
    }))
}

/// GET /api/v1/summary
pub async fn get_summary(State(service): State<AppState>) -> Json<SummaryResponse> {
    let snapshot = service.snapshot().await;
    Json(SummaryResponse {
        origin: snapshot.origin,
        table: service.table().to_string(),
        fetched_at: snapshot.fetched_at.to_rfc3339(),
        fetched_rows: snapshot.fetched_rows,
        rejected_rows: snapshot.rejected_rows,
        warnings: snapshot.warnings.clone(),
        kpis: snapshot.kpis.clone(),
        forecast: snapshot.forecast.clone(),
    })
}

/// GET /api/v1/monthly
pub async fn get_monthly(State(service): State<AppState>) -> Json<Vec<MonthlyResponse>> {
    let snapshot = service.snapshot().await;
    let forecast = snapshot.forecast.forecast();
    let response = snapshot
        .monthly
        .iter()
        .map(|m| MonthlyResponse {
            month: m.month,
            label: m.month.label(),
            total_amount: m.total_amount,
            total_quantity: m.total_quantity,
            count: m.count,
            trend: forecast
                .and_then(|f| f.points.iter().find(|p| p.month == m.month))
                .map(|p| p.trend),
        })
        .collect();
    Json(response)
}

/// GET /api/v1/forecast
pub async fn get_forecast(State(service): State<AppState>) -> Json<ForecastState> {
    let snapshot = service.snapshot().await;
    Json(snapshot.forecast.clone())
}

/// GET /api/v1/breakdown/:dimension
pub async fn get_breakdown(
    State(service): State<AppState>,
    Path(dimension): Path<String>,
) -> Result<Json<BreakdownResponse>, ApiError> {
    let snapshot = service.snapshot().await;
    let categories = match dimension.to_ascii_lowercase().as_str() {
        "region" => snapshot.by_region.clone(),
        "product" => snapshot.by_product.clone(),
        _ => {
            return Err(api_error(
                StatusCode::NOT_FOUND,
                format!("Unknown dimension '{}'. Valid: region, product", dimension),
            ))
        }
    };
    Ok(Json(BreakdownResponse {
        dimension: dimension.to_ascii_lowercase(),
        categories,
    }))
}

/// GET /api/v1/records?limit=N
pub async fn get_records(
    State(service): State<AppState>,
    Query(params): Query<LimitQuery>,
) -> Json<Vec<SalesRecord>> {
    let limit = params.limit.unwrap_or(100);
    let snapshot = service.snapshot().await;
    Json(snapshot.records.iter().rev().take(limit).cloned().collect())
}

/// GET /api/v1/risk/classify
pub async fn classify_risk(
    State(service): State<AppState>,
    Query(params): Query<RiskQuery>,
) -> Result<Json<RiskResponse>, ApiError> {
    let input = params
        .to_input()
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?;
    match service.classify(&input).await {
        Ok(assessment) => Ok(Json(RiskResponse { input, assessment })),
        Err(DashboardError::InvalidInput(msg)) => Err(api_error(StatusCode::BAD_REQUEST, msg)),
        Err(e) => {
            warn!("Risk classification unavailable: {}", e);
            Err(api_error(StatusCode::SERVICE_UNAVAILABLE, e.to_string()))
        }
    }
}

/// POST /api/v1/refresh
pub async fn refresh(State(service): State<AppState>) -> Json<SummaryResponse> {
    service.invalidate().await;
    get_summary(State(service)).await
}

/// GET /api/v1/export/monthly.csv
pub async fn export_monthly_csv(State(service): State<AppState>) -> Result<Response, ApiError> {
    let snapshot = service.snapshot().await;
    match crate::export::monthly_csv(&snapshot.monthly, snapshot.forecast.forecast()) {
        Ok(body) => Ok((
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"monthly_sales.csv\"",
                ),
            ],
            body,
        )
            .into_response()),
        Err(e) => Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())),
    }
}
