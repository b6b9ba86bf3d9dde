//! Forecasting stage
//!
//! Ordinary least squares of monthly total against the ordinal day of each
//! month end, fitted with smartcore. The fitted line is evaluated over the
//! observed months (trend overlay) and one calendar month past the last
//! observed month (projection).

use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::linear::linear_regression::{LinearRegression, LinearRegressionParameters};
use tracing::debug;

use crate::error::{DashboardError, Result};
use crate::models::{MonthKey, MonthlyAggregate};

pub const MIN_MONTHS: usize = 2;

/// Proleptic Gregorian ordinal, 0001-01-01 is day 1
pub fn ordinal(date: NaiveDate) -> i32 {
    date.num_days_from_ce()
}

/// `total = intercept + slope * ordinal(month_end)`
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct TrendLine {
    pub slope: f64,
    pub intercept: f64,
    /// Fitted domain, inclusive
    pub first_month: MonthKey,
    pub last_month: MonthKey,
}

impl TrendLine {
    pub fn value_at(&self, month: MonthKey) -> f64 {
        self.value_on(month.month_end())
    }

    pub fn value_on(&self, date: NaiveDate) -> f64 {
        self.intercept + self.slope * f64::from(ordinal(date))
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TrendPoint {
    pub month: MonthKey,
    pub label: String,
    pub actual: f64,
    pub trend: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Forecast {
    pub trend: TrendLine,
    pub points: Vec<TrendPoint>,
    pub next_month: MonthKey,
    /// Last observed month end plus one calendar month, day clamped
    pub projection_date: NaiveDate,
    /// Regression output, may be negative
    pub raw_projection: f64,
    /// Projection clamped at zero for display
    pub projection: f64,
    /// Raw projection minus the last observed monthly total
    pub delta_vs_last: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ForecastState {
    Ready(Forecast),
    Insufficient { months: usize },
}

impl ForecastState {
    pub fn forecast(&self) -> Option<&Forecast> {
        match self {
            ForecastState::Ready(f) => Some(f),
            ForecastState::Insufficient { .. } => None,
        }
    }
}

/// Fit the trend over an ordered monthly series
pub fn fit_forecast(monthly: &[MonthlyAggregate]) -> Result<Forecast> {
    if monthly.len() < MIN_MONTHS {
        return Err(DashboardError::InsufficientData(monthly.len()));
    }

    // x is days since the first month end; the intercept is shifted back
    // to plain ordinals afterwards.
    let origin = ordinal(monthly[0].month.month_end());
    let offsets: Vec<f64> = monthly
        .iter()
        .map(|m| f64::from(ordinal(m.month.month_end()) - origin))
        .collect();
    let totals: Vec<f64> = monthly.iter().map(|m| m.total_amount).collect();

    let x = DenseMatrix::from_2d_vec(&offsets.iter().map(|d| vec![*d]).collect::<Vec<_>>());
    let model = LinearRegression::fit(&x, &totals, LinearRegressionParameters::default())
        .map_err(|e| DashboardError::Model(e.to_string()))?;
    let fitted: Vec<f64> = model
        .predict(&x)
        .map_err(|e| DashboardError::Model(e.to_string()))?;

    let first = 0;
    let last = monthly.len() - 1;
    let span = offsets[last] - offsets[first];
    let slope = if span != 0.0 {
        (fitted[last] - fitted[first]) / span
    } else {
        0.0
    };
    let intercept = fitted[first] - slope * f64::from(origin);

    let trend = TrendLine {
        slope,
        intercept,
        first_month: monthly[first].month,
        last_month: monthly[last].month,
    };

    let points = monthly
        .iter()
        .zip(&fitted)
        .map(|(m, fit)| TrendPoint {
            month: m.month,
            label: m.month.label(),
            actual: m.total_amount,
            trend: *fit,
        })
        .collect();

    let next_month = trend.last_month.next();
    let projection_date = trend
        .last_month
        .month_end()
        .checked_add_months(Months::new(1))
        .ok_or_else(|| DashboardError::Model(format!("no month after {}", trend.last_month)))?;
    let next_offset = f64::from(ordinal(projection_date) - origin);
    let raw_projection = fitted[first] + slope * next_offset;
    debug!(
        "Fitted trend over {} months: slope {:.4}/day, projection {:.2} on {}",
        monthly.len(),
        slope,
        raw_projection,
        projection_date
    );

    Ok(Forecast {
        trend,
        points,
        next_month,
        projection_date,
        raw_projection,
        projection: raw_projection.max(0.0),
        delta_vs_last: raw_projection - monthly[last].total_amount,
    })
}

/// Fit, degrading to [`ForecastState::Insufficient`] on too few months
pub fn forecast_state(monthly: &[MonthlyAggregate]) -> Result<ForecastState> {
    match fit_forecast(monthly) {
        Ok(f) => Ok(ForecastState::Ready(f)),
        Err(DashboardError::InsufficientData(months)) => Ok(ForecastState::Insufficient { months }),
        Err(e) => Err(e),
    }
}
