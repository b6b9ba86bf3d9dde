//! One pass of the dashboard pipeline: fetch outcome -> snapshot
//!
//! Every stage degrades on failure. The resulting [`Snapshot`] always
//! renders; problems surface as `warnings`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use crate::aggregate::{aggregate_monthly, by_product, by_region, compute_kpis};
use crate::error::{DashboardError, Result};
use crate::forecast::{forecast_state, ForecastState};
use crate::ingest::clean_rows;
use crate::models::{CategoryAggregate, Kpis, MonthlyAggregate, SalesRecord};
use crate::risk::{RiskState, DEFAULT_MAX_DEPTH};
use crate::sample::sample_records;
use crate::schema::RawRow;

#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    pub sample_fallback: bool,
    pub risk_max_depth: u16,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            sample_fallback: true,
            risk_max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DataOrigin {
    Live,
    Sample,
    Empty,
}

#[derive(Debug)]
pub struct Snapshot {
    pub origin: DataOrigin,
    pub warnings: Vec<String>,
    pub fetched_rows: usize,
    pub rejected_rows: usize,
    pub records: Vec<SalesRecord>,
    pub kpis: Kpis,
    pub monthly: Vec<MonthlyAggregate>,
    pub by_region: Vec<CategoryAggregate>,
    pub by_product: Vec<CategoryAggregate>,
    pub forecast: ForecastState,
    pub risk: RiskState,
    pub fetched_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn has_data(&self) -> bool {
        !self.records.is_empty()
    }
}

/// Turn a fetch outcome into a renderable snapshot
pub fn build_snapshot(
    fetched: Result<Vec<RawRow>>,
    options: &PipelineOptions,
    fetched_at: DateTime<Utc>,
) -> Snapshot {
    let mut warnings = Vec::new();
    let mut fetched_rows = 0;
    let mut rejected_rows = 0;

    let live = match fetched {
        Ok(rows) if rows.is_empty() => Err(DashboardError::EmptyResultSet),
        Ok(rows) => {
            fetched_rows = rows.len();
            let report = clean_rows(&rows);
            rejected_rows = report.rejected.len();
            if rejected_rows > 0 {
                warnings.push(format!(
                    "{} of {} rows were skipped because their date or amount could not be read.",
                    rejected_rows, fetched_rows
                ));
            }
            if report.records.is_empty() {
                Err(DashboardError::NoUsableRows(fetched_rows))
            } else {
                Ok(report.records)
            }
        }
        Err(e) => Err(e),
    };

    let (origin, records) = match live {
        Ok(records) => (DataOrigin::Live, records),
        Err(e) => {
            warn!("Live data unavailable: {}", e);
            warnings.push(format!("Live data unavailable: {}.", e));
            if options.sample_fallback {
                warnings.push("Showing built-in sample data.".to_string());
                (DataOrigin::Sample, sample_records())
            } else {
                (DataOrigin::Empty, Vec::new())
            }
        }
    };

    let monthly = aggregate_monthly(&records);
    let kpis = compute_kpis(&records, &monthly);

    let forecast = match forecast_state(&monthly) {
        Ok(state) => state,
        Err(e) => {
            warn!("Forecast failed: {}", e);
            warnings.push(format!("Forecast unavailable: {}.", e));
            ForecastState::Insufficient { months: monthly.len() }
        }
    };
    if let ForecastState::Insufficient { months } = &forecast {
        if !records.is_empty() {
            warnings.push(format!(
                "Not enough monthly data to forecast (need at least 2 months, have {}).",
                months
            ));
        }
    }

    let risk = RiskState::build(&records, options.risk_max_depth);

    Snapshot {
        origin,
        warnings,
        fetched_rows,
        rejected_rows,
        by_region: by_region(&records),
        by_product: by_product(&records),
        records,
        kpis,
        monthly,
        forecast,
        risk,
        fetched_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows(value: serde_json::Value) -> Vec<RawRow> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_live_rows_flow_through() {
        let snapshot = build_snapshot(
            Ok(rows(json!([
                {"transaksi_date": "2025-01-05", "total_sales": 100},
                {"transaksi_date": "2025-01-20", "total_sales": 50},
                {"transaksi_date": "2025-02-10", "total_sales": 200},
                {"transaksi_date": "garbage", "total_sales": 1e9}
            ]))),
            &PipelineOptions::default(),
            Utc::now(),
        );

        assert_eq!(snapshot.origin, DataOrigin::Live);
        assert_eq!(snapshot.rejected_rows, 1);
        assert_eq!(snapshot.kpis.total_sales, 350.0);
        let totals: Vec<f64> = snapshot.monthly.iter().map(|m| m.total_amount).collect();
        assert_eq!(totals, vec![150.0, 200.0]);
        assert!(snapshot.forecast.forecast().is_some());
        assert!(snapshot.risk.model().is_none());
        assert_eq!(snapshot.warnings.len(), 1);
    }

    #[test]
    fn test_empty_table_falls_back_to_sample() {
        let snapshot = build_snapshot(Ok(vec![]), &PipelineOptions::default(), Utc::now());
        assert_eq!(snapshot.origin, DataOrigin::Sample);
        assert!(snapshot.has_data());
        assert!(snapshot.warnings.iter().any(|w| w.contains("no rows")));
        assert!(snapshot.risk.model().is_some());
    }

    #[test]
    fn test_fetch_error_without_fallback_renders_empty() {
        let options = PipelineOptions {
            sample_fallback: false,
            ..PipelineOptions::default()
        };
        let snapshot = build_snapshot(Err(DashboardError::MissingCredentials), &options, Utc::now());
        assert_eq!(snapshot.origin, DataOrigin::Empty);
        assert!(!snapshot.has_data());
        assert_eq!(snapshot.kpis, Kpis::default());
        assert_eq!(snapshot.forecast, ForecastState::Insufficient { months: 0 });
        assert_eq!(snapshot.warnings.len(), 1);
    }

    #[test]
    fn test_all_rows_unusable_counts_as_failure() {
        let snapshot = build_snapshot(
            Ok(rows(json!([{"transaksi_date": "2025-01-01", "total_sales": "abc"}]))),
            &PipelineOptions::default(),
            Utc::now(),
        );
        assert_eq!(snapshot.origin, DataOrigin::Sample);
        assert_eq!(snapshot.rejected_rows, 1);
    }

    #[test]
    fn test_gap_month_is_part_of_the_series() {
        let snapshot = build_snapshot(
            Ok(rows(json!([
                {"transaksi_date": "2025-01-10", "total_sales": 100},
                {"transaksi_date": "2025-03-10", "total_sales": 100}
            ]))),
            &PipelineOptions::default(),
            Utc::now(),
        );
        let totals: Vec<f64> = snapshot.monthly.iter().map(|m| m.total_amount).collect();
        assert_eq!(totals, vec![100.0, 0.0, 100.0]);
        assert_eq!(snapshot.monthly[1].count, 0);
        assert_eq!(snapshot.kpis.transaction_count, 2);

        let forecast = snapshot.forecast.forecast().unwrap();
        assert_eq!(forecast.points.len(), 3);
        assert!(forecast.raw_projection > 66.0 && forecast.raw_projection < 75.0);
    }

    #[test]
    fn test_single_month_skips_forecast_with_warning() {
        let snapshot = build_snapshot(
            Ok(rows(json!([
                {"transaction_date": "2025-04-01", "total_sales_rp": 10},
                {"transaction_date": "2025-04-30", "total_sales_rp": 20}
            ]))),
            &PipelineOptions::default(),
            Utc::now(),
        );
        assert_eq!(snapshot.forecast, ForecastState::Insufficient { months: 1 });
        assert!(snapshot.warnings.iter().any(|w| w.contains("Not enough monthly data")));
    }
}
