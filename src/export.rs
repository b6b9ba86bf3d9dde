//! CSV export of the monthly table

use serde::Serialize;

use crate::error::{DashboardError, Result};
use crate::forecast::Forecast;
use crate::models::MonthlyAggregate;

const HEADER: [&str; 6] = [
    "month",
    "label",
    "total_amount",
    "total_quantity",
    "transactions",
    "trend",
];

#[derive(Serialize)]
struct MonthlyRow<'a> {
    month: String,
    label: &'a str,
    total_amount: f64,
    total_quantity: f64,
    transactions: usize,
    trend: Option<f64>,
}

/// One row per observed month; `trend` is empty when no forecast was fitted
pub fn monthly_csv(monthly: &[MonthlyAggregate], forecast: Option<&Forecast>) -> Result<String> {
    let labels: Vec<String> = monthly.iter().map(|m| m.month.label()).collect();
    let mut writer = csv::Writer::from_writer(Vec::new());

    // serialize() only emits the header alongside the first record
    if monthly.is_empty() {
        writer.write_record(HEADER)?;
    }

    for (m, label) in monthly.iter().zip(&labels) {
        let trend = forecast
            .and_then(|f| f.points.iter().find(|p| p.month == m.month))
            .map(|p| p.trend);
        writer.serialize(MonthlyRow {
            month: m.month.to_string(),
            label,
            total_amount: m.total_amount,
            total_quantity: m.total_quantity,
            transactions: m.count,
            trend,
        })?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| DashboardError::Render(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| DashboardError::Render(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::fit_forecast;
    use crate::models::MonthKey;

    fn month(m: u32, total: f64) -> MonthlyAggregate {
        MonthlyAggregate {
            month: MonthKey { year: 2025, month: m },
            total_amount: total,
            total_quantity: 3.0,
            count: 2,
        }
    }

    #[test]
    fn test_csv_with_trend() {
        let monthly = vec![month(1, 150.0), month(2, 200.0)];
        let forecast = fit_forecast(&monthly).unwrap();
        let csv = monthly_csv(&monthly, Some(&forecast)).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], HEADER.join(","));
        assert!(lines[1].starts_with("2025-01,Jan 2025,150.0,3.0,2,"));
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_csv_without_trend_leaves_column_empty() {
        let csv = monthly_csv(&[month(5, 10.0)], None).unwrap();
        assert_eq!(csv.lines().nth(1), Some("2025-05,May 2025,10.0,3.0,2,"));
    }

    #[test]
    fn test_csv_empty_keeps_header() {
        let csv = monthly_csv(&[], None).unwrap();
        assert_eq!(csv, format!("{}\n", HEADER.join(",")));
        assert_eq!(csv.lines().count(), 1);
    }
}
