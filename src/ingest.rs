//! Cleaning stage: raw store rows to typed records

use tracing::debug;

use crate::models::SalesRecord;
use crate::schema::{normalize_row, RawRow, Rejection};

/// Result of cleaning one fetch
#[derive(Debug, Clone, Default)]
pub struct CleanReport {
    pub records: Vec<SalesRecord>,
    pub rejected: Vec<(usize, Rejection)>,
}

impl CleanReport {
    pub fn total_rows(&self) -> usize {
        self.records.len() + self.rejected.len()
    }
}

/// Coerce every row, keeping the ones with a usable date and amount.
/// Records come back sorted by date.
pub fn clean_rows(rows: &[RawRow]) -> CleanReport {
    let mut report = CleanReport::default();

    for (idx, row) in rows.iter().enumerate() {
        match normalize_row(row) {
            Ok(record) => report.records.push(record),
            Err(reason) => {
                debug!("Dropping row {}: {}", idx, reason);
                report.rejected.push((idx, reason));
            }
        }
    }

    report.records.sort_by_key(|r| r.date);
    report
}
