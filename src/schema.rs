//! Canonical schema for store rows
//!
//! The sales table has drifted across deployments (`transaksi_date` vs
//! `transaction_date`, `total_sales` vs `total_sales_rp`, ...). Every known
//! column name maps onto one [`Field`] here, and nowhere else.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};
use std::fmt;

use crate::models::{RiskProfile, RiskStatus, SalesRecord};

/// A raw row as returned by the store
pub type RawRow = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Date,
    Amount,
    Quantity,
    Region,
    Product,
    Dependents,
    CreditLimit,
    Status,
}

/// Known column names for each canonical field, in lookup order
pub const COLUMN_ALIASES: &[(Field, &[&str])] = &[
    (Field::Date, &["transaksi_date", "transaction_date", "tanggal_transaksi", "date"]),
    (Field::Amount, &["total_sales", "total_sales_rp", "amount"]),
    (Field::Quantity, &["quantity", "qty", "jumlah"]),
    (Field::Region, &["region", "wilayah"]),
    (Field::Product, &["product_name", "nama_produk", "product"]),
    (Field::Dependents, &["jumlah_tanggungan", "dependents"]),
    (Field::CreditLimit, &["plafon_kredit", "credit_limit"]),
    (Field::Status, &["status_lancar", "status"]),
];

/// Map a column name onto its canonical field
pub fn resolve_column(name: &str) -> Option<Field> {
    let name = name.trim().to_ascii_lowercase();
    COLUMN_ALIASES
        .iter()
        .find(|(_, names)| names.contains(&name.as_str()))
        .map(|(field, _)| *field)
}

/// Why a row was dropped at the ingestion boundary
#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    MissingDate,
    BadDate(String),
    MissingAmount,
    BadAmount(String),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::MissingDate => write!(f, "missing transaction date"),
            Rejection::BadDate(v) => write!(f, "unparseable date '{}'", v),
            Rejection::MissingAmount => write!(f, "missing sales amount"),
            Rejection::BadAmount(v) => write!(f, "non-numeric amount '{}'", v),
        }
    }
}

/// Find the value of a canonical field, whichever alias the row uses
fn lookup<'a>(row: &'a RawRow, field: Field) -> Option<&'a Value> {
    row.iter()
        .find(|(name, value)| !value.is_null() && resolve_column(name) == Some(field))
        .map(|(_, value)| value)
}

fn describe(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Coerce a JSON value into a finite number; strings are trimmed first
pub fn coerce_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            s.parse::<f64>().ok()?
        }
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Coerce a JSON value into a calendar date
///
/// Accepts plain ISO dates, ISO date-times with or without fractional
/// seconds, and RFC 3339 timestamps (the date is taken in the timestamp's
/// own offset).
pub fn coerce_date(value: &Value) -> Option<NaiveDate> {
    let s = value.as_str()?.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.date_naive());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(ts.date());
        }
    }
    None
}

/// Coerce a repayment flag: 1/0, booleans, or status words
pub fn coerce_status(value: &Value) -> Option<RiskStatus> {
    if let Value::String(s) = value {
        match s.trim().to_ascii_lowercase().as_str() {
            "lancar" | "current" => return Some(RiskStatus::Current),
            "macet" | "delinquent" => return Some(RiskStatus::Delinquent),
            _ => {}
        }
    }
    match coerce_number(value)? {
        n if n == 1.0 => Some(RiskStatus::Current),
        n if n == 0.0 => Some(RiskStatus::Delinquent),
        _ => None,
    }
}

fn coerce_label(value: &Value) -> Option<String> {
    let label = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!label.is_empty()).then_some(label)
}

/// Normalize one raw row into a [`SalesRecord`]
///
/// Date and amount are required. Optional fields that fail coercion are
/// left empty; the risk profile is attached only when all three risk
/// fields coerce.
pub fn normalize_row(row: &RawRow) -> Result<SalesRecord, Rejection> {
    let date_value = lookup(row, Field::Date).ok_or(Rejection::MissingDate)?;
    let date = coerce_date(date_value).ok_or_else(|| Rejection::BadDate(describe(date_value)))?;

    let amount_value = lookup(row, Field::Amount).ok_or(Rejection::MissingAmount)?;
    let amount =
        coerce_number(amount_value).ok_or_else(|| Rejection::BadAmount(describe(amount_value)))?;

    let risk = match (
        lookup(row, Field::Dependents).and_then(coerce_number),
        lookup(row, Field::CreditLimit).and_then(coerce_number),
        lookup(row, Field::Status).and_then(coerce_status),
    ) {
        (Some(dependents), Some(credit_limit), Some(status)) => Some(RiskProfile {
            dependents,
            credit_limit,
            status,
        }),
        _ => None,
    };

    Ok(SalesRecord {
        date,
        amount,
        quantity: lookup(row, Field::Quantity).and_then(coerce_number),
        region: lookup(row, Field::Region).and_then(coerce_label),
        product: lookup(row, Field::Product).and_then(coerce_label),
        risk,
    })
}
