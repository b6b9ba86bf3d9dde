use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Repayment status of a customer record
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RiskStatus {
    Current,
    Delinquent,
}

impl RiskStatus {
    /// Class label used by the classifier (1 = current, 0 = delinquent)
    pub fn label(self) -> u32 {
        match self {
            RiskStatus::Current => 1,
            RiskStatus::Delinquent => 0,
        }
    }

    pub fn from_label(label: u32) -> Self {
        if label == 1 {
            RiskStatus::Current
        } else {
            RiskStatus::Delinquent
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            RiskStatus::Current => "Current",
            RiskStatus::Delinquent => "Delinquent",
        }
    }
}

/// Customer-risk fields present on some tables
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskProfile {
    pub dependents: f64,
    pub credit_limit: f64,
    pub status: RiskStatus,
}

/// One cleaned sales row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SalesRecord {
    pub date: NaiveDate,
    pub amount: f64,
    pub quantity: Option<f64>,
    pub region: Option<String>,
    pub product: Option<String>,
    pub risk: Option<RiskProfile>,
}

impl SalesRecord {
    pub fn new(date: NaiveDate, amount: f64) -> Self {
        Self {
            date,
            amount,
            quantity: None,
            region: None,
            product: None,
            risk: None,
        }
    }

    pub fn month(&self) -> MonthKey {
        MonthKey::from_date(self.date)
    }
}

/// Calendar month bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

const MONTH_ABBREV: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

impl MonthKey {
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self { year: self.year + 1, month: 1 }
        } else {
            Self { year: self.year, month: self.month + 1 }
        }
    }

    /// Last calendar day of the month
    pub fn month_end(&self) -> NaiveDate {
        self.next()
            .first_day()
            .pred_opt()
            .unwrap_or_else(|| self.first_day())
    }

    /// Short chart label, e.g. "Jan 2025"
    pub fn label(&self) -> String {
        let idx = (self.month.clamp(1, 12) - 1) as usize;
        format!("{} {}", MONTH_ABBREV[idx], self.year)
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Sums over every record of one calendar month
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthlyAggregate {
    pub month: MonthKey,
    pub total_amount: f64,
    pub total_quantity: f64,
    pub count: usize,
}

/// Sums and means over every record sharing a category label
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryAggregate {
    pub label: String,
    pub total_amount: f64,
    pub mean_amount: f64,
    pub count: usize,
    pub share: f64,
}

/// Headline numbers shown on the KPI cards
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Kpis {
    pub total_sales: f64,
    pub transaction_count: usize,
    pub mean_sale: f64,
    pub total_quantity: f64,
    pub months_covered: usize,
    pub top_region: Option<String>,
}
