//! Built-in sample dataset shown when the store has nothing usable

use chrono::NaiveDate;

use crate::models::{RiskProfile, RiskStatus, SalesRecord};

// (date, amount, quantity, region, product, dependents, credit limit, current?)
const SAMPLE_ROWS: &[(&str, f64, f64, &str, &str, f64, f64, bool)] = &[
    ("2025-01-06", 4_250_000.0, 85.0, "Jakarta", "Galon 19L", 1.0, 1_000_000.0, true),
    ("2025-01-14", 1_800_000.0, 120.0, "Bandung", "Botol 600ml", 3.0, 4_000_000.0, false),
    ("2025-01-27", 2_600_000.0, 52.0, "Surabaya", "Galon 19L", 2.0, 1_500_000.0, true),
    ("2025-02-03", 5_100_000.0, 102.0, "Jakarta", "Galon 19L", 0.0, 2_000_000.0, true),
    ("2025-02-18", 1_350_000.0, 90.0, "Bogor", "Gelas 240ml", 4.0, 5_000_000.0, false),
    ("2025-02-25", 3_050_000.0, 61.0, "Bandung", "Botol 1500ml", 2.0, 1_000_000.0, true),
    ("2025-03-04", 4_900_000.0, 98.0, "Jakarta", "Galon 19L", 1.0, 1_500_000.0, true),
    ("2025-03-12", 2_200_000.0, 147.0, "Surabaya", "Botol 600ml", 5.0, 6_000_000.0, false),
    ("2025-03-29", 3_400_000.0, 68.0, "Bogor", "Botol 1500ml", 1.0, 1_000_000.0, true),
    ("2025-04-08", 5_600_000.0, 112.0, "Jakarta", "Galon 19L", 2.0, 2_500_000.0, true),
    ("2025-04-16", 1_950_000.0, 130.0, "Bandung", "Gelas 240ml", 3.0, 4_500_000.0, false),
    ("2025-04-23", 3_700_000.0, 74.0, "Surabaya", "Botol 1500ml", 0.0, 1_000_000.0, true),
    ("2025-05-02", 6_050_000.0, 121.0, "Jakarta", "Galon 19L", 1.0, 2_000_000.0, true),
    ("2025-05-19", 2_450_000.0, 163.0, "Bogor", "Botol 600ml", 4.0, 5_500_000.0, false),
    ("2025-05-30", 3_900_000.0, 78.0, "Bandung", "Galon 19L", 2.0, 1_500_000.0, true),
    ("2025-06-05", 6_400_000.0, 128.0, "Jakarta", "Galon 19L", 1.0, 1_000_000.0, true),
    ("2025-06-17", 2_750_000.0, 183.0, "Surabaya", "Gelas 240ml", 5.0, 6_500_000.0, false),
    ("2025-06-26", 4_100_000.0, 82.0, "Bogor", "Botol 1500ml", 2.0, 2_000_000.0, true),
];

/// The fixed fallback dataset, sorted by date
pub fn sample_records() -> Vec<SalesRecord> {
    SAMPLE_ROWS
        .iter()
        .filter_map(
            |&(date, amount, quantity, region, product, dependents, credit_limit, current)| {
                let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
                Some(SalesRecord {
                    date,
                    amount,
                    quantity: Some(quantity),
                    region: Some(region.to_string()),
                    product: Some(product.to_string()),
                    risk: Some(RiskProfile {
                        dependents,
                        credit_limit,
                        status: if current {
                            RiskStatus::Current
                        } else {
                            RiskStatus::Delinquent
                        },
                    }),
                })
            },
        )
        .collect()
}
