//! Aggregation stage: monthly totals, category breakdowns and KPIs

use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

use crate::models::{CategoryAggregate, Kpis, MonthKey, MonthlyAggregate, SalesRecord};

/// Anything that can be bucketed by calendar month
pub trait Observation {
    fn observed_on(&self) -> NaiveDate;
    fn amount(&self) -> f64;
    fn quantity(&self) -> f64;
    /// Number of transactions this observation stands for
    fn weight(&self) -> usize {
        1
    }
}

impl Observation for SalesRecord {
    fn observed_on(&self) -> NaiveDate {
        self.date
    }

    fn amount(&self) -> f64 {
        self.amount
    }

    fn quantity(&self) -> f64 {
        self.quantity.unwrap_or(0.0)
    }
}

impl Observation for MonthlyAggregate {
    fn observed_on(&self) -> NaiveDate {
        self.month.month_end()
    }

    fn amount(&self) -> f64 {
        self.total_amount
    }

    fn quantity(&self) -> f64 {
        self.total_quantity
    }

    fn weight(&self) -> usize {
        self.count
    }
}

fn empty_bucket(month: MonthKey) -> MonthlyAggregate {
    MonthlyAggregate {
        month,
        total_amount: 0.0,
        total_quantity: 0.0,
        count: 0,
    }
}

/// Group observations by (year, month), oldest month first.
/// Calendar months between the first and last observation that have no
/// rows are emitted as zero buckets with `count == 0`.
pub fn aggregate_monthly<T: Observation>(items: &[T]) -> Vec<MonthlyAggregate> {
    let mut buckets: BTreeMap<MonthKey, MonthlyAggregate> = BTreeMap::new();

    for item in items {
        let month = MonthKey::from_date(item.observed_on());
        let bucket = buckets.entry(month).or_insert_with(|| empty_bucket(month));
        bucket.total_amount += item.amount();
        bucket.total_quantity += item.quantity();
        bucket.count += item.weight();
    }

    if let (Some(&first), Some(&last)) = (buckets.keys().next(), buckets.keys().next_back()) {
        let mut month = first;
        while month < last {
            month = month.next();
            buckets.entry(month).or_insert_with(|| empty_bucket(month));
        }
    }

    buckets.into_values().collect()
}

/// Breakdown by an optional label (region, product). Records without the
/// label are grouped under "Unknown". Sorted by total, largest first.
pub fn aggregate_by<F>(records: &[SalesRecord], label_of: F) -> Vec<CategoryAggregate>
where
    F: Fn(&SalesRecord) -> Option<&str>,
{
    let mut groups: HashMap<String, (f64, usize)> = HashMap::new();
    for record in records {
        let label = label_of(record).unwrap_or("Unknown").to_string();
        let entry = groups.entry(label).or_insert((0.0, 0));
        entry.0 += record.amount;
        entry.1 += 1;
    }

    let grand_total: f64 = groups.values().map(|(total, _)| total).sum();

    let mut out: Vec<CategoryAggregate> = groups
        .into_iter()
        .map(|(label, (total, count))| CategoryAggregate {
            label,
            total_amount: total,
            mean_amount: total / count as f64,
            count,
            share: if grand_total != 0.0 { total / grand_total } else { 0.0 },
        })
        .collect();

    out.sort_by(|a, b| {
        b.total_amount
            .total_cmp(&a.total_amount)
            .then_with(|| a.label.cmp(&b.label))
    });
    out
}

pub fn by_region(records: &[SalesRecord]) -> Vec<CategoryAggregate> {
    aggregate_by(records, |r| r.region.as_deref())
}

pub fn by_product(records: &[SalesRecord]) -> Vec<CategoryAggregate> {
    aggregate_by(records, |r| r.product.as_deref())
}

pub fn compute_kpis(records: &[SalesRecord], monthly: &[MonthlyAggregate]) -> Kpis {
    let total_sales: f64 = records.iter().map(|r| r.amount).sum();
    let transaction_count = records.len();
    let mean_sale = if transaction_count > 0 {
        total_sales / transaction_count as f64
    } else {
        0.0
    };
    let top_region = if records.iter().any(|r| r.region.is_some()) {
        by_region(records)
            .into_iter()
            .find(|c| c.label != "Unknown")
            .map(|c| c.label)
    } else {
        None
    };

    Kpis {
        total_sales,
        transaction_count,
        mean_sale,
        total_quantity: records.iter().filter_map(|r| r.quantity).sum(),
        months_covered: monthly.len(),
        top_region,
    }
}
