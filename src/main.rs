//! Terminal sales report
//!
//! Fetches the table once, runs the same pipeline as the dashboard and
//! prints it section by section.
//!
//! Run: ./target/release/sales_dashboard [section] [--amount N --dependents N --credit-limit N]
//! Sections: all, summary, monthly, forecast, breakdown, risk

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use sales_dashboard::api::format::{compact, percent, rupiah, signed, thousands};
use sales_dashboard::config::{PipelineArgs, StoreArgs};
use sales_dashboard::forecast::ForecastState;
use sales_dashboard::models::CategoryAggregate;
use sales_dashboard::pipeline::{build_snapshot, Snapshot};
use sales_dashboard::risk::{RiskInput, RiskState};
use sales_dashboard::store::StoreClient;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "sales_dashboard")]
#[command(about = "Print the sales dashboard as a terminal report")]
struct Args {
    /// Section to print: all, summary, monthly, forecast, breakdown, risk
    #[arg(default_value = "all")]
    section: String,

    /// Income / amount for an ad-hoc risk check
    #[arg(long)]
    amount: Option<f64>,

    /// Dependents for an ad-hoc risk check
    #[arg(long)]
    dependents: Option<f64>,

    /// Credit limit for an ad-hoc risk check
    #[arg(long)]
    credit_limit: Option<f64>,

    #[command(flatten)]
    store: StoreArgs,

    #[command(flatten)]
    pipeline: PipelineArgs,
}

fn print_section_header(title: &str) {
    println!("\n{}", "═".repeat(72));
    println!("  {}", title);
    println!("{}\n", "═".repeat(72));
}

fn print_summary(snapshot: &Snapshot) {
    print_section_header("1. SUMMARY");
    for warning in &snapshot.warnings {
        println!("  ⚠ {}", warning);
    }
    if !snapshot.warnings.is_empty() {
        println!();
    }
    let k = &snapshot.kpis;
    println!("  {:24} {:?}", "Data origin", snapshot.origin);
    println!("  {:24} {}", "Total sales", rupiah(k.total_sales));
    println!("  {:24} {}", "Transactions", thousands(k.transaction_count as f64));
    println!("  {:24} {}", "Average sale", rupiah(k.mean_sale));
    println!("  {:24} {}", "Units sold", thousands(k.total_quantity));
    println!("  {:24} {}", "Months covered", k.months_covered);
    println!("  {:24} {}", "Top region", k.top_region.as_deref().unwrap_or("-"));
}

fn print_monthly(snapshot: &Snapshot) {
    print_section_header("2. MONTHLY TOTALS");
    let forecast = snapshot.forecast.forecast();
    println!("  {:10} {:>20} {:>10} {:>8} {:>20}", "Month", "Total", "Qty", "Rows", "Trend");
    println!("  {}", "─".repeat(72));
    for m in &snapshot.monthly {
        let trend = forecast
            .and_then(|f| f.points.iter().find(|p| p.month == m.month))
            .map(|p| rupiah(p.trend))
            .unwrap_or_else(|| "-".into());
        println!(
            "  {:10} {:>20} {:>10} {:>8} {:>20}",
            m.month.label(),
            rupiah(m.total_amount),
            thousands(m.total_quantity),
            m.count,
            trend
        );
    }
}

fn print_forecast(snapshot: &Snapshot) {
    print_section_header("3. NEXT-MONTH PROJECTION");
    match &snapshot.forecast {
        ForecastState::Ready(f) => {
            println!("  {:24} {}", "Projected month", f.next_month.label());
            println!("  {:24} {}", "Projection", rupiah(f.projection));
            println!("  {:24} {}", "vs last month", signed(f.delta_vs_last));
            println!("  {:24} {}/day", "Trend slope", compact(f.trend.slope));
        }
        ForecastState::Insufficient { months } => {
            println!("  Not enough monthly data to forecast (need 2 months, have {}).", months);
        }
    }
}

fn print_breakdown(title: &str, categories: &[CategoryAggregate]) {
    println!("\n{}", title);
    println!("{}", "─".repeat(72));
    println!("  {:20} {:>20} {:>18} {:>6} {:>6}", "Label", "Total", "Mean", "Rows", "Share");
    for c in categories {
        println!(
            "  {:20} {:>20} {:>18} {:>6} {:>5.1}%",
            c.label,
            rupiah(c.total_amount),
            rupiah(c.mean_amount),
            c.count,
            c.share * 100.0
        );
    }
}

fn print_risk(snapshot: &Snapshot, input: Option<RiskInput>) {
    print_section_header("5. CUSTOMER RISK");
    let model = match &snapshot.risk {
        RiskState::Ready(model) => model,
        RiskState::Unavailable(reason) => {
            println!("  {}", reason);
            return;
        }
    };
    println!(
        "  Trained on {} customers ({} current, {} delinquent)",
        model.training_rows, model.current_examples, model.delinquent_examples
    );
    let Some(input) = input else {
        println!("  Pass --amount, --dependents and --credit-limit to classify a customer.");
        return;
    };
    match model.classify(&input) {
        Ok(a) => println!(
            "  Prediction: {} (confidence {})",
            a.status.display_name(),
            percent(a.confidence)
        ),
        Err(e) => println!("  Could not classify: {}", e),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .init();

    let args = Args::parse();
    let store = StoreClient::new(&args.store)?;
    let fetched = store.fetch_all().await;
    let snapshot = build_snapshot(fetched, &args.pipeline.options(), Utc::now());
    info!("Report built from {} records", snapshot.records.len());

    let risk_input = if args.amount.is_some() || args.dependents.is_some() || args.credit_limit.is_some() {
        let defaults = RiskInput::default();
        Some(RiskInput {
            amount: args.amount.unwrap_or(defaults.amount),
            dependents: args.dependents.unwrap_or(defaults.dependents),
            credit_limit: args.credit_limit.unwrap_or(defaults.credit_limit),
        })
    } else {
        None
    };

    match args.section.as_str() {
        "all" => {
            print_summary(&snapshot);
            print_monthly(&snapshot);
            print_forecast(&snapshot);
            print_section_header("4. BREAKDOWNS");
            print_breakdown("By region", &snapshot.by_region);
            print_breakdown("By product", &snapshot.by_product);
            print_risk(&snapshot, risk_input);
        }
        "summary" => print_summary(&snapshot),
        "monthly" => print_monthly(&snapshot),
        "forecast" => print_forecast(&snapshot),
        "breakdown" => {
            print_section_header("4. BREAKDOWNS");
            print_breakdown("By region", &snapshot.by_region);
            print_breakdown("By product", &snapshot.by_product);
        }
        "risk" => print_risk(&snapshot, risk_input),
        _ => {
            println!("Unknown section: {}", args.section);
            println!("Available: all, summary, monthly, forecast, breakdown, risk");
        }
    }

    println!("\nUpdated: {}", snapshot.fetched_at.format("%d/%m/%Y %H:%M:%S UTC"));
    Ok(())
}
