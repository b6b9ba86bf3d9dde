//! Sales dashboard web server
//!
//! Serves the HTML dashboard and its JSON API on one port.
//!
//! Usage:
//!   ./target/release/dashboard_server [options]
//!
//! Environment variables (or matching flags, see --help):
//!   SUPABASE_URL        - Base URL of the table store
//!   SUPABASE_KEY        - API key for the store
//!   SALES_TABLE         - Table to read (default: amdk_sales)
//!   CACHE_TTL_SECS      - How long a fetched snapshot is reused (default: 600)
//!   DASHBOARD_PORT      - Port to listen on (default: 8080)
//!
//! Routes:
//!   GET  /                          - Dashboard page
//!   GET  /risk                      - Dashboard page with a risk check
//!   POST /refresh                   - Drop the cache and reload
//!   GET  /api/v1/health             - Health check
//!   GET  /api/v1/summary            - KPIs, warnings, forecast
//!   GET  /api/v1/monthly            - Monthly totals with trend values
//!   GET  /api/v1/forecast           - Next-month projection
//!   GET  /api/v1/breakdown/:dim     - Breakdown by region or product
//!   GET  /api/v1/records            - Cleaned rows (?limit=N)
//!   GET  /api/v1/risk/classify      - Classify one customer
//!   POST /api/v1/refresh            - Drop the cache and reload
//!   GET  /api/v1/export/monthly.csv - Monthly table as CSV

use anyhow::Result;
use clap::Parser;
use sales_dashboard::api::{create_router, DashboardService};
use sales_dashboard::config::{PipelineArgs, StoreArgs};
use sales_dashboard::store::StoreClient;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "dashboard_server")]
#[command(about = "Sales reporting and forecasting dashboard")]
struct Args {
    /// Port to listen on
    #[arg(long, env = "DASHBOARD_PORT", default_value = "8080")]
    port: u16,

    /// Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    bind: String,

    /// Seconds a fetched snapshot is served before refetching
    #[arg(long, env = "CACHE_TTL_SECS", default_value = "600")]
    cache_ttl_secs: u64,

    #[command(flatten)]
    store: StoreArgs,

    #[command(flatten)]
    pipeline: PipelineArgs,
}

fn print_banner(args: &Args, configured: bool) {
    println!("============================================================");
    println!("           SALES FORECASTING DASHBOARD SERVER");
    println!("============================================================");
    println!();
    println!("  Page:     http://localhost:{}/", args.port);
    println!("  API:      http://localhost:{}/api/v1/", args.port);
    println!("  Table:    {}", args.store.table);
    println!(
        "  Store:    {}",
        if configured { "configured" } else { "NOT configured (sample data)" }
    );
    println!("  Cache:    {}s", args.cache_ttl_secs);
    println!();
    println!("============================================================");
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .init();

    let args = Args::parse();

    let store = StoreClient::new(&args.store)?;
    print_banner(&args, store.is_configured());

    let service = Arc::new(DashboardService::new(
        store,
        args.pipeline.options(),
        Duration::from_secs(args.cache_ttl_secs),
    ));

    let addr: SocketAddr = format!("{}:{}", args.bind, args.port).parse()?;
    let app = create_router(service);
    tracing::info!("Starting dashboard server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
