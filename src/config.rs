//! Command-line / environment configuration shared by both binaries

use clap::Args;
use std::time::Duration;

use crate::risk::DEFAULT_MAX_DEPTH;

pub const DEFAULT_TABLE: &str = "amdk_sales";

/// Where the sales table lives
#[derive(Args, Debug, Clone)]
pub struct StoreArgs {
    /// Base URL of the table store, e.g. https://<project>.supabase.co
    #[arg(long, env = "SUPABASE_URL")]
    pub store_url: Option<String>,

    /// API key sent as `apikey` and bearer token
    #[arg(long, env = "SUPABASE_KEY", hide_env_values = true)]
    pub store_key: Option<String>,

    /// Table holding the sales rows
    #[arg(long, env = "SALES_TABLE", default_value = DEFAULT_TABLE)]
    pub table: String,

    /// HTTP timeout for the fetch, in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value = "15")]
    pub timeout_secs: u64,
}

impl StoreArgs {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

/// How fetched rows are turned into a dashboard
#[derive(Args, Debug, Clone)]
pub struct PipelineArgs {
    /// Render an empty dashboard instead of the built-in sample data
    /// when the store has no usable rows
    #[arg(long)]
    pub no_sample_fallback: bool,

    /// Maximum depth of the risk decision tree
    #[arg(long, env = "RISK_MAX_DEPTH", default_value_t = DEFAULT_MAX_DEPTH)]
    pub risk_max_depth: u16,
}

impl PipelineArgs {
    pub fn options(&self) -> crate::pipeline::PipelineOptions {
        crate::pipeline::PipelineOptions {
            sample_fallback: !self.no_sample_fallback,
            risk_max_depth: self.risk_max_depth,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(flatten)]
        store: StoreArgs,
        #[command(flatten)]
        pipeline: PipelineArgs,
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = TestCli::parse_from([
            "test",
            "--store-url",
            "https://example.supabase.co",
            "--store-key",
            "anon",
            "--table",
            "sales_2025",
            "--timeout-secs",
            "0",
            "--no-sample-fallback",
            "--risk-max-depth",
            "2",
        ]);
        assert_eq!(cli.store.store_url.as_deref(), Some("https://example.supabase.co"));
        assert_eq!(cli.store.table, "sales_2025");
        assert_eq!(cli.store.timeout(), Duration::from_secs(1));
        let options = cli.pipeline.options();
        assert!(!options.sample_fallback);
        assert_eq!(options.risk_max_depth, 2);
    }
}
