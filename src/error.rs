//! Error taxonomy for the dashboard pipeline.
//!
//! Every stage returns one of these; the service turns them into
//! user-visible warnings instead of letting them reach the page.

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("store credentials missing: set SUPABASE_URL and SUPABASE_KEY")]
    MissingCredentials,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("store returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected payload from store: {0}")]
    UnexpectedPayload(String),

    #[error("the sales table returned no rows")]
    EmptyResultSet,

    #[error("none of the {0} fetched rows had a usable date and amount")]
    NoUsableRows(usize),

    #[error("forecast needs at least 2 months of data, found {0}")]
    InsufficientData(usize),

    #[error("risk model needs both current and delinquent examples ({current} current, {delinquent} delinquent)")]
    InsufficientClasses { current: usize, delinquent: usize },

    #[error("model error: {0}")]
    Model(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("chart rendering failed: {0}")]
    Render(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, DashboardError>;
