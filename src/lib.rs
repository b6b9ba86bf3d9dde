pub mod aggregate;
pub mod api;
pub mod config;
pub mod error;
pub mod export;
pub mod forecast;
pub mod ingest;
pub mod models;
pub mod pipeline;
pub mod risk;
pub mod sample;
pub mod schema;
pub mod store;

pub use error::{DashboardError, Result};
