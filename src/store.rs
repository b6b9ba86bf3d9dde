use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;
use tracing::{info, warn};

use crate::config::StoreArgs;
use crate::error::{DashboardError, Result};
use crate::schema::RawRow;

/// Read-only client for one PostgREST-style table
///
/// Built once at startup and handed to whoever fetches; there is no global
/// connection.
#[derive(Debug, Clone)]
pub struct StoreClient {
    base_url: Option<String>,
    api_key: Option<String>,
    table: String,
    client: reqwest::Client,
}

impl StoreClient {
    pub fn new(args: &StoreArgs) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(args.timeout()).build()?;
        let base_url = args
            .store_url
            .as_deref()
            .map(|u| u.trim().trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty());
        let api_key = args
            .store_key
            .as_deref()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        if base_url.is_none() || api_key.is_none() {
            warn!("Store URL or key not configured; live data will be unavailable");
        }

        Ok(Self {
            base_url,
            api_key,
            table: args.table.clone(),
            client,
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn is_configured(&self) -> bool {
        self.base_url.is_some() && self.api_key.is_some()
    }

    fn table_url(&self, base_url: &str) -> String {
        format!("{}/rest/v1/{}?select=*", base_url, self.table)
    }

    fn auth_headers(key: &str) -> Result<HeaderMap> {
        let invalid = |_| DashboardError::InvalidInput("store key contains invalid characters".into());
        let mut headers = HeaderMap::new();
        headers.insert("apikey", HeaderValue::from_str(key).map_err(invalid)?);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", key)).map_err(invalid)?,
        );
        Ok(headers)
    }

    /// Fetch every row of the table
    pub async fn fetch_all(&self) -> Result<Vec<RawRow>> {
        let (Some(base_url), Some(key)) = (self.base_url.as_deref(), self.api_key.as_deref()) else {
            return Err(DashboardError::MissingCredentials);
        };

        let url = self.table_url(base_url);
        let response = self
            .client
            .get(&url)
            .headers(Self::auth_headers(key)?)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(DashboardError::Status { status, body });
        }

        let payload: Value = response.json().await?;
        let rows = match payload {
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::Object(map) => Ok(map),
                    other => Err(DashboardError::UnexpectedPayload(format!(
                        "expected row objects, got {}",
                        other
                    ))),
                })
                .collect::<Result<Vec<RawRow>>>()?,
            other => {
                return Err(DashboardError::UnexpectedPayload(format!(
                    "expected a JSON array, got {}",
                    type_name(&other)
                )))
            }
        };

        info!("Fetched {} rows from table '{}'", rows.len(), self.table);
        Ok(rows)
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
