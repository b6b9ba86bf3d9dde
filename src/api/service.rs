//! Shared dashboard logic behind the HTML page and the JSON API
//!
//! Owns the store client and the single read-cache entry.

use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::{DashboardError, Result};
use crate::pipeline::{build_snapshot, PipelineOptions, Snapshot};
use crate::risk::{RiskAssessment, RiskInput, RiskState};
use crate::store::StoreClient;

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(600);

/// A pipeline result and when it was produced
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub snapshot: Arc<Snapshot>,
    pub fetched_at: Instant,
}

impl CacheEntry {
    pub fn new(snapshot: Snapshot, fetched_at: Instant) -> Self {
        Self {
            snapshot: Arc::new(snapshot),
            fetched_at,
        }
    }

    pub fn is_fresh(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.fetched_at) < ttl
    }
}

pub struct DashboardService {
    store: StoreClient,
    options: PipelineOptions,
    ttl: Duration,
    cache: RwLock<Option<CacheEntry>>,
}

impl DashboardService {
    pub fn new(store: StoreClient, options: PipelineOptions, ttl: Duration) -> Self {
        Self {
            store,
            options,
            ttl,
            cache: RwLock::new(None),
        }
    }

    pub fn table(&self) -> &str {
        self.store.table()
    }

    pub fn cache_ttl(&self) -> Duration {
        self.ttl
    }

    /// Current snapshot, refetching when the cache entry is missing or stale
    pub async fn snapshot(&self) -> Arc<Snapshot> {
        // Check cache first
        {
            let cache = self.cache.read().await;
            if let Some(entry) = cache.as_ref() {
                if entry.is_fresh(Instant::now(), self.ttl) {
                    debug!("Serving cached snapshot");
                    return entry.snapshot.clone();
                }
            }
        }

        let fetched = self.store.fetch_all().await;
        let snapshot = build_snapshot(fetched, &self.options, Utc::now());
        info!(
            "Built snapshot: origin {:?}, {} records, {} months, {} warnings",
            snapshot.origin,
            snapshot.records.len(),
            snapshot.monthly.len(),
            snapshot.warnings.len()
        );

        // Update cache
        let entry = CacheEntry::new(snapshot, Instant::now());
        let out = entry.snapshot.clone();
        {
            let mut cache = self.cache.write().await;
            *cache = Some(entry);
        }
        out
    }

    /// Drop the cached snapshot so the next read refetches
    pub async fn invalidate(&self) {
        let mut cache = self.cache.write().await;
        if cache.take().is_some() {
            info!("Cache invalidated by manual refresh");
        }
    }

    pub async fn classify(&self, input: &RiskInput) -> Result<RiskAssessment> {
        let snapshot = self.snapshot().await;
        match &snapshot.risk {
            RiskState::Ready(model) => model.classify(input),
            RiskState::Unavailable(reason) => Err(DashboardError::Model(reason.clone())),
        }
    }
}
