//! Caching layer for MVV responses.
//!
//! Stop searches and line lists change rarely and are requested repeatedly
//! (every keystroke burst, every time the selection dialog opens), so both
//! are cached for a short TTL. Departures are live data and always pass
//! through.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use moka::future::Cache as MokaCache;

use crate::domain::{Departure, LineInfo, LocationResult, SelectedLines};
use crate::mvv::{MvvClient, MvvError};
use crate::source::{DepartureSource, LineSource, StopSearch};

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries per kind.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(300),
            max_capacity: 1000,
        }
    }
}

/// MVV client with caching.
///
/// Wraps any transit source; errors are never cached.
pub struct CachedMvvClient<C = MvvClient> {
    client: C,
    /// Search results keyed by normalized query.
    searches: MokaCache<String, Arc<Vec<LocationResult>>>,
    /// Available lines keyed by stop id.
    lines: MokaCache<String, Arc<Vec<LineInfo>>>,
}

impl<C> CachedMvvClient<C> {
    /// Create a new cached client.
    pub fn new(client: C, config: &CacheConfig) -> Self {
        let searches = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();
        let lines = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self {
            client,
            searches,
            lines,
        }
    }

    /// Access the underlying client for operations that bypass cache.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Invalidate all cached entries.
    pub fn invalidate_cache(&self) {
        self.searches.invalidate_all();
        self.lines.invalidate_all();
    }
}

/// Cache key for a search: case and surrounding whitespace do not matter.
fn search_key(query: &str) -> String {
    query.trim().to_lowercase()
}

impl<C: StopSearch> StopSearch for CachedMvvClient<C> {
    async fn search_stops(&self, query: &str) -> Result<Vec<LocationResult>, MvvError> {
        let key = search_key(query);
        if let Some(cached) = self.searches.get(&key).await {
            return Ok(cached.as_ref().clone());
        }

        let results = self.client.search_stops(query).await?;
        self.searches.insert(key, Arc::new(results.clone())).await;
        Ok(results)
    }
}

impl<C: LineSource> LineSource for CachedMvvClient<C> {
    async fn available_lines(&self, stop_id: &str) -> Result<Vec<LineInfo>, MvvError> {
        if let Some(cached) = self.lines.get(stop_id).await {
            return Ok(cached.as_ref().clone());
        }

        let lines = self.client.available_lines(stop_id).await?;
        self.lines
            .insert(stop_id.to_string(), Arc::new(lines.clone()))
            .await;
        Ok(lines)
    }
}

impl<C: DepartureSource> DepartureSource for CachedMvvClient<C> {
    async fn departures(
        &self,
        stop_id: &str,
        lines: &SelectedLines,
        at: Option<DateTime<Utc>>,
    ) -> Result<Vec<Departure>, MvvError> {
        self.client.departures(stop_id, lines, at).await
    }
}
