//! MVV HTTP client.
//!
//! Provides async methods for the stop finder and departure finder endpoints
//! of the MVV website. All endpoints are GET requests against the site root
//! selected by an `eID` query parameter.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use tokio::sync::Semaphore;
use tracing::debug;

use crate::domain::{
    Departure, LineInfo, LocationResult, SelectedLines, TransitMode, best_stop,
    transit_stops_only,
};
use crate::source::{DepartureSource, LineSource, StopSearch};

use super::encode::encode_lines;
use super::error::MvvError;
use super::types::{AvailableLinesResponse, DeparturesResponse, Envelope, StopFinderResponse};

/// Default base URL for the MVV website.
const DEFAULT_BASE_URL: &str = "https://www.mvv-muenchen.de";

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 5;

/// Configuration for the MVV client.
#[derive(Debug, Clone)]
pub struct MvvConfig {
    /// Base URL (defaults to production)
    pub base_url: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl MvvConfig {
    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for MvvConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: 30,
        }
    }
}

/// MVV API client.
///
/// Uses a semaphore to limit concurrent requests: a polling cycle fires one
/// request per saved stop at once.
#[derive(Debug, Clone)]
pub struct MvvClient {
    http: reqwest::Client,
    base_url: String,
    semaphore: Arc<Semaphore>,
}

impl MvvClient {
    /// Create a new client with the given configuration.
    pub fn new(config: MvvConfig) -> Result<Self, MvvError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            semaphore: Arc::new(Semaphore::new(config.max_concurrent)),
        })
    }

    /// Search stops, streets and points of interest.
    pub async fn search_stops(&self, query: &str) -> Result<StopFinderResponse, MvvError> {
        self.get(&[("eID", "stopFinder"), ("query", query)]).await
    }

    /// The provider's best match for `query`, if any.
    pub async fn best_stop(&self, query: &str) -> Result<Option<LocationResult>, MvvError> {
        let response = self.search_stops(query).await?;
        Ok(best_stop(&response.results).cloned())
    }

    /// Search results restricted to transit stops.
    pub async fn search_transit_stops(
        &self,
        query: &str,
    ) -> Result<Vec<LocationResult>, MvvError> {
        let response = self.search_stops(query).await?;
        Ok(transit_stops_only(response.results))
    }

    /// All lines serving a stop.
    pub async fn available_lines(&self, stop_id: &str) -> Result<Vec<LineInfo>, MvvError> {
        let response: AvailableLinesResponse = self
            .get(&[
                ("eID", "departuresFinder"),
                ("action", "available_lines"),
                ("stop_id", stop_id),
            ])
            .await?;
        Ok(response.lines)
    }

    /// Lines of the given modes serving a stop.
    pub async fn lines_by_mode(
        &self,
        stop_id: &str,
        modes: &[TransitMode],
    ) -> Result<Vec<LineInfo>, MvvError> {
        let lines = self.available_lines(stop_id).await?;
        Ok(lines.into_iter().filter(|l| modes.contains(&l.name)).collect())
    }

    /// Departures at a stop for the selected lines.
    ///
    /// # Arguments
    ///
    /// * `stop_id` - Global stop id, e.g. `de:09162:6`
    /// * `lines` - Lines to include
    /// * `at` - Earliest departure time; now if `None`
    pub async fn departures(
        &self,
        stop_id: &str,
        lines: &SelectedLines,
        at: Option<DateTime<Utc>>,
    ) -> Result<DeparturesResponse, MvvError> {
        let timestamp = at.unwrap_or_else(Utc::now).timestamp().to_string();
        let encoded = encode_lines(lines);
        self.get(&[
            ("eID", "departuresFinder"),
            ("action", "get_departures"),
            ("stop_id", stop_id),
            ("requested_timestamp", &timestamp),
            ("lines", &encoded),
        ])
        .await
    }

    /// Departures starting `minutes` from now.
    pub async fn departures_in(
        &self,
        stop_id: &str,
        lines: &SelectedLines,
        minutes: i64,
    ) -> Result<DeparturesResponse, MvvError> {
        let at = Utc::now() + Duration::minutes(minutes);
        self.departures(stop_id, lines, Some(at)).await
    }

    async fn get<T>(&self, params: &[(&str, &str)]) -> Result<T, MvvError>
    where
        T: DeserializeOwned + Envelope,
    {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| MvvError::LimiterClosed)?;

        let url = format!("{}/", self.base_url);
        debug!(?params, "MVV request");

        let response = self
            .http
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MvvError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;
        let parsed: T = serde_json::from_str(&body).map_err(|e| MvvError::Json {
            message: e.to_string(),
            body: Some(body.chars().take(500).collect()),
        })?;

        if let Some(error) = parsed.api_error() {
            return Err(MvvError::Provider(error.to_string()));
        }

        Ok(parsed)
    }
}

impl StopSearch for MvvClient {
    async fn search_stops(&self, query: &str) -> Result<Vec<LocationResult>, MvvError> {
        Ok(MvvClient::search_stops(self, query).await?.results)
    }
}

impl LineSource for MvvClient {
    async fn available_lines(&self, stop_id: &str) -> Result<Vec<LineInfo>, MvvError> {
        MvvClient::available_lines(self, stop_id).await
    }
}

impl DepartureSource for MvvClient {
    async fn departures(
        &self,
        stop_id: &str,
        lines: &SelectedLines,
        at: Option<DateTime<Utc>>,
    ) -> Result<Vec<Departure>, MvvError> {
        Ok(MvvClient::departures(self, stop_id, lines, at)
            .await?
            .departures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builder() {
        let config = MvvConfig::default()
            .with_base_url("http://localhost:8080")
            .with_max_concurrent(10)
            .with_timeout(60);

        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.max_concurrent, 10);
        assert_eq!(config.timeout_secs, 60);
    }

    #[test]
    fn config_defaults() {
        let config = MvvConfig::default();

        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.max_concurrent, DEFAULT_MAX_CONCURRENT);
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn client_creation_trims_trailing_slash() {
        let client = MvvClient::new(MvvConfig::default().with_base_url("http://x/")).unwrap();
        assert_eq!(client.base_url, "http://x");
    }

    // Requests against the live site are not exercised here; the mock client
    // covers everything above the HTTP layer.
}
