//! In-memory MVV client for tests and offline development.
//!
//! Serves canned stops, lines and departures, records every query, and can
//! be told to fail or to answer slowly.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::domain::{Departure, LineInfo, LocationResult, SelectedLines};
use crate::source::{DepartureSource, LineSource, StopSearch};

use super::error::MvvError;

#[derive(Default)]
struct MockData {
    stops: Vec<LocationResult>,
    lines: HashMap<String, Vec<LineInfo>>,
    departures: HashMap<String, Vec<Departure>>,
    failing: HashSet<String>,
    search_delay: Option<Duration>,
    departure_delays: HashMap<String, Duration>,
    search_log: Vec<String>,
    departure_log: Vec<(String, SelectedLines)>,
    lines_calls: usize,
}

/// Mock MVV client backed by in-memory data.
///
/// Cloning shares the underlying data, so a test can keep a handle to
/// reconfigure the mock after handing a clone to the code under test.
#[derive(Clone, Default)]
pub struct MockMvvClient {
    data: Arc<Mutex<MockData>>,
}

impl MockMvvClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn data(&self) -> MutexGuard<'_, MockData> {
        // A panic while holding the lock only happens in a failing test.
        self.data.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Add a stop that searches will match by case-insensitive substring.
    pub fn add_stop(&self, stop: LocationResult) {
        self.data().stops.push(stop);
    }

    /// Replace the lines served at a stop.
    pub fn set_lines(&self, stop_id: &str, lines: Vec<LineInfo>) {
        self.data().lines.insert(stop_id.to_string(), lines);
    }

    /// Replace the departures returned for a stop.
    pub fn set_departures(&self, stop_id: &str, departures: Vec<Departure>) {
        self.data()
            .departures
            .insert(stop_id.to_string(), departures);
    }

    /// Make every request mentioning `key` (stop id or search query) fail.
    pub fn fail(&self, key: &str) {
        self.data().failing.insert(key.to_string());
    }

    /// Undo [`MockMvvClient::fail`].
    pub fn recover(&self, key: &str) {
        self.data().failing.remove(key);
    }

    /// Delay every search by `delay`.
    pub fn set_search_delay(&self, delay: Duration) {
        self.data().search_delay = Some(delay);
    }

    /// Delay departure requests for one stop.
    pub fn set_departure_delay(&self, stop_id: &str, delay: Duration) {
        self.data()
            .departure_delays
            .insert(stop_id.to_string(), delay);
    }

    /// Queries passed to `search_stops`, in call order.
    pub fn search_log(&self) -> Vec<String> {
        self.data().search_log.clone()
    }

    /// `(stop_id, lines)` passed to `departures`, in call order.
    pub fn departure_log(&self) -> Vec<(String, SelectedLines)> {
        self.data().departure_log.clone()
    }

    /// Number of `available_lines` calls.
    pub fn lines_calls(&self) -> usize {
        self.data().lines_calls
    }

    fn failure(&self, key: &str) -> Option<MvvError> {
        self.data().failing.contains(key).then(|| MvvError::Api {
            status: 503,
            message: format!("mock failure for {key}"),
        })
    }
}

impl StopSearch for MockMvvClient {
    async fn search_stops(&self, query: &str) -> Result<Vec<LocationResult>, MvvError> {
        let delay = {
            let mut data = self.data();
            data.search_log.push(query.to_string());
            data.search_delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(err) = self.failure(query) {
            return Err(err);
        }

        let needle = query.to_lowercase();
        Ok(self
            .data()
            .stops
            .iter()
            .filter(|s| s.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }
}

impl LineSource for MockMvvClient {
    async fn available_lines(&self, stop_id: &str) -> Result<Vec<LineInfo>, MvvError> {
        self.data().lines_calls += 1;
        if let Some(err) = self.failure(stop_id) {
            return Err(err);
        }
        self.data()
            .lines
            .get(stop_id)
            .cloned()
            .ok_or_else(|| MvvError::Provider(format!("unknown stop {stop_id}")))
    }
}

impl DepartureSource for MockMvvClient {
    async fn departures(
        &self,
        stop_id: &str,
        lines: &SelectedLines,
        _at: Option<DateTime<Utc>>,
    ) -> Result<Vec<Departure>, MvvError> {
        let delay = {
            let mut data = self.data();
            data.departure_log
                .push((stop_id.to_string(), lines.clone()));
            data.departure_delays.get(stop_id).copied()
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(err) = self.failure(stop_id) {
            return Err(err);
        }

        let all = self
            .data()
            .departures
            .get(stop_id)
            .cloned()
            .unwrap_or_default();
        Ok(match lines {
            SelectedLines::All => all,
            SelectedLines::Explicit(ids) => all
                .into_iter()
                .filter(|d| ids.iter().any(|id| id.same_line(&d.line.stateless)))
                .collect(),
        })
    }
}
