//! Collaborator traits for transit data.
//!
//! Components take these as injected capabilities rather than reaching for
//! a shared client, so tests can substitute
//! [`MockMvvClient`](crate::mvv::MockMvvClient) or a hand-written fake.

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::domain::{Departure, LineInfo, LocationResult, SelectedLines};
use crate::mvv::MvvError;

/// Searches for stops by free text.
pub trait StopSearch: Send + Sync {
    /// Returns matching locations, best match first.
    fn search_stops(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Vec<LocationResult>, MvvError>> + Send;
}

/// Lists the lines currently serving a stop.
pub trait LineSource: Send + Sync {
    /// Returns the available lines. Order is not significant.
    fn available_lines(
        &self,
        stop_id: &str,
    ) -> impl Future<Output = Result<Vec<LineInfo>, MvvError>> + Send;
}

/// Fetches departures for some lines at a stop.
pub trait DepartureSource: Send + Sync {
    /// Returns upcoming departures at `stop_id` for `lines`, from `at`
    /// onwards (now if `None`).
    fn departures(
        &self,
        stop_id: &str,
        lines: &SelectedLines,
        at: Option<DateTime<Utc>>,
    ) -> impl Future<Output = Result<Vec<Departure>, MvvError>> + Send;
}

impl<T: StopSearch> StopSearch for std::sync::Arc<T> {
    fn search_stops(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Vec<LocationResult>, MvvError>> + Send {
        (**self).search_stops(query)
    }
}

impl<T: LineSource> LineSource for std::sync::Arc<T> {
    fn available_lines(
        &self,
        stop_id: &str,
    ) -> impl Future<Output = Result<Vec<LineInfo>, MvvError>> + Send {
        (**self).available_lines(stop_id)
    }
}

impl<T: DepartureSource> DepartureSource for std::sync::Arc<T> {
    fn departures(
        &self,
        stop_id: &str,
        lines: &SelectedLines,
        at: Option<DateTime<Utc>>,
    ) -> impl Future<Output = Result<Vec<Departure>, MvvError>> + Send {
        (**self).departures(stop_id, lines, at)
    }
}

/// Everything the HTTP layer needs from a transit backend.
pub trait TransitSource: StopSearch + LineSource + DepartureSource + 'static {}

impl<T: StopSearch + LineSource + DepartureSource + 'static> TransitSource for T {}
