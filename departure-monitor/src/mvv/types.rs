//! MVV response envelopes.
//!
//! Each endpoint wraps its payload in an object; the departure finder
//! endpoints also report failures in-band through an `error` string.

use serde::Deserialize;

use crate::domain::{Departure, LineInfo, LocationResult, Notification};

/// Envelope types that may report an error in the response body.
pub(super) trait Envelope {
    /// The in-band error message, if the provider set one.
    fn api_error(&self) -> Option<&str> {
        None
    }
}

/// Response from `eID=stopFinder`.
#[derive(Debug, Clone, Deserialize)]
pub struct StopFinderResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub results: Vec<LocationResult>,
}

impl Envelope for StopFinderResponse {}

/// Response from `eID=departuresFinder&action=available_lines`.
#[derive(Debug, Clone, Deserialize)]
pub struct AvailableLinesResponse {
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub lines: Vec<LineInfo>,
}

impl Envelope for AvailableLinesResponse {
    fn api_error(&self) -> Option<&str> {
        non_empty(&self.error)
    }
}

/// Response from `eID=departuresFinder&action=get_departures`.
#[derive(Debug, Clone, Deserialize)]
pub struct DeparturesResponse {
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub departures: Vec<Departure>,
    #[serde(default)]
    pub notifications: Vec<Notification>,
}

impl Envelope for DeparturesResponse {
    fn api_error(&self) -> Option<&str> {
        non_empty(&self.error)
    }
}

fn non_empty(s: &str) -> Option<&str> {
    if s.is_empty() { None } else { Some(s) }
}
