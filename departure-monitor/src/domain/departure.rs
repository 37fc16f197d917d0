//! Departures as returned by the departure finder.

use serde::{Deserialize, Serialize};

use super::line::LineInfo;

/// A stop reference inside a departure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartureStation {
    pub id: String,
    pub name: String,
}

/// A service notice attached to a departure or a whole response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub link: String,
    #[serde(default, rename = "type")]
    pub kind: String,
}

/// One departure of a line from a stop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Departure {
    pub line: LineInfo,
    pub direction: String,
    pub station: DepartureStation,
    #[serde(default)]
    pub track: String,
    #[serde(default)]
    pub departure_date: String,
    /// Scheduled time, "HH:MM".
    pub departure_planned: String,
    /// Live time, "HH:MM", or empty when no realtime data is available.
    #[serde(default)]
    pub departure_live: String,
    #[serde(default = "default_in_time")]
    pub in_time: bool,
    #[serde(default)]
    pub notifications: Vec<Notification>,
}

fn default_in_time() -> bool {
    true
}
