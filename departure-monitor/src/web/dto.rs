//! Data transfer objects for web requests and responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::departures::{LineGroup, StopBoard, delay_of, delayed_only, next_n};
use crate::domain::{
    Departure, LineColors, LineId, LineInfo, LocationResult, Notification, SavedSelection,
    line_colors,
};
use crate::selection::SaveOutcome;

/// Request to search for stops.
#[derive(Debug, Deserialize)]
pub struct StopSearchRequest {
    /// Free-text query
    pub q: String,

    /// Only return actual stops, not streets or points of interest
    #[serde(default)]
    pub stops_only: bool,
}

/// Stop search response.
#[derive(Debug, Serialize)]
pub struct StopSearchResponse {
    pub stops: Vec<LocationResult>,
}

/// A line at a stop with its checkbox state.
#[derive(Debug, Serialize)]
pub struct LineOption {
    #[serde(flatten)]
    pub line: LineInfo,

    /// Whether the saved selection for the stop tracks this line
    pub checked: bool,

    pub colors: LineColors,
}

/// Lines serving a stop, hydrated from its saved selection.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StopLinesResponse {
    pub stop_id: String,

    /// Whether every line is checked
    pub all_selected: bool,

    pub lines: Vec<LineOption>,
}

/// Request to save the lines tracked at a stop.
#[derive(Debug, Deserialize)]
pub struct SaveSelectionRequest {
    pub stop: LocationResult,

    /// Checked lines; matched against the stop's current lines by key
    pub lines: Vec<LineId>,
}

/// What a save did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveStatus {
    Unchanged,
    Updated,
    Added,
}

impl From<&SaveOutcome> for SaveStatus {
    fn from(outcome: &SaveOutcome) -> Self {
        match outcome {
            SaveOutcome::Unchanged => SaveStatus::Unchanged,
            SaveOutcome::Updated(_) => SaveStatus::Updated,
            SaveOutcome::Added(_) => SaveStatus::Added,
        }
    }
}

/// Save response.
#[derive(Debug, Serialize)]
pub struct SaveSelectionResponse {
    pub status: SaveStatus,

    /// The stored entry after the save
    pub selection: Option<SavedSelection>,
}

/// Saved selections response.
#[derive(Debug, Serialize)]
pub struct SelectionsResponse {
    pub selections: Vec<SavedSelection>,
}

/// Departure board query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct DeparturesRequest {
    /// Maximum departures per line
    pub limit: Option<usize>,

    /// Only departures that are not on time
    #[serde(default)]
    pub delayed: bool,
}

/// One departure on a board.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartureResult {
    pub direction: String,
    pub track: String,

    /// Scheduled time, "HH:MM"
    pub planned: String,

    /// Live time, if the provider has one
    pub live: Option<String>,

    /// Minutes late; negative when early
    pub delay_minutes: i32,

    pub in_time: bool,
    pub notifications: Vec<Notification>,
}

impl From<&Departure> for DepartureResult {
    fn from(d: &Departure) -> Self {
        Self {
            direction: d.direction.clone(),
            track: d.track.clone(),
            planned: d.departure_planned.clone(),
            live: (!d.departure_live.is_empty()).then(|| d.departure_live.clone()),
            delay_minutes: delay_of(d),
            in_time: d.in_time,
            notifications: d.notifications.clone(),
        }
    }
}

/// Departures of one line on a board.
#[derive(Debug, Serialize)]
pub struct LineBoard {
    pub line: LineInfo,
    pub colors: LineColors,
    pub departures: Vec<DepartureResult>,
}

/// Board for one saved stop.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardResult {
    pub stop_id: String,
    pub stop_name: String,
    pub fetched_at: DateTime<Utc>,
    pub lines: Vec<LineBoard>,
}

impl BoardResult {
    /// Render a polled board, filtered and trimmed per `req`.
    pub fn from_board(board: &StopBoard, req: &DeparturesRequest) -> Self {
        let lines = board
            .groups
            .iter()
            .filter_map(|group| line_board(group, req))
            .collect();
        Self {
            stop_id: board.stop_id.clone(),
            stop_name: board.stop_name.clone(),
            fetched_at: board.fetched_at,
            lines,
        }
    }
}

/// A group's board row, or `None` if filtering leaves it empty.
fn line_board(group: &LineGroup, req: &DeparturesRequest) -> Option<LineBoard> {
    let shown: Vec<&Departure> = if req.delayed {
        delayed_only(&group.departures)
    } else {
        group.departures.iter().collect()
    };
    let shown = match req.limit {
        Some(n) => next_n(&shown, n),
        None => &shown[..],
    };
    if shown.is_empty() {
        return None;
    }
    Some(LineBoard {
        line: group.line.clone(),
        colors: line_colors(&group.line),
        departures: shown.iter().map(|d| DepartureResult::from(*d)).collect(),
    })
}

/// Departure boards response.
#[derive(Debug, Serialize)]
pub struct DeparturesResponse {
    pub boards: Vec<BoardResult>,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
