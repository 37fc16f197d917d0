//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get},
};
use tracing::{error, warn};

use crate::domain::{line_colors, transit_stops_only};
use crate::mvv::MvvError;
use crate::selection::{LineSelection, SelectionError, StoreError, merge};
use crate::source::{LineSource, StopSearch, TransitSource};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router<C: TransitSource>(state: AppState<C>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/stops/search", get(search_stops::<C>))
        .route("/api/stops/:id/lines", get(stop_lines::<C>))
        .route(
            "/api/selections",
            get(list_selections::<C>).post(save_selection::<C>),
        )
        .route("/api/selections/:id", delete(delete_selection::<C>))
        .route("/api/departures", get(departures::<C>))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Search stops by free text.
async fn search_stops<C: TransitSource>(
    State(state): State<AppState<C>>,
    Query(req): Query<StopSearchRequest>,
) -> Result<Json<StopSearchResponse>, AppError> {
    let query = req.q.trim();
    if query.is_empty() {
        return Err(AppError::BadRequest {
            message: "Query must not be empty".to_string(),
        });
    }

    let results = state.source.search_stops(query).await?;
    let stops = if req.stops_only {
        transit_stops_only(results)
    } else {
        results
    };
    Ok(Json(StopSearchResponse { stops }))
}

/// Lines serving a stop, checked as its saved selection says.
async fn stop_lines<C: TransitSource>(
    State(state): State<AppState<C>>,
    Path(stop_id): Path<String>,
) -> Result<Json<StopLinesResponse>, AppError> {
    let available = state.source.available_lines(&stop_id).await?;
    let saved = state.selections.get(&stop_id);
    let checked = merge::hydrate(&available, saved.as_ref().map(|s| &s.lines));

    let all_selected = merge::covers_all(&available, &checked);
    let lines = available
        .into_iter()
        .map(|line| LineOption {
            checked: checked.iter().any(|id| id.same_line(&line.stateless)),
            colors: line_colors(&line),
            line,
        })
        .collect();

    Ok(Json(StopLinesResponse {
        stop_id,
        all_selected,
        lines,
    }))
}

/// All saved selections, in save order.
async fn list_selections<C: TransitSource>(
    State(state): State<AppState<C>>,
) -> Json<SelectionsResponse> {
    Json(SelectionsResponse {
        selections: state.selections.list(),
    })
}

/// Save the lines tracked at a stop.
///
/// Requested lines are matched to the stop's current lines by key, and the
/// current identifiers are what gets stored.
async fn save_selection<C: TransitSource>(
    State(state): State<AppState<C>>,
    Json(req): Json<SaveSelectionRequest>,
) -> Result<(StatusCode, Json<SaveSelectionResponse>), AppError> {
    if req.stop.id.is_empty() {
        return Err(SelectionError::MissingStopId.into());
    }

    let available = state.source.available_lines(&req.stop.id).await?;
    let mut selection = LineSelection::new(req.stop, available, None);

    let mut unknown = Vec::new();
    for requested in &req.lines {
        let current = selection
            .available()
            .iter()
            .find(|l| l.stateless.same_line(requested))
            .map(|l| l.stateless.clone());
        match current {
            Some(id) => selection.toggle_line(&id, true),
            None => unknown.push(requested.as_str()),
        }
    }
    if !unknown.is_empty() {
        return Err(AppError::BadRequest {
            message: format!("Lines not served at this stop: {}", unknown.join(", ")),
        });
    }

    let record = selection.save_record()?;
    let stop_id = record.stop_id().to_string();
    let outcome = state.selections.save(record)?;

    let status = SaveStatus::from(&outcome);
    let code = match status {
        SaveStatus::Added => StatusCode::CREATED,
        _ => StatusCode::OK,
    };
    Ok((
        code,
        Json(SaveSelectionResponse {
            status,
            selection: state.selections.get(&stop_id),
        }),
    ))
}

/// Stop tracking a stop.
async fn delete_selection<C: TransitSource>(
    State(state): State<AppState<C>>,
    Path(stop_id): Path<String>,
) -> Result<StatusCode, AppError> {
    if state.selections.remove(&stop_id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound {
            message: format!("No saved selection for stop {}", stop_id),
        })
    }
}

/// Latest polled departures for every saved stop.
async fn departures<C: TransitSource>(
    State(state): State<AppState<C>>,
    Query(req): Query<DeparturesRequest>,
) -> Json<DeparturesResponse> {
    let boards = state
        .poller
        .boards()
        .iter()
        .map(|board| BoardResult::from_board(board, &req))
        .collect();
    Json(DeparturesResponse { boards })
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    /// The transit provider failed
    Upstream { message: String },
    Internal { message: String },
}

impl From<MvvError> for AppError {
    fn from(e: MvvError) -> Self {
        AppError::Upstream {
            message: e.to_string(),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::Internal {
            message: e.to_string(),
        }
    }
}

impl From<SelectionError> for AppError {
    fn from(e: SelectionError) -> Self {
        match e {
            SelectionError::Lines(e) => e.into(),
            SelectionError::Store(e) => e.into(),
            _ => AppError::BadRequest {
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Upstream { message } => (StatusCode::BAD_GATEWAY, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(%status, %message, "request failed");
        } else {
            warn!(%status, %message, "request rejected");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
