//! The "add stop" dialog: search for a stop, pick its lines, save.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::debug;

use crate::autocomplete::{Autocomplete, AutocompleteConfig, StopFinder};
use crate::domain::LocationResult;
use crate::failure::{FailureSink, TracingFailureSink};
use crate::source::{LineSource, StopSearch};

use super::error::SelectionError;
use super::merge::{LineSelection, SaveOutcome};
use super::repository::SavedSelections;

/// Queries shorter than this are answered with no results, without a search.
const MIN_SEARCH_LEN: usize = 4;

/// Stop search input the dialog uses.
pub type StopSearchInput<C> = Autocomplete<LocationResult, StopFinder<C>>;

/// Drives one stop-and-lines selection from search to save.
pub struct StopDialog<C>
where
    C: StopSearch + LineSource + Clone + 'static,
{
    search: StopSearchInput<C>,
    picks: mpsc::UnboundedReceiver<LocationResult>,
    source: C,
    selections: Arc<SavedSelections>,
    selection: Option<LineSelection>,
    sink: Arc<dyn FailureSink>,
}

impl<C> StopDialog<C>
where
    C: StopSearch + LineSource + Clone + 'static,
{
    pub fn new(source: C, selections: Arc<SavedSelections>) -> Self {
        Self::with_failure_sink(source, selections, Arc::new(TracingFailureSink))
    }

    pub fn with_failure_sink(
        source: C,
        selections: Arc<SavedSelections>,
        sink: Arc<dyn FailureSink>,
    ) -> Self {
        let (tx, picks) = mpsc::unbounded_channel();
        let config = AutocompleteConfig::default()
            .with_debounce(Duration::from_millis(300))
            .with_min_chars(1);
        let search = Autocomplete::builder(
            StopFinder::new(source.clone()).with_min_query_len(MIN_SEARCH_LEN),
        )
        .config(config)
        .failure_sink(Arc::clone(&sink))
        .on_select(move |stop: &LocationResult, _value: &str| {
            // The receiver lives as long as the dialog.
            let _ = tx.send(stop.clone());
        })
        .build();

        Self {
            search,
            picks,
            source,
            selections,
            selection: None,
            sink,
        }
    }

    /// The stop search input.
    pub fn search(&self) -> &StopSearchInput<C> {
        &self.search
    }

    /// Wait until a stop is chosen in the search input.
    pub async fn next_pick(&mut self) -> Option<LocationResult> {
        self.picks.recv().await
    }

    /// Load `stop`'s lines and pre-select what is saved for it.
    ///
    /// On failure the previous selection is kept and the failure reported.
    pub async fn pick_stop(&mut self, stop: LocationResult) -> Result<&LineSelection, SelectionError> {
        let saved = self.selections.list();
        match LineSelection::pick_stop(stop, &self.source, &saved).await {
            Ok(selection) => Ok(self.selection.insert(selection)),
            Err(e) => {
                self.sink.notify_failure("load available lines", &e);
                Err(e.into())
            }
        }
    }

    /// Wait for the next chosen stop and pick it.
    pub async fn pick_next(&mut self) -> Option<Result<&LineSelection, SelectionError>> {
        let stop = self.next_pick().await?;
        Some(self.pick_stop(stop).await)
    }

    pub fn selection(&self) -> Option<&LineSelection> {
        self.selection.as_ref()
    }

    pub fn selection_mut(&mut self) -> Option<&mut LineSelection> {
        self.selection.as_mut()
    }

    /// Whether [`StopDialog::save`] would pass validation.
    pub fn can_save(&self) -> bool {
        self.selection
            .as_ref()
            .is_some_and(|s| !s.stop().id.is_empty() && !s.selected().is_empty())
    }

    /// Persist the current selection.
    ///
    /// Validation failures are reported and nothing is written.
    pub fn save(&self) -> Result<SaveOutcome, SelectionError> {
        let result = self
            .selection
            .as_ref()
            .ok_or(SelectionError::NoStopPicked)
            .and_then(LineSelection::save_record)
            .and_then(|record| self.selections.save(record).map_err(SelectionError::from));
        match &result {
            Ok(outcome) => debug!(changed = outcome.is_changed(), "dialog saved"),
            Err(e) => self.sink.notify_failure("save selection", e),
        }
        result
    }
}
