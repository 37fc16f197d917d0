//! Application state for the web layer.

use std::sync::Arc;

use crate::departures::DeparturePoller;
use crate::selection::SavedSelections;

/// Shared application state.
///
/// Contains all the services needed to handle requests.
pub struct AppState<C> {
    /// Transit data source, usually a cached MVV client
    pub source: Arc<C>,

    /// Saved selections, the only place they are read and written
    pub selections: Arc<SavedSelections>,

    /// Background departure polling for the saved selections
    pub poller: Arc<DeparturePoller>,
}

impl<C> AppState<C> {
    /// Create a new app state.
    pub fn new(source: Arc<C>, selections: Arc<SavedSelections>, poller: DeparturePoller) -> Self {
        Self {
            source,
            selections,
            poller: Arc::new(poller),
        }
    }
}

impl<C> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            selections: Arc::clone(&self.selections),
            poller: Arc::clone(&self.poller),
        }
    }
}
