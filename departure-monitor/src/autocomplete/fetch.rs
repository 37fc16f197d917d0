//! What an autocomplete fetches and how it shows it.

use std::future::Future;

use crate::domain::LocationResult;
use crate::mvv::MvvError;
use crate::source::StopSearch;

/// An item that can appear in the result panel.
pub trait Suggest: Clone + Send + Sync + 'static {
    /// Text put into the input when the item is chosen.
    fn display_value(&self) -> String;

    /// Text shown for the item in the panel.
    fn label(&self) -> String {
        self.display_value()
    }
}

impl Suggest for LocationResult {
    fn display_value(&self) -> String {
        self.name.clone()
    }
}

impl Suggest for String {
    fn display_value(&self) -> String {
        self.clone()
    }
}

/// Produces suggestions for a query.
///
/// The returned future is dropped when the fetch is superseded, so
/// implementations must not rely on running to completion.
pub trait Fetch<T>: Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync + 'static;

    fn fetch(&self, query: &str) -> impl Future<Output = Result<Vec<T>, Self::Error>> + Send;
}

/// Stop search as an autocomplete source.
///
/// Queries shorter than `min_query_len` resolve to no results without a
/// request; the panel then shows its placeholder.
#[derive(Debug, Clone)]
pub struct StopFinder<S> {
    source: S,
    min_query_len: usize,
}

impl<S> StopFinder<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            min_query_len: 0,
        }
    }

    /// Answer shorter queries with an empty list instead of searching.
    pub fn with_min_query_len(mut self, n: usize) -> Self {
        self.min_query_len = n;
        self
    }
}

impl<S: StopSearch + 'static> Fetch<LocationResult> for StopFinder<S> {
    type Error = MvvError;

    async fn fetch(&self, query: &str) -> Result<Vec<LocationResult>, MvvError> {
        if query.chars().count() < self.min_query_len {
            return Ok(Vec::new());
        }
        self.source.search_stops(query).await
    }
}
