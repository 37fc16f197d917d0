//! Autocomplete configuration.

use std::time::Duration;

/// Configuration for an [`Autocomplete`](super::Autocomplete).
#[derive(Debug, Clone)]
pub struct AutocompleteConfig {
    /// Quiet period after the last keystroke before a fetch is issued.
    pub debounce: Duration,

    /// Minimum trimmed query length (in characters) that triggers a fetch.
    /// Shorter input closes the panel.
    pub min_chars: usize,

    /// Placeholder shown when a fetch returns no results.
    pub no_results_text: String,
}

impl AutocompleteConfig {
    /// Set the debounce interval.
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Set the minimum query length.
    pub fn with_min_chars(mut self, n: usize) -> Self {
        self.min_chars = n;
        self
    }

    /// Set the "no results" placeholder.
    pub fn with_no_results_text(mut self, text: impl Into<String>) -> Self {
        self.no_results_text = text.into();
        self
    }
}

impl Default for AutocompleteConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
            min_chars: 0,
            no_results_text: "No results found".to_string(),
        }
    }
}
