//! Search-as-you-type input with a debounced, cancelable result panel.
//!
//! The engine owns the input state machine: keystrokes update the query at
//! once, fetches wait for a quiet period, and a newer keystroke supersedes
//! whatever the previous one started. Keyboard and pointer handlers cover
//! the panel's navigation and dismissal; rendering is left to the host.

mod config;
mod engine;
mod fetch;
mod input;


pub use config::AutocompleteConfig;
pub use engine::{Autocomplete, AutocompleteBuilder, AutocompleteState, OnSelect, Panel, Row};
pub use fetch::{Fetch, StopFinder, Suggest};
pub use input::{Bounds, Key, KeyOutcome, Point};
