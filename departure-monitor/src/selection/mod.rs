//! Picking, hydrating and persisting the lines tracked at each stop.
//!
//! [`LineSelection`] holds the checkbox state for one stop, [`merge`]'s free
//! functions decide what gets stored, and [`SavedSelections`] is the one
//! place the stored list is read from and written to.

mod dialog;
mod error;
pub mod merge;
mod repository;
mod store;

pub use dialog::{StopDialog, StopSearchInput};
pub use error::{SelectionError, StoreError};
pub use merge::{LineSelection, SaveOutcome, SaveRecord, compute_save_record};
pub use repository::SavedSelections;
pub use store::{JsonFileStore, KeyValueStore, MemoryStore, SAVED_SELECTIONS_KEY};
