//! Domain types for the departure monitor.
//!
//! Wire-compatible with the provider's JSON: these types are deserialized
//! straight from responses and serialized back into persisted selections.

mod colors;
mod departure;
mod line;
mod line_id;
mod selection;
mod stop;
mod time;

pub use colors::{DEFAULT_COLORS, LineColors, line_colors, mode_colors};
pub use departure::{Departure, DepartureStation, Notification};
pub use line::{LineInfo, TransitMode, group_lines_by_mode, lines_by_mode};
pub use line_id::{Direction, LineId, LineIdParts, LineKey, line_key};
pub use selection::{SavedSelection, SelectedLines};
pub use stop::{
    AnyType, Coordinates, LocationReference, LocationResult, best_stop, transit_stops_only,
};
pub use time::{ClockTime, TimeError};

#[cfg(test)]
pub(crate) use stop::stop_fixture;
