//! Live departures for saved selections.
//!
//! [`DeparturePoller`] fetches departures for every saved stop in the
//! background; the functions in this module turn a response into what a
//! board shows: one group per line, with delays in minutes.

mod aggregate;
mod poller;

#[cfg(test)]
mod poller_tests;

pub use aggregate::{
    LineGroup, compute_delay, delay_of, delayed_only, group_by_line, next_n, with_delays,
};
pub use poller::{DeparturePoller, PollConfig, StopBoard};
