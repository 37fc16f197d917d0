//! MVV (Münchner Verkehrs- und Tarifverbund) website client.
//!
//! This module provides an HTTP client for the JSON endpoints behind the
//! MVV journey planner pages:
//! - `stopFinder` for free-text stop search
//! - `departuresFinder` with `available_lines` and `get_departures`
//!
//! Key characteristics:
//! - Line identifiers carry a trailing variant segment the provider bumps
//!   without notice (see [`crate::domain::LineKey`])
//! - Times are "HH:MM" strings without a date
//! - Errors are reported in-band through an `error` string

mod client;
mod encode;
mod error;
mod mock;
mod types;

pub use client::{MvvClient, MvvConfig};
pub use encode::{decode_lines, encode_lines};
pub use error::MvvError;
pub use mock::MockMvvClient;
pub use types::{AvailableLinesResponse, DeparturesResponse, StopFinderResponse};
