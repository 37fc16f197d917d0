//! Munich public transport departure monitor.
//!
//! Search stops, pick the lines to track at each one, and keep a live
//! departure board with delays for every saved stop.

pub mod autocomplete;
pub mod cache;
pub mod departures;
pub mod domain;
pub mod failure;
pub mod mvv;
pub mod selection;
pub mod source;
pub mod web;
