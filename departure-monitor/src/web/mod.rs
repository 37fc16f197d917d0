//! Web layer for the departure monitor.
//!
//! A small JSON API over stop search, line selection and the polled
//! departure boards.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
