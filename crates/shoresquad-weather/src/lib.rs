//! Forecast widget for ShoreSquad
//!
//! Fetches the 4-day outlook, turns it into display data and keeps it
//! fresh on a cancellable timer.

pub mod condition;
pub mod controller;
pub mod provider;
pub mod render;
pub mod types;

pub use condition::IconCategory;
pub use controller::{
    ControllerOptions, CycleOutcome, ForecastController, DEFAULT_REFRESH_INTERVAL,
};
pub use provider::{ForecastSource, HttpForecastProvider, DEFAULT_REQUEST_TIMEOUT};
pub use render::{DayCard, ErrorPayload, ForecastView, ForecastViewModel, ViewAction};
pub use types::*;
