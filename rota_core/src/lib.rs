#![forbid(unsafe_code)]

//! Core domain model and rotation logic for sensor and pod site planning.
//!
//! This crate provides:
//! - Domain types (sites, sides, placements, change events)
//! - The rotation catalog (sensor sequence, pod compatibility map)
//! - Sensor rotation and pod site selection
//! - Forecasting of upcoming changes
//! - Session state tying it together

pub mod types;
pub mod error;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod sensor;
pub mod pod;
pub mod forecast;
pub mod session;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{build_default_catalog, get_default_catalog};
pub use config::Config;
pub use sensor::next_sensor;
pub use pod::{AcceptSuggestion, PlacementDecider, PodSelector, RecencyBuffer};
pub use forecast::{forecast, Forecast, ForecastOrder, ForecastPlan, Horizon};
pub use session::{Session, SessionStart};
