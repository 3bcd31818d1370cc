//! Farm Forecast Library
//!
//! Demand forecasting for an organic-farm platform: daily per-crop forecasts
//! from seasonal tables, and ranked per-variety forecasts from order history.
//!
//! The engine is synchronous and performs no I/O. Callers load orders and
//! customers, hand them to [`ForecastingService`], and render the typed results.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod config;
pub mod errors;
pub mod ml;
pub mod models;
pub mod services;

pub use config::{init_tracing, load_config, AppConfigError, ForecastConfig};
pub use errors::ServiceError;
pub use ml::{ForecastTables, Midpoint, NoiseSource, SeededNoise};
pub use services::forecasting::{fallback_forecasts, ForecastRequest, ForecastingService};
