//! Core library for the `weather` CLI.
//!
//! This crate defines:
//! - A client for the weatherapi.com current/forecast endpoints
//! - The decoded report model and the failure taxonomy
//! - A pluggable HTTP transport, so tests can run without a network
//! - Configuration & credentials handling
//!
//! It is used by `weather-cli`, but can also be reused by other front-ends.

pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod transport;

pub use client::{Endpoint, FORECAST_DAYS, WeatherClient};
pub use config::{ClientConfig, Config};
pub use error::{BoxError, ErrorKind, WeatherError};
pub use model::{
    Condition, ConditionKind, DaySummary, Forecast, ForecastDay, Location, WeatherReport,
    WeatherSnapshot,
};
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport};
