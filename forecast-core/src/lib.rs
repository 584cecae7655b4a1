//! Core library for the `forecast` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Abstraction over forecast providers
//! - Daily aggregation of forecast samples and condition classification
//! - Location lookup with fallback
//! - The presenter that owns the forecast view state
//!
//! It is used by `forecast-cli`, but can also be reused by other front ends.

pub mod aggregate;
pub mod condition;
pub mod config;
pub mod error;
pub mod location;
pub mod model;
pub mod provider;
pub mod state;

pub use aggregate::aggregate_by_day;
pub use condition::{CoarseCondition, IconBucket, classify_code};
pub use config::{Config, ForecastConfig, LocationConfig, ProviderConfig};
pub use error::{FetchError, LocationError};
pub use location::{LocationFix, LocationSource, resolve_location};
pub use model::{Coordinate, DaySummary, ForecastSample, LocationQuery};
pub use provider::{ForecastProvider, ProviderId};
pub use state::{ForecastPresenter, ViewState};
