//! Core library for the `forecast` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The forecast source seam and its OpenWeather implementation
//! - The debounced query pipeline and its outcome state
//! - Projection of an outcome into displayable screen regions
//!
//! It is used by `forecast-cli`, but the pipeline is independent of any terminal.

pub mod config;
pub mod debounce;
pub mod model;
pub mod outcome;
pub mod pipeline;
pub mod provider;
pub mod render;

pub use config::Config;
pub use debounce::Debouncer;
pub use model::{ForecastEntry, ForecastList, ForecastReply, TimezoneOffset};
pub use outcome::QueryOutcome;
pub use pipeline::{QueryState, Session, Step};
pub use provider::{FetchError, ForecastSource, source_from_config};
pub use render::{ForecastView, Header, Placeholder, Projector, Row, Screen};
