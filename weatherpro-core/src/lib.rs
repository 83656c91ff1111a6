//! Core library for the `weatherpro` CLI.
//!
//! This crate defines:
//! - A one-shot location provider over a pluggable platform location service
//! - The OpenWeather current-conditions fetcher
//! - A session coordinating the two and publishing its progress
//! - Configuration & credentials handling
//!
//! It is used by `weatherpro-cli`, but can also be reused by other front ends.

pub mod config;
pub mod error;
pub mod location;
pub mod model;
pub mod provider;
pub mod session;

#[cfg(test)]
mod test_support;

pub use config::{Config, LocationConfig};
pub use error::{ErrorKind, WeatherError};
pub use location::{
    AuthorizationState, FixedLocationService, IpLocationService, LocationProvider,
    LocationService, LocationState, PermissionPrompt,
};
pub use model::{Coordinate, WeatherCondition, WeatherSnapshot};
pub use provider::{OpenWeatherProvider, WeatherProvider, provider_from_config};
pub use session::{SessionPhase, SessionState, WeatherSession};
