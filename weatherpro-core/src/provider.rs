use crate::{
    Config,
    error::WeatherError,
    model::{Coordinate, WeatherSnapshot},
};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod openweather;

pub use openweather::OpenWeatherProvider;

/// Translates a coordinate into current conditions with one network round trip.
///
/// Implementations hold no state between calls: every call is an independent attempt.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current_weather(&self, at: Coordinate) -> Result<WeatherSnapshot, WeatherError>;
}

#[async_trait]
impl<P: WeatherProvider + ?Sized> WeatherProvider for Box<P> {
    async fn current_weather(&self, at: Coordinate) -> Result<WeatherSnapshot, WeatherError> {
        (**self).current_weather(at).await
    }
}

#[async_trait]
impl<P: WeatherProvider + ?Sized> WeatherProvider for Arc<P> {
    async fn current_weather(&self, at: Coordinate) -> Result<WeatherSnapshot, WeatherError> {
        (**self).current_weather(at).await
    }
}

/// Construct the OpenWeather provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<OpenWeatherProvider> {
    let api_key = config.api_key()?;

    Ok(OpenWeatherProvider::with_base_url(
        api_key.to_owned(),
        config.base_url(),
    ))
}
