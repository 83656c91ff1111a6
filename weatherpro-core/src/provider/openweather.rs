use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use std::fmt;
use tracing::{debug, info, warn};

use crate::{
    error::WeatherError,
    model::{Coordinate, WeatherSnapshot},
};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

const UNITS: &str = "metric";

#[derive(Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: String, base_url: impl Into<String>) -> Self {
        Self {
            api_key,
            base_url: base_url.into(),
            http: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build `base?lat=..&lon=..&appid=..&units=metric` for a coordinate.
    pub fn request_url(&self, at: Coordinate) -> Result<Url, WeatherError> {
        if !at.is_finite() {
            return Err(WeatherError::InvalidRequest(format!(
                "coordinate ({}, {}) is not a finite number",
                at.latitude, at.longitude
            )));
        }

        Url::parse_with_params(
            &self.base_url,
            &[
                ("lat", at.latitude.to_string()),
                ("lon", at.longitude.to_string()),
                ("appid", self.api_key.clone()),
                ("units", UNITS.to_string()),
            ],
        )
        .map_err(|e| WeatherError::InvalidRequest(format!("bad base URL '{}': {e}", self.base_url)))
    }

    async fn fetch_current(&self, at: Coordinate) -> Result<WeatherSnapshot, WeatherError> {
        let url = self.request_url(at)?;
        debug!(url = %redacted(&url), "requesting current weather");

        let res = self.http.get(url).send().await?;

        let status = res.status();
        if status != StatusCode::OK {
            return Err(WeatherError::Http {
                status: status.as_u16(),
            });
        }

        let body = res.bytes().await?;

        let parsed: OwCurrentResponse =
            serde_json::from_slice(&body).map_err(|e| WeatherError::Decode(e.to_string()))?;

        parsed.into_snapshot(at)
    }
}

impl fmt::Debug for OpenWeatherProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenWeatherProvider")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current_weather(&self, at: Coordinate) -> Result<WeatherSnapshot, WeatherError> {
        let snapshot = self
            .fetch_current(at)
            .await
            .inspect_err(|err| warn!(%err, coordinate = %at, "current weather fetch failed"))?;

        info!(
            location = %snapshot.location_name,
            condition = %snapshot.condition,
            temperature = snapshot.temperature,
            "current weather fetched"
        );
        Ok(snapshot)
    }
}

#[derive(Debug, Deserialize)]
struct OwCoord {
    lon: f64,
    lat: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    id: i64,
    main: String,
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    temp_min: f64,
    temp_max: f64,
    pressure: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
    deg: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    coord: OwCoord,
    weather: Vec<OwWeather>,
    main: OwMain,
    name: String,
    wind: OwWind,
}

impl OwCurrentResponse {
    fn into_snapshot(self, requested: Coordinate) -> Result<WeatherSnapshot, WeatherError> {
        let primary = self.weather.into_iter().next().ok_or_else(|| {
            WeatherError::Decode("response contained no weather conditions".to_string())
        })?;

        Ok(WeatherSnapshot {
            location_name: self.name,
            condition: primary.main,
            condition_id: primary.id,
            description: primary.description,
            icon: primary.icon,
            temperature: self.main.temp,
            feels_like: self.main.feels_like,
            temp_min: self.main.temp_min,
            temp_max: self.main.temp_max,
            pressure: self.main.pressure,
            humidity: self.main.humidity,
            wind_speed: self.wind.speed,
            wind_direction_deg: self.wind.deg,
            coordinate: Coordinate::new(self.coord.lat, self.coord.lon),
            requested,
            fetched_at: Utc::now(),
        })
    }
}

/// Copy of `url` with the API key masked, for logs.
fn redacted(url: &Url) -> Url {
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "appid" { "***".to_string() } else { v.into_owned() };
            (k.into_owned(), v)
        })
        .collect();

    let mut out = url.clone();
    out.query_pairs_mut().clear().extend_pairs(pairs);
    out
}
