use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A resolved geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Both components are finite numbers (no NaN or infinity).
    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Broad class of the primary condition reported by the weather API.
///
/// The API reports the condition group as a free-form string (`weather[0].main`);
/// anything outside the known groups is kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeatherCondition {
    Clear,
    Clouds,
    Rain,
    Drizzle,
    Snow,
    Thunderstorm,
    /// Mist, fog and haze.
    Atmosphere,
    Other(String),
}

impl WeatherCondition {
    pub fn classify(main: &str) -> Self {
        match main.trim().to_lowercase().as_str() {
            "clear" => Self::Clear,
            "clouds" => Self::Clouds,
            "rain" => Self::Rain,
            "drizzle" => Self::Drizzle,
            "snow" => Self::Snow,
            "thunderstorm" => Self::Thunderstorm,
            "mist" | "fog" | "haze" => Self::Atmosphere,
            _ => Self::Other(main.to_string()),
        }
    }

    /// Terminal glyph for the condition class.
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Clear => "☀",
            Self::Clouds => "☁",
            Self::Rain | Self::Drizzle => "🌧",
            Self::Snow => "❄",
            Self::Thunderstorm => "⛈",
            Self::Atmosphere => "🌫",
            Self::Other(_) => "🌡",
        }
    }
}

/// Immutable result of one successful current-conditions fetch.
///
/// Temperatures are in °C, pressure in hPa, humidity in %, wind speed in m/s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub location_name: String,
    /// Primary condition group as reported, e.g. "Clear" or "Clouds".
    pub condition: String,
    pub condition_id: i64,
    pub description: String,
    pub icon: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub pressure: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub wind_direction_deg: f64,
    /// Station coordinate as reported by the API.
    pub coordinate: Coordinate,
    /// Coordinate the fetch was issued for.
    pub requested: Coordinate,
    pub fetched_at: DateTime<Utc>,
}

impl WeatherSnapshot {
    pub fn condition_kind(&self) -> WeatherCondition {
        WeatherCondition::classify(&self.condition)
    }

    pub fn wind_compass(&self) -> &'static str {
        compass_point(self.wind_direction_deg)
    }
}

/// 16-point compass name for a bearing in degrees.
pub fn compass_point(degrees: f64) -> &'static str {
    const POINTS: [&str; 16] = [
        "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW",
        "NW", "NNW",
    ];

    if !degrees.is_finite() {
        return "?";
    }

    let normalized = degrees.rem_euclid(360.0);
    let index = ((normalized / 22.5).round() as usize) % POINTS.len();
    POINTS[index]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_known_groups_case_insensitively() {
        assert_eq!(WeatherCondition::classify("Clear"), WeatherCondition::Clear);
        assert_eq!(WeatherCondition::classify("clouds"), WeatherCondition::Clouds);
        assert_eq!(WeatherCondition::classify("RAIN"), WeatherCondition::Rain);
        assert_eq!(WeatherCondition::classify("Drizzle"), WeatherCondition::Drizzle);
        assert_eq!(WeatherCondition::classify("Snow"), WeatherCondition::Snow);
        assert_eq!(
            WeatherCondition::classify("Thunderstorm"),
            WeatherCondition::Thunderstorm
        );
    }

    #[test]
    fn mist_fog_and_haze_share_a_class() {
        for main in ["Mist", "Fog", "Haze"] {
            assert_eq!(WeatherCondition::classify(main), WeatherCondition::Atmosphere);
        }
    }

    #[test]
    fn unknown_group_is_kept_verbatim() {
        assert_eq!(
            WeatherCondition::classify("Tornado"),
            WeatherCondition::Other("Tornado".to_string())
        );
    }

    #[test]
    fn rain_and_drizzle_share_a_symbol() {
        assert_eq!(WeatherCondition::Rain.symbol(), WeatherCondition::Drizzle.symbol());
    }

    #[test]
    fn compass_points() {
        assert_eq!(compass_point(0.0), "N");
        assert_eq!(compass_point(200.0), "SSW");
        assert_eq!(compass_point(270.0), "W");
        assert_eq!(compass_point(359.0), "N");
        assert_eq!(compass_point(-90.0), "W");
        assert_eq!(compass_point(f64::NAN), "?");
    }

    #[test]
    fn coordinate_display_rounds_to_four_places() {
        let c = Coordinate::new(51.507_22, -0.127_58);
        assert_eq!(c.to_string(), "51.5072, -0.1276");
    }
}
