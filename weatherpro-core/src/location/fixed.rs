use async_trait::async_trait;

use super::{AuthorizationState, LocationService};
use crate::{error::WeatherError, model::Coordinate};

/// A location service that always reports the same coordinate.
///
/// Used for coordinates given on the command line or in the config file.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocationService {
    coordinate: Coordinate,
}

impl FixedLocationService {
    pub fn new(coordinate: Coordinate) -> Self {
        Self { coordinate }
    }
}

#[async_trait]
impl LocationService for FixedLocationService {
    fn authorization(&self) -> AuthorizationState {
        AuthorizationState::AuthorizedAlways
    }

    async fn request_authorization(&self) -> AuthorizationState {
        AuthorizationState::AuthorizedAlways
    }

    async fn request_fix(&self) -> Result<Coordinate, WeatherError> {
        if !self.coordinate.is_finite() {
            return Err(WeatherError::LocationUnavailable(format!(
                "configured coordinate ({}, {}) is not a finite number",
                self.coordinate.latitude, self.coordinate.longitude
            )));
        }
        Ok(self.coordinate)
    }
}
