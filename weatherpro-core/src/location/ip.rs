use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::{
    fmt::Debug,
    sync::{Arc, Mutex, PoisonError},
};
use tracing::debug;

use super::{AuthorizationState, LocationService};
use crate::{error::WeatherError, model::Coordinate};

pub const DEFAULT_GEOLOCATION_URL: &str = "http://ip-api.com/json";

/// Asks the user whether their approximate location may be looked up.
#[async_trait]
pub trait PermissionPrompt: Send + Sync + Debug {
    async fn ask(&self) -> bool;
}

/// Approximate location from the public IP address.
///
/// Authorization starts undetermined and is settled by the injected prompt; the
/// decision holds for the lifetime of the service.
#[derive(Debug)]
pub struct IpLocationService {
    url: String,
    http: Client,
    prompt: Option<Arc<dyn PermissionPrompt>>,
    authorization: Mutex<AuthorizationState>,
}

impl IpLocationService {
    pub fn new(url: impl Into<String>, prompt: Arc<dyn PermissionPrompt>) -> Self {
        Self {
            url: url.into(),
            http: Client::new(),
            prompt: Some(prompt),
            authorization: Mutex::new(AuthorizationState::Undetermined),
        }
    }

    /// A service the user has already consented to, e.g. with `--yes`.
    pub fn pre_authorized(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            http: Client::new(),
            prompt: None,
            authorization: Mutex::new(AuthorizationState::AuthorizedWhileInUse),
        }
    }

    fn set_authorization(&self, state: AuthorizationState) {
        *self
            .authorization
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = state;
    }

    async fn lookup(&self) -> Result<Coordinate, WeatherError> {
        debug!(url = %self.url, "requesting ip geolocation");

        let res = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|e| {
                WeatherError::LocationUnavailable(format!("geolocation request failed: {e}"))
            })?;

        let status = res.status();
        if status != StatusCode::OK {
            return Err(WeatherError::LocationUnavailable(format!(
                "geolocation service responded with HTTP status {}",
                status.as_u16()
            )));
        }

        let body: IpApiResponse = res.json().await.map_err(|e| {
            WeatherError::LocationUnavailable(format!("failed to decode geolocation response: {e}"))
        })?;

        body.into_coordinate()
    }
}

#[async_trait]
impl LocationService for IpLocationService {
    fn authorization(&self) -> AuthorizationState {
        *self
            .authorization
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    async fn request_authorization(&self) -> AuthorizationState {
        let current = self.authorization();
        if current != AuthorizationState::Undetermined {
            return current;
        }

        let granted = match &self.prompt {
            Some(prompt) => prompt.ask().await,
            None => false,
        };

        let decided = if granted {
            AuthorizationState::AuthorizedWhileInUse
        } else {
            AuthorizationState::Denied
        };
        self.set_authorization(decided);
        decided
    }

    async fn request_fix(&self) -> Result<Coordinate, WeatherError> {
        self.lookup().await
    }
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    lat: Option<f64>,
    lon: Option<f64>,
    message: Option<String>,
}

impl IpApiResponse {
    fn into_coordinate(self) -> Result<Coordinate, WeatherError> {
        if self.status != "success" {
            let reason = self.message.unwrap_or_else(|| "lookup failed".to_string());
            return Err(WeatherError::LocationUnavailable(format!(
                "geolocation lookup failed: {reason}"
            )));
        }

        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Ok(Coordinate::new(lat, lon)),
            _ => Err(WeatherError::LocationUnavailable(
                "geolocation response had no coordinate".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Answer(bool);

    #[async_trait]
    impl PermissionPrompt for Answer {
        async fn ask(&self) -> bool {
            self.0
        }
    }

    fn decode(body: &str) -> Result<Coordinate, WeatherError> {
        serde_json::from_str::<IpApiResponse>(body)
            .expect("body must parse")
            .into_coordinate()
    }

    #[test]
    fn success_body_yields_coordinate() {
        let c = decode(r#"{"status":"success","city":"London","lat":51.5074,"lon":-0.1196}"#)
            .unwrap();
        assert_eq!(c, Coordinate::new(51.5074, -0.1196));
    }

    #[test]
    fn fail_body_carries_message() {
        let err = decode(r#"{"status":"fail","message":"private range"}"#).unwrap_err();
        assert!(matches!(&err, WeatherError::LocationUnavailable(m) if m.contains("private range")));
    }

    #[test]
    fn success_without_coordinate_is_unavailable() {
        let err = decode(r#"{"status":"success"}"#).unwrap_err();
        assert!(matches!(err, WeatherError::LocationUnavailable(_)));
    }

    #[tokio::test]
    async fn prompt_decides_authorization_once() {
        let service = IpLocationService::new(DEFAULT_GEOLOCATION_URL, Arc::new(Answer(true)));
        assert_eq!(service.authorization(), AuthorizationState::Undetermined);

        let decided = service.request_authorization().await;
        assert_eq!(decided, AuthorizationState::AuthorizedWhileInUse);
        assert_eq!(service.authorization(), AuthorizationState::AuthorizedWhileInUse);
    }

    #[tokio::test]
    async fn refused_prompt_denies() {
        let service = IpLocationService::new(DEFAULT_GEOLOCATION_URL, Arc::new(Answer(false)));

        assert_eq!(service.request_authorization().await, AuthorizationState::Denied);
        assert_eq!(service.request_authorization().await, AuthorizationState::Denied);
    }

    #[test]
    fn pre_authorized_skips_prompt() {
        let service = IpLocationService::pre_authorized(DEFAULT_GEOLOCATION_URL);
        assert_eq!(service.authorization(), AuthorizationState::AuthorizedWhileInUse);
    }
}
