//! One-shot device location with permission handling.
//!
//! [`LocationService`] is the platform boundary (permission prompt, single fix).
//! [`LocationProvider`] drives it and owns the observable [`LocationState`].

use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    error::{ErrorKind, WeatherError},
    model::Coordinate,
};

pub mod fixed;
pub mod ip;

pub use fixed::FixedLocationService;
pub use ip::{IpLocationService, PermissionPrompt};

/// Platform permission grant for location access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AuthorizationState {
    #[default]
    Undetermined,
    Denied,
    AuthorizedWhileInUse,
    AuthorizedAlways,
}

impl AuthorizationState {
    pub fn is_authorized(self) -> bool {
        matches!(
            self,
            AuthorizationState::AuthorizedWhileInUse | AuthorizationState::AuthorizedAlways
        )
    }
}

#[async_trait]
pub trait LocationService: Send + Sync + Debug {
    /// Current permission grant, without prompting.
    fn authorization(&self) -> AuthorizationState;

    /// Show the permission prompt and resolve with the resulting grant.
    async fn request_authorization(&self) -> AuthorizationState;

    /// Request a single coordinate fix.
    async fn request_fix(&self) -> Result<Coordinate, WeatherError>;
}

#[async_trait]
impl<S: LocationService + ?Sized> LocationService for Box<S> {
    fn authorization(&self) -> AuthorizationState {
        (**self).authorization()
    }

    async fn request_authorization(&self) -> AuthorizationState {
        (**self).request_authorization().await
    }

    async fn request_fix(&self) -> Result<Coordinate, WeatherError> {
        (**self).request_fix().await
    }
}

#[async_trait]
impl<S: LocationService + ?Sized> LocationService for Arc<S> {
    fn authorization(&self) -> AuthorizationState {
        (**self).authorization()
    }

    async fn request_authorization(&self) -> AuthorizationState {
        (**self).request_authorization().await
    }

    async fn request_fix(&self) -> Result<Coordinate, WeatherError> {
        (**self).request_fix().await
    }
}

/// Observable state of a [`LocationProvider`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationState {
    pub authorization: AuthorizationState,
    /// A fix (or the permission prompt preceding it) is in flight.
    pub busy: bool,
    /// Most recent successful fix.
    pub coordinate: Option<Coordinate>,
    pub last_error: Option<ErrorKind>,
    in_flight: usize,
}

impl LocationState {
    fn begin(&mut self) {
        self.in_flight += 1;
        self.busy = true;
    }

    fn end(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.busy = self.in_flight > 0;
    }
}

/// Obtains the device coordinate, one fix per request.
///
/// Concurrent requests are independent attempts; whichever finishes last
/// determines `coordinate`/`last_error`. `busy` stays set while any attempt runs.
#[derive(Debug)]
pub struct LocationProvider<S> {
    service: S,
    state: watch::Sender<LocationState>,
}

impl<S: LocationService> LocationProvider<S> {
    pub fn new(service: S) -> Self {
        let initial = LocationState {
            authorization: service.authorization(),
            ..LocationState::default()
        };
        let (state, _) = watch::channel(initial);

        Self { service, state }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn subscribe(&self) -> watch::Receiver<LocationState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> LocationState {
        self.state.borrow().clone()
    }

    pub fn coordinate(&self) -> Option<Coordinate> {
        self.state.borrow().coordinate
    }

    pub fn authorization(&self) -> AuthorizationState {
        self.state.borrow().authorization
    }

    pub fn is_busy(&self) -> bool {
        self.state.borrow().busy
    }

    /// Request a one-shot fix, prompting for permission first when undetermined.
    ///
    /// The result is returned and also published to subscribers.
    pub async fn request_location(&self) -> Result<Coordinate, WeatherError> {
        let reported = self.service.authorization();
        let mut authorization = reported;
        self.state.send_modify(|s| {
            // A denial already recorded for this session stays in force.
            if s.authorization != AuthorizationState::Denied {
                s.authorization = reported;
            }
            authorization = s.authorization;
            s.begin();
        });

        let result = match authorization {
            AuthorizationState::Denied => Err(WeatherError::PermissionDenied),
            AuthorizationState::Undetermined => {
                debug!("location permission undetermined, prompting");
                let decided = self.service.request_authorization().await;
                self.state.send_modify(|s| s.authorization = decided);

                if decided.is_authorized() {
                    self.service.request_fix().await
                } else {
                    Err(WeatherError::PermissionDenied)
                }
            }
            AuthorizationState::AuthorizedWhileInUse | AuthorizationState::AuthorizedAlways => {
                self.service.request_fix().await
            }
        };

        self.finish(&result);
        result
    }

    /// Record a permission change reported by the platform.
    ///
    /// When the new grant is an authorized one, no coordinate has been obtained
    /// and nothing is in flight, a fix is requested and its result returned.
    pub async fn authorization_changed(
        &self,
        authorization: AuthorizationState,
    ) -> Option<Result<Coordinate, WeatherError>> {
        let mut issue = false;
        self.state.send_modify(|s| {
            s.authorization = authorization;
            if authorization.is_authorized() && s.coordinate.is_none() && !s.busy {
                s.begin();
                issue = true;
            }
        });

        if !issue {
            debug!(?authorization, "location authorization changed");
            return None;
        }

        debug!(?authorization, "location authorized, requesting fix");
        let result = self.service.request_fix().await;
        self.finish(&result);
        Some(result)
    }

    fn finish(&self, result: &Result<Coordinate, WeatherError>) {
        match result {
            Ok(coordinate) => info!(%coordinate, "location fix obtained"),
            Err(err) => warn!(%err, "location request failed"),
        }

        self.state.send_modify(|s| {
            s.end();
            match result {
                Ok(coordinate) => {
                    s.coordinate = Some(*coordinate);
                    s.last_error = None;
                }
                Err(err) => s.last_error = Some(err.kind()),
            }
        });
    }
}
