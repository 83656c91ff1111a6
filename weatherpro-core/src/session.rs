//! Location → weather pipeline with observable progress.

use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

use crate::{
    error::{ErrorKind, WeatherError},
    location::{LocationProvider, LocationService},
    model::{Coordinate, WeatherSnapshot},
    provider::WeatherProvider,
};

/// Where the pipeline currently is.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SessionPhase {
    /// Nothing requested yet.
    #[default]
    Welcome,
    Locating,
    Fetching,
    Ready(Arc<WeatherSnapshot>),
    Failed(ErrorKind),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub phase: SessionPhase,
    /// Last successful snapshot; survives later failures.
    pub snapshot: Option<Arc<WeatherSnapshot>>,
}

/// Owns the location provider and the weather provider, and is the only writer
/// of the published [`SessionState`].
#[derive(Debug)]
pub struct WeatherSession<S, P> {
    location: LocationProvider<S>,
    provider: P,
    state: watch::Sender<SessionState>,
}

impl<S, P> WeatherSession<S, P>
where
    S: LocationService,
    P: WeatherProvider,
{
    pub fn new(service: S, provider: P) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self {
            location: LocationProvider::new(service),
            provider,
            state,
        }
    }

    pub fn location(&self) -> &LocationProvider<S> {
        &self.location
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn snapshot(&self) -> Option<Arc<WeatherSnapshot>> {
        self.state.borrow().snapshot.clone()
    }

    /// Fetch for the known coordinate, locating first if there is none yet.
    pub async fn refresh(&self) -> Result<Arc<WeatherSnapshot>, WeatherError> {
        let at = match self.location.coordinate() {
            Some(at) => at,
            None => self.locate().await?,
        };
        self.fetch_for(at).await
    }

    /// Request a fresh fix, then fetch for it.
    pub async fn relocate(&self) -> Result<Arc<WeatherSnapshot>, WeatherError> {
        let at = self.locate().await?;
        self.fetch_for(at).await
    }

    /// Fetch for an explicit coordinate, bypassing the location provider.
    pub async fn fetch_for(&self, at: Coordinate) -> Result<Arc<WeatherSnapshot>, WeatherError> {
        self.set_phase(SessionPhase::Fetching);

        match self.provider.current_weather(at).await {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                self.state.send_modify(|s| {
                    s.phase = SessionPhase::Ready(Arc::clone(&snapshot));
                    s.snapshot = Some(Arc::clone(&snapshot));
                });
                Ok(snapshot)
            }
            Err(err) => {
                self.set_phase(SessionPhase::Failed(err.kind()));
                Err(err)
            }
        }
    }

    async fn locate(&self) -> Result<Coordinate, WeatherError> {
        self.set_phase(SessionPhase::Locating);

        self.location
            .request_location()
            .await
            .inspect_err(|err| self.set_phase(SessionPhase::Failed(err.kind())))
    }

    fn set_phase(&self, phase: SessionPhase) {
        debug!(?phase, "session phase");
        self.state.send_modify(|s| s.phase = phase);
    }
}
