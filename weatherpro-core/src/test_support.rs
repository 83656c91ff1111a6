//! Scripted collaborators shared by unit tests.

use async_trait::async_trait;
use chrono::Utc;
use std::{
    collections::VecDeque,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};
use tokio::sync::Notify;

use crate::{
    error::WeatherError,
    location::{AuthorizationState, LocationService},
    model::{Coordinate, WeatherSnapshot},
    provider::WeatherProvider,
};

#[derive(Debug)]
struct LocationScript {
    authorization: Mutex<AuthorizationState>,
    answer: Mutex<AuthorizationState>,
    fix: Mutex<Result<Coordinate, String>>,
    prompts: AtomicUsize,
    fixes: AtomicUsize,
    gated: AtomicBool,
    gate: Notify,
}

/// Location service whose grant, prompt answer and fix are set by the test.
#[derive(Debug, Clone)]
pub(crate) struct ScriptedLocation {
    script: Arc<LocationScript>,
}

impl ScriptedLocation {
    pub(crate) fn new(authorization: AuthorizationState, fix: Result<Coordinate, String>) -> Self {
        Self {
            script: Arc::new(LocationScript {
                authorization: Mutex::new(authorization),
                answer: Mutex::new(AuthorizationState::Denied),
                fix: Mutex::new(fix),
                prompts: AtomicUsize::new(0),
                fixes: AtomicUsize::new(0),
                gated: AtomicBool::new(false),
                gate: Notify::new(),
            }),
        }
    }

    pub(crate) fn authorized(fix: Result<Coordinate, String>) -> Self {
        Self::new(AuthorizationState::AuthorizedWhileInUse, fix)
    }

    /// Grant the prompt resolves with.
    pub(crate) fn answering(self, answer: AuthorizationState) -> Self {
        *self.script.answer.lock().unwrap() = answer;
        self
    }

    /// Hold every fix until [`ScriptedLocation::release`] is called.
    pub(crate) fn gated(self) -> Self {
        self.script.gated.store(true, Ordering::SeqCst);
        self
    }

    pub(crate) fn release(&self) {
        self.script.gate.notify_one();
    }

    pub(crate) fn set_fix(&self, fix: Result<Coordinate, String>) {
        *self.script.fix.lock().unwrap() = fix;
    }

    pub(crate) fn prompt_calls(&self) -> usize {
        self.script.prompts.load(Ordering::SeqCst)
    }

    pub(crate) fn fix_calls(&self) -> usize {
        self.script.fixes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LocationService for ScriptedLocation {
    fn authorization(&self) -> AuthorizationState {
        *self.script.authorization.lock().unwrap()
    }

    async fn request_authorization(&self) -> AuthorizationState {
        self.script.prompts.fetch_add(1, Ordering::SeqCst);
        let answer = *self.script.answer.lock().unwrap();
        *self.script.authorization.lock().unwrap() = answer;
        answer
    }

    async fn request_fix(&self) -> Result<Coordinate, WeatherError> {
        self.script.fixes.fetch_add(1, Ordering::SeqCst);
        if self.script.gated.load(Ordering::SeqCst) {
            self.script.gate.notified().await;
        }
        self.script
            .fix
            .lock()
            .unwrap()
            .clone()
            .map_err(WeatherError::LocationUnavailable)
    }
}

/// Weather provider replaying queued outcomes; `Err(status)` becomes an HTTP error.
#[derive(Debug, Default)]
pub(crate) struct StubProvider {
    outcomes: Mutex<VecDeque<Result<WeatherSnapshot, u16>>>,
    requested: Mutex<Vec<Coordinate>>,
}

impl StubProvider {
    pub(crate) fn replying(outcomes: impl IntoIterator<Item = Result<WeatherSnapshot, u16>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into_iter().collect()),
            requested: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn requested(&self) -> Vec<Coordinate> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl WeatherProvider for StubProvider {
    async fn current_weather(&self, at: Coordinate) -> Result<WeatherSnapshot, WeatherError> {
        self.requested.lock().unwrap().push(at);
        let next = self.outcomes.lock().unwrap().pop_front();
        match next {
            Some(Ok(mut snapshot)) => {
                snapshot.requested = at;
                Ok(snapshot)
            }
            Some(Err(status)) => Err(WeatherError::Http { status }),
            None => Err(WeatherError::Http { status: 503 }),
        }
    }
}

pub(crate) fn snapshot(name: &str, temperature: f64) -> WeatherSnapshot {
    WeatherSnapshot {
        location_name: name.to_string(),
        condition: "Clouds".to_string(),
        condition_id: 803,
        description: "broken clouds".to_string(),
        icon: "04d".to_string(),
        temperature,
        feels_like: temperature - 1.0,
        temp_min: temperature - 2.0,
        temp_max: temperature + 2.0,
        pressure: 1015.0,
        humidity: 70.0,
        wind_speed: 4.1,
        wind_direction_deg: 250.0,
        coordinate: Coordinate::new(0.0, 0.0),
        requested: Coordinate::new(0.0, 0.0),
        fetched_at: Utc::now(),
    }
}
