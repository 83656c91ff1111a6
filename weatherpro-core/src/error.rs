use thiserror::Error;

/// Everything that can end a location or weather attempt.
///
/// None of these are retried by the core; the caller decides whether to try again.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Location permission denied")]
    PermissionDenied,

    #[error("Location unavailable: {0}")]
    LocationUnavailable(String),

    #[error("Invalid weather request: {0}")]
    InvalidRequest(String),

    #[error("Weather request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Weather API responded with HTTP status {status}")]
    Http { status: u16 },

    #[error("Failed to decode weather response: {0}")]
    Decode(String),
}

/// Fieldless mirror of [`WeatherError`] for publishing through watch channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    PermissionDenied,
    LocationUnavailable,
    InvalidRequest,
    Transport,
    Http(u16),
    Decode,
}

impl WeatherError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WeatherError::PermissionDenied => ErrorKind::PermissionDenied,
            WeatherError::LocationUnavailable(_) => ErrorKind::LocationUnavailable,
            WeatherError::InvalidRequest(_) => ErrorKind::InvalidRequest,
            WeatherError::Transport(_) => ErrorKind::Transport,
            WeatherError::Http { status } => ErrorKind::Http(*status),
            WeatherError::Decode(_) => ErrorKind::Decode,
        }
    }

    /// True when the attempt failed before any weather request was made.
    pub fn is_location_error(&self) -> bool {
        self.kind().is_location_error()
    }

    pub fn user_message(&self) -> &'static str {
        self.kind().user_message()
    }
}

impl ErrorKind {
    pub fn is_location_error(self) -> bool {
        matches!(self, ErrorKind::PermissionDenied | ErrorKind::LocationUnavailable)
    }

    pub fn user_message(self) -> &'static str {
        match self {
            ErrorKind::PermissionDenied => {
                "Location access was denied. Pass --lat/--lon or set [location] in the config file."
            }
            ErrorKind::LocationUnavailable => {
                "Unable to determine your location. Please try again."
            }
            ErrorKind::InvalidRequest
            | ErrorKind::Transport
            | ErrorKind::Http(_)
            | ErrorKind::Decode => {
                "Unable to fetch weather data. Please check your connection and try again."
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_kind_keeps_status() {
        let err = WeatherError::Http { status: 401 };
        assert_eq!(err.kind(), ErrorKind::Http(401));
        assert!(err.to_string().contains("401"));
    }

    #[test]
    fn location_and_fetch_errors_are_distinguishable() {
        assert!(WeatherError::PermissionDenied.is_location_error());
        assert!(WeatherError::LocationUnavailable("gps off".into()).is_location_error());
        assert!(!WeatherError::Decode("missing field".into()).is_location_error());
        assert!(!WeatherError::Http { status: 500 }.is_location_error());
    }

    #[test]
    fn fetch_errors_share_a_user_message() {
        let decode = WeatherError::Decode("x".into()).user_message();
        let http = WeatherError::Http { status: 404 }.user_message();
        assert_eq!(decode, http);
        assert!(decode.starts_with("Unable to fetch weather data"));
    }
}
