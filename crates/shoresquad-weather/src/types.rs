use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One day of the provider's outlook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub calendar_date: NaiveDate,
    /// Weekday name, e.g. "Monday"
    pub label: String,
    /// Free-text condition as reported by the provider
    pub condition_text: String,
    pub temperature_high_c: f64,
    pub temperature_low_c: f64,
    pub humidity_high_pct: f64,
    pub humidity_low_pct: f64,
    pub wind_speed_kmh: Option<f64>,
}

impl ForecastDay {
    pub fn weekday_label(date: NaiveDate) -> String {
        date.format("%A").to_string()
    }
}

/// All entries from one successful fetch, displayed as a unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSnapshot {
    pub days: Vec<ForecastDay>,
    pub fetched_at: DateTime<Utc>,
}

/// Failure kinds without their diagnostic detail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchErrorKind {
    Timeout,
    HttpStatus(u16),
    MalformedResponse,
    NetworkUnreachable,
    Unknown,
}

/// Forecast fetch errors. All of them are recoverable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("Forecast request timed out")]
    Timeout,
    #[error("Forecast provider returned HTTP {0}")]
    HttpStatus(u16),
    #[error("Malformed forecast response: {0}")]
    MalformedResponse(String),
    #[error("Forecast provider unreachable: {0}")]
    NetworkUnreachable(String),
    #[error("Forecast request failed: {0}")]
    Unknown(String),
}

pub const HTTP_TOO_MANY_REQUESTS: u16 = 429;

impl FetchError {
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            Self::Timeout => FetchErrorKind::Timeout,
            Self::HttpStatus(code) => FetchErrorKind::HttpStatus(*code),
            Self::MalformedResponse(_) => FetchErrorKind::MalformedResponse,
            Self::NetworkUnreachable(_) => FetchErrorKind::NetworkUnreachable,
            Self::Unknown(_) => FetchErrorKind::Unknown,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::HttpStatus(HTTP_TOO_MANY_REQUESTS))
    }

    /// Classify a transport-level failure from reqwest.
    pub fn from_transport(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else if error.is_connect() {
            Self::NetworkUnreachable(error.to_string())
        } else if error.is_decode() {
            Self::MalformedResponse(error.to_string())
        } else if let Some(status) = error.status() {
            Self::HttpStatus(status.as_u16())
        } else {
            Self::Unknown(error.to_string())
        }
    }

    /// Short message for the error view
    pub fn user_message(&self) -> String {
        match self {
            Self::Timeout => "Weather request timed out".to_string(),
            Self::HttpStatus(HTTP_TOO_MANY_REQUESTS) => "Too many weather requests".to_string(),
            Self::HttpStatus(code) => format!("Weather service unavailable (HTTP {})", code),
            Self::NetworkUnreachable(_) => "Unable to reach the weather service".to_string(),
            Self::MalformedResponse(_) | Self::Unknown(_) => {
                "Weather data is unavailable right now".to_string()
            }
        }
    }

    /// What the user can do about it
    pub fn hint(&self) -> &'static str {
        match self {
            Self::Timeout => "The weather service is responding slowly. Try again in a moment.",
            Self::HttpStatus(HTTP_TOO_MANY_REQUESTS) => {
                "The weather service is rate limiting requests. Wait a few minutes before retrying."
            }
            Self::HttpStatus(_) => "The weather service is having trouble. Try again later.",
            Self::NetworkUnreachable(_) => "Check your internet connection and try again.",
            Self::MalformedResponse(_) | Self::Unknown(_) => "Please try again later.",
        }
    }
}
