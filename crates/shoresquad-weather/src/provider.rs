//! Forecast provider: one bounded HTTP request per call.
//!
//! The wire format is the data.gov.sg 4-day outlook: `items[0].forecasts`
//! holds one entry per day.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::types::{FetchError, ForecastDay, ForecastSnapshot};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = "ShoreSquad/0.1.0";

/// Anything that can produce a forecast snapshot.
#[async_trait]
pub trait ForecastSource: Send + Sync {
    async fn load_forecast(&self) -> Result<ForecastSnapshot, FetchError>;
}

#[derive(Debug, Deserialize)]
struct OutlookResponse {
    items: Vec<OutlookItem>,
}

#[derive(Debug, Deserialize)]
struct OutlookItem {
    forecasts: Option<Vec<OutlookForecast>>,
}

#[derive(Debug, Deserialize)]
struct OutlookForecast {
    date: NaiveDate,
    forecast: String,
    temperature: Range,
    relative_humidity: Range,
    wind: Option<OutlookWind>,
}

#[derive(Debug, Deserialize)]
struct Range {
    low: f64,
    high: f64,
}

#[derive(Debug, Deserialize)]
struct OutlookWind {
    speed: Option<WindSpeed>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WindSpeed {
    Value(f64),
    Range(Range),
}

impl WindSpeed {
    /// Ranges report their upper bound
    fn kmh(&self) -> f64 {
        match self {
            WindSpeed::Value(v) => *v,
            WindSpeed::Range(range) => range.high,
        }
    }
}

impl From<OutlookForecast> for ForecastDay {
    fn from(entry: OutlookForecast) -> Self {
        Self {
            calendar_date: entry.date,
            label: ForecastDay::weekday_label(entry.date),
            condition_text: entry.forecast,
            temperature_high_c: entry.temperature.high,
            temperature_low_c: entry.temperature.low,
            humidity_high_pct: entry.relative_humidity.high,
            humidity_low_pct: entry.relative_humidity.low,
            wind_speed_kmh: entry
                .wind
                .and_then(|wind| wind.speed)
                .map(|speed| speed.kmh()),
        }
    }
}

/// Parse a provider body into a snapshot.
pub fn parse_forecast(
    body: &str,
    fetched_at: DateTime<Utc>,
) -> Result<ForecastSnapshot, FetchError> {
    let response: OutlookResponse = serde_json::from_str(body)
        .map_err(|e| FetchError::MalformedResponse(format!("JSON parse error: {}", e)))?;

    let forecasts = response
        .items
        .into_iter()
        .next()
        .ok_or_else(|| FetchError::MalformedResponse("response has no items".to_string()))?
        .forecasts
        .ok_or_else(|| FetchError::MalformedResponse("first item has no forecasts".to_string()))?;

    if forecasts.is_empty() {
        return Err(FetchError::MalformedResponse(
            "forecasts array is empty".to_string(),
        ));
    }

    Ok(ForecastSnapshot {
        days: forecasts.into_iter().map(ForecastDay::from).collect(),
        fetched_at,
    })
}

/// HTTP forecast provider with a hard bound on each request.
#[derive(Debug, Clone)]
pub struct HttpForecastProvider {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpForecastProvider {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn fetch(&self) -> Result<ForecastSnapshot, FetchError> {
        let response = self
            .client
            .get(&self.endpoint)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(FetchError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let body = response.text().await.map_err(FetchError::from_transport)?;
        parse_forecast(&body, Utc::now())
    }
}

#[async_trait]
impl ForecastSource for HttpForecastProvider {
    /// Dropping the in-flight future on timeout aborts the request.
    async fn load_forecast(&self) -> Result<ForecastSnapshot, FetchError> {
        match tokio::time::timeout(self.timeout, self.fetch()).await {
            Ok(result) => result,
            Err(_) => {
                tracing::debug!(
                    endpoint = %self.endpoint,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Forecast request aborted after timeout"
                );
                Err(FetchError::Timeout)
            }
        }
    }
}
