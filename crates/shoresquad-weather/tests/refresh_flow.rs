//! End-to-end tests: HTTP provider + controller against a mock server.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use shoresquad_weather::{
    ControllerOptions, CycleOutcome, ErrorPayload, FetchErrorKind, ForecastController,
    ForecastView, ForecastViewModel, HttpForecastProvider, IconCategory,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn june(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 6, day).unwrap()
}

fn second_day_is_today() -> NaiveDate {
    june(16)
}

fn outlook() -> serde_json::Value {
    serde_json::json!({
        "items": [{
            "forecasts": [
                {
                    "date": "2026-06-15",
                    "forecast": "Thundery Showers",
                    "temperature": {"low": 25, "high": 33},
                    "relative_humidity": {"low": 55, "high": 95},
                    "wind": {"speed": {"low": 10, "high": 20}, "direction": "SSE"}
                },
                {
                    "date": "2026-06-16",
                    "forecast": "Fair & Warm",
                    "temperature": {"low": 26, "high": 34},
                    "relative_humidity": {"low": 50, "high": 90},
                    "wind": {"speed": {"low": 10, "high": 15}, "direction": "S"}
                },
                {
                    "date": "2026-06-17",
                    "forecast": "Cloudy",
                    "temperature": {"low": 26, "high": 32},
                    "relative_humidity": {"low": 60, "high": 90}
                }
            ]
        }]
    })
}

#[derive(Default)]
struct LastShown {
    forecast: Mutex<Option<ForecastViewModel>>,
    error: Mutex<Option<ErrorPayload>>,
    loading_count: Mutex<usize>,
}

impl ForecastView for LastShown {
    fn show_loading(&self) {
        *self.loading_count.lock() += 1;
    }

    fn show_forecast(&self, forecast: &ForecastViewModel) {
        *self.error.lock() = None;
        *self.forecast.lock() = Some(forecast.clone());
    }

    fn show_error(&self, error: &ErrorPayload) {
        *self.forecast.lock() = None;
        *self.error.lock() = Some(error.clone());
    }
}

fn controller_for(
    server: &MockServer,
    timeout: Duration,
) -> (ForecastController, Arc<LastShown>) {
    let provider =
        HttpForecastProvider::new(format!("{}/forecast", server.uri()), timeout).unwrap();
    let view = Arc::new(LastShown::default());
    let controller = ForecastController::new(
        Arc::new(provider),
        view.clone(),
        ControllerOptions {
            today: second_day_is_today,
            ..ControllerOptions::default()
        },
    );
    (controller, view)
}

#[tokio::test]
async fn test_refresh_renders_outlook() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(outlook()))
        .mount(&mock_server)
        .await;

    let (controller, view) = controller_for(&mock_server, Duration::from_secs(10));
    assert_eq!(controller.manual_refresh().await, CycleOutcome::Rendered);

    let forecast = view.forecast.lock().clone().unwrap();
    let labels: Vec<_> = forecast.days.iter().map(|d| d.label.as_str()).collect();
    assert_eq!(labels, vec!["Monday", "Today", "Wednesday"]);

    let icons: Vec<_> = forecast.days.iter().map(|d| d.icon).collect();
    assert_eq!(
        icons,
        vec![
            IconCategory::Thunderstorm,
            IconCategory::Sunny,
            IconCategory::Cloudy
        ]
    );
    assert_eq!(forecast.days[1].wind().as_deref(), Some("15 km/h"));
    assert_eq!(forecast.days[2].wind(), None);
    assert_eq!(forecast.days[0].date, june(15));
    assert_eq!(*view.loading_count.lock(), 1);
}

#[tokio::test]
async fn test_rate_limit_then_manual_refresh_recovers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&mock_server)
        .await;

    let (controller, view) = controller_for(&mock_server, Duration::from_secs(10));

    assert_eq!(
        controller.manual_refresh().await,
        CycleOutcome::Failed(FetchErrorKind::HttpStatus(429))
    );
    let error = view.error.lock().clone().unwrap();
    assert!(error.message.contains("Too many"));
    assert!(view.forecast.lock().is_none());

    // Provider recovers
    mock_server.reset().await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(outlook()))
        .mount(&mock_server)
        .await;

    assert_eq!(controller.manual_refresh().await, CycleOutcome::Rendered);
    assert!(view.error.lock().is_none());
    assert_eq!(view.forecast.lock().as_ref().map(|f| f.days.len()), Some(3));
    assert!(!controller.is_auto_refresh_enabled());
}

#[tokio::test]
async fn test_timeout_shows_timeout_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(outlook())
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&mock_server)
        .await;

    let (controller, view) = controller_for(&mock_server, Duration::from_millis(200));

    let outcome = tokio::time::timeout(Duration::from_secs(3), controller.manual_refresh())
        .await
        .expect("cycle must finish within the request bound");

    assert_eq!(outcome, CycleOutcome::Failed(FetchErrorKind::Timeout));
    let error = view.error.lock().clone().unwrap();
    assert!(error.message.contains("timed out"));
}

#[tokio::test]
async fn test_missing_forecasts_shows_generic_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [{"update_timestamp": "2026-06-15T05:35:00+08:00"}]
        })))
        .mount(&mock_server)
        .await;

    let (controller, view) = controller_for(&mock_server, Duration::from_secs(10));

    assert_eq!(
        controller.manual_refresh().await,
        CycleOutcome::Failed(FetchErrorKind::MalformedResponse)
    );
    let error = view.error.lock().clone().unwrap();
    assert_eq!(error.kind, FetchErrorKind::MalformedResponse);
    assert_eq!(error.status, None);
}
