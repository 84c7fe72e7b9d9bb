//! Display models handed to the rendering surface.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::condition::IconCategory;
use crate::types::{FetchError, FetchErrorKind, ForecastSnapshot};

pub const TODAY_LABEL: &str = "Today";

/// User actions the view can send back to the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewAction {
    Retry,
    ToggleAutoRefresh,
    ManualRefresh,
}

/// One rendered forecast day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayCard {
    pub date: NaiveDate,
    pub label: String,
    pub is_today: bool,
    pub condition: String,
    pub icon: IconCategory,
    pub high_c: f64,
    pub low_c: f64,
    pub humidity_low_pct: f64,
    pub humidity_high_pct: f64,
    pub wind_speed_kmh: Option<f64>,
}

impl DayCard {
    pub fn temperature_range(&self) -> String {
        format!("{:.0}-{:.0}°C", self.low_c, self.high_c)
    }

    pub fn humidity_range(&self) -> String {
        format!("{:.0}-{:.0}%", self.humidity_low_pct, self.humidity_high_pct)
    }

    pub fn wind(&self) -> Option<String> {
        self.wind_speed_kmh.map(|speed| format!("{:.0} km/h", speed))
    }
}

/// Everything the view needs to draw a populated forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastViewModel {
    pub days: Vec<DayCard>,
    pub fetched_at: DateTime<Utc>,
    pub auto_refresh_active: bool,
}

impl ForecastViewModel {
    /// Build the view model for `snapshot` as seen on `today` (local date).
    pub fn build(snapshot: &ForecastSnapshot, today: NaiveDate, auto_refresh_active: bool) -> Self {
        let days = snapshot
            .days
            .iter()
            .map(|day| {
                let is_today = day.calendar_date == today;
                DayCard {
                    date: day.calendar_date,
                    label: if is_today {
                        TODAY_LABEL.to_string()
                    } else {
                        day.label.clone()
                    },
                    is_today,
                    condition: day.condition_text.clone(),
                    icon: IconCategory::from_condition(&day.condition_text),
                    high_c: day.temperature_high_c,
                    low_c: day.temperature_low_c,
                    humidity_low_pct: day.humidity_low_pct,
                    humidity_high_pct: day.humidity_high_pct,
                    wind_speed_kmh: day.wind_speed_kmh,
                }
            })
            .collect();

        Self {
            days,
            fetched_at: snapshot.fetched_at,
            auto_refresh_active,
        }
    }
}

/// Error view contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub kind: FetchErrorKind,
    pub message: String,
    pub hint: String,
    pub status: Option<u16>,
    pub actions: Vec<ViewAction>,
    pub auto_refresh_active: bool,
}

impl ErrorPayload {
    pub fn for_error(error: &FetchError, auto_refresh_active: bool) -> Self {
        let status = match error {
            FetchError::HttpStatus(code) => Some(*code),
            _ => None,
        };

        Self {
            kind: error.kind(),
            message: error.user_message(),
            hint: error.hint().to_string(),
            status,
            actions: vec![ViewAction::Retry, ViewAction::ToggleAutoRefresh],
            auto_refresh_active,
        }
    }
}

/// The rendering surface. Each call replaces whatever was shown before.
pub trait ForecastView: Send + Sync {
    fn show_loading(&self);

    fn show_forecast(&self, forecast: &ForecastViewModel);

    fn show_error(&self, error: &ErrorPayload);
}
