//! Plain-text rendering surface for the terminal.

use chrono::Local;
use shoresquad_weather::{ErrorPayload, ForecastView, ForecastViewModel, ViewAction};
use std::io::Write;

pub struct ConsoleView;

impl ConsoleView {
    fn emit(&self, text: &str) {
        let mut stdout = std::io::stdout().lock();
        if let Err(e) = writeln!(stdout, "{}", text).and_then(|_| stdout.flush()) {
            tracing::warn!("Failed to write to terminal: {}", e);
        }
    }
}

pub fn format_forecast(forecast: &ForecastViewModel) -> String {
    let mut out = String::from("\n== Beach weather ==\n");
    for day in &forecast.days {
        let mut line = format!(
            "{:<10} [{}] {:<14} {:<20} {}  humidity {}",
            day.label,
            day.icon.icon_name(),
            day.icon.description(),
            day.condition,
            day.temperature_range(),
            day.humidity_range(),
        );
        if let Some(wind) = day.wind() {
            line.push_str(&format!("  wind {}", wind));
        }
        out.push_str(&line);
        out.push('\n');
    }
    out.push_str(&format!(
        "Updated {}  |  auto-refresh {}",
        forecast.fetched_at.with_timezone(&Local).format("%H:%M"),
        if forecast.auto_refresh_active { "on" } else { "off" },
    ));
    out
}

pub fn format_error(error: &ErrorPayload) -> String {
    let mut out = format!("\n!! {}\n   {}\n", error.message, error.hint);
    let actions: Vec<&str> = error
        .actions
        .iter()
        .map(|action| match action {
            ViewAction::Retry => "[retry]",
            ViewAction::ManualRefresh => "[r]efresh",
            ViewAction::ToggleAutoRefresh if error.auto_refresh_active => "[t] pause auto-refresh",
            ViewAction::ToggleAutoRefresh => "[t] resume auto-refresh",
        })
        .collect();
    out.push_str("   ");
    out.push_str(&actions.join("  "));
    out
}

impl ForecastView for ConsoleView {
    fn show_loading(&self) {
        self.emit("Loading weather data...");
    }

    fn show_forecast(&self, forecast: &ForecastViewModel) {
        self.emit(&format_forecast(forecast));
    }

    fn show_error(&self, error: &ErrorPayload) {
        self.emit(&format_error(error));
    }
}
