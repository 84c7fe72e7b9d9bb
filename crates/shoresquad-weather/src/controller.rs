//! Forecast refresh controller.
//!
//! Owns the fetch/render cycle and the auto-refresh timer. Timer ticks,
//! manual refreshes and retries each start their own cycle and may overlap;
//! a monotonically increasing sequence number decides which result reaches
//! the view. Only the most recently issued cycle may render.

use chrono::{Local, NaiveDate};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::provider::ForecastSource;
use crate::render::{ErrorPayload, ForecastView, ForecastViewModel, ViewAction};
use crate::types::{FetchError, FetchErrorKind, ForecastSnapshot};

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// What started a cycle. Only used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Timer,
    Manual,
    Retry,
}

/// Result of one fetch/render cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Forecast reached the view
    Rendered,
    /// Error view was shown
    Failed(FetchErrorKind),
    /// A newer cycle was issued while this one was in flight; result dropped
    Superseded,
}

#[derive(Debug, Clone)]
pub struct ControllerOptions {
    /// Standard interval used by `toggle_auto_refresh`
    pub refresh_interval: Duration,
    /// Local calendar date used to pick the "Today" entry
    pub today: fn() -> NaiveDate,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            today: local_today,
        }
    }
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

struct RefreshTimer {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl RefreshTimer {
    fn cancel(self) {
        self.cancel.cancel();
        self.task.abort();
    }
}

#[derive(Default)]
struct RefreshState {
    timer: Option<RefreshTimer>,
    /// Bumped on every start/stop; a tick only fires for the current generation
    generation: u64,
}

#[derive(Default)]
struct DisplayState {
    latest_snapshot: Option<ForecastSnapshot>,
}

struct Inner {
    source: Arc<dyn ForecastSource>,
    view: Arc<dyn ForecastView>,
    options: ControllerOptions,
    issued: AtomicU64,
    display: Mutex<DisplayState>,
    refresh: Mutex<RefreshState>,
}

/// Handle to a forecast widget. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct ForecastController {
    inner: Arc<Inner>,
}

impl ForecastController {
    pub fn new(
        source: Arc<dyn ForecastSource>,
        view: Arc<dyn ForecastView>,
        options: ControllerOptions,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                source,
                view,
                options,
                issued: AtomicU64::new(0),
                display: Mutex::new(DisplayState::default()),
                refresh: Mutex::new(RefreshState::default()),
            }),
        }
    }

    /// One bounded fetch. Leaves refresh state untouched.
    pub async fn load_forecast(&self) -> Result<ForecastSnapshot, FetchError> {
        self.inner.source.load_forecast().await
    }

    /// Replace the view with `snapshot`.
    pub fn render(&self, snapshot: &ForecastSnapshot) {
        self.inner.render(snapshot);
    }

    /// Replace the view with the error screen for `error`.
    pub fn render_error(&self, error: &FetchError) {
        self.inner.render_error(error);
    }

    /// Fetch and render once, right now. The timer is not touched.
    pub async fn manual_refresh(&self) -> CycleOutcome {
        self.inner.run_cycle(Trigger::Manual).await
    }

    /// Same as `manual_refresh`, issued from the error view.
    pub async fn retry(&self) -> CycleOutcome {
        self.inner.run_cycle(Trigger::Retry).await
    }

    /// Install the auto-refresh timer, replacing any active one.
    ///
    /// Must be called from within a Tokio runtime. A zero interval is
    /// rejected and leaves the current timer in place.
    pub fn start_auto_refresh(&self, interval: Duration) {
        let mut refresh = self.inner.refresh.lock();
        Inner::install_timer(&self.inner, &mut refresh, interval);
    }

    /// Cancel the auto-refresh timer; no-op when none is active.
    pub fn stop_auto_refresh(&self) {
        let mut refresh = self.inner.refresh.lock();
        if Inner::cancel_timer(&mut refresh) {
            tracing::info!("Forecast auto-refresh stopped");
        }
    }

    /// Flip auto-refresh on or off. Returns whether it is now active.
    pub fn toggle_auto_refresh(&self) -> bool {
        let mut refresh = self.inner.refresh.lock();
        if Inner::cancel_timer(&mut refresh) {
            tracing::info!("Forecast auto-refresh toggled off");
            false
        } else {
            Inner::install_timer(&self.inner, &mut refresh, self.inner.options.refresh_interval);
            refresh.timer.is_some()
        }
    }

    pub fn is_auto_refresh_enabled(&self) -> bool {
        self.inner.is_auto_refresh_enabled()
    }

    /// Last snapshot that made it to the view
    pub fn latest_snapshot(&self) -> Option<ForecastSnapshot> {
        self.inner.display.lock().latest_snapshot.clone()
    }

    /// Dispatch a user action coming from the view.
    pub async fn handle_action(&self, action: ViewAction) {
        match action {
            ViewAction::Retry => {
                self.retry().await;
            }
            ViewAction::ManualRefresh => {
                self.manual_refresh().await;
            }
            ViewAction::ToggleAutoRefresh => {
                self.toggle_auto_refresh();
            }
        }
    }
}

impl Inner {
    fn today(&self) -> NaiveDate {
        (self.options.today)()
    }

    fn is_auto_refresh_enabled(&self) -> bool {
        self.refresh.lock().timer.is_some()
    }

    fn is_current_timer(&self, generation: u64) -> bool {
        self.refresh.lock().generation == generation
    }

    fn render(&self, snapshot: &ForecastSnapshot) {
        let model =
            ForecastViewModel::build(snapshot, self.today(), self.is_auto_refresh_enabled());
        self.view.show_forecast(&model);
    }

    fn render_error(&self, error: &FetchError) {
        let payload = ErrorPayload::for_error(error, self.is_auto_refresh_enabled());
        self.view.show_error(&payload);
    }

    async fn run_cycle(&self, trigger: Trigger) -> CycleOutcome {
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(seq, ?trigger, "Starting forecast cycle");
        self.view.show_loading();

        let result = self.source.load_forecast().await;

        {
            let mut display = self.display.lock();
            let latest = self.issued.load(Ordering::SeqCst);
            if seq < latest {
                tracing::debug!(seq, latest, "Discarding superseded forecast result");
                return CycleOutcome::Superseded;
            }
            if let Ok(snapshot) = &result {
                display.latest_snapshot = Some(snapshot.clone());
            }
        }

        // The view may call back into the controller, so no lock is held here.
        match result {
            Ok(snapshot) => {
                tracing::info!(days = snapshot.days.len(), ?trigger, "Forecast updated");
                self.render(&snapshot);
                CycleOutcome::Rendered
            }
            Err(error) => {
                match &error {
                    FetchError::MalformedResponse(detail) => {
                        tracing::warn!(%detail, "Forecast response had an unexpected shape")
                    }
                    other => tracing::warn!(error = %other, ?trigger, "Forecast fetch failed"),
                }
                self.render_error(&error);
                CycleOutcome::Failed(error.kind())
            }
        }
    }

    /// Returns true if a timer was active.
    fn cancel_timer(refresh: &mut RefreshState) -> bool {
        refresh.generation = refresh.generation.wrapping_add(1);
        match refresh.timer.take() {
            Some(timer) => {
                timer.cancel();
                true
            }
            None => false,
        }
    }

    fn install_timer(this: &Arc<Self>, refresh: &mut RefreshState, interval: Duration) {
        if interval.is_zero() {
            tracing::warn!("Ignoring auto-refresh request with a zero interval");
            return;
        }

        if Self::cancel_timer(refresh) {
            tracing::debug!("Replacing active auto-refresh timer");
        }

        let cancel = CancellationToken::new();
        let task = tokio::spawn(run_timer(
            Arc::downgrade(this),
            refresh.generation,
            interval,
            cancel.clone(),
        ));
        refresh.timer = Some(RefreshTimer { cancel, task });

        tracing::info!(interval_secs = interval.as_secs(), "Forecast auto-refresh started");
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(timer) = self.refresh.get_mut().timer.take() {
            timer.cancel();
        }
    }
}

async fn run_timer(
    inner: Weak<Inner>,
    generation: u64,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let Some(inner) = inner.upgrade() else {
            break;
        };

        if !inner.is_current_timer(generation) {
            break;
        }

        // Checked again once the cycle task runs: a stop that lands between
        // the tick and the first poll must keep the cycle from starting.
        let cycle_inner = Arc::clone(&inner);
        tokio::spawn(async move {
            if cycle_inner.is_current_timer(generation) {
                cycle_inner.run_cycle(Trigger::Timer).await;
            } else {
                tracing::debug!(generation, "Dropping tick from a cancelled timer");
            }
        });
    }
}
