//! Application state and navigation logic.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::debug;

use crate::data::{Alert, AlertFilter, History};
use crate::export::Report;
use crate::live::LiveData;
use crate::source::DataSource;
use crate::telemetry::{
    AlertsTelemetry, ControllerTelemetry, EngineTelemetry, OptimisationTelemetry,
    StatusTelemetry, TelemetryPath,
};
use crate::ui::Theme;

/// The current view/tab in the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Status, latest alert and controller gauges.
    Dashboard,
    /// Line voltages, phase currents and bus voltages.
    Engine,
    /// Availability and maintenance progress.
    Optimisation,
    /// Filterable alert list.
    Alerts,
}

impl View {
    pub const ALL: [View; 4] = [View::Dashboard, View::Engine, View::Optimisation, View::Alerts];

    /// Cycle to the next view.
    pub fn next(self) -> Self {
        match self {
            View::Dashboard => View::Engine,
            View::Engine => View::Optimisation,
            View::Optimisation => View::Alerts,
            View::Alerts => View::Dashboard,
        }
    }

    /// Cycle to the previous view.
    pub fn prev(self) -> Self {
        match self {
            View::Dashboard => View::Alerts,
            View::Engine => View::Dashboard,
            View::Optimisation => View::Engine,
            View::Alerts => View::Optimisation,
        }
    }

    /// Returns the display label for this view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Dashboard => "Dashboard",
            View::Engine => "Engine",
            View::Optimisation => "Optimisation",
            View::Alerts => "Alerts",
        }
    }

    /// Store paths the view renders, in slot order.
    pub fn paths(&self) -> &'static [TelemetryPath] {
        match self {
            View::Dashboard => &[
                TelemetryPath::Controller,
                TelemetryPath::Status,
                TelemetryPath::Alerts,
            ],
            View::Engine => &[TelemetryPath::EngineData],
            View::Optimisation => &[TelemetryPath::Optimisation],
            View::Alerts => &[TelemetryPath::Alerts],
        }
    }
}

/// How long a status message stays visible.
const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(3);

/// Main application state.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,

    // Data source
    source: Arc<dyn DataSource>,
    /// One live feed per path of the current view.
    pub feeds: Vec<LiveData>,
    pub history: History,

    // Alerts view
    pub alert_filter: AlertFilter,
    pub search_active: bool,
    pub selected_alert: usize,

    // UI
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create a new App reading from `source`, starting on the dashboard.
    pub fn new(source: Arc<dyn DataSource>, theme: Theme) -> Self {
        let mut app = Self {
            running: true,
            current_view: View::Dashboard,
            show_help: false,
            source,
            feeds: Vec::new(),
            history: History::new(),
            alert_filter: AlertFilter::default(),
            search_active: false,
            selected_alert: 0,
            theme,
            status_message: None,
        };
        app.attach_feeds();
        app
    }

    /// Returns a description of the current data source.
    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    /// Point the feed slots at the current view's paths.
    ///
    /// Existing slots are re-pointed; surplus slots are dropped, which
    /// releases their subscriptions.
    fn attach_feeds(&mut self) {
        let paths = self.current_view.paths();
        for (slot, path) in paths.iter().enumerate() {
            match self.feeds.get_mut(slot) {
                Some(feed) => feed.set_path(path.as_str()),
                None => self.feeds.push(LiveData::subscribe(self.source.clone(), path.as_str())),
            }
        }
        self.feeds.truncate(paths.len());
        debug!(view = self.current_view.label(), feeds = self.feeds.len(), "attached feeds");
    }

    /// The feed for `path`, if the current view uses it.
    pub fn feed(&self, path: TelemetryPath) -> Option<&LiveData> {
        self.feeds.iter().find(|feed| feed.path() == Some(path.as_str()))
    }

    fn decoded<T: serde::de::DeserializeOwned>(&self, path: TelemetryPath) -> Option<T> {
        match self.feed(path)?.decode::<T>() {
            Ok(value) => value,
            Err(err) => {
                debug!(path = %path, error = %err, "value does not match schema");
                None
            }
        }
    }

    pub fn controller(&self) -> Option<ControllerTelemetry> {
        self.decoded(TelemetryPath::Controller)
    }

    pub fn status(&self) -> Option<StatusTelemetry> {
        self.decoded(TelemetryPath::Status)
    }

    pub fn alerts_data(&self) -> Option<AlertsTelemetry> {
        self.decoded(TelemetryPath::Alerts)
    }

    pub fn engine(&self) -> Option<EngineTelemetry> {
        self.decoded(TelemetryPath::EngineData)
    }

    pub fn optimisation(&self) -> Option<OptimisationTelemetry> {
        self.decoded(TelemetryPath::Optimisation)
    }

    /// Current alerts.
    pub fn alerts(&self) -> Vec<Alert> {
        self.alerts_data().map(|a| a.active_alerts()).unwrap_or_default()
    }

    /// Current alerts after the severity and search filters.
    pub fn filtered_alerts(&self) -> Vec<Alert> {
        let alerts = self.alerts();
        self.alert_filter.apply(&alerts).into_iter().cloned().collect()
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired.
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < STATUS_MESSAGE_TTL {
                return Some(msg);
            }
        }
        None
    }

    /// Apply pending events from every feed.
    ///
    /// Returns true if any feed changed. Controller updates are recorded in
    /// the history.
    pub fn reload_data(&mut self) -> bool {
        let mut changed = false;
        let mut controller_changed = false;
        for feed in self.feeds.iter_mut() {
            if feed.poll() {
                changed = true;
                if feed.path() == Some(TelemetryPath::Controller.as_str()) {
                    controller_changed = true;
                }
            }
        }

        if controller_changed {
            if let Some(controller) = self.controller() {
                self.history.record(&controller);
            }
        }
        self.clamp_selection();
        changed
    }

    /// Switch to the next view.
    pub fn next_view(&mut self) {
        self.set_view(self.current_view.next());
    }

    /// Switch to the previous view.
    pub fn prev_view(&mut self) {
        self.set_view(self.current_view.prev());
    }

    /// Switch to a specific view.
    pub fn set_view(&mut self, view: View) {
        if view == self.current_view {
            return;
        }
        self.current_view = view;
        self.selected_alert = 0;
        self.search_active = false;
        self.attach_feeds();
    }

    /// Move the alert selection down by one.
    pub fn select_next(&mut self) {
        if self.current_view == View::Alerts {
            let max = self.filtered_alerts().len().saturating_sub(1);
            self.selected_alert = (self.selected_alert + 1).min(max);
        }
    }

    /// Move the alert selection up by one.
    pub fn select_prev(&mut self) {
        self.selected_alert = self.selected_alert.saturating_sub(1);
    }

    /// Select the alert at a visual row, if it exists.
    pub fn select_alert(&mut self, row: usize) {
        if row < self.filtered_alerts().len() {
            self.selected_alert = row;
        }
    }

    fn clamp_selection(&mut self) {
        if self.current_view == View::Alerts {
            let count = self.filtered_alerts().len();
            self.selected_alert = self.selected_alert.min(count.saturating_sub(1));
        }
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Enter search input mode on the alerts view.
    pub fn start_search(&mut self) {
        self.set_view(View::Alerts);
        self.search_active = true;
    }

    /// Exit search input mode, keeping the query.
    pub fn cancel_search(&mut self) {
        self.search_active = false;
    }

    pub fn search_push(&mut self, c: char) {
        self.alert_filter.query.push(c);
        self.selected_alert = 0;
    }

    pub fn search_pop(&mut self) {
        self.alert_filter.query.pop();
        self.selected_alert = 0;
    }

    /// Step the severity filter.
    pub fn cycle_severity(&mut self) {
        self.alert_filter.cycle_severity();
        self.selected_alert = 0;
        self.set_status_message(format!("Severity: {}", self.alert_filter.severity_label()));
    }

    /// Clear the severity and search filters.
    pub fn clear_filter(&mut self) {
        self.alert_filter.clear();
        self.search_active = false;
        self.selected_alert = 0;
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Export the current view's feeds to a file.
    pub fn export_state(&self, path: &Path) -> Result<()> {
        if self.feeds.iter().all(|feed| feed.loading()) {
            anyhow::bail!("No data to export");
        }
        Report::from_feeds(self.source.description(), &self.feeds).write(path)
    }
}
