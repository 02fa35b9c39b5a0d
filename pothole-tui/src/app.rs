//! Application state and navigation logic.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::Utc;
use pothole_pipeline::Scheduler;
use pothole_types::{Event, Snapshot};
use tokio::runtime::Handle;
use tokio::sync::watch;

use crate::export::write_snapshot;
use crate::ui::Theme;

/// Events listed on the dashboard and highlighted on the map.
pub const RECENT_LIMIT: usize = 10;

/// Where the `e` key writes the current snapshot.
pub const DEFAULT_EXPORT_PATH: &str = "pothole_export.json";

/// The current view/tab in the TUI.
///
/// Event detail is shown as an overlay (controlled by `App::detail_event`)
/// rather than as a separate view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// KPI cards, compact charts and the most recent events.
    Dashboard,
    /// Event positions around the map center.
    Map,
    /// Severity distribution and daily timeline.
    Charts,
    /// Every event in the snapshot.
    Logs,
}

impl View {
    pub const ALL: [View; 4] = [View::Dashboard, View::Map, View::Charts, View::Logs];

    /// Cycle to the next view.
    pub fn next(self) -> Self {
        match self {
            View::Dashboard => View::Map,
            View::Map => View::Charts,
            View::Charts => View::Logs,
            View::Logs => View::Dashboard,
        }
    }

    /// Cycle to the previous view.
    pub fn prev(self) -> Self {
        match self {
            View::Dashboard => View::Logs,
            View::Map => View::Dashboard,
            View::Charts => View::Map,
            View::Logs => View::Charts,
        }
    }

    /// Returns the display label for this view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Dashboard => "Dashboard",
            View::Map => "Map",
            View::Charts => "Charts",
            View::Logs => "Logs",
        }
    }

    /// Position in the tab bar.
    pub fn index(&self) -> usize {
        match self {
            View::Dashboard => 0,
            View::Map => 1,
            View::Charts => 2,
            View::Logs => 3,
        }
    }
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,
    /// The event in the detail overlay, as it was when selected.
    pub detail_event: Option<Event>,

    // Pipeline
    scheduler: Scheduler,
    runtime: Handle,
    snapshots: watch::Receiver<Arc<Snapshot>>,
    pub snapshot: Arc<Snapshot>,

    // Navigation state
    pub selected_index: usize,

    // UI
    pub theme: Theme,
    pub export_path: PathBuf,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create an App reading snapshots from the given scheduler.
    ///
    /// Manual refreshes are spawned on `runtime`.
    pub fn new(scheduler: Scheduler, runtime: Handle, theme: Theme) -> Self {
        let mut snapshots = scheduler.subscribe();
        let snapshot = snapshots.borrow_and_update().clone();
        Self {
            running: true,
            current_view: View::Dashboard,
            show_help: false,
            detail_event: None,
            scheduler,
            runtime,
            snapshots,
            snapshot,
            selected_index: 0,
            theme,
            export_path: PathBuf::from(DEFAULT_EXPORT_PATH),
            status_message: None,
        }
    }

    /// Returns a description of the feed being polled.
    pub fn source_description(&self) -> &str {
        self.scheduler.feed_description()
    }

    pub fn poll_interval(&self) -> Duration {
        self.scheduler.interval()
    }

    /// True while a fetch is in flight.
    pub fn is_loading(&self) -> bool {
        self.scheduler.is_loading()
    }

    /// Message of the last failed poll cycle, if the most recent one failed.
    pub fn last_error(&self) -> Option<String> {
        self.scheduler.last_error()
    }

    /// Time since the current snapshot was assembled, `None` before the first one.
    pub fn update_age(&self) -> Option<Duration> {
        let generated_at = self.snapshot.generated_at?;
        Some((Utc::now() - generated_at).to_std().unwrap_or(Duration::ZERO))
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired (3 seconds).
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < Duration::from_secs(3) {
                return Some(msg);
            }
        }
        None
    }

    /// Pick up the latest published snapshot.
    ///
    /// Returns true if a new snapshot was received.
    pub fn reload_data(&mut self) -> bool {
        if !self.snapshots.has_changed().unwrap_or(false) {
            return false;
        }
        self.snapshot = self.snapshots.borrow_and_update().clone();

        // Clamp selection to the new list
        let len = self.list_len();
        if self.selected_index >= len {
            self.selected_index = len.saturating_sub(1);
        }
        true
    }

    /// Ask the scheduler for a cycle now.
    ///
    /// A refresh requested while a fetch is in flight is dropped.
    pub fn refresh(&mut self) {
        if self.scheduler.is_loading() {
            self.set_status_message("Refresh already in progress".to_string());
            return;
        }
        let scheduler = self.scheduler.clone();
        self.runtime.spawn(async move {
            scheduler.poll_now().await;
        });
        self.set_status_message("Refreshing...".to_string());
    }

    /// Switch to the next view (cycles through Dashboard → Map → Charts → Logs).
    pub fn next_view(&mut self) {
        self.set_view(self.current_view.next());
    }

    /// Switch to the previous view.
    pub fn prev_view(&mut self) {
        self.set_view(self.current_view.prev());
    }

    /// Switch to a specific view.
    pub fn set_view(&mut self, view: View) {
        self.current_view = view;
        self.selected_index = 0;
    }

    /// Events listed in the current view.
    pub fn visible_events(&self) -> &[Event] {
        match self.current_view {
            View::Dashboard => self.snapshot.recent(RECENT_LIMIT),
            View::Logs => &self.snapshot.events,
            View::Map | View::Charts => &[],
        }
    }

    fn list_len(&self) -> usize {
        self.visible_events().len()
    }

    /// The event under the cursor, if the current view has a list.
    pub fn selected_event(&self) -> Option<&Event> {
        self.visible_events().get(self.selected_index)
    }

    /// Move selection down by one item.
    pub fn select_next(&mut self) {
        self.select_next_n(1);
    }

    /// Move selection up by one item.
    pub fn select_prev(&mut self) {
        self.select_prev_n(1);
    }

    /// Move selection down by n items.
    pub fn select_next_n(&mut self, n: usize) {
        let max = self.list_len().saturating_sub(1);
        self.selected_index = (self.selected_index + n).min(max);
        self.follow_selection();
    }

    /// Move selection up by n items.
    pub fn select_prev_n(&mut self, n: usize) {
        self.selected_index = self.selected_index.saturating_sub(n);
        self.follow_selection();
    }

    /// Jump to the first item in the list.
    pub fn select_first(&mut self) {
        self.selected_index = 0;
        self.follow_selection();
    }

    /// Jump to the last item in the list.
    pub fn select_last(&mut self) {
        self.selected_index = self.list_len().saturating_sub(1);
        self.follow_selection();
    }

    /// Keep an open detail overlay on the selected event.
    fn follow_selection(&mut self) {
        if self.detail_event.is_some() {
            self.detail_event = self.selected_event().cloned();
        }
    }

    /// Open the detail overlay for the selected event.
    pub fn enter_detail(&mut self) {
        if let Some(event) = self.selected_event().cloned() {
            self.detail_event = Some(event);
        }
    }

    /// The event in the detail overlay, if it is still in the snapshot.
    pub fn detail(&self) -> Option<&Event> {
        let shown = self.detail_event.as_ref()?;
        self.snapshot.events.iter().find(|e| *e == shown)
    }

    /// Close the detail overlay if open.
    pub fn close_overlay(&mut self) {
        self.detail_event = None;
    }

    /// Navigate back: close overlay first, then return to the Dashboard.
    pub fn go_back(&mut self) {
        if self.detail_event.is_some() {
            self.close_overlay();
            return;
        }
        if self.current_view != View::Dashboard {
            self.set_view(View::Dashboard);
        }
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Write the current snapshot to a JSON file.
    pub fn export_state(&self, path: &Path) -> Result<()> {
        write_snapshot(&self.snapshot, path)
    }

    /// Quit the application.
    pub fn quit(&mut self) {
        self.running = false;
    }
}
