// Live telemetry aggregator - single reducer over pulled history, pushed snapshots and table state
use crate::domain::dashboard::{Dashboard, LiveView, TableView};
use crate::domain::reading::{Reading, StatusDisplayMap};
use crate::domain::snapshot::LiveSnapshot;
use crate::domain::table::TableState;
use crate::domain::telemetry::ChartWindows;
use crate::infrastructure::config::AggregatorSettings;
use chrono::{DateTime, Duration, Utc};

/// Everything that may change the dashboard, applied strictly in arrival order.
#[derive(Debug, Clone)]
pub enum DashboardEvent {
    /// Result of a history pull; replaces every chart window wholesale
    HistoryLoaded { seq: u64, readings: Vec<Reading> },
    /// Result of a table pull; replaces the table's backing list wholesale
    TableLoaded { seq: u64, readings: Vec<Reading> },
    /// Snapshot pushed over the live channel, stamped with its arrival time
    LiveUpdate {
        snapshot: LiveSnapshot,
        at: DateTime<Utc>,
    },
    PageChanged(usize),
    RowsPerPageChanged(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Ignored(IgnoreReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// A newer response for the same feed was already applied
    StaleResponse,
    /// Snapshot lacks temperature or humidity; only the live display changed
    IncompleteSnapshot,
    /// Snapshot arrived inside the append interval; only the live display changed
    RateLimited,
    InvalidRowsPerPage,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardState {
    pub live: LiveSnapshot,
    pub charts: ChartWindows,
    pub table: TableState,
    pub table_rows: Vec<Reading>,
    max_points: usize,
    append_min_interval: Duration,
    last_append_at: Option<DateTime<Utc>>,
    history_seq: u64,
    table_seq: u64,
}

impl DashboardState {
    pub fn new(settings: &AggregatorSettings) -> Self {
        Self {
            live: LiveSnapshot::default(),
            charts: ChartWindows::new(settings.max_points),
            table: TableState::new(settings.rows_per_page).unwrap_or_default(),
            table_rows: Vec::new(),
            max_points: settings.max_points,
            append_min_interval: settings.append_min_interval(),
            last_append_at: None,
            history_seq: 0,
            table_seq: 0,
        }
    }

    pub fn apply(&mut self, event: DashboardEvent) -> Outcome {
        match event {
            DashboardEvent::HistoryLoaded { seq, readings } => {
                if seq <= self.history_seq {
                    return Outcome::Ignored(IgnoreReason::StaleResponse);
                }
                self.history_seq = seq;
                let window = latest_window(readings, self.max_points);
                self.charts = ChartWindows::from_readings(self.max_points, &window);
                Outcome::Applied
            }
            DashboardEvent::TableLoaded { seq, readings } => {
                if seq <= self.table_seq {
                    return Outcome::Ignored(IgnoreReason::StaleResponse);
                }
                self.table_seq = seq;
                self.table_rows = readings;
                Outcome::Applied
            }
            DashboardEvent::LiveUpdate { snapshot, at } => {
                self.live = snapshot;
                let Some((temperature, humidity)) = snapshot.complete() else {
                    return Outcome::Ignored(IgnoreReason::IncompleteSnapshot);
                };
                if let Some(last) = self.last_append_at {
                    if at - last < self.append_min_interval {
                        return Outcome::Ignored(IgnoreReason::RateLimited);
                    }
                }
                self.last_append_at = Some(at);
                self.charts.append(at, temperature, humidity);
                Outcome::Applied
            }
            DashboardEvent::PageChanged(page) => {
                self.table.set_page(page);
                Outcome::Applied
            }
            DashboardEvent::RowsPerPageChanged(rows) => {
                if self.table.set_rows_per_page(rows) {
                    Outcome::Applied
                } else {
                    Outcome::Ignored(IgnoreReason::InvalidRowsPerPage)
                }
            }
        }
    }

    pub fn dashboard(&self) -> Dashboard {
        Dashboard::new(
            "Sensor Dashboard".to_string(),
            LiveView::from(&self.live),
            self.charts.charts(),
        )
    }

    pub fn table_view(&self, colors: &StatusDisplayMap) -> TableView {
        TableView::new(&self.table_rows, &self.table, colors)
    }
}

/// The `max_points` most recent readings, oldest first.
pub fn latest_window(mut readings: Vec<Reading>, max_points: usize) -> Vec<Reading> {
    readings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    readings.truncate(max_points);
    readings.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    readings
}
