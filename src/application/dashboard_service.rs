// Dashboard service - Owns the aggregator state and funnels every update through one reducer task
use crate::application::aggregator::{DashboardEvent, DashboardState, Outcome};
use crate::application::telemetry_source::TelemetrySource;
use crate::domain::snapshot::LiveSnapshot;
use crate::infrastructure::config::{AggregatorSettings, TableSource};
use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

struct Command {
    event: DashboardEvent,
    ack: oneshot::Sender<Outcome>,
}

#[derive(Clone)]
pub struct DashboardService {
    source: Arc<dyn TelemetrySource>,
    settings: AggregatorSettings,
    commands: mpsc::Sender<Command>,
    state: watch::Receiver<DashboardState>,
    history_seq: Arc<AtomicU64>,
    table_seq: Arc<AtomicU64>,
}

impl DashboardService {
    /// Create the service and spawn its reducer task. The task ends once every
    /// clone of the service has been dropped.
    pub fn start(
        source: Arc<dyn TelemetrySource>,
        settings: AggregatorSettings,
    ) -> (Self, JoinHandle<()>) {
        let (commands, mut rx) = mpsc::channel::<Command>(64);
        let (state_tx, state) = watch::channel(DashboardState::new(&settings));

        let reducer = tokio::spawn(async move {
            while let Some(Command { event, ack }) = rx.recv().await {
                let label = event_label(&event);
                let is_live = matches!(event, DashboardEvent::LiveUpdate { .. });
                let mut outcome = Outcome::Applied;
                state_tx.send_if_modified(|state| {
                    outcome = state.apply(event);
                    // partial or rate-limited snapshots still refresh the live display
                    outcome == Outcome::Applied || is_live
                });
                tracing::debug!("Dashboard event {} -> {:?}", label, outcome);
                let _ = ack.send(outcome);
            }
            tracing::debug!("Dashboard reducer stopped");
        });

        let service = Self {
            source,
            settings,
            commands,
            state,
            history_seq: Arc::new(AtomicU64::new(0)),
            table_seq: Arc::new(AtomicU64::new(0)),
        };

        (service, reducer)
    }

    pub fn settings(&self) -> &AggregatorSettings {
        &self.settings
    }

    /// Current state
    pub fn current(&self) -> DashboardState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.state.clone()
    }

    async fn dispatch(&self, event: DashboardEvent) -> Option<Outcome> {
        let (ack, done) = oneshot::channel();
        if self.commands.send(Command { event, ack }).await.is_err() {
            tracing::warn!("Dashboard reducer is gone, dropping event");
            return None;
        }
        done.await.ok()
    }

    /// Pull recent readings and rebuild the chart windows. Failures leave the
    /// current windows in place.
    pub async fn refresh_history(&self) -> Option<Outcome> {
        let seq = self.history_seq.fetch_add(1, Ordering::SeqCst) + 1;
        match self.source.recent_readings().await {
            Ok(readings) => {
                tracing::debug!("History fetch #{} returned {} readings", seq, readings.len());
                self.dispatch(DashboardEvent::HistoryLoaded { seq, readings })
                    .await
            }
            Err(e) => {
                tracing::warn!("Error fetching sensor history: {}", e);
                None
            }
        }
    }

    /// Pull the table's backing list from the configured endpoint.
    pub async fn refresh_table(&self) -> Option<Outcome> {
        let seq = self.table_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let result = match self.settings.table_source {
            TableSource::Recent => self.source.recent_readings().await,
            TableSource::Filtered => self.source.filtered_readings().await,
        };
        match result {
            Ok(readings) => {
                tracing::debug!("Table fetch #{} returned {} readings", seq, readings.len());
                self.dispatch(DashboardEvent::TableLoaded { seq, readings })
                    .await
            }
            Err(e) => {
                tracing::warn!("Error fetching table data: {}", e);
                None
            }
        }
    }

    pub async fn ingest_snapshot(&self, snapshot: LiveSnapshot) -> Option<Outcome> {
        self.dispatch(DashboardEvent::LiveUpdate {
            snapshot,
            at: Utc::now(),
        })
        .await
    }

    pub async fn change_page(&self, page: usize) -> Option<Outcome> {
        self.dispatch(DashboardEvent::PageChanged(page)).await
    }

    pub async fn change_rows_per_page(&self, rows: usize) -> Option<Outcome> {
        self.dispatch(DashboardEvent::RowsPerPageChanged(rows)).await
    }

    /// Spawn the history and table timers. Both fire immediately, then on their
    /// configured period, and stop when `shutdown` flips.
    pub fn spawn_pollers(&self, shutdown: watch::Receiver<bool>) -> Vec<JoinHandle<()>> {
        let history = self.clone();
        let table = self.clone();

        vec![
            tokio::spawn(run_every(
                "history",
                self.settings.history_poll_interval(),
                shutdown.clone(),
                move || {
                    let service = history.clone();
                    async move {
                        service.refresh_history().await;
                    }
                },
            )),
            tokio::spawn(run_every(
                "table",
                self.settings.table_refresh_interval(),
                shutdown,
                move || {
                    let service = table.clone();
                    async move {
                        service.refresh_table().await;
                    }
                },
            )),
        ]
    }
}

async fn run_every<F, Fut>(
    name: &'static str,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
    mut task: F,
) where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tracing::info!("Starting {} poller every {:?}", name, period);

    loop {
        tokio::select! {
            _ = interval.tick() => task().await,
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    tracing::info!("Stopped {} poller", name);
}

fn event_label(event: &DashboardEvent) -> &'static str {
    match event {
        DashboardEvent::HistoryLoaded { .. } => "history_loaded",
        DashboardEvent::TableLoaded { .. } => "table_loaded",
        DashboardEvent::LiveUpdate { .. } => "live_update",
        DashboardEvent::PageChanged(_) => "page_changed",
        DashboardEvent::RowsPerPageChanged(_) => "rows_per_page_changed",
    }
}
