// Application state for HTTP handlers
use crate::application::dashboard_service::DashboardService;
use crate::application::settings_service::SettingsEditor;
use crate::domain::reading::StatusDisplayMap;
use crate::domain::settings::{NotificationConfig, ThresholdConfig};
use tokio::sync::watch;

#[derive(Clone)]
pub struct AppState {
    pub dashboard: DashboardService,
    pub thresholds: SettingsEditor<ThresholdConfig>,
    pub phone: SettingsEditor<NotificationConfig>,
    pub status_colors: StatusDisplayMap,
    /// Flips to true when the server is shutting down; open streams end
    pub shutdown: watch::Receiver<bool>,
}
