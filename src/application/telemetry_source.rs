// Source traits for the sensor backend - readings and settings records
use crate::domain::reading::Reading;
use async_trait::async_trait;
use thiserror::Error;

/// Everything that can go wrong talking to the backend. Callers log and carry on.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("{url} responded with status {status}: {body}")]
    Status { url: String, status: u16, body: String },

    #[error("failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },
}

#[async_trait]
pub trait TelemetrySource: Send + Sync {
    /// Full list of recent readings, in whatever order the backend returns them
    async fn recent_readings(&self) -> Result<Vec<Reading>, SourceError>;

    /// Filtered / aggregated readings used by some table layouts
    async fn filtered_readings(&self) -> Result<Vec<Reading>, SourceError>;
}

/// Load and save a single settings record.
#[async_trait]
pub trait SettingsEndpoint<T>: Send + Sync {
    async fn load(&self) -> Result<T, SourceError>;

    async fn save(&self, value: &T) -> Result<(), SourceError>;
}
