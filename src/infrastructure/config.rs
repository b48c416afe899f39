use crate::domain::reading::StatusDisplayMap;
use crate::domain::table::DEFAULT_ROWS_PER_PAGE;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub backend: BackendSettings,
    pub aggregator: AggregatorSettings,
    pub status_colors: StatusDisplayMap,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerSettings {
    pub bind_addr: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BackendSettings {
    pub base_url: String,
    /// Defaults to `base_url` with the scheme switched to ws/wss
    pub live_url: Option<String>,
    pub request_timeout_secs: u64,
    pub reconnect_delay_secs: u64,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:4000".to_string(),
            live_url: None,
            request_timeout_secs: 10,
            reconnect_delay_secs: 5,
        }
    }
}

impl BackendSettings {
    pub fn live_url(&self) -> String {
        if let Some(url) = &self.live_url {
            return url.clone();
        }
        let base = self.base_url.trim_end_matches('/');
        if let Some(rest) = base.strip_prefix("https://") {
            format!("wss://{}", rest)
        } else if let Some(rest) = base.strip_prefix("http://") {
            format!("ws://{}", rest)
        } else {
            base.to_string()
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_delay_secs)
    }
}

/// Which endpoint backs the readings table.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TableSource {
    #[default]
    Recent,
    Filtered,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AggregatorSettings {
    pub history_poll_secs: u64,
    pub table_refresh_secs: u64,
    pub table_source: TableSource,
    pub max_points: usize,
    pub append_min_interval_secs: u64,
    pub rows_per_page: usize,
}

impl Default for AggregatorSettings {
    fn default() -> Self {
        Self {
            history_poll_secs: 60,
            table_refresh_secs: 60,
            table_source: TableSource::Recent,
            max_points: 10,
            append_min_interval_secs: 60,
            rows_per_page: DEFAULT_ROWS_PER_PAGE,
        }
    }
}

impl AggregatorSettings {
    pub fn history_poll_interval(&self) -> Duration {
        Duration::from_secs(self.history_poll_secs.max(1))
    }

    pub fn table_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.table_refresh_secs.max(1))
    }

    /// Values past chrono's range saturate, which stops appends after the first
    pub fn append_min_interval(&self) -> chrono::Duration {
        i64::try_from(self.append_min_interval_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .unwrap_or(chrono::TimeDelta::MAX)
    }
}

/// Optional `config/dashboard.*` file, overridden by `DASHBOARD__SECTION__KEY` variables.
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard").required(false))
        .add_source(config::Environment::with_prefix("DASHBOARD").separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_sources() {
        let config: AppConfig = config::Config::builder()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.server.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.aggregator.max_points, 10);
        assert_eq!(config.aggregator.history_poll_interval(), Duration::from_secs(60));
        assert_eq!(config.aggregator.table_source, TableSource::Recent);
        assert_eq!(config.status_colors.both_exceeded, "red");
    }

    #[test]
    fn test_file_overrides() {
        let toml = r##"
            [backend]
            base_url = "https://sensors.example.com/"

            [aggregator]
            table_source = "filtered"
            table_refresh_secs = 1800

            [status_colors]
            single_exceeded = "#ffa000"
        "##;
        let config: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.backend.live_url(), "wss://sensors.example.com");
        assert_eq!(config.aggregator.table_source, TableSource::Filtered);
        assert_eq!(config.aggregator.table_refresh_interval(), Duration::from_secs(1800));
        assert_eq!(config.aggregator.max_points, 10);
        assert_eq!(config.status_colors.single_exceeded, "#ffa000");
        assert_eq!(config.status_colors.normal, "green");
    }

    #[test]
    fn test_append_interval_out_of_range_saturates() {
        let settings = AggregatorSettings {
            append_min_interval_secs: u64::MAX,
            ..AggregatorSettings::default()
        };
        assert_eq!(settings.append_min_interval(), chrono::TimeDelta::MAX);

        let settings = AggregatorSettings {
            append_min_interval_secs: 90,
            ..AggregatorSettings::default()
        };
        assert_eq!(settings.append_min_interval(), chrono::Duration::seconds(90));
    }

    #[test]
    fn test_live_url_derivation() {
        let mut backend = BackendSettings::default();
        assert_eq!(backend.live_url(), "ws://localhost:4000");

        backend.live_url = Some("ws://push.local:9000/live".to_string());
        assert_eq!(backend.live_url(), "ws://push.local:9000/live");
    }
}
