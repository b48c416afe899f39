// Reading domain model - one sensor sample as served by the telemetry backend
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    #[serde(alias = "_id", deserialize_with = "opaque_id")]
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub temperature: f64,
    pub humidity: f64,
    #[serde(default)]
    pub status: ReadingStatus,
}

/// Status classification computed upstream.
///
/// Two schemas are in use: `NORMAL/WARNING` and
/// `NORMAL/TEM_EXCEED/HUM_EXCEED/BOTH_EXCEED`. Both decode here; anything else
/// is kept verbatim as `Unknown`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ReadingStatus {
    Normal,
    Warning,
    TemperatureExceeded,
    HumidityExceeded,
    BothExceeded,
    Unknown(String),
}

impl Default for ReadingStatus {
    fn default() -> Self {
        ReadingStatus::Unknown(String::new())
    }
}

impl From<String> for ReadingStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "NORMAL" => ReadingStatus::Normal,
            "WARNING" => ReadingStatus::Warning,
            "TEM_EXCEED" => ReadingStatus::TemperatureExceeded,
            "HUM_EXCEED" => ReadingStatus::HumidityExceeded,
            "BOTH_EXCEED" => ReadingStatus::BothExceeded,
            _ => ReadingStatus::Unknown(raw),
        }
    }
}

impl From<ReadingStatus> for String {
    fn from(status: ReadingStatus) -> Self {
        status.code().to_string()
    }
}

impl ReadingStatus {
    pub fn code(&self) -> &str {
        match self {
            ReadingStatus::Normal => "NORMAL",
            ReadingStatus::Warning => "WARNING",
            ReadingStatus::TemperatureExceeded => "TEM_EXCEED",
            ReadingStatus::HumidityExceeded => "HUM_EXCEED",
            ReadingStatus::BothExceeded => "BOTH_EXCEED",
            ReadingStatus::Unknown(raw) => raw,
        }
    }
}

/// Display colors per status class, configurable per deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusDisplayMap {
    pub normal: String,
    pub single_exceeded: String,
    pub both_exceeded: String,
    pub unknown: String,
}

impl Default for StatusDisplayMap {
    fn default() -> Self {
        Self {
            normal: "green".to_string(),
            single_exceeded: "orange".to_string(),
            both_exceeded: "red".to_string(),
            unknown: "black".to_string(),
        }
    }
}

impl StatusDisplayMap {
    pub fn color_for(&self, status: &ReadingStatus) -> &str {
        match status {
            ReadingStatus::Normal => &self.normal,
            ReadingStatus::Warning
            | ReadingStatus::TemperatureExceeded
            | ReadingStatus::HumidityExceeded => &self.single_exceeded,
            ReadingStatus::BothExceeded => &self.both_exceeded,
            ReadingStatus::Unknown(_) => &self.unknown,
        }
    }
}

// Backends hand out either Mongo-style string ids or integer keys
fn opaque_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "unsupported reading id: {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_reading() {
        let json = r#"{
            "_id": "65f1c2",
            "createdAt": "2024-03-13T10:15:00.000Z",
            "temperature": 24.5,
            "humidity": 61.2,
            "status": "TEM_EXCEED"
        }"#;

        let reading: Reading = serde_json::from_str(json).unwrap();
        assert_eq!(reading.id, "65f1c2");
        assert_eq!(reading.temperature, 24.5);
        assert_eq!(reading.status, ReadingStatus::TemperatureExceeded);
        assert_eq!(reading.created_at.to_rfc3339(), "2024-03-13T10:15:00+00:00");
    }

    #[test]
    fn test_numeric_id_and_missing_status() {
        let json =
            r#"{"id": 42, "createdAt": "2024-03-13T10:15:00Z", "temperature": 20, "humidity": 40}"#;

        let reading: Reading = serde_json::from_str(json).unwrap();
        assert_eq!(reading.id, "42");
        assert_eq!(reading.status, ReadingStatus::Unknown(String::new()));
    }

    #[test]
    fn test_status_colors() {
        let colors = StatusDisplayMap::default();

        assert_eq!(colors.color_for(&ReadingStatus::Normal), "green");
        assert_eq!(colors.color_for(&ReadingStatus::Warning), "orange");
        assert_eq!(colors.color_for(&ReadingStatus::HumidityExceeded), "orange");
        assert_eq!(colors.color_for(&ReadingStatus::TemperatureExceeded), "orange");
        assert_eq!(colors.color_for(&ReadingStatus::BothExceeded), "red");
        assert_eq!(colors.color_for(&ReadingStatus::from("CALIBRATING".to_string())), "black");
    }

    #[test]
    fn test_unknown_status_round_trips_verbatim() {
        let status = ReadingStatus::from("CALIBRATING".to_string());
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"CALIBRATING\"");
    }
}
