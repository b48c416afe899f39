// Live snapshot domain model - latest instantaneous values pushed over the live channel
use serde::{Deserialize, Deserializer};

pub const PLACEHOLDER: &str = "--";

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct LiveSnapshot {
    #[serde(default, deserialize_with = "lenient_value")]
    pub temperature: Option<f64>,
    #[serde(default, deserialize_with = "lenient_value")]
    pub humidity: Option<f64>,
}

impl LiveSnapshot {
    pub fn new(temperature: Option<f64>, humidity: Option<f64>) -> Self {
        Self {
            temperature,
            humidity,
        }
    }

    /// Both values, or `None` for partial and placeholder snapshots.
    pub fn complete(&self) -> Option<(f64, f64)> {
        self.temperature.zip(self.humidity)
    }

    pub fn temperature_display(&self) -> String {
        display(self.temperature)
    }

    pub fn humidity_display(&self) -> String {
        display(self.humidity)
    }
}

fn display(value: Option<f64>) -> String {
    value.map_or_else(|| PLACEHOLDER.to_string(), |v| v.to_string())
}

// Numbers or numeric strings count; placeholders, blanks and other shapes read as absent
fn lenient_value<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    })
}
