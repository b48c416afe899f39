// Settings domain models - alert thresholds and notification phone number
use serde::{Deserialize, Serialize};

/// A threshold as entered in the editor: the backend stores whatever was typed,
/// so a value may come back as a number or as text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ThresholdValue {
    Number(f64),
    Text(String),
}

impl Default for ThresholdValue {
    fn default() -> Self {
        ThresholdValue::Text(String::new())
    }
}

impl ThresholdValue {
    pub fn is_blank(&self) -> bool {
        matches!(self, ThresholdValue::Text(s) if s.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    #[serde(default, deserialize_with = "blank_if_null")]
    pub temperature: ThresholdValue,
    #[serde(default, deserialize_with = "blank_if_null")]
    pub humidity: ThresholdValue,
}

impl ThresholdConfig {
    pub fn new(temperature: ThresholdValue, humidity: ThresholdValue) -> Self {
        Self {
            temperature,
            humidity,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationConfig {
    // Loaded as `phone`, saved as `phoneNumber`
    #[serde(rename = "phoneNumber", alias = "phone", default)]
    pub phone_number: String,
}

impl NotificationConfig {
    pub fn new(phone_number: impl Into<String>) -> Self {
        Self {
            phone_number: phone_number.into(),
        }
    }
}

fn blank_if_null<'de, D>(deserializer: D) -> Result<ThresholdValue, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<ThresholdValue>::deserialize(deserializer)?.unwrap_or_default())
}
