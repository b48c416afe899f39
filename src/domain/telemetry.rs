// Telemetry chart domain models - bounded rolling series and chart-ready data
use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use std::collections::VecDeque;

use super::reading::Reading;

pub const HUMIDITY_COLOR: &str = "#2196f3";
pub const TEMPERATURE_COLOR: &str = "#ff5722";

/// Human-readable time-of-day label for a chart point.
pub fn time_label(time: DateTime<Utc>) -> String {
    time.with_timezone(&Local).format("%H:%M:%S").to_string()
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPoint {
    pub time: DateTime<Utc>,
    pub label: String,
    pub value: f64,
}

impl SeriesPoint {
    pub fn new(time: DateTime<Utc>, value: f64) -> Self {
        Self {
            time,
            label: time_label(time),
            value,
        }
    }
}

/// FIFO window of at most `max_points` points; the oldest point is evicted first.
#[derive(Debug, Clone, PartialEq)]
pub struct RollingSeries {
    max_points: usize,
    points: VecDeque<SeriesPoint>,
}

impl RollingSeries {
    pub fn new(max_points: usize) -> Self {
        Self {
            max_points,
            points: VecDeque::with_capacity(max_points),
        }
    }

    /// Build a window from `points`, keeping only the last `max_points`.
    pub fn from_points<I>(max_points: usize, points: I) -> Self
    where
        I: IntoIterator<Item = SeriesPoint>,
    {
        let mut series = Self::new(max_points);
        for point in points {
            series.push(point);
        }
        series
    }

    pub fn push(&mut self, point: SeriesPoint) {
        if self.max_points == 0 {
            return;
        }
        while self.points.len() >= self.max_points {
            self.points.pop_front();
        }
        self.points.push_back(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = &SeriesPoint> {
        self.points.iter()
    }

    pub fn labels(&self) -> Vec<String> {
        self.points.iter().map(|p| p.label.clone()).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }
}

/// Temperature and humidity sharing one time axis.
#[derive(Debug, Clone, PartialEq)]
pub struct CombinedSeries {
    pub temperature: RollingSeries,
    pub humidity: RollingSeries,
}

/// The three chart windows, always rebuilt or appended in lockstep so labels align.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartWindows {
    pub humidity: RollingSeries,
    pub temperature: RollingSeries,
    pub combined: CombinedSeries,
}

impl ChartWindows {
    pub fn new(max_points: usize) -> Self {
        Self {
            humidity: RollingSeries::new(max_points),
            temperature: RollingSeries::new(max_points),
            combined: CombinedSeries {
                temperature: RollingSeries::new(max_points),
                humidity: RollingSeries::new(max_points),
            },
        }
    }

    /// Rebuild every window from readings already ordered oldest first.
    pub fn from_readings(max_points: usize, readings: &[Reading]) -> Self {
        let temperature = |r: &Reading| SeriesPoint::new(r.created_at, r.temperature);
        let humidity = |r: &Reading| SeriesPoint::new(r.created_at, r.humidity);

        Self {
            humidity: RollingSeries::from_points(max_points, readings.iter().map(humidity)),
            temperature: RollingSeries::from_points(max_points, readings.iter().map(temperature)),
            combined: CombinedSeries {
                temperature: RollingSeries::from_points(
                    max_points,
                    readings.iter().map(temperature),
                ),
                humidity: RollingSeries::from_points(max_points, readings.iter().map(humidity)),
            },
        }
    }

    pub fn append(&mut self, time: DateTime<Utc>, temperature: f64, humidity: f64) {
        self.humidity.push(SeriesPoint::new(time, humidity));
        self.temperature.push(SeriesPoint::new(time, temperature));
        self.combined.temperature.push(SeriesPoint::new(time, temperature));
        self.combined.humidity.push(SeriesPoint::new(time, humidity));
    }

    pub fn charts(&self) -> Vec<ChartData> {
        vec![
            ChartData::new(
                "humidity".to_string(),
                "Current Humidity".to_string(),
                Some("%".to_string()),
                ChartKind::Line,
                self.humidity.labels(),
                vec![SeriesData::humidity(self.humidity.values())],
            ),
            ChartData::new(
                "temperature".to_string(),
                "Temperature Over Time".to_string(),
                Some("°C".to_string()),
                ChartKind::Line,
                self.temperature.labels(),
                vec![SeriesData::temperature(self.temperature.values())],
            ),
            ChartData::new(
                "temperature_humidity".to_string(),
                "Temperature vs. Humidity Over Time".to_string(),
                None,
                ChartKind::MultiLine,
                self.combined.temperature.labels(),
                vec![
                    SeriesData::temperature(self.combined.temperature.values()),
                    SeriesData::humidity(self.combined.humidity.values()),
                ],
            ),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesData {
    pub id: String,
    pub name: String,
    pub color: Option<String>,
    pub values: Vec<f64>,
}

impl SeriesData {
    pub fn new(id: String, name: String, color: Option<String>, values: Vec<f64>) -> Self {
        Self {
            id,
            name,
            color,
            values,
        }
    }

    fn temperature(values: Vec<f64>) -> Self {
        Self::new(
            "temperature".to_string(),
            "Temperature (°C)".to_string(),
            Some(TEMPERATURE_COLOR.to_string()),
            values,
        )
    }

    fn humidity(values: Vec<f64>) -> Self {
        Self::new(
            "humidity".to_string(),
            "Humidity (%)".to_string(),
            Some(HUMIDITY_COLOR.to_string()),
            values,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    pub id: String,
    pub title: String,
    pub unit: Option<String>,
    pub kind: ChartKind,
    pub labels: Vec<String>,
    pub series: Vec<SeriesData>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ChartKind {
    Line,
    MultiLine,
}

impl ChartData {
    pub fn new(
        id: String,
        title: String,
        unit: Option<String>,
        kind: ChartKind,
        labels: Vec<String>,
        series: Vec<SeriesData>,
    ) -> Self {
        Self {
            id,
            title,
            unit,
            kind,
            labels,
            series,
        }
    }
}
