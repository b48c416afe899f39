// Dashboard domain model - render-ready views handed to the UI
use chrono::Local;
use serde::Serialize;

use super::reading::{Reading, StatusDisplayMap};
use super::snapshot::LiveSnapshot;
use super::table::{ROWS_PER_PAGE_OPTIONS, TableState};
use super::telemetry::ChartData;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveView {
    pub temperature: String,
    pub humidity: String,
}

impl From<&LiveSnapshot> for LiveView {
    fn from(snapshot: &LiveSnapshot) -> Self {
        Self {
            temperature: snapshot.temperature_display(),
            humidity: snapshot.humidity_display(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub title: String,
    pub live: LiveView,
    pub charts: Vec<ChartData>,
}

impl Dashboard {
    pub fn new(title: String, live: LiveView, charts: Vec<ChartData>) -> Self {
        Self {
            title,
            live,
            charts,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRow {
    pub id: String,
    pub date: String,
    pub time: String,
    pub temperature: String,
    pub humidity: String,
    pub status: String,
    pub color: String,
}

impl TableRow {
    pub fn new(reading: &Reading, colors: &StatusDisplayMap) -> Self {
        let local = reading.created_at.with_timezone(&Local);
        Self {
            id: reading.id.clone(),
            date: local.format("%Y-%m-%d").to_string(),
            time: local.format("%H:%M:%S").to_string(),
            temperature: format!("{:.1}", reading.temperature),
            humidity: format!("{:.1}", reading.humidity),
            status: reading.status.code().to_string(),
            color: colors.color_for(&reading.status).to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableView {
    pub page: usize,
    pub rows_per_page: usize,
    pub rows_per_page_options: Vec<usize>,
    pub total_rows: usize,
    pub page_count: usize,
    pub rows: Vec<TableRow>,
}

impl TableView {
    pub fn new(readings: &[Reading], table: &TableState, colors: &StatusDisplayMap) -> Self {
        Self {
            page: table.page(),
            rows_per_page: table.rows_per_page(),
            rows_per_page_options: ROWS_PER_PAGE_OPTIONS.to_vec(),
            total_rows: readings.len(),
            page_count: table.page_count(readings.len()),
            rows: table
                .slice(readings)
                .iter()
                .map(|r| TableRow::new(r, colors))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::reading::ReadingStatus;
    use chrono::{Duration, TimeZone, Utc};

    fn readings(count: i64) -> Vec<Reading> {
        let start = Utc.with_ymd_and_hms(2024, 3, 13, 8, 0, 0).unwrap();
        (0..count)
            .map(|i| Reading {
                id: format!("r{}", i),
                created_at: start + Duration::minutes(i),
                temperature: 21.26,
                humidity: 40.0,
                status: if i % 2 == 0 {
                    ReadingStatus::Normal
                } else {
                    ReadingStatus::BothExceeded
                },
            })
            .collect()
    }

    #[test]
    fn test_table_view_slices_current_page() {
        let rows = readings(25);
        let mut table = TableState::new(10).unwrap();
        table.set_page(1);

        let view = TableView::new(&rows, &table, &StatusDisplayMap::default());
        assert_eq!(view.total_rows, 25);
        assert_eq!(view.page_count, 3);
        let ids: Vec<&str> = view.rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, (10..20).map(|i| format!("r{}", i)).collect::<Vec<_>>());
    }

    #[test]
    fn test_table_row_formatting() {
        let rows = readings(2);
        let colors = StatusDisplayMap::default();

        let row = TableRow::new(&rows[1], &colors);
        assert_eq!(row.temperature, "21.3");
        assert_eq!(row.humidity, "40.0");
        assert_eq!(row.status, "BOTH_EXCEED");
        assert_eq!(row.color, "red");
    }

    #[test]
    fn test_live_view_placeholders() {
        let view = LiveView::from(&LiveSnapshot::new(Some(22.5), None));
        assert_eq!(view.temperature, "22.5");
        assert_eq!(view.humidity, "--");
    }
}
