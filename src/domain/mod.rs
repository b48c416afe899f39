// Domain layer - Sensor readings, chart windows, settings and views
pub mod dashboard;
pub mod reading;
pub mod settings;
pub mod snapshot;
pub mod table;
pub mod telemetry;
