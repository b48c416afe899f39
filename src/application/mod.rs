// Application layer - Aggregation, polling and settings use cases
pub mod aggregator;
pub mod dashboard_service;
pub mod settings_service;
pub mod telemetry_source;
