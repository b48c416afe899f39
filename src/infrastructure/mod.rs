// Infrastructure layer - External dependencies and adapters
pub mod chunked_stream;
pub mod config;
pub mod http_backend;
pub mod http_response;
pub mod live_channel;
