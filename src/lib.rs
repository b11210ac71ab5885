// Supporting modules
pub mod config;
pub mod error;
pub mod metrics;
pub mod shutdown;
pub mod telemetry;

// Domain layer
pub mod fcm;
pub mod notification;
pub mod triggers;

// Application layer
pub mod api;
pub mod server;
