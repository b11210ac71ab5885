//! Notification records and forwarding to the push provider.

mod forwarder;
mod record;

pub use forwarder::{ForwarderStats, ForwarderStatsSnapshot, NotificationForwarder};
pub use record::{NotificationRecord, APP_TOKEN_FIELD, BODY_FIELD, TITLE_FIELD};
