mod handlers;
mod models;

pub use handlers::firestore_event;
pub use models::{TriggerResponse, TriggerStatus};
