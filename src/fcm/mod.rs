//! Firebase Cloud Messaging
//!
//! - `client`: FCM HTTP v1 client for single-device sends
//! - `credentials`: OAuth2 access token sources and caching
//! - `models`: payload and wire types
//! - `errors`: provider error type

mod client;
mod credentials;
mod errors;
mod models;

use async_trait::async_trait;

pub use client::FcmClient;
pub use credentials::{load_service_account, sign_assertion, TokenProvider, TokenSource, FCM_SCOPE};
pub use errors::FcmError;
pub use models::{FcmSendRequest, MessagingPayload, NotificationPayload, SendResponse, ServiceAccountKey};

/// Sends a push notification to a single device
#[async_trait]
pub trait PushSender: Send + Sync {
    async fn send_to_device(
        &self,
        token: &str,
        payload: &MessagingPayload,
    ) -> Result<SendResponse, FcmError>;
}
