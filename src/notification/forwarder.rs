use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;

use crate::fcm::{FcmError, PushSender, SendResponse};

use super::NotificationRecord;

/// Statistics for the forwarder
#[derive(Debug, Default)]
pub struct ForwarderStats {
    /// Sends accepted by the provider
    pub total_forwarded: AtomicU64,
    /// Sends that failed
    pub total_failed: AtomicU64,
}

impl ForwarderStats {
    pub fn snapshot(&self) -> ForwarderStatsSnapshot {
        ForwarderStatsSnapshot {
            total_forwarded: self.total_forwarded.load(Ordering::Relaxed),
            total_failed: self.total_failed.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of forwarder statistics
#[derive(Debug, Clone, Serialize)]
pub struct ForwarderStatsSnapshot {
    pub total_forwarded: u64,
    pub total_failed: u64,
}

/// Forwards notification records to a single device through a [`PushSender`]
pub struct NotificationForwarder {
    sender: Arc<dyn PushSender>,
    click_action: String,
    stats: ForwarderStats,
}

impl NotificationForwarder {
    pub fn new(sender: Arc<dyn PushSender>, click_action: impl Into<String>) -> Self {
        Self {
            sender,
            click_action: click_action.into(),
            stats: ForwarderStats::default(),
        }
    }

    pub fn click_action(&self) -> &str {
        &self.click_action
    }

    /// Send one notification for `record`.
    ///
    /// Exactly one provider call is made. Provider errors are returned as-is;
    /// nothing is retried.
    #[tracing::instrument(
        name = "forwarder.forward",
        skip(self, record),
        fields(has_token = record.app_token.is_some())
    )]
    pub async fn forward(&self, record: &NotificationRecord) -> Result<SendResponse, FcmError> {
        let payload = record.to_payload(&self.click_action);
        let token = record.app_token.as_deref().unwrap_or_default();

        match self.sender.send_to_device(token, &payload).await {
            Ok(response) => {
                self.stats.total_forwarded.fetch_add(1, Ordering::Relaxed);
                tracing::info!(message_id = %response.message_id, "Notification forwarded");
                Ok(response)
            }
            Err(e) => {
                self.stats.total_failed.fetch_add(1, Ordering::Relaxed);
                Err(e)
            }
        }
    }

    pub fn stats(&self) -> ForwarderStatsSnapshot {
        self.stats.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fcm::MessagingPayload;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSender {
        calls: Mutex<Vec<(String, MessagingPayload)>>,
    }

    #[async_trait]
    impl PushSender for RecordingSender {
        async fn send_to_device(
            &self,
            token: &str,
            payload: &MessagingPayload,
        ) -> Result<SendResponse, FcmError> {
            self.calls
                .lock()
                .unwrap()
                .push((token.to_string(), payload.clone()));
            if token.is_empty() {
                return Err(FcmError::InvalidArgument("empty token".to_string()));
            }
            Ok(SendResponse {
                message_id: "projects/p/messages/1".to_string(),
            })
        }
    }

    fn record(token: Option<&str>) -> NotificationRecord {
        NotificationRecord {
            title: "Hi".to_string(),
            body: "There".to_string(),
            app_token: token.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_forward_sends_once() {
        let sender = Arc::new(RecordingSender::default());
        let forwarder = NotificationForwarder::new(sender.clone(), "FLUTTER_NOTIFICATION_CLICK");

        let response = forwarder.forward(&record(Some("tok123"))).await.unwrap();
        assert_eq!(response.message_id, "projects/p/messages/1");

        let calls = sender.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "tok123");
        assert_eq!(calls[0].1.notification.title, "Hi");
        assert_eq!(calls[0].1.notification.body, "There");
        assert_eq!(
            calls[0].1.notification.click_action,
            "FLUTTER_NOTIFICATION_CLICK"
        );
        assert_eq!(forwarder.stats().total_forwarded, 1);
    }

    #[tokio::test]
    async fn test_missing_token_propagates_failure() {
        let sender = Arc::new(RecordingSender::default());
        let forwarder = NotificationForwarder::new(sender.clone(), "FLUTTER_NOTIFICATION_CLICK");

        let err = forwarder.forward(&record(None)).await.unwrap_err();
        assert!(matches!(err, FcmError::InvalidArgument(_)));

        // still exactly one attempt, no retry
        assert_eq!(sender.calls.lock().unwrap().len(), 1);
        assert_eq!(forwarder.stats().total_failed, 1);
        assert_eq!(forwarder.stats().total_forwarded, 0);
    }
}
