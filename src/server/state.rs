use std::sync::Arc;
use std::time::Instant;

use uuid::Uuid;

use crate::config::Settings;
use crate::error::Result;
use crate::fcm::{FcmClient, PushSender};
use crate::notification::NotificationForwarder;
use crate::triggers::DocumentPattern;

/// Provider details surfaced on the health endpoint
#[derive(Debug, Clone)]
pub struct ProviderInfo {
    pub project_id: String,
    pub token_source: String,
    pub dry_run: bool,
}

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub pattern: Arc<DocumentPattern>,
    pub forwarder: Arc<NotificationForwarder>,
    pub provider: Arc<ProviderInfo>,
    pub instance_id: Uuid,
    pub start_time: Instant,
}

impl AppState {
    /// Build the process-wide state: resolve credentials and create the FCM client once.
    pub fn new(settings: Settings) -> Result<Self> {
        let client = FcmClient::from_config(&settings.fcm)?;
        let provider = ProviderInfo {
            project_id: client.project_id().to_string(),
            token_source: client.token_source().to_string(),
            dry_run: client.dry_run(),
        };

        Self::with_sender(settings, Arc::new(client), provider)
    }

    /// Build state around an existing sender
    pub fn with_sender(
        settings: Settings,
        sender: Arc<dyn PushSender>,
        provider: ProviderInfo,
    ) -> Result<Self> {
        let pattern = DocumentPattern::parse(&settings.trigger.document_pattern)?;
        let forwarder = NotificationForwarder::new(sender, settings.trigger.click_action.clone());

        Ok(Self {
            settings: Arc::new(settings),
            pattern: Arc::new(pattern),
            forwarder: Arc::new(forwarder),
            provider: Arc::new(provider),
            instance_id: Uuid::new_v4(),
            start_time: Instant::now(),
        })
    }
}
