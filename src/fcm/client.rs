use std::time::Instant;

use async_trait::async_trait;

use crate::config::FcmConfig;
use crate::metrics::PushMetrics;

use super::credentials::{TokenProvider, TokenSource};
use super::errors::FcmError;
use super::models::{
    FcmApiResponse, FcmSendRequest, GoogleErrorEnvelope, MessagingPayload, SendResponse,
};
use super::PushSender;

/// Firebase Cloud Messaging client
///
/// Created once per process and shared by every invocation. Sends through the
/// FCM HTTP v1 API, authenticating with a cached OAuth2 access token.
pub struct FcmClient {
    project_id: String,
    base_url: String,
    dry_run: bool,
    tokens: TokenProvider,
    http_client: reqwest::Client,
}

impl FcmClient {
    /// Create a client for `project_id` authenticating through `source`
    pub fn new(project_id: impl Into<String>, source: TokenSource) -> Self {
        let http_client = reqwest::Client::new();
        Self {
            project_id: project_id.into(),
            base_url: "https://fcm.googleapis.com".to_string(),
            dry_run: false,
            tokens: TokenProvider::new(source, http_client.clone()),
            http_client,
        }
    }

    /// Resolve credentials and project from configuration
    pub fn from_config(config: &FcmConfig) -> Result<Self, FcmError> {
        let source = TokenSource::from_config(config)?;

        let project_id = config
            .project_id
            .clone()
            .or_else(|| source.project_id().map(str::to_string))
            .ok_or_else(|| {
                FcmError::Credentials(
                    "no project id configured and none found in the service account key"
                        .to_string(),
                )
            })?;

        tracing::info!(
            project_id = %project_id,
            token_source = source.kind(),
            dry_run = config.dry_run,
            "FCM client initialized"
        );

        Ok(Self::new(project_id, source)
            .with_base_url(&config.base_url)
            .with_dry_run(config.dry_run))
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn token_source(&self) -> &'static str {
        self.tokens.source().kind()
    }

    fn send_url(&self) -> String {
        format!(
            "{}/v1/projects/{}/messages:send",
            self.base_url, self.project_id
        )
    }

    async fn post_message(&self, request: &FcmSendRequest) -> Result<SendResponse, FcmError> {
        let access_token = self.tokens.access_token().await?;

        let response = self
            .http_client
            .post(self.send_url())
            .bearer_auth(access_token)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let body: FcmApiResponse = response
                .json()
                .await
                .map_err(|e| FcmError::ResponseParse(e.to_string()))?;

            return body
                .name
                .map(|message_id| SendResponse { message_id })
                .ok_or_else(|| FcmError::ResponseParse("missing message name".to_string()));
        }

        let text = response.text().await.unwrap_or_default();
        Err(match serde_json::from_str::<GoogleErrorEnvelope>(&text) {
            Ok(envelope) => FcmError::Api {
                status: status.as_u16(),
                code: envelope
                    .error
                    .code()
                    .unwrap_or_else(|| status.as_str().to_string()),
                message: envelope.error.message,
            },
            Err(_) => FcmError::Api {
                status: status.as_u16(),
                code: status.as_str().to_string(),
                message: text,
            },
        })
    }
}

#[async_trait]
impl PushSender for FcmClient {
    #[tracing::instrument(
        name = "fcm.send_to_device",
        skip(self, token, payload),
        fields(project_id = %self.project_id, dry_run = self.dry_run)
    )]
    async fn send_to_device(
        &self,
        token: &str,
        payload: &MessagingPayload,
    ) -> Result<SendResponse, FcmError> {
        if token.trim().is_empty() {
            return Err(FcmError::InvalidArgument(
                "registration token must be a non-empty string".to_string(),
            ));
        }

        let request = FcmSendRequest::for_device(token, payload, self.dry_run);

        let start = Instant::now();
        let result = self.post_message(&request).await;
        PushMetrics::record_latency(start.elapsed());

        match &result {
            Ok(response) => {
                tracing::debug!(message_id = %response.message_id, "FCM accepted message")
            }
            Err(e) => tracing::warn!(
                code = e.code(),
                invalid_token = e.is_invalid_token(),
                error = %e,
                "FCM rejected message"
            ),
        }

        result
    }
}
