use serde::{Deserialize, Serialize};

/// Provider-neutral payload handed to a [`PushSender`](super::PushSender)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagingPayload {
    pub notification: NotificationPayload,
}

/// Visible notification content plus the tap-through routing hint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub title: String,
    pub body: String,
    pub click_action: String,
}

/// Result of a successful single-device send
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendResponse {
    /// Provider message name, `projects/{project}/messages/{id}`
    pub message_id: String,
}

/// Firebase service account key (the JSON file downloaded from the console)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceAccountKey {
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub private_key_id: Option<String>,
    pub private_key: String,
    pub client_email: String,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

/// JWT claims for the OAuth2 JWT-bearer grant
#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub iss: String,
    pub sub: String,
    pub scope: String,
    pub aud: String,
    pub exp: i64,
    pub iat: i64,
}

/// Google OAuth2 token response, shared by the token URI and the metadata server
#[derive(Debug, Deserialize)]
pub struct GoogleTokenResponse {
    pub access_token: String,
    pub expires_in: i64,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// FCM v1 `messages:send` request body
#[derive(Debug, Serialize)]
pub struct FcmSendRequest {
    pub message: FcmMessage,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub validate_only: bool,
}

impl FcmSendRequest {
    /// Build a single-device request. The click action is carried in both the
    /// Android notification and the APNs category so either client can route it.
    pub fn for_device(token: &str, payload: &MessagingPayload, validate_only: bool) -> Self {
        let notification = &payload.notification;
        Self {
            message: FcmMessage {
                token: token.to_string(),
                notification: FcmNotification {
                    title: notification.title.clone(),
                    body: notification.body.clone(),
                },
                android: AndroidConfig {
                    notification: AndroidNotification {
                        click_action: notification.click_action.clone(),
                    },
                },
                apns: ApnsConfig {
                    payload: ApnsPayload {
                        aps: Aps {
                            category: notification.click_action.clone(),
                        },
                    },
                },
            },
            validate_only,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FcmMessage {
    pub token: String,
    pub notification: FcmNotification,
    pub android: AndroidConfig,
    pub apns: ApnsConfig,
}

#[derive(Debug, Serialize)]
pub struct FcmNotification {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Serialize)]
pub struct AndroidConfig {
    pub notification: AndroidNotification,
}

#[derive(Debug, Serialize)]
pub struct AndroidNotification {
    pub click_action: String,
}

#[derive(Debug, Serialize)]
pub struct ApnsConfig {
    pub payload: ApnsPayload,
}

#[derive(Debug, Serialize)]
pub struct ApnsPayload {
    pub aps: Aps,
}

#[derive(Debug, Serialize)]
pub struct Aps {
    pub category: String,
}

/// FCM API success response
#[derive(Debug, Deserialize)]
pub struct FcmApiResponse {
    pub name: Option<String>,
}

/// Google API error envelope
#[derive(Debug, Deserialize)]
pub struct GoogleErrorEnvelope {
    pub error: GoogleError,
}

#[derive(Debug, Deserialize)]
pub struct GoogleError {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub details: Vec<GoogleErrorDetail>,
}

#[derive(Debug, Deserialize)]
pub struct GoogleErrorDetail {
    #[serde(rename = "@type", default)]
    pub type_url: String,
    #[serde(rename = "errorCode", default)]
    pub error_code: Option<String>,
}

impl GoogleError {
    /// FCM-specific error code when present, otherwise the RPC status
    pub fn code(&self) -> Option<String> {
        self.details
            .iter()
            .find(|d| d.type_url.ends_with("google.firebase.fcm.v1.FcmError"))
            .and_then(|d| d.error_code.clone())
            .or_else(|| self.status.clone())
    }
}
