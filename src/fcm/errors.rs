use thiserror::Error;

/// FCM client error types
#[derive(Error, Debug)]
pub enum FcmError {
    /// Rejected locally before any request was made
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Credential error: {0}")]
    Credentials(String),

    #[error("Failed to parse private key: {0}")]
    KeyParse(String),

    #[error("Failed to encode JWT: {0}")]
    JwtEncode(String),

    #[error("Access token request failed: {0}")]
    TokenRequest(String),

    #[error("FCM send request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("FCM API error: {status} {code} - {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Failed to parse FCM response: {0}")]
    ResponseParse(String),
}

impl FcmError {
    /// Short machine-readable code for logs, metrics and error bodies
    pub fn code(&self) -> &str {
        match self {
            FcmError::InvalidArgument(_) => "INVALID_ARGUMENT",
            FcmError::Credentials(_) | FcmError::KeyParse(_) | FcmError::JwtEncode(_) => {
                "CREDENTIALS"
            }
            FcmError::TokenRequest(_) => "TOKEN_REQUEST",
            FcmError::Http(_) => "TRANSPORT",
            FcmError::Api { code, .. } => code,
            FcmError::ResponseParse(_) => "RESPONSE_PARSE",
        }
    }

    /// Whether the device token itself was the problem
    pub fn is_invalid_token(&self) -> bool {
        match self {
            FcmError::InvalidArgument(_) => true,
            FcmError::Api { code, .. } => {
                code == "UNREGISTERED" || code == "INVALID_ARGUMENT" || code == "SENDER_ID_MISMATCH"
            }
            _ => false,
        }
    }
}
