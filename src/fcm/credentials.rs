//! OAuth2 access tokens for the FCM v1 API.
//!
//! Tokens come from one of three sources, resolved once at start-up:
//! a service account key (JWT-bearer grant), the instance metadata server,
//! or a fixed token for emulators. Fetched tokens are cached until shortly
//! before they expire.

use std::path::Path;

use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use tokio::sync::Mutex;

use crate::config::FcmConfig;
use crate::metrics::TokenMetrics;

use super::errors::FcmError;
use super::models::{GoogleTokenResponse, JwtClaims, ServiceAccountKey};

/// OAuth2 scope for sending FCM messages
pub const FCM_SCOPE: &str = "https://www.googleapis.com/auth/firebase.messaging";

/// Cached tokens are refreshed this many seconds before they expire
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Where access tokens come from
#[derive(Debug, Clone)]
pub enum TokenSource {
    ServiceAccount(ServiceAccountKey),
    MetadataServer { url: String },
    Static(String),
}

impl TokenSource {
    /// Resolve credentials from configuration.
    ///
    /// Order: fixed access token, configured key file, `GOOGLE_APPLICATION_CREDENTIALS`,
    /// then the metadata server of the hosting platform.
    pub fn from_config(config: &FcmConfig) -> Result<Self, FcmError> {
        if let Some(token) = &config.access_token {
            return Ok(TokenSource::Static(token.clone()));
        }

        let key_file = config
            .credentials_file
            .clone()
            .or_else(|| std::env::var("GOOGLE_APPLICATION_CREDENTIALS").ok());

        match key_file {
            Some(path) => Ok(TokenSource::ServiceAccount(load_service_account(&path)?)),
            None => Ok(TokenSource::MetadataServer {
                url: config.metadata_token_url.clone(),
            }),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            TokenSource::ServiceAccount(_) => "service_account",
            TokenSource::MetadataServer { .. } => "metadata_server",
            TokenSource::Static(_) => "static",
        }
    }

    /// Project the credentials belong to, if they say
    pub fn project_id(&self) -> Option<&str> {
        match self {
            TokenSource::ServiceAccount(key) => key.project_id.as_deref(),
            _ => None,
        }
    }
}

/// Read and parse a service account key file
pub fn load_service_account(path: impl AsRef<Path>) -> Result<ServiceAccountKey, FcmError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|e| {
        FcmError::Credentials(format!("failed to read {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&contents).map_err(|e| {
        FcmError::Credentials(format!("invalid service account key {}: {}", path.display(), e))
    })
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: i64,
}

/// Hands out access tokens, refreshing them through the configured source
pub struct TokenProvider {
    source: TokenSource,
    cache: Mutex<Option<CachedToken>>,
    http_client: reqwest::Client,
}

impl TokenProvider {
    pub fn new(source: TokenSource, http_client: reqwest::Client) -> Self {
        Self {
            source,
            cache: Mutex::new(None),
            http_client,
        }
    }

    pub fn source(&self) -> &TokenSource {
        &self.source
    }

    /// Current access token, fetching a new one when the cache is stale.
    ///
    /// The cache lock is held across the fetch so concurrent callers share one refresh.
    pub async fn access_token(&self) -> Result<String, FcmError> {
        let mut cache = self.cache.lock().await;
        if let Some(cached) = cache.as_ref() {
            if cached.expires_at > Utc::now().timestamp() + EXPIRY_MARGIN_SECS {
                return Ok(cached.access_token.clone());
            }
        }

        let response = match &self.source {
            TokenSource::ServiceAccount(key) => self.exchange_jwt(key).await?,
            TokenSource::MetadataServer { url } => self.fetch_from_metadata(url).await?,
            TokenSource::Static(token) => return Ok(token.clone()),
        };

        TokenMetrics::record_refresh(self.source.kind());
        tracing::debug!(
            source = self.source.kind(),
            expires_in = response.expires_in,
            "Access token refreshed"
        );

        *cache = Some(CachedToken {
            access_token: response.access_token.clone(),
            expires_at: Utc::now().timestamp() + response.expires_in,
        });

        Ok(response.access_token)
    }

    async fn exchange_jwt(&self, key: &ServiceAccountKey) -> Result<GoogleTokenResponse, FcmError> {
        let assertion = sign_assertion(key)?;
        let params = [
            ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
            ("assertion", assertion.as_str()),
        ];

        let response = self
            .http_client
            .post(&key.token_uri)
            .form(&params)
            .send()
            .await
            .map_err(|e| FcmError::TokenRequest(e.to_string()))?;

        parse_token_response(response).await
    }

    async fn fetch_from_metadata(&self, url: &str) -> Result<GoogleTokenResponse, FcmError> {
        let response = self
            .http_client
            .get(url)
            .query(&[("scopes", FCM_SCOPE)])
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| FcmError::TokenRequest(e.to_string()))?;

        parse_token_response(response).await
    }
}

/// Sign the RS256 assertion for the JWT-bearer grant
pub fn sign_assertion(key: &ServiceAccountKey) -> Result<String, FcmError> {
    let now = Utc::now();
    let claims = JwtClaims {
        iss: key.client_email.clone(),
        sub: key.client_email.clone(),
        scope: FCM_SCOPE.to_string(),
        aud: key.token_uri.clone(),
        exp: (now + Duration::hours(1)).timestamp(),
        iat: now.timestamp(),
    };

    let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
        .map_err(|e| FcmError::KeyParse(e.to_string()))?;

    let mut header = Header::new(Algorithm::RS256);
    header.kid = key.private_key_id.clone();

    encode(&header, &claims, &encoding_key).map_err(|e| FcmError::JwtEncode(e.to_string()))
}

async fn parse_token_response(
    response: reqwest::Response,
) -> Result<GoogleTokenResponse, FcmError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(FcmError::TokenRequest(format!("status {}: {}", status, body)));
    }

    response
        .json()
        .await
        .map_err(|e| FcmError::TokenRequest(format!("invalid token response: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> ServiceAccountKey {
        ServiceAccountKey {
            project_id: Some("moth-app".to_string()),
            private_key_id: Some("key-id".to_string()),
            private_key: "not-a-pem".to_string(),
            client_email: "svc@moth-app.iam.gserviceaccount.com".to_string(),
            client_id: None,
            token_uri: "https://oauth2.googleapis.com/token".to_string(),
        }
    }

    const TEST_PRIVATE_KEY: &str = include_str!("../../tests/fixtures/service_account_key.pem");
    const TEST_PUBLIC_KEY: &str = include_str!("../../tests/fixtures/service_account_pub.pem");

    fn signing_key(token_uri: String) -> ServiceAccountKey {
        ServiceAccountKey {
            private_key: TEST_PRIVATE_KEY.to_string(),
            token_uri,
            ..key()
        }
    }

    fn token_body(token: &str, expires_in: i64) -> String {
        format!(
            r#"{{"access_token":"{}","expires_in":{},"token_type":"Bearer"}}"#,
            token, expires_in
        )
    }

    #[test]
    fn test_assertion_claims() {
        let key = signing_key("https://oauth2.googleapis.com/token".to_string());
        let assertion = sign_assertion(&key).unwrap();

        let header = jsonwebtoken::decode_header(&assertion).unwrap();
        assert_eq!(header.alg, Algorithm::RS256);
        assert_eq!(header.kid.as_deref(), Some("key-id"));

        let mut validation = jsonwebtoken::Validation::new(Algorithm::RS256);
        validation.set_audience(&["https://oauth2.googleapis.com/token"]);
        validation.set_issuer(&["svc@moth-app.iam.gserviceaccount.com"]);
        let decoding_key = jsonwebtoken::DecodingKey::from_rsa_pem(TEST_PUBLIC_KEY.as_bytes()).unwrap();
        let claims = jsonwebtoken::decode::<JwtClaims>(&assertion, &decoding_key, &validation)
            .unwrap()
            .claims;

        assert_eq!(claims.sub, "svc@moth-app.iam.gserviceaccount.com");
        assert_eq!(claims.scope, FCM_SCOPE);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[tokio::test]
    async fn test_service_account_jwt_grant() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/token")
            .match_header("content-type", "application/x-www-form-urlencoded")
            .match_body(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded(
                    "grant_type".to_string(),
                    "urn:ietf:params:oauth:grant-type:jwt-bearer".to_string(),
                ),
                mockito::Matcher::Regex(r"assertion=eyJ[\w-]+\.[\w-]+\.[\w-]+".to_string()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(token_body("ya29.sa", 3599))
            .expect(1)
            .create_async()
            .await;

        let provider = TokenProvider::new(
            TokenSource::ServiceAccount(signing_key(format!("{}/token", server.url()))),
            reqwest::Client::new(),
        );

        assert_eq!(provider.access_token().await.unwrap(), "ya29.sa");
        assert_eq!(provider.access_token().await.unwrap(), "ya29.sa");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_token_inside_expiry_margin_is_refetched() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(token_body("ya29.short", 30))
            .expect(2)
            .create_async()
            .await;

        let provider = TokenProvider::new(
            TokenSource::ServiceAccount(signing_key(format!("{}/token", server.url()))),
            reqwest::Client::new(),
        );

        assert_eq!(provider.access_token().await.unwrap(), "ya29.short");
        assert_eq!(provider.access_token().await.unwrap(), "ya29.short");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_token_endpoint_rejection() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/token")
            .with_status(400)
            .with_body(r#"{"error":"invalid_grant"}"#)
            .create_async()
            .await;

        let provider = TokenProvider::new(
            TokenSource::ServiceAccount(signing_key(format!("{}/token", server.url()))),
            reqwest::Client::new(),
        );

        let err = provider.access_token().await.unwrap_err();
        assert!(matches!(err, FcmError::TokenRequest(ref m) if m.contains("invalid_grant")));
    }

    #[test]
    fn test_static_token_precedence() {
        let config = FcmConfig {
            access_token: Some("owner".to_string()),
            credentials_file: Some("/does/not/exist.json".to_string()),
            ..FcmConfig::default()
        };
        let source = TokenSource::from_config(&config).unwrap();
        assert_eq!(source.kind(), "static");
    }

    #[test]
    fn test_missing_key_file_is_credentials_error() {
        let config = FcmConfig {
            credentials_file: Some("/does/not/exist.json".to_string()),
            ..FcmConfig::default()
        };
        let err = TokenSource::from_config(&config).unwrap_err();
        assert!(matches!(err, FcmError::Credentials(_)));
    }

    #[test]
    fn test_service_account_project_id() {
        let source = TokenSource::ServiceAccount(key());
        assert_eq!(source.project_id(), Some("moth-app"));
        assert_eq!(TokenSource::Static("t".to_string()).project_id(), None);
    }

    #[test]
    fn test_invalid_private_key() {
        let err = sign_assertion(&key()).unwrap_err();
        assert!(matches!(err, FcmError::KeyParse(_)));
    }

    #[tokio::test]
    async fn test_static_token_skips_network() {
        let provider = TokenProvider::new(
            TokenSource::Static("fixed-token".to_string()),
            reqwest::Client::new(),
        );
        assert_eq!(provider.access_token().await.unwrap(), "fixed-token");
    }

    #[tokio::test]
    async fn test_metadata_token_is_cached() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/token")
            .match_header("Metadata-Flavor", "Google")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token":"ya29.meta","expires_in":3599,"token_type":"Bearer"}"#)
            .expect(1)
            .create_async()
            .await;

        let provider = TokenProvider::new(
            TokenSource::MetadataServer {
                url: format!("{}/token", server.url()),
            },
            reqwest::Client::new(),
        );

        assert_eq!(provider.access_token().await.unwrap(), "ya29.meta");
        assert_eq!(provider.access_token().await.unwrap(), "ya29.meta");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_metadata_failure() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/token")
            .match_query(mockito::Matcher::Any)
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let provider = TokenProvider::new(
            TokenSource::MetadataServer {
                url: format!("{}/token", server.url()),
            },
            reqwest::Client::new(),
        );

        let err = provider.access_token().await.unwrap_err();
        assert!(matches!(err, FcmError::TokenRequest(_)));
    }
}
