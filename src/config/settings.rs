use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

/// Click action consumed by the companion mobile client to route notification taps
pub const DEFAULT_CLICK_ACTION: &str = "FLUTTER_NOTIFICATION_CLICK";

/// Document path the trigger is registered for
pub const DEFAULT_DOCUMENT_PATTERN: &str = "notifications/{id}";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub trigger: TriggerConfig,
    #[serde(default)]
    pub fcm: FcmConfig,
    #[serde(default)]
    pub otel: OtelConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Maximum accepted event body size in bytes
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TriggerConfig {
    /// Document path pattern, e.g. `notifications/{id}`
    #[serde(default = "default_document_pattern")]
    pub document_pattern: String,
    #[serde(default = "default_click_action")]
    pub click_action: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FcmConfig {
    /// Firebase project ID. Falls back to the service account key's project.
    pub project_id: Option<String>,
    /// Path to a service account key file. Falls back to `GOOGLE_APPLICATION_CREDENTIALS`.
    pub credentials_file: Option<String>,
    /// Fixed bearer token (emulators, local development)
    pub access_token: Option<String>,
    #[serde(default = "default_fcm_base_url")]
    pub base_url: String,
    #[serde(default = "default_metadata_token_url")]
    pub metadata_token_url: String,
    /// Validate messages with the provider without delivering them
    #[serde(default)]
    pub dry_run: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OtelConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_otel_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "default_sampling_ratio")]
    pub sampling_ratio: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogConfig {
    #[serde(default)]
    pub format: LogFormat,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_body_limit() -> usize {
    1024 * 1024 // 1 MiB
}

fn default_document_pattern() -> String {
    DEFAULT_DOCUMENT_PATTERN.to_string()
}

fn default_click_action() -> String {
    DEFAULT_CLICK_ACTION.to_string()
}

fn default_fcm_base_url() -> String {
    "https://fcm.googleapis.com".to_string()
}

fn default_metadata_token_url() -> String {
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token"
        .to_string()
}

fn default_otel_endpoint() -> String {
    "http://localhost:4317".to_string()
}

fn default_service_name() -> String {
    "firestore-push-forwarder".to_string()
}

fn default_sampling_ratio() -> f64 {
    1.0
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        // Load .env file if exists
        let _ = dotenvy::dotenv();

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        // Cloud Run and most container platforms hand the listen port over in PORT
        let platform_port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .map(i64::from);

        let builder = Config::builder()
            .set_default("server.host", default_host())?
            .set_default("server.port", i64::from(default_port()))?
            .set_default("trigger.document_pattern", DEFAULT_DOCUMENT_PATTERN)?
            .set_default("trigger.click_action", DEFAULT_CLICK_ACTION)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // FORWARDER__FCM__PROJECT_ID, FORWARDER__SERVER__PORT, ...
            .add_source(
                Environment::with_prefix("FORWARDER")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("server.port", platform_port)?;

        builder.build()?.try_deserialize()
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            document_pattern: default_document_pattern(),
            click_action: default_click_action(),
        }
    }
}

impl Default for FcmConfig {
    fn default() -> Self {
        Self {
            project_id: None,
            credentials_file: None,
            access_token: None,
            base_url: default_fcm_base_url(),
            metadata_token_url: default_metadata_token_url(),
            dry_run: false,
        }
    }
}

impl Default for OtelConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_otel_endpoint(),
            service_name: default_service_name(),
            sampling_ratio: default_sampling_ratio(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            trigger: TriggerConfig::default(),
            fcm: FcmConfig::default(),
            otel: OtelConfig::default(),
            log: LogConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let server = ServerConfig::default();
        assert_eq!(server.host, "0.0.0.0");
        assert_eq!(server.port, 8080);
        assert_eq!(server.body_limit_bytes, 1024 * 1024);
    }

    #[test]
    fn test_trigger_defaults() {
        let trigger = TriggerConfig::default();
        assert_eq!(trigger.document_pattern, "notifications/{id}");
        assert_eq!(trigger.click_action, "FLUTTER_NOTIFICATION_CLICK");
    }

    #[test]
    fn test_fcm_defaults() {
        let fcm = FcmConfig::default();
        assert!(fcm.project_id.is_none());
        assert!(!fcm.dry_run);
        assert_eq!(fcm.base_url, "https://fcm.googleapis.com");
    }

    #[test]
    fn test_settings_server_addr() {
        let settings = Settings::default();
        assert_eq!(settings.server_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_log_format_deserialize() {
        let format: LogFormat = serde_json::from_str("\"json\"").unwrap();
        assert_eq!(format, LogFormat::Json);
        assert_eq!(LogFormat::default(), LogFormat::Text);
    }
}
