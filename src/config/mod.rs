mod settings;

pub use settings::{
    FcmConfig, LogConfig, LogFormat, OtelConfig, ServerConfig, Settings, TriggerConfig,
    DEFAULT_CLICK_ACTION, DEFAULT_DOCUMENT_PATTERN,
};
