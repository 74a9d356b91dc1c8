use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Publish Netatmo weather station readings to MQTT.
#[derive(Debug, Parser)]
#[command(version)]
pub struct Args {
    /// MQTT broker host
    #[arg(long, env = "MQTT_HOST", default_value = "localhost")]
    pub mqtt_host: String,

    /// MQTT broker port
    #[arg(long, env = "MQTT_PORT", default_value_t = 1883)]
    pub mqtt_port: u16,

    /// MQTT client identifier
    #[arg(long, env = "MQTT_CLIENT_ID", default_value = "netatmo-publisher")]
    pub mqtt_client_id: String,

    /// Seconds a cached measurement stays fresh
    #[arg(long, env = "NETATMO_CACHE_TTL", default_value_t = 150)]
    pub cache_ttl: u64,

    /// Accept invalid TLS certificates from the Netatmo API
    #[arg(long, env = "NETATMO_INSECURE")]
    pub insecure: bool,

    /// Default log level; RUST_LOG takes precedence when set
    #[arg(long, env = "NETATMO_LOG_LEVEL", value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Directory holding settings, token and cache files
    #[arg(long, env = "NETATMO_DATA_DIR", default_value = ".")]
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    /// Filter directive for this level.
    pub fn directive(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error => "error",
        }
    }
}
