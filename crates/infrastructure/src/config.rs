use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HttpConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MqttConfig {
    #[serde(default)]
    pub enabled: bool,
    pub host: String,
    pub port: u16,
    #[serde(default = "default_client_id")]
    pub client_id: String,
}

fn default_client_id() -> String {
    "configuration-server".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct DatabaseConfig {
    /// `None` keeps everything in memory
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RetryConfig {
    pub max_attempts: u32,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct IntervalsConfig {
    pub default_seconds: u32,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub http: HttpConfig,
    pub mqtt: MqttConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    pub retry: RetryConfig,
    pub intervals: IntervalsConfig,
}

impl ServerConfig {
    pub fn load(config_dir: &str) -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            // Start with default settings
            .set_default("http.port", 8080)?
            .set_default("mqtt.enabled", false)?
            .set_default("mqtt.host", "localhost")?
            .set_default("mqtt.port", 1883)?
            .set_default("mqtt.client_id", default_client_id())?
            .set_default("retry.max_attempts", 3)?
            .set_default("intervals.default_seconds", 1800)?
            // Shared settings, e.g. config/default.toml
            .add_source(File::with_name(&format!("{}/default", config_dir)).required(false))
            // Per environment overrides, e.g. config/production.toml
            .add_source(File::with_name(&format!("{}/{}", config_dir, run_mode)).required(false))
            // Environment variables (e.g. DEVICES__DATABASE__URL=postgres://...)
            .add_source(Environment::with_prefix("DEVICES").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
