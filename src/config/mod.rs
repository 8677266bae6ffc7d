// config/mod.rs
use serde::Deserialize;
use config::{Config, Environment, File};
use validator::Validate;

use crate::energy::PowerProfile;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub metrics: MetricsSettings,
    #[serde(default)]
    pub light: PowerProfile,
}

#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    pub address: String,
    pub environment: Deployment,
    /// CORS allow-list, only consulted in production.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Deployment {
    Development,
    Production,
}

#[derive(Debug, Deserialize)]
pub struct MetricsSettings {
    pub enabled: bool,
    pub port: u16,
}

impl Settings {
    pub fn new() -> Result<Self, config::ConfigError> {
        Self::load("config/config")
    }

    /// Defaults, then the optional file at `path`, then `APP__*` variables.
    /// A `PORT` variable rebinds the server on all interfaces.
    pub fn load(path: &str) -> Result<Self, config::ConfigError> {
        let port_override = std::env::var("PORT")
            .ok()
            .map(|port| format!("0.0.0.0:{port}"));

        let settings = Config::builder()
            .set_default("server.address", "127.0.0.1:5000")?
            .set_default("server.environment", "development")?
            .set_default("metrics.enabled", false)?
            .set_default("metrics.port", 9000)?
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.allowed_origins")
                    .try_parsing(true),
            )
            .set_override_option("server.address", port_override)?
            .build()?;

        let settings: Self = settings.try_deserialize()?;
        settings
            .light
            .validate()
            .map_err(|e| config::ConfigError::Message(format!("invalid [light] table: {e}")))?;
        Ok(settings)
    }
}
