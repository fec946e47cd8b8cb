//! Application settings, read from `settings.toml` (or the file named by
//! `HAKOGANE_SETTINGS`) and overridden by `HAKOGANE__SECTION__KEY`
//! environment variables.
use chrono_tz::Tz;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const DEFAULT_SETTINGS_PATH: &str = "settings";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
    /// IANA zone "today" is computed in.
    pub timezone: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            timezone: "Asia/Kolkata".to_string(),
        }
    }
}

impl App {
    pub fn timezone(&self) -> Result<Tz, ConfigError> {
        self.timezone.parse().map_err(|_| {
            ConfigError::Message(format!("unknown time zone: {}", self.timezone))
        })
    }
}

fn default_port() -> u16 {
    3000
}

fn default_session_ttl_hours() -> i64 {
    168
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    #[serde(default = "default_port")]
    pub port: u16,
    pub database: Database,
    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: i64,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    pub server: Option<Server>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let path = std::env::var("HAKOGANE_SETTINGS")
            .unwrap_or_else(|_| DEFAULT_SETTINGS_PATH.to_string());
        Self::load(&path)
    }

    fn load(path: &str) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("HAKOGANE").separator("__"))
            .build()?;

        let settings: Settings = settings.try_deserialize()?;
        settings.app.timezone()?;
        if let Some(server) = &settings.server
            && server.session_ttl_hours <= 0
        {
            return Err(ConfigError::Message(
                "server.session_ttl_hours must be positive".to_string(),
            ));
        }
        Ok(settings)
    }
}
