use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::models::ParticipantId;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub bot: BotSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub premium: PremiumSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BotSettings {
    /// Messaging-platform credential. Required; startup fails without it.
    #[serde(default)]
    pub token: String,
    /// Comma-separated admin identifier list.
    #[serde(default)]
    pub admin_ids: String,
}

impl BotSettings {
    pub fn admin_ids(&self) -> Vec<ParticipantId> {
        self.admin_ids
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect()
    }

    pub fn is_admin(&self, id: ParticipantId) -> bool {
        self.admin_ids().contains(&id)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    #[serde(default = "default_data_file")]
    pub data_file: String,
    #[serde(default = "default_autosave_interval_secs")]
    pub autosave_interval_secs: u64,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            autosave_interval_secs: default_autosave_interval_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PremiumSettings {
    /// Price shown on the invoice, in platform stars.
    #[serde(default = "default_premium_price")]
    pub price_stars: u32,
    #[serde(default = "default_premium_duration_hours")]
    pub duration_hours: i64,
}

impl Default for PremiumSettings {
    fn default() -> Self {
        Self {
            price_stars: default_premium_price(),
            duration_hours: default_premium_duration_hours(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_data_file() -> String {
    "./data.json".to_string()
}
fn default_autosave_interval_secs() -> u64 {
    30
}
fn default_premium_price() -> u32 {
    300
}
fn default_premium_duration_hours() -> i64 {
    14
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "pretty".to_string()
}

impl Settings {
    /// Load configuration from files and environment variables
    ///
    /// Sources, later overrides earlier:
    /// 1. Defaults on the structs
    /// 2. config/default.toml, then config/local.toml
    /// 3. Environment variables prefixed with KANONY__
    ///    (e.g. KANONY__STORAGE__DATA_FILE -> storage.data_file)
    /// 4. Bare BOT_TOKEN / ADMIN_IDS / DATA_FILE variables
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::with_prefix("KANONY")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings = apply_bare_env_overrides(settings)?;

        let settings: Settings = settings.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load configuration from a custom path (tests and tooling).
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings: Settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.bot.token.trim().is_empty() {
            return Err(ConfigError::Message(
                "bot.token is required (set BOT_TOKEN)".to_string(),
            ));
        }
        Ok(())
    }
}

/// The deployment environment historically configures the bot through bare
/// variables; honor them over everything else.
fn apply_bare_env_overrides(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    if let Ok(token) = env::var("BOT_TOKEN") {
        builder = builder.set_override("bot.token", token)?;
    }
    if let Ok(admins) = env::var("ADMIN_IDS") {
        builder = builder.set_override("bot.admin_ids", admins)?;
    }
    if let Ok(data_file) = env::var("DATA_FILE") {
        builder = builder.set_override("storage.data_file", data_file)?;
    }

    builder.build()
}
