//! # configs
//!
//! Runtime settings for the ban engine.
//!
//! Sources, lowest priority first: built-in defaults, a `.env` file in the
//! working directory, then `BANHAMMER__`-prefixed environment variables
//! (`BANHAMMER__BAN__ADMIN_REASON=...`).

use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use thiserror::Error;

pub const ENV_PREFIX: &str = "BANHAMMER";

pub const DEFAULT_ADMIN_REASON: &str = "Administrative Ban";
pub const DEFAULT_AUTOMATIC_REASON: &str = "Automatic Ban";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load settings: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid setting {0}: {1}")]
    Invalid(&'static str, String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub ban: BanSettings,
}

/// Reasons used when a ban is issued without one.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BanSettings {
    pub admin_reason: String,
    pub automatic_reason: String,
}

impl Default for BanSettings {
    fn default() -> Self {
        Self {
            admin_reason: DEFAULT_ADMIN_REASON.to_string(),
            automatic_reason: DEFAULT_AUTOMATIC_REASON.to_string(),
        }
    }
}

impl Settings {
    /// Loads defaults, `.env` and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
            Err(e) if e.not_found() => {}
            Err(e) => tracing::warn!(error = %e, "ignoring unreadable .env"),
        }

        let builder = Self::defaults()?.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__"),
        );
        Self::finish(builder.build()?)
    }

    /// Loads defaults overlaid with a TOML document, without touching the
    /// environment.
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        let builder = Self::defaults()?.add_source(File::from_str(toml, FileFormat::Toml));
        Self::finish(builder.build()?)
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Ok(Config::builder()
            .set_default("ban.admin_reason", DEFAULT_ADMIN_REASON)?
            .set_default("ban.automatic_reason", DEFAULT_AUTOMATIC_REASON)?)
    }

    fn finish(config: Config) -> Result<Self, ConfigError> {
        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        tracing::debug!(?settings, "settings loaded");
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.ban.admin_reason.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "ban.admin_reason",
                "must not be blank".to_string(),
            ));
        }
        if self.ban.automatic_reason.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "ban.automatic_reason",
                "must not be blank".to_string(),
            ));
        }
        Ok(())
    }
}
