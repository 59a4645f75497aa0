//! Configuration loading and validation for the KMS server.
//!
//! All values are read from environment variables at startup. The process will
//! exit with a clear error message if any required variable is missing or invalid.

use std::fmt;

use anyhow::{Context, Result};
use kms::{MasterKey, MasterKeyKms};
use serde::Deserialize;

/// Validated KMS server configuration.
#[derive(Clone, Deserialize)]
pub struct Config {
    /// Master key as `<key-id>:<hex-encoded 32 bytes>`. **Required.**
    pub master_key: String,

    /// Port the HTTP server listens on.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_listen_port() -> u16 {
    7373
}
fn default_log_level() -> String {
    "info".into()
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("master_key", &"[REDACTED]")
            .field("listen_port", &self.listen_port)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any required variable is absent or cannot be parsed.
    pub fn from_env() -> Result<Self> {
        Self::from_source(config::Environment::default())
    }

    fn from_source(env: config::Environment) -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(env)
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Build the master-key backend described by [`Config::master_key`].
    ///
    /// # Errors
    ///
    /// Returns an error if the master key string is malformed.
    pub fn build_kms(&self) -> Result<MasterKeyKms> {
        MasterKeyKms::from_config_str(&self.master_key).context("MASTER_KEY is invalid")
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        if self.master_key.trim().is_empty() {
            anyhow::bail!("MASTER_KEY is required and must not be empty");
        }
        MasterKey::parse(&self.master_key).context("MASTER_KEY is invalid")?;
        if self.log_level.trim().is_empty() {
            anyhow::bail!("LOG_LEVEL must not be empty");
        }
        Ok(())
    }
}
