//! Configuration loading and validation for processes using field encryption.
//!
//! All values are read from `SECUREJSON_*` environment variables. Callers
//! should exit with the returned error if any required variable is missing
//! or invalid.

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::crypto::{KdfParams, Salt};

/// Validated field-encryption configuration.
#[derive(Clone, Deserialize)]
pub struct Config {
    /// Password the field key is derived from. **Required.**
    pub password: String,

    /// Standard base64 salt, at least 8 decoded bytes. **Required.**
    pub salt: String,

    /// Argon2id memory cost in KiB.
    #[serde(default = "default_kdf_memory_kib")]
    pub kdf_memory_kib: u32,

    /// Argon2id pass count.
    #[serde(default = "default_kdf_iterations")]
    pub kdf_iterations: u32,

    /// Argon2id lane count.
    #[serde(default = "default_kdf_parallelism")]
    pub kdf_parallelism: u32,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_kdf_memory_kib() -> u32 {
    KdfParams::default().memory_kib
}
fn default_kdf_iterations() -> u32 {
    KdfParams::default().iterations
}
fn default_kdf_parallelism() -> u32 {
    KdfParams::default().parallelism
}
fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any required variable is absent or cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::with_prefix("SECUREJSON"))
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Argon2id cost parameters from the configured values.
    pub fn kdf_params(&self) -> KdfParams {
        KdfParams {
            memory_kib: self.kdf_memory_kib,
            iterations: self.kdf_iterations,
            parallelism: self.kdf_parallelism,
        }
    }

    /// Decode the configured salt.
    ///
    /// # Errors
    ///
    /// Returns an error if the salt is not standard base64 or is too short.
    pub fn salt_bytes(&self) -> Result<Salt> {
        Salt::from_base64(self.salt.trim()).context("SECUREJSON_SALT is invalid")
    }

    fn validate(&self) -> Result<()> {
        ensure_non_empty(&self.password, "SECUREJSON_PASSWORD")?;
        ensure_non_empty(&self.salt, "SECUREJSON_SALT")?;
        self.salt_bytes()?;

        if self.kdf_memory_kib == 0 {
            anyhow::bail!("SECUREJSON_KDF_MEMORY_KIB must be > 0");
        }
        if self.kdf_iterations == 0 {
            anyhow::bail!("SECUREJSON_KDF_ITERATIONS must be > 0");
        }
        if self.kdf_parallelism == 0 {
            anyhow::bail!("SECUREJSON_KDF_PARALLELISM must be > 0");
        }
        Ok(())
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("password", &"[REDACTED]")
            .field("salt", &self.salt)
            .field("kdf_memory_kib", &self.kdf_memory_kib)
            .field("kdf_iterations", &self.kdf_iterations)
            .field("kdf_parallelism", &self.kdf_parallelism)
            .field("log_level", &self.log_level)
            .finish()
    }
}

fn ensure_non_empty(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        anyhow::bail!("{name} is required and must not be empty");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> Config {
        Config {
            password: "May$ecr!tPa$$w0rd".into(),
            salt: "AAECAwQFBgcICQoLDA0ODw==".into(),
            kdf_memory_kib: default_kdf_memory_kib(),
            kdf_iterations: default_kdf_iterations(),
            kdf_parallelism: default_kdf_parallelism(),
            log_level: default_log_level(),
        }
    }

    #[test]
    fn defaults_are_correct() {
        assert_eq!(default_kdf_memory_kib(), 65_536);
        assert_eq!(default_kdf_iterations(), 3);
        assert_eq!(default_kdf_parallelism(), 4);
        assert_eq!(default_log_level(), "info");
    }

    #[test]
    fn valid_config_passes() {
        let cfg = valid();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.kdf_params(), KdfParams::default());
        assert_eq!(cfg.salt_bytes().unwrap().as_bytes().len(), 16);
    }

    #[test]
    fn validate_rejects_empty_password() {
        let cfg = Config {
            password: "  ".into(),
            ..valid()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_salt() {
        for salt in ["", "not base64!", "AAEC"] {
            let cfg = Config {
                salt: salt.into(),
                ..valid()
            };
            assert!(cfg.validate().is_err(), "accepted salt {salt:?}");
        }
    }

    #[test]
    fn validate_rejects_zero_cost() {
        let cfg = Config {
            kdf_iterations: 0,
            ..valid()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn debug_redacts_password() {
        let printed = format!("{:?}", valid());
        assert!(!printed.contains("May$ecr!tPa$$w0rd"));
        assert!(printed.contains("REDACTED"));
    }
}
