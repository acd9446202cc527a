//! Run file configuration.
//!
//! A run file holds the master seed and the ordered descriptors. It is read
//! from TOML or JSON (chosen by extension) and the seed may be overridden
//! with `GARBLE_MASTER_SEED`.
//!
//! ```toml
//! master_seed = 151
//!
//! [[operations]]
//! name = "Typogre"
//! type = "typo"
//! rate = 0.02
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::descriptor::Descriptor;

/// Environment variable overriding the configured master seed.
pub const MASTER_SEED_ENV: &str = "GARBLE_MASTER_SEED";

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The run file could not be read.
    #[error("Configuration file error: {0}")]
    FileError(String),

    /// The run file extension is neither `.toml` nor `.json`.
    #[error("Unsupported run file format: {0}. Expected .toml or .json")]
    UnsupportedFormat(String),

    /// The run file could not be parsed.
    #[error("Failed to parse run file: {0}")]
    ParseError(String),

    /// A seed value is not an integer.
    #[error("Invalid master seed: {0}")]
    InvalidSeed(String),

    /// A descriptor failed validation.
    #[error("Invalid operation {index} ('{name}'): {message}")]
    InvalidOperation {
        /// Position in `operations`
        index: usize,
        /// Descriptor name
        name: String,
        /// Validation message
        message: String,
    },
}

/// Master seeds are integers, or decimal strings when they exceed 64 bits.
mod seed_repr {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Signed(i64),
        Unsigned(u64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(seed: &Option<i128>, serializer: S) -> Result<S::Ok, S::Error> {
        match seed {
            Some(value) => match i64::try_from(*value) {
                Ok(small) => serializer.serialize_some(&small),
                Err(_) => serializer.serialize_some(&value.to_string()),
            },
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i128>, D::Error> {
        let repr = Option::<Repr>::deserialize(deserializer)?;
        repr.map(|repr| match repr {
            Repr::Signed(value) => Ok(i128::from(value)),
            Repr::Unsigned(value) => Ok(i128::from(value)),
            Repr::Text(text) => text
                .trim()
                .parse::<i128>()
                .map_err(|_| serde::de::Error::custom(format!("invalid master seed: {text}"))),
        })
        .transpose()
    }
}

/// A run file: master seed plus ordered operations.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Master seed; `None` leaves the choice to the caller
    #[serde(with = "seed_repr", skip_serializing_if = "Option::is_none")]
    pub master_seed: Option<i128>,
    /// Operations in execution order
    pub operations: Vec<Descriptor>,
}

impl RunConfig {
    /// Parses TOML.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(format!("TOML: {}", e)))
    }

    /// Parses JSON.
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(content).map_err(|e| ConfigError::ParseError(format!("JSON: {}", e)))
    }

    /// Reads a `.toml` or `.json` run file without validating it.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileError(format!("Failed to read {}: {}", path.display(), e)))?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "toml" => Self::from_toml_str(&content),
            "json" => Self::from_json_str(&content),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Replaces the master seed with a parsed override value.
    pub fn apply_seed_override(&mut self, value: &str) -> Result<(), ConfigError> {
        let seed = value
            .trim()
            .parse::<i128>()
            .map_err(|_| ConfigError::InvalidSeed(value.to_string()))?;
        self.master_seed = Some(seed);
        Ok(())
    }

    /// Applies [`MASTER_SEED_ENV`] if it is set.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(value) = std::env::var(MASTER_SEED_ENV) {
            tracing::debug!(value = %value, "master seed overridden from environment");
            self.apply_seed_override(&value)?;
        }
        Ok(())
    }

    /// Checks that every descriptor decodes into an operation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (index, descriptor) in self.operations.iter().enumerate() {
            descriptor
                .build()
                .map_err(|err| ConfigError::InvalidOperation {
                    index,
                    name: descriptor.name.clone(),
                    message: err.to_string(),
                })?;
        }
        Ok(())
    }

    /// Reads, applies the environment override, and validates.
    ///
    /// Priority (highest to lowest):
    /// 1. `GARBLE_MASTER_SEED`
    /// 2. The run file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path)?;
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }
}
