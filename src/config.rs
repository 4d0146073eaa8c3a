//! Configuration management

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Lowest PBKDF2 iteration count accepted for private key protection.
pub const MIN_PBKDF2_ITERATIONS: u32 = 1_000;

/// Line ending used in emitted PEM documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    #[default]
    Lf,
    Crlf,
}

impl From<LineEnding> for pkcs8::LineEnding {
    fn from(ending: LineEnding) -> Self {
        match ending {
            LineEnding::Lf => pkcs8::LineEnding::LF,
            LineEnding::Crlf => pkcs8::LineEnding::CRLF,
        }
    }
}

/// Tunables for key generation and sealing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecretaryConfig {
    /// PBKDF2-HMAC-SHA256 iterations protecting generated private keys.
    pub pbkdf2_iterations: u32,
    /// Reject recipient keys that are not exactly 2048 bit while sealing.
    pub enforce_recipient_strength: bool,
    pub line_ending: LineEnding,
}

impl Default for SecretaryConfig {
    fn default() -> Self {
        Self {
            pbkdf2_iterations: 600_000,
            enforce_recipient_strength: false,
            line_ending: LineEnding::Lf,
        }
    }
}

impl SecretaryConfig {
    /// Parse a TOML document; missing keys take their defaults.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Defaults overlaid with `SECRETARY_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().overlay(|name| std::env::var(name).ok())
    }

    fn overlay(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        if let Some(value) = lookup("SECRETARY_PBKDF2_ITERATIONS") {
            self.pbkdf2_iterations = value
                .trim()
                .parse()
                .map_err(|e| ConfigError::Invalid(format!("Invalid pbkdf2_iterations: {}", e)))?;
        }

        if let Some(value) = lookup("SECRETARY_ENFORCE_RECIPIENT_STRENGTH") {
            self.enforce_recipient_strength = match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                other => {
                    return Err(ConfigError::Invalid(format!(
                        "Invalid enforce_recipient_strength: {}",
                        other
                    )))
                }
            };
        }

        if let Some(value) = lookup("SECRETARY_LINE_ENDING") {
            self.line_ending = match value.trim().to_ascii_lowercase().as_str() {
                "lf" => LineEnding::Lf,
                "crlf" => LineEnding::Crlf,
                other => {
                    return Err(ConfigError::Invalid(format!("Invalid line_ending: {}", other)))
                }
            };
        }

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pbkdf2_iterations < MIN_PBKDF2_ITERATIONS {
            return Err(ConfigError::Invalid(format!(
                "pbkdf2_iterations must be at least {}",
                MIN_PBKDF2_ITERATIONS
            )));
        }
        Ok(())
    }
}
