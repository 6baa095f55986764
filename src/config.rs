// SPDX-License-Identifier: MIT
//! Run configuration
//!
//! Precedence, lowest first: built-in defaults, an optional TOML file,
//! `MERFISH_*` environment variables, then command-line flags (applied by the
//! binary).

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bbox::NanPolicy;

/// Upper bound on worker threads
pub const MAX_THREADS: usize = 1024;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value {value:?} for {var}")]
    InvalidEnv { var: &'static str, value: String },

    #[error("{0}")]
    Invalid(String),
}

/// Report rendering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// File to decode
    pub input: PathBuf,

    /// 1 = sequential, 0 = rayon default pool, n = n workers
    pub threads: usize,

    pub nan_policy: NanPolicy,

    /// Require the file length to equal what the header implies
    pub check_file_size: bool,

    pub output: OutputFormat,

    /// Default tracing filter when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: PathBuf::from("a.bin"),
            threads: 1,
            nan_policy: NanPolicy::Propagate,
            check_file_size: false,
            output: OutputFormat::Text,
            log_level: "warn".to_string(),
        }
    }
}

impl Config {
    /// Parse a TOML document; missing keys keep their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Load a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Defaults, then `path` if given, then the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.with_env(|var| std::env::var(var).ok())
    }

    /// Overlay `MERFISH_*` variables resolved through `lookup`.
    pub fn with_env<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        if let Some(value) = lookup("MERFISH_INPUT") {
            self.input = PathBuf::from(value);
        }
        if let Some(value) = lookup("MERFISH_THREADS") {
            self.threads = value.parse().map_err(|_| ConfigError::InvalidEnv {
                var: "MERFISH_THREADS",
                value,
            })?;
        }
        if let Some(value) = lookup("MERFISH_NAN_POLICY") {
            self.nan_policy =
                NanPolicy::from_str(&value, true).map_err(|_| ConfigError::InvalidEnv {
                    var: "MERFISH_NAN_POLICY",
                    value,
                })?;
        }
        if let Some(value) = lookup("MERFISH_CHECK_FILE_SIZE") {
            self.check_file_size = match value.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => {
                    return Err(ConfigError::InvalidEnv {
                        var: "MERFISH_CHECK_FILE_SIZE",
                        value,
                    })
                }
            };
        }
        if let Some(value) = lookup("MERFISH_OUTPUT") {
            self.output =
                OutputFormat::from_str(&value, true).map_err(|_| ConfigError::InvalidEnv {
                    var: "MERFISH_OUTPUT",
                    value,
                })?;
        }
        if let Some(value) = lookup("MERFISH_LOG_LEVEL") {
            self.log_level = value;
        }
        Ok(self)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.input.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("input path cannot be empty".to_string()));
        }

        if self.threads > MAX_THREADS {
            return Err(ConfigError::Invalid(format!(
                "threads must be at most {}, got {}",
                MAX_THREADS, self.threads
            )));
        }

        if self.log_level.trim().is_empty() {
            return Err(ConfigError::Invalid("log_level cannot be empty".to_string()));
        }

        Ok(())
    }
}
