//! Configuration model and the explicit config holder.
//!
//! The config lives in `ntx.toml`. Its keys may sit at the top level, under
//! an `[ntx]` table, or under `[tool.ntx]` — the latter two let projects
//! fold ntx into a shared tool config file. [`ConfigStore`] is passed by
//! reference to whatever needs configuration; there is no module-level
//! state.

pub mod patch;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default config filename, probed in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "ntx.toml";

/// Default output directory for generated modules.
pub const DEFAULT_OUTPUT_DIR: &str = "src/notion";

/// Environment variable that overrides the configured token.
pub const TOKEN_ENV_VAR: &str = "NTX_TOKEN";

/// The semantic configuration value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Auth credential for the remote API.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Database identifiers to generate clients for.
    #[serde(default)]
    pub databases: Vec<String>,
    /// Output directory for generated modules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
}

impl Config {
    /// Output directory, defaulted.
    pub fn output_dir(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR))
    }

    /// Resolve the auth token: the environment variable wins over the
    /// config value.
    pub fn resolve_token(&self) -> Result<String, ConfigError> {
        if let Ok(token) = std::env::var(TOKEN_ENV_VAR)
            && !token.is_empty()
        {
            return Ok(token);
        }
        self.token
            .clone()
            .filter(|token| !token.is_empty())
            .ok_or(ConfigError::MissingToken)
    }
}

/// Parse config source text, probing the three recognized declaration
/// shapes for where the keys live.
pub fn parse_config(source: &str) -> Result<Config, toml::de::Error> {
    let value: toml::Value = source.parse()?;
    let scoped = value
        .get("ntx")
        .filter(|v| v.is_table())
        .or_else(|| value.get("tool").and_then(|tool| tool.get("ntx")))
        .unwrap_or(&value);
    scoped.clone().try_into()
}

/// Explicit configuration holder: load once, clear on demand.
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    loaded: Option<Config>,
}

impl ConfigStore {
    /// Holder for the config at `path`. Nothing is read until
    /// [`Self::load`].
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            loaded: None,
        }
    }

    /// The config file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the config, reusing the cached value on repeat calls.
    pub fn load(&mut self) -> Result<&Config, ConfigError> {
        if self.loaded.is_none() {
            self.loaded = Some(self.read()?);
        }
        Ok(self.loaded.get_or_insert_with(Config::default))
    }

    /// Drop the cached value; the next [`Self::load`] re-reads the file.
    pub fn clear(&mut self) {
        self.loaded = None;
    }

    /// Clear and reload in one step.
    pub fn reload(&mut self) -> Result<&Config, ConfigError> {
        self.clear();
        self.load()
    }

    fn read(&self) -> Result<Config, ConfigError> {
        if !self.path.exists() {
            return Err(ConfigError::NotFound {
                path: self.path.clone(),
            });
        }
        let contents = std::fs::read_to_string(&self.path).map_err(|source| ConfigError::Io {
            path: self.path.clone(),
            source,
        })?;
        parse_config(&contents).map_err(|source| ConfigError::Parse {
            path: self.path.clone(),
            source,
        })
    }
}
