use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::list::ListCodec;

/// Endpoint used when no configuration names one.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5173/api/query";

/// Request timeout used when no configuration names one.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// File name searched for in the user config directory and the working
/// directory.
pub const CONFIG_FILE_NAME: &str = "tilepack.toml";

/// Top-level configuration loaded from TOML.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub transport: TransportSettings,
    #[serde(default)]
    pub lists: ListSettings,
}

/// Where and how records are sent.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TransportSettings {
    pub endpoint: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl TransportSettings {
    pub fn endpoint(&self) -> &str {
        self.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }
}

/// List definitions, one string per list, in registration order.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ListSettings {
    #[serde(default)]
    pub definitions: Vec<String>,
}

impl Config {
    /// Parses configuration from TOML content.
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Loads the built-in configuration with the default lists.
    pub fn load_default() -> Result<Self, ConfigError> {
        let content = include_str!("../tilepack.toml");
        Self::from_toml(content).map_err(|source| ConfigError::Toml {
            path: "<built-in>".to_string(),
            source,
        })
    }

    /// Loads configuration from a custom file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content).map_err(|source| ConfigError::Toml {
            path: path.display().to_string(),
            source,
        })
    }

    /// Loads configuration with user overrides from standard locations.
    ///
    /// Searches in priority order:
    /// 1. Built-in configuration (from library)
    /// 2. `~/.config/tilepack/tilepack.toml` (user overrides)
    /// 3. `./tilepack.toml` (project-local overrides)
    ///
    /// Later files override earlier ones; unreadable files are skipped with
    /// a warning.
    pub fn load_with_overrides() -> Result<Self, ConfigError> {
        let mut config = Self::load_default()?;

        if let Some(config_dir) = dirs::config_dir() {
            let user_path = config_dir.join("tilepack").join(CONFIG_FILE_NAME);
            config.merge_file(&user_path);
        }
        config.merge_file(Path::new(CONFIG_FILE_NAME));

        Ok(config)
    }

    fn merge_file(&mut self, path: &Path) {
        if !path.exists() {
            return;
        }
        match Self::load_from_file(path) {
            Ok(other) => {
                tracing::debug!(path = %path.display(), "merging config override");
                self.merge(other);
            }
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "skipping config override"),
        }
    }

    /// Merges another configuration into this one.
    ///
    /// Transport settings present in `other` win. A list definition replaces
    /// the definition of the same list name, otherwise it is appended.
    pub fn merge(&mut self, other: Config) {
        if other.transport.endpoint.is_some() {
            self.transport.endpoint = other.transport.endpoint;
        }
        if other.transport.timeout_secs.is_some() {
            self.transport.timeout_secs = other.transport.timeout_secs;
        }

        for definition in other.lists.definitions {
            let existing = definition_name(&definition).and_then(|name| {
                self.lists
                    .definitions
                    .iter()
                    .position(|d| definition_name(d).as_deref() == Some(name.as_str()))
            });
            match existing {
                Some(i) => self.lists.definitions[i] = definition,
                None => self.lists.definitions.push(definition),
            }
        }
    }
}

fn definition_name(definition: &str) -> Option<String> {
    ListCodec::parse(definition)
        .ok()
        .map(|list| list.name().to_string())
}
