//! `flatschema.toml` loading.
//!
//! Every key is optional. Relative paths are resolved against the directory
//! holding the config file, so a checked-in config works from any cwd.

use flatschema_schema::identity::IdStrategy;
use serde::Deserialize;
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error as ThisError;

/// File name looked up next to the source file.
pub const CONFIG_FILE: &str = "flatschema.toml";

///
/// ConfigError
///

#[remain::sorted]
#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("cannot read config {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
}

///
/// Config
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub namespace: Option<String>,
    pub model_file: Option<PathBuf>,
    pub id_strategy: Option<IdStrategy>,
    pub binding_file: Option<PathBuf>,
}

impl Config {
    /// Parse config text; relative paths resolve against `base`.
    pub fn parse(text: &str, base: &Path, path: &Path) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        config.model_file = config.model_file.map(|p| base.join(p));
        config.binding_file = config.binding_file.map(|p| base.join(p));

        Ok(config)
    }

    /// Load the config file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));

        let config = Self::parse(&text, base, path)?;
        tracing::debug!(path = %path.display(), ?config, "loaded config");

        Ok(config)
    }

    /// Load `flatschema.toml` from `dir` if present, defaults otherwise.
    pub fn discover(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(CONFIG_FILE);

        match Self::load(&path) {
            Err(ConfigError::Read { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            result => result,
        }
    }
}

///
/// TESTS
///
