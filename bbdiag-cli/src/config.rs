//! Tool configuration.
//!
//! Read from a JSON file: the path given with `--config`, else
//! `bbdiag.json` in the platform config directory when it exists, else the
//! built-in defaults. Missing fields take their default value.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use bbdiag_core::SessionConfig;
use directories::ProjectDirs;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CONFIG_FILE: &str = "bbdiag.json";

pub fn get_project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "bbdiag", "bbdiag")
}

/// Location of the configuration file in the platform config directory
pub fn default_config_path() -> Option<PathBuf> {
    get_project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to open config {}: {source}", path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Session parameters handed to the message store
    pub session: SessionConfig,
    /// Log decode statistics when the capture is done
    pub report_stats: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            report_stats: true,
        }
    }
}

impl Config {
    /// Load the configuration, see the module docs for the lookup order.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        match default_config_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => {
                debug!("No config file, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let file = File::open(path).map_err(|source| ConfigError::Open {
            path: path.to_owned(),
            source,
        })?;
        let config = serde_json::from_reader(BufReader::new(file)).map_err(|source| {
            ConfigError::Parse {
                path: path.to_owned(),
                source,
            }
        })?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }
}
