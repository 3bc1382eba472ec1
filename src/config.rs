use std::{env, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub docs_dir: PathBuf,
    pub log_file: PathBuf,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("MCP_DOCS_DIR is unset and the working directory is unavailable")]
    MissingDocsDir,
    #[error("MCP_LOG_FILE is unset and no cache directory could be derived; set HOME or XDG_CACHE_HOME")]
    MissingCacheDir,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let docs_dir = match env::var_os("MCP_DOCS_DIR").filter(|value| !value.is_empty()) {
            Some(value) => PathBuf::from(value),
            None => env::current_dir().map_err(|_| ConfigError::MissingDocsDir)?,
        };

        let log_file = match env::var_os("MCP_LOG_FILE").filter(|value| !value.is_empty()) {
            Some(value) => PathBuf::from(value),
            None => default_cache_dir()
                .ok_or(ConfigError::MissingCacheDir)?
                .join("practices-mcp")
                .join("practices-mcp.log"),
        };

        Ok(Self { docs_dir, log_file })
    }
}

fn default_cache_dir() -> Option<PathBuf> {
    if let Some(cache) = env::var_os("XDG_CACHE_HOME").filter(|value| !value.is_empty()) {
        return Some(PathBuf::from(cache));
    }

    env::var_os("HOME")
        .filter(|value| !value.is_empty())
        .map(|home| PathBuf::from(home).join(".cache"))
}
