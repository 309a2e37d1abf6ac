use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::mail::gmail::DEFAULT_API_BASE;

/// Gmail rejects larger `maxResults` values.
pub const MAX_PAGE_SIZE: u32 = 500;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Page counts, `--- subject` and an indented URL per message
    #[default]
    Text,
    /// One JSON object per message
    Json,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub query: String,
    pub page_size: u32,
    /// Google OAuth client secret file (as downloaded from the cloud console)
    pub credentials_path: PathBuf,
    /// Cached OAuth token
    pub token_path: PathBuf,
    pub api_base_url: String,
    /// Used by the loopback flow; the console flow uses the first redirect of the client secret.
    pub redirect_uri: Option<String>,
    pub open_browser: bool,
    pub format: OutputFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            query: "label:Recipes".to_string(),
            page_size: 25,
            credentials_path: PathBuf::from("../credentials.json"),
            token_path: PathBuf::from("../token.json"),
            api_base_url: DEFAULT_API_BASE.to_string(),
            redirect_uri: None,
            open_browser: true,
            format: OutputFormat::Text,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.query.trim().is_empty() {
            return Err(ConfigError::Invalid {
                message: "query must not be empty".into(),
            });
        }
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::Invalid {
                message: format!(
                    "page_size must be between 1 and {MAX_PAGE_SIZE}, got {}",
                    self.page_size
                ),
            });
        }
        Ok(())
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("label-links").join("config.toml"))
}

/// Reads `path`, or the default location when `path` is `None`. A missing
/// default file yields the built-in defaults; an explicitly named file must exist.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let (path, required) = match path {
        Some(p) => (p.to_path_buf(), true),
        None => match default_config_path() {
            Some(p) => (p, false),
            None => return Ok(Config::default()),
        },
    };

    if !required && !path.exists() {
        return Ok(Config::default());
    }

    let s = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    toml::from_str(&s).map_err(|source| ConfigError::Parse { path, source })
}
