use reqwest::Url;
use std::env;
use std::path::PathBuf;
use thiserror::Error;

use crate::db::Database;

const DEFAULT_API_URL: &str = "http://localhost:8080";
const DEFAULT_LOG_LEVEL: &str = "warn";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JOBPOST_API_URL must be an http(s) URL, got '{value}'")]
    InvalidApiUrl { value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_url: String,
    pub api_token: Option<String>,
    pub db_path: PathBuf,
    pub log_level: String,
}

impl Config {
    /// Reads the process environment, after loading `.env` if one exists.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let api_url = non_empty("JOBPOST_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        match Url::parse(&api_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => return Err(ConfigError::InvalidApiUrl { value: api_url }),
        }

        Ok(Self {
            api_url,
            api_token: non_empty("JOBPOST_API_TOKEN"),
            db_path: non_empty("JOBPOST_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(Database::default_path),
            log_level: non_empty("JOBPOST_LOG").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        })
    }
}
