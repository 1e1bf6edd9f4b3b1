// src/utils/config.rs

use crate::api::config::{
    BackendConfig, BackendKind, DEFAULT_LOCAL_MODEL, DEFAULT_REMOTE_MODEL,
    DEFAULT_REQUEST_TIMEOUT_SECS, LOCAL_BASE_URL, REMOTE_BASE_URL,
};
use crate::api::prompt::DEFAULT_LANGUAGE;
use crate::errors::AppError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::{env, fs};

/// Environment variable consulted when no API key is stored in the config.
pub const API_KEY_ENV: &str = "GROQ_API_KEY";

const LOG_LEVELS: [&str; 5] = ["off", "error", "warn", "info", "debug"];

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub use_remote: bool,
    pub remote_model: String,
    pub remote_base_url: String,
    pub api_key: Option<String>,
    pub local_model: String,
    pub local_base_url: String,
    pub request_timeout_secs: u64,
    pub log_level: String,
    pub language: String,
    pub backup_before_overwrite: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            use_remote: true,
            remote_model: DEFAULT_REMOTE_MODEL.to_string(),
            remote_base_url: REMOTE_BASE_URL.to_string(),
            api_key: None,
            local_model: DEFAULT_LOCAL_MODEL.to_string(),
            local_base_url: LOCAL_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            log_level: "off".to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            backup_before_overwrite: true,
        }
    }
}

impl Config {
    /// The backend record handed to `backend_from_config`.
    pub fn backend_config(&self) -> BackendConfig {
        let api_key = self
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| env::var(API_KEY_ENV).ok());

        BackendConfig {
            kind: if self.use_remote {
                BackendKind::Remote
            } else {
                BackendKind::Local
            },
            remote_model: self.remote_model.clone(),
            remote_base_url: self.remote_base_url.clone(),
            api_key,
            local_model: self.local_model.clone(),
            local_base_url: self.local_base_url.clone(),
            request_timeout_secs: self.request_timeout_secs,
        }
    }
}

pub fn get_config_path() -> Result<PathBuf, AppError> {
    let mut path = get_executable_dir()?;
    path.push("config.toml");
    Ok(path)
}

/// Validate config to prevent obviously wrong or missing values.
pub fn validate_config(config: &Config) -> Result<(), AppError> {
    if config.remote_model.trim().is_empty() || config.local_model.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "Model names cannot be empty".to_string(),
        ));
    }
    if config.request_timeout_secs == 0 {
        return Err(AppError::InvalidInput(
            "Request timeout cannot be zero".to_string(),
        ));
    }
    if !LOG_LEVELS.contains(&config.log_level.as_str()) {
        return Err(AppError::InvalidInput(format!(
            "Unknown log level: {} (expected one of {})",
            config.log_level,
            LOG_LEVELS.join(", ")
        )));
    }
    if config.language.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "Language cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Read config from file, and create a default config if none exists.
pub fn read_config() -> Result<Config, AppError> {
    read_config_from(&get_config_path()?)
}

pub fn read_config_from(config_path: &Path) -> Result<Config, AppError> {
    if !config_path.exists() {
        write_config_to(config_path, &Config::default())?;
    }
    let config_str = fs::read_to_string(config_path)?;
    let config: Config = toml::from_str(&config_str)?;
    validate_config(&config)?;
    Ok(config)
}

pub fn write_config(config: &Config) -> Result<(), AppError> {
    write_config_to(&get_config_path()?, config)
}

pub fn write_config_to(config_path: &Path, config: &Config) -> Result<(), AppError> {
    let config_str = toml::to_string(config)?;
    fs::write(config_path, config_str)?;
    Ok(())
}

fn get_executable_dir() -> Result<PathBuf, AppError> {
    let exe = env::current_exe()?;
    exe.parent().map(Path::to_path_buf).ok_or_else(|| {
        AppError::InvalidInput(format!(
            "Executable has no parent directory: {}",
            exe.display()
        ))
    })
}
