use crate::api::config::{BASE_URL, DEFAULT_MODEL};
use crate::errors::AppError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs};

pub const CONFIG_FILE: &str = "config.toml";
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub log_level: String,
    pub output_directory: String,
    pub favicon_path: String,
    pub deploy_command: String,
    pub request_timeout_secs: u64,
    pub deploy_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            log_level: "off".to_string(),
            output_directory: "generated_websites".to_string(),
            favicon_path: "assets/default_favicon.ico".to_string(),
            deploy_command: "vercel".to_string(),
            request_timeout_secs: 180,
            deploy_timeout_secs: 600,
        }
    }
}

impl Config {
    /// API key from the config file, falling back to `OPENAI_API_KEY`.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| env::var(API_KEY_ENV).ok().filter(|key| !key.trim().is_empty()))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn deploy_timeout(&self) -> Duration {
        Duration::from_secs(self.deploy_timeout_secs)
    }
}

pub fn get_config_path() -> Result<PathBuf, AppError> {
    Ok(get_executable_dir()?.join(CONFIG_FILE))
}

/// Validate config to prevent obviously wrong or missing values.
pub fn validate_config(config: &Config) -> Result<(), AppError> {
    if config.request_timeout_secs == 0 || config.deploy_timeout_secs == 0 {
        return Err(AppError::InvalidInput(
            "Timeouts must be greater than zero".to_string(),
        ));
    }
    if config.model.trim().is_empty() {
        return Err(AppError::InvalidInput("Model cannot be empty".to_string()));
    }
    if config.deploy_command.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "Deploy command cannot be empty".to_string(),
        ));
    }
    if !config.base_url.starts_with("http") {
        return Err(AppError::InvalidInput(format!(
            "Base URL must be an http(s) URL: {}",
            config.base_url
        )));
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
        AppError::InvalidInput(format!("executable has no parent directory: {}", exe.display()))
    })
}
