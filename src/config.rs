use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::cli::Cli;
use crate::debounce::DEFAULT_DEBOUNCE;
use crate::error::{Error, Result};

pub const DEFAULT_CONFIG_PATH: &str = ".tasktrack/config.toml";
pub const API_URL_ENV: &str = "TASKTRACK_API_URL";

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub base_url: Option<String>,
    pub debounce_ms: Option<u64>,
    pub template_dir: Option<String>,
    pub confirm_delete: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub base_url: String,
    pub debounce_ms: u64,
    pub template_dir: Option<PathBuf>,
    pub confirm_delete: bool,
}

impl Config {
    /// Load the config file, then layer `TASKTRACK_API_URL` and CLI flags on top.
    /// An explicit `--config` must exist; the default path is optional.
    pub fn load(cli: &Cli) -> Result<Self> {
        let file_config = match cli.config {
            Some(ref path) => {
                let path = Path::new(path);
                if !path.exists() {
                    return Err(Error::ConfigNotFound(path.to_path_buf()));
                }
                parse_config(&std::fs::read_to_string(path)?)?
            }
            None => {
                let path = Path::new(DEFAULT_CONFIG_PATH);
                if path.exists() {
                    parse_config(&std::fs::read_to_string(path)?)?
                } else {
                    ConfigFile::default()
                }
            }
        };

        let env_url = std::env::var(API_URL_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty());
        merge(file_config, cli, env_url)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

pub fn parse_config(content: &str) -> Result<ConfigFile> {
    let config: ConfigFile = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &ConfigFile) -> Result<()> {
    if let Some(ref url) = config.base_url {
        validate_base_url(url)?;
    }
    if let Some(debounce) = config.debounce_ms
        && debounce == 0
    {
        return Err(Error::ConfigValidation(
            "debounce_ms must be > 0".to_string(),
        ));
    }
    Ok(())
}

fn validate_base_url(url: &str) -> Result<()> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(Error::ConfigValidation(format!(
            "base_url must be an http(s) URL: {url}"
        )))
    }
}

/// Precedence: CLI flag, then environment, then file.
pub fn merge(file: ConfigFile, cli: &Cli, env_url: Option<String>) -> Result<Config> {
    let base_url = cli
        .base_url
        .clone()
        .or(env_url)
        .or(file.base_url)
        .ok_or_else(|| {
            Error::ConfigValidation(format!(
                "no task collection URL: set --base-url, ${API_URL_ENV}, or base_url in {DEFAULT_CONFIG_PATH}"
            ))
        })?;
    validate_base_url(&base_url)?;

    Ok(Config {
        base_url,
        debounce_ms: file
            .debounce_ms
            .unwrap_or(DEFAULT_DEBOUNCE.as_millis() as u64),
        template_dir: file.template_dir.map(PathBuf::from),
        confirm_delete: file.confirm_delete.unwrap_or(true),
    })
}
