use std::{env, fs};
use chrono::NaiveTime;
use log::info;
use serde::Deserialize;
use crate::errors::ConfigError;
use crate::forecast_selector::{noon, SelectionOptions, SelectionPolicy};
use crate::logging::setup_logger;

#[derive(Deserialize, Debug)]
pub struct WebServerParameters {
    pub bind_address: String,
    pub bind_port: u16,
    #[serde(default = "default_allowed_origin")]
    pub allowed_origin: String,
}

#[derive(Deserialize, Debug)]
pub struct General {
    pub log_path: Option<String>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_true")]
    pub log_to_stdout: bool,
}

#[derive(Deserialize, Debug)]
pub struct OpenWeatherConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_openweather_url")]
    pub base_url: String,
    #[serde(default = "default_units")]
    pub units: String,
    #[serde(default = "default_lang")]
    pub lang: String,
}

impl Default for OpenWeatherConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_openweather_url(),
            units: default_units(),
            lang: default_lang(),
        }
    }
}

/// Wall clock used when comparing forecast samples with a target date
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimezonePolicy {
    #[default]
    Utc,
    CityLocal,
}

#[derive(Deserialize, Debug)]
pub struct ForecastConfig {
    #[serde(default)]
    pub policy: SelectionPolicy,
    #[serde(default = "noon")]
    pub reference_hour: NaiveTime,
    #[serde(default)]
    pub timezone: TimezonePolicy,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            policy: SelectionPolicy::default(),
            reference_hour: noon(),
            timezone: TimezonePolicy::default(),
        }
    }
}

impl ForecastConfig {
    pub fn selection_options(&self) -> SelectionOptions {
        SelectionOptions {
            policy: self.policy,
            reference_hour: self.reference_hour,
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct GitHubConfig {
    #[serde(default = "default_github_url")]
    pub base_url: String,
    pub default_owner: Option<String>,
    pub default_repo: Option<String>,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    pub token: Option<String>,
    #[serde(default = "default_per_page")]
    pub per_page: u8,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            base_url: default_github_url(),
            default_owner: None,
            default_repo: None,
            user_agent: default_user_agent(),
            token: None,
            per_page: default_per_page(),
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct GeminiConfig {
    #[serde(default = "default_gemini_url")]
    pub base_url: String,
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: default_gemini_url(),
            api_key: None,
            model: default_model(),
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct Config {
    pub web_server: WebServerParameters,
    pub general: General,
    #[serde(default)]
    pub openweather: OpenWeatherConfig,
    #[serde(default)]
    pub forecast: ForecastConfig,
    #[serde(default)]
    pub github: GitHubConfig,
    #[serde(default)]
    pub gemini: GeminiConfig,
}

/// Loads the configuration file and sets up logging
///
/// The file is given by the environment variable CONFIG_FILE and defaults to config.toml.
/// API keys and tokens in the environment take precedence over the file.
pub fn config() -> Result<Config, ConfigError> {
    let config_path = env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".to_string());

    let mut config = load_config(&config_path)?;
    apply_env_overrides(&mut config, |key| env::var(key).ok());

    if config.openweather.api_key.is_empty() {
        return Err(ConfigError::from("openweather api key missing, set it in config or OPENWEATHER_API_KEY"));
    }

    setup_logger(&config.general)?;
    info!("configuration loaded from {}", config_path);

    if config.github.default_owner.is_none() || config.github.default_repo.is_none() {
        log::warn!("github default owner/repo not configured, requests must name them explicitly");
    }

    Ok(config)
}

/// Loads and parses a toml configuration file
///
/// # Arguments
///
/// * 'config_path' - path to the configuration file
pub fn load_config(config_path: &str) -> Result<Config, ConfigError> {
    let toml = fs::read_to_string(config_path)?;
    parse_config(&toml)
}

/// Parses configuration from a toml string
///
/// # Arguments
///
/// * 'toml' - the configuration document
pub fn parse_config(toml: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(toml)?;

    if config.github.per_page == 0 || config.github.per_page > 100 {
        return Err(ConfigError::from("github per_page must be between 1 and 100"));
    }

    Ok(config)
}

/// Replaces secrets in the configuration with values found in the environment
///
/// # Arguments
///
/// * 'config' - configuration to update
/// * 'lookup' - returns the value of an environment variable, if set
fn apply_env_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(key) = lookup("OPENWEATHER_API_KEY") {
        config.openweather.api_key = key;
    }
    if let Some(key) = lookup("GEMINI_API_KEY") {
        config.gemini.api_key = Some(key);
    }
    if let Some(token) = lookup("GITHUB_TOKEN") {
        config.github.token = Some(token);
    }
    if let Some(owner) = lookup("GITHUB_REPO_OWNER") {
        config.github.default_owner = Some(owner);
    }
    if let Some(repo) = lookup("GITHUB_REPO_NAME") {
        config.github.default_repo = Some(repo);
    }
}

fn default_allowed_origin() -> String { "*".to_string() }
fn default_log_level() -> String { "info".to_string() }
fn default_true() -> bool { true }
fn default_openweather_url() -> String { "http://api.openweathermap.org/data/2.5".to_string() }
fn default_units() -> String { "metric".to_string() }
fn default_lang() -> String { "zh_cn".to_string() }
fn default_github_url() -> String { "https://api.github.com".to_string() }
fn default_user_agent() -> String { "fortune-proxy".to_string() }
fn default_per_page() -> u8 { 5 }
fn default_gemini_url() -> String { "https://generativelanguage.googleapis.com/v1beta".to_string() }
fn default_model() -> String { "gemini-2.5-flash".to_string() }
