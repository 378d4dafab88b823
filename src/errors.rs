use std::fmt;
use std::fmt::Formatter;
use log4rs::config::runtime::ConfigErrors;
use log::SetLoggerError;
use crate::manager_gemini::errors::GeminiError;
use crate::manager_github::errors::GitHubError;
use crate::manager_openweather::errors::OpenWeatherError;

/// Error representing an unrecoverable error that will halt the application
///
#[derive(Debug)]
pub struct UnrecoverableError(pub String);
impl fmt::Display for UnrecoverableError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "UnrecoverableError: {}", self.0)
    }
}
impl From<std::io::Error> for UnrecoverableError {
    fn from(e: std::io::Error) -> Self { UnrecoverableError(e.to_string()) }
}
impl From<ConfigError> for UnrecoverableError {
    fn from(e: ConfigError) -> Self {
        UnrecoverableError(e.to_string())
    }
}
impl From<OpenWeatherError> for UnrecoverableError {
    fn from(e: OpenWeatherError) -> Self { UnrecoverableError(e.to_string()) }
}
impl From<GitHubError> for UnrecoverableError {
    fn from(e: GitHubError) -> Self { UnrecoverableError(e.to_string()) }
}
impl From<GeminiError> for UnrecoverableError {
    fn from(e: GeminiError) -> Self { UnrecoverableError(e.to_string()) }
}

/// Errors while managing configuration
///
#[derive(Debug)]
pub struct ConfigError(pub String);

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "ConfigError: {}", self.0)
    }
}
impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self { ConfigError(e.to_string()) }
}
impl From<SetLoggerError> for ConfigError {
    fn from(e: SetLoggerError) -> Self {
        ConfigError(e.to_string())
    }
}
impl From<ConfigErrors> for ConfigError {
    fn from(e: ConfigErrors) -> Self {
        ConfigError(e.to_string())
    }
}
impl From<&str> for ConfigError {
    fn from(e: &str) -> Self { ConfigError(e.to_string()) }
}
impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError(e.to_string())
    }
}

/// Precondition violations detected before running a forecast selection
///
#[derive(Debug)]
pub enum SelectorError {
    InvalidDate(String),
    Unsorted(usize),
}
impl fmt::Display for SelectorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SelectorError::InvalidDate(d) => write!(f, "SelectorError::InvalidDate: '{}' is not a YYYY-MM-DD date", d),
            SelectorError::Unsorted(i) => write!(f, "SelectorError::Unsorted: sample {} is earlier than its predecessor", i),
        }
    }
}
