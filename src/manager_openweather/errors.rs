use std::fmt;
use chrono::NaiveDate;
use crate::errors::SelectorError;

#[derive(Debug)]
pub enum OpenWeatherError {
    OpenWeather(String),
    Document(String),
    Rejected(Option<String>),
    NoForecast(NaiveDate),
    Precondition(String),
}

impl fmt::Display for OpenWeatherError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OpenWeatherError::OpenWeather(e) => write!(f, "OpenWeatherError::OpenWeather: {}", e),
            OpenWeatherError::Document(e) => write!(f, "OpenWeatherError::Document: {}", e),
            OpenWeatherError::Rejected(e) => write!(f, "OpenWeatherError::Rejected: {}", e.as_deref().unwrap_or("no message")),
            OpenWeatherError::NoForecast(d) => write!(f, "OpenWeatherError::NoForecast: {}", d),
            OpenWeatherError::Precondition(e) => write!(f, "OpenWeatherError::Precondition: {}", e),
        }
    }
}
impl From<reqwest::Error> for OpenWeatherError {
    fn from(e: reqwest::Error) -> Self {
        OpenWeatherError::OpenWeather(e.to_string())
    }
}
impl From<serde_json::Error> for OpenWeatherError {
    fn from(e: serde_json::Error) -> Self {
        OpenWeatherError::Document(e.to_string())
    }
}
impl From<SelectorError> for OpenWeatherError {
    fn from(e: SelectorError) -> Self {
        OpenWeatherError::Precondition(e.to_string())
    }
}
