pub mod errors;
pub mod models;

use std::time::Duration;
use chrono::{FixedOffset, NaiveDate, Offset, Utc};
use log::{debug, info};
use reqwest::Client;
use serde_json::Value;
use crate::forecast_selector::{ensure_sorted, select, SelectionOptions};
use crate::initialization::{OpenWeatherConfig, TimezonePolicy};
use crate::manager_openweather::errors::OpenWeatherError;
use crate::manager_openweather::models::{DatedForecast, ForecastEntry, ForecastSeries, FullForecast};


/// Struct for fetching 5 day / 3 hour forecasts from OpenWeather
pub struct OpenWeather {
    client: Client,
    api_key: String,
    base_url: String,
    units: String,
    lang: String,
}

impl OpenWeather {
    /// Returns an OpenWeather struct ready for fetching forecasts
    ///
    /// # Arguments
    ///
    /// * 'config' - api key, base url, units and language to request
    pub fn new(config: &OpenWeatherConfig) -> Result<OpenWeather, OpenWeatherError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            units: config.units.clone(),
            lang: config.lang.clone(),
        })
    }

    /// Retrieves the full forecast series for a city
    ///
    /// # Arguments
    ///
    /// * 'city' - city name as typed by the user, e.g. "Taipei, TW"
    pub async fn forecast(&self, city: &str) -> Result<ForecastSeries, OpenWeatherError> {
        let url = format!("{}/forecast", self.base_url);

        let req = self.client
            .get(url)
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", self.units.as_str()),
                ("lang", self.lang.as_str()),
            ])
            .send().await?;

        let status = req.status();
        let json = req.text().await?;
        debug!("openweather answered {} for '{}'", status, city);

        decode_forecast(status.as_u16(), &json)
    }

    /// Retrieves the forecast sample representing the given date
    ///
    /// # Arguments
    ///
    /// * 'city' - city name as typed by the user
    /// * 'date' - the date to get a forecast for
    /// * 'options' - selection policy and reference hour
    /// * 'timezone' - wall clock to compare sample times in
    pub async fn forecast_for_date(&self, city: &str, date: NaiveDate, options: &SelectionOptions, timezone: TimezonePolicy) -> Result<DatedForecast, OpenWeatherError> {
        let series = self.forecast(city).await?;
        info!("got {} forecast samples for {}", series.list.len(), series.city);

        pick_forecast(series, date, options, timezone)
    }
}

/// Decodes a forecast response. Error documents carry cod and message, so the body
/// is decoded regardless of status. A failed request without such a document is an
/// upstream failure rather than a bad document.
///
/// # Arguments
///
/// * 'status' - http status of the response
/// * 'json' - the response body
fn decode_forecast(status: u16, json: &str) -> Result<ForecastSeries, OpenWeatherError> {
    match parse_forecast(json) {
        Err(OpenWeatherError::Document(e)) if !(200..300).contains(&status) => {
            Err(OpenWeatherError::OpenWeather(format!("Error while fetching forecast from OpenWeather: {} ({})", status, e)))
        }
        result => result,
    }
}

/// Decodes an OpenWeather forecast document
///
/// # Arguments
///
/// * 'json' - the response body
pub fn parse_forecast(json: &str) -> Result<ForecastSeries, OpenWeatherError> {
    let full: FullForecast = serde_json::from_str(json)?;

    if !is_success_code(&full.cod) {
        let message = match full.message {
            Value::String(m) if !m.is_empty() => Some(m),
            _ => None,
        };
        return Err(OpenWeatherError::Rejected(message));
    }

    let list = full.list.ok_or_else(|| OpenWeatherError::Document("missing list".to_string()))?;
    let city = full.city.ok_or_else(|| OpenWeatherError::Document("missing city".to_string()))?;
    let utc_offset = FixedOffset::east_opt(city.timezone)
        .ok_or_else(|| OpenWeatherError::Document(format!("invalid timezone offset {}", city.timezone)))?;

    Ok(ForecastSeries { city: city.name, utc_offset, list })
}

/// Picks the sample for a date out of a series and wraps it with the city name
///
/// # Arguments
///
/// * 'series' - decoded forecast series
/// * 'date' - the date to get a forecast for
/// * 'options' - selection policy and reference hour
/// * 'timezone' - wall clock to compare sample times in
pub fn pick_forecast(series: ForecastSeries, date: NaiveDate, options: &SelectionOptions, timezone: TimezonePolicy) -> Result<DatedForecast, OpenWeatherError> {
    let offset = match timezone {
        TimezonePolicy::Utc => Utc.fix(),
        TimezonePolicy::CityLocal => series.utc_offset,
    };
    let wall_clock = |e: &ForecastEntry| e.wall_clock(&offset);

    ensure_sorted(&series.list, wall_clock)?;

    match select(&series.list, date, options, wall_clock) {
        Some(forecast) => Ok(DatedForecast {
            forecast: forecast.clone(),
            city: series.city,
        }),
        None => Err(OpenWeatherError::NoForecast(date)),
    }
}

/// OpenWeather reports success as the string "200", errors as strings or numbers
fn is_success_code(cod: &Value) -> bool {
    match cod {
        Value::String(s) => s == "200",
        Value::Number(n) => n.as_u64() == Some(200),
        _ => false,
    }
}
