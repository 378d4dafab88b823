mod errors;
mod logging;
mod initialization;
mod forecast_selector;
mod manager_openweather;
mod manager_github;
mod manager_gemini;
mod prompts;
mod chat_session;
mod handlers;

use actix_web::{web, App, HttpServer};
use log::info;
use crate::errors::UnrecoverableError;
use crate::forecast_selector::SelectionOptions;
use crate::handlers::{configure, cors};
use crate::initialization::{config, TimezonePolicy};
use crate::manager_gemini::Gemini;
use crate::manager_github::GitHub;
use crate::manager_openweather::OpenWeather;

struct AppState {
    weather: OpenWeather,
    github: GitHub,
    gemini: Gemini,
    selection: SelectionOptions,
    timezone: TimezonePolicy,
    default_owner: Option<String>,
    default_repo: Option<String>,
}

#[actix_web::main]
async fn main() -> Result<(), UnrecoverableError> {
    let config = config()?;

    let state = web::Data::new(AppState {
        weather: OpenWeather::new(&config.openweather)?,
        github: GitHub::new(&config.github)?,
        gemini: Gemini::new(&config.gemini)?,
        selection: config.forecast.selection_options(),
        timezone: config.forecast.timezone,
        default_owner: config.github.default_owner.clone(),
        default_repo: config.github.default_repo.clone(),
    });

    info!("forecast selection: {:?} at {}, timezone {:?}",
          config.forecast.policy, config.forecast.reference_hour, config.forecast.timezone);
    info!("listening on {}:{}", config.web_server.bind_address, config.web_server.bind_port);

    let allowed_origin = config.web_server.allowed_origin.clone();

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(cors(&allowed_origin))
            .configure(configure)
    })
        .bind((config.web_server.bind_address, config.web_server.bind_port))?
        .run()
        .await?;

    Ok(())
}
