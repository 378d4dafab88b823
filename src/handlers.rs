use actix_cors::Cors;
use actix_web::http::header::{HeaderName, CONTENT_TYPE};
use actix_web::http::StatusCode;
use actix_web::{get, post, web, HttpRequest, HttpResponse, Responder};
use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use crate::AppState;
use crate::chat_session::{ChatEvent, ChatSession, NO_REPLY, NO_SUGGESTION};
use crate::forecast_selector::parse_target_date;
use crate::manager_gemini::errors::GeminiError;
use crate::manager_gemini::models::{Content, Role};
use crate::manager_github::errors::GitHubError;
use crate::manager_openweather::errors::OpenWeatherError;
use crate::manager_openweather::models::ForecastEntry;
use crate::prompts::{chat_prompt, extract_fortune, outfit_prompt};

const GEMINI_KEY_HEADER: &str = "x-gemini-api-key";

#[derive(Deserialize, Debug)]
struct WeatherParams {
    city: Option<String>,
    date: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ReposParams {
    owner: Option<String>,
}

#[derive(Deserialize, Debug)]
struct IssuesParams {
    owner: Option<String>,
    repo: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ChatRequest {
    session: Option<ChatSession>,
    message: String,
    model: Option<String>,
    #[serde(default)]
    reset: bool,
}

#[derive(Serialize)]
struct ChatResponse {
    reply: String,
    fortune: Option<Map<String, Value>>,
    session: ChatSession,
}

#[derive(Deserialize, Debug)]
struct OutfitRequest {
    city: String,
    date: Option<String>,
    model: Option<String>,
    session: Option<ChatSession>,
}

#[derive(Serialize)]
struct OutfitResponse {
    forecast: ForecastEntry,
    city: String,
    suggestion: String,
    session: ChatSession,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

/// Registers all proxy routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health)
        .service(weather_proxy)
        .service(github_repos)
        .service(github_issues)
        .service(chat)
        .service(outfit);
}

/// CORS policy letting the widget call the proxy from another origin
///
/// # Arguments
///
/// * 'allowed_origin' - comma separated origins, '*' allows any origin
pub fn cors(allowed_origin: &str) -> Cors {
    let cors = Cors::default()
        .allowed_methods(vec!["GET", "POST"])
        .allowed_headers(vec![CONTENT_TYPE, HeaderName::from_static(GEMINI_KEY_HEADER)])
        .max_age(86400);

    let origins: Vec<&str> = allowed_origin
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .collect();

    if origins.is_empty() || origins.contains(&"*") {
        return cors.allow_any_origin().send_wildcard();
    }

    origins.into_iter().fold(cors, |cors, origin| cors.allowed_origin(origin))
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

// city=Taipei,TW&date=2024-06-01
#[get("/api/weather-proxy")]
async fn weather_proxy(params: web::Query<WeatherParams>, data: web::Data<AppState>) -> impl Responder {
    info!("{:?}", params);

    let (city, date) = match (non_empty(&params.city), non_empty(&params.date)) {
        (Some(city), Some(date)) => (city, date),
        _ => return error_response(StatusCode::BAD_REQUEST, "Missing required city or date parameter.", None),
    };
    let date = match parse_target_date(date) {
        Ok(date) => date,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, &e.to_string(), None),
    };

    match data.weather.forecast_for_date(city, date, &data.selection, data.timezone).await {
        Ok(forecast) => HttpResponse::Ok().json(forecast),
        Err(e) => weather_error(e),
    }
}

#[get("/api/github-repos")]
async fn github_repos(params: web::Query<ReposParams>, data: web::Data<AppState>) -> impl Responder {
    info!("{:?}", params);

    let owner = match non_empty(&params.owner).or(data.default_owner.as_deref()) {
        Some(owner) => owner,
        None => return error_response(StatusCode::BAD_REQUEST, "Missing owner parameter.", None),
    };
    if !is_name(owner) {
        return error_response(StatusCode::BAD_REQUEST, "Invalid owner parameter.", None);
    }

    match data.github.repositories(owner).await {
        Ok(repos) => HttpResponse::Ok().json(repos),
        Err(e) => github_error(e, &format!("Check that the user or organization {} exists.", owner)),
    }
}

#[get("/api/github-issues")]
async fn github_issues(params: web::Query<IssuesParams>, data: web::Data<AppState>) -> impl Responder {
    info!("{:?}", params);

    let owner = non_empty(&params.owner).or(data.default_owner.as_deref());
    let repo = non_empty(&params.repo).or(data.default_repo.as_deref());

    let (owner, repo) = match (owner, repo) {
        (Some(owner), Some(repo)) => (owner, repo),
        _ if params.owner.is_none() && params.repo.is_none() => {
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "GitHub repository is not configured on the server (github.default_owner / github.default_repo).",
                None,
            );
        }
        _ => return error_response(StatusCode::BAD_REQUEST, "Missing owner or repo parameter.", None),
    };
    if !is_name(owner) || !is_name(repo) {
        return error_response(StatusCode::BAD_REQUEST, "Invalid owner or repo parameter.", None);
    }

    match data.github.issues(owner, repo).await {
        Ok(issues) => HttpResponse::Ok().json(issues),
        Err(e) => github_error(e, &format!("Check that the repository {}/{} is public and correctly named.", owner, repo)),
    }
}

#[post("/api/chat")]
async fn chat(req: HttpRequest, body: web::Json<ChatRequest>, data: web::Data<AppState>) -> impl Responder {
    let body = body.into_inner();
    let message = body.message.trim();
    if message.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Message is empty.", None);
    }
    let model = match model_name(&body.model, &data) {
        Some(model) => model,
        None => return error_response(StatusCode::BAD_REQUEST, "Invalid model parameter.", None),
    };

    let mut session = body.session.unwrap_or_default();
    if body.reset {
        session = session.apply(ChatEvent::Reset);
    }
    let session = session.apply(ChatEvent::UserMessage(message.to_string()));
    let contents = session.conversation_with(&chat_prompt(message, today(Utc::now())));

    match data.gemini.generate(gemini_key(&req), model, &contents).await {
        Ok(reply) => {
            let reply = reply.unwrap_or_else(|| NO_REPLY.to_string());
            let fortune = extract_fortune(&reply);
            let session = session.apply(ChatEvent::ModelReply(reply.clone()));

            HttpResponse::Ok().json(ChatResponse { reply, fortune, session })
        }
        Err(e) => gemini_error(e),
    }
}

#[post("/api/outfit")]
async fn outfit(req: HttpRequest, body: web::Json<OutfitRequest>, data: web::Data<AppState>) -> impl Responder {
    let body = body.into_inner();
    let city = body.city.trim();
    if city.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Enter a location.", None);
    }
    let model = match model_name(&body.model, &data) {
        Some(model) => model,
        None => return error_response(StatusCode::BAD_REQUEST, "Invalid model parameter.", None),
    };

    let api_key = gemini_key(&req);
    if !data.gemini.has_key(api_key) {
        return gemini_error(GeminiError::MissingKey);
    }

    let date = match non_empty(&body.date) {
        Some(date) => match parse_target_date(date) {
            Ok(date) => date,
            Err(e) => return error_response(StatusCode::BAD_REQUEST, &e.to_string(), None),
        },
        None => tomorrow(Utc::now()),
    };

    let dated = match data.weather.forecast_for_date(city, date, &data.selection, data.timezone).await {
        Ok(dated) => dated,
        Err(e) => return weather_error(e),
    };

    let prompt = outfit_prompt(&dated.city, &dated.forecast, today(Utc::now()));
    let contents = [Content::new(Role::User, &prompt)];

    match data.gemini.generate(api_key, model, &contents).await {
        Ok(suggestion) => {
            let suggestion = suggestion.unwrap_or_else(|| NO_SUGGESTION.to_string());
            let session = body.session
                .unwrap_or_default()
                .apply(ChatEvent::WeatherSuggestion(suggestion.clone()));

            HttpResponse::Ok().json(OutfitResponse {
                forecast: dated.forecast,
                city: dated.city,
                suggestion,
                session,
            })
        }
        Err(e) => gemini_error(e),
    }
}

/// Dates shown in prompts and used as defaults are UTC dates, same as the forecast timestamps
fn today(now: DateTime<Utc>) -> NaiveDate {
    now.date_naive()
}

/// The date the widget asks about when none is given
fn tomorrow(now: DateTime<Utc>) -> NaiveDate {
    today(now) + TimeDelta::days(1)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// True for GitHub logins, repository names and model names: [A-Za-z0-9._-]+ except '.' and '..'
fn is_name(value: &str) -> bool {
    !matches!(value, "" | "." | "..")
        && value.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

/// The requested model if it is a valid name, the configured one if none was requested
fn model_name<'a>(requested: &'a Option<String>, data: &'a AppState) -> Option<&'a str> {
    match non_empty(requested) {
        Some(model) if is_name(model) => Some(model),
        Some(_) => None,
        None => Some(data.gemini.default_model()),
    }
}

fn gemini_key(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(GEMINI_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
}

fn error_response(status: StatusCode, error: &str, detail: Option<String>) -> HttpResponse {
    HttpResponse::build(status).json(ErrorBody { error: error.to_string(), detail })
}

fn weather_error(e: OpenWeatherError) -> HttpResponse {
    match e {
        OpenWeatherError::Rejected(message) => {
            warn!("openweather rejected the request: {:?}", message);
            let message = message.unwrap_or_else(|| "Unable to fetch weather data, check the city name.".to_string());
            error_response(StatusCode::NOT_FOUND, &message, None)
        }
        OpenWeatherError::NoForecast(date) => error_response(
            StatusCode::NOT_FOUND,
            &format!("No forecast found for {}. Try a different date or location.", date),
            None,
        ),
        e => {
            error!("openweather call failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Server error while calling the external API.", None)
        }
    }
}

fn github_error(e: GitHubError, detail: &str) -> HttpResponse {
    match e {
        GitHubError::Status { status, message } => {
            warn!("github answered {}: {:?}", status, message);
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            let message = message.unwrap_or_else(|| "GitHub lookup failed.".to_string());
            error_response(status, &message, Some(detail.to_string()))
        }
        e => {
            error!("github call failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Server error while calling the GitHub API.", None)
        }
    }
}

fn gemini_error(e: GeminiError) -> HttpResponse {
    match e {
        GeminiError::MissingKey => {
            error_response(StatusCode::BAD_REQUEST, "Enter a valid Gemini API key first.", None)
        }
        GeminiError::Status { status, message } => {
            warn!("gemini answered {}: {:?}", status, message);
            let message = message.unwrap_or_else(|| "Text generation failed.".to_string());
            error_response(StatusCode::BAD_GATEWAY, &message, Some(format!("upstream status {}", status)))
        }
        e => {
            error!("gemini call failed: {}", e);
            error_response(StatusCode::BAD_GATEWAY, "Server error while calling the text generation API.", None)
        }
    }
}
