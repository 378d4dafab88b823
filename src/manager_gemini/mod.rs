pub mod errors;
pub mod models;

use std::time::Duration;
use log::debug;
use reqwest::{Client, Url};
use crate::initialization::GeminiConfig;
use crate::manager_gemini::errors::GeminiError;
use crate::manager_gemini::models::{Content, ErrorEnvelope, GenerateRequest, GenerateResponse};

/// Struct for generating text with the Gemini generateContent api
pub struct Gemini {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
    default_model: String,
}

impl Gemini {
    /// Returns a Gemini struct, the api key from config is used when a request brings none
    ///
    /// # Arguments
    ///
    /// * 'config' - base url, optional api key and default model
    pub fn new(config: &GeminiConfig) -> Result<Gemini, GeminiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;

        Ok(Self {
            client,
            base_url: Url::parse(&config.base_url).map_err(|e| GeminiError::Gemini(format!("base url {}: {}", config.base_url, e)))?,
            api_key: config.api_key.clone(),
            default_model: config.model.clone(),
        })
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    /// True if a usable api key is available, either from the caller or from configuration
    pub fn has_key(&self, requested: Option<&str>) -> bool {
        resolve_key(requested, self.api_key.as_deref()).is_ok()
    }

    /// Sends a conversation and returns the text of the first candidate,
    /// None if the model produced no text
    ///
    /// # Arguments
    ///
    /// * 'api_key' - key given by the caller, takes precedence over the configured one
    /// * 'model' - model name, e.g. gemini-2.5-flash
    /// * 'contents' - the conversation, last turn being the prompt
    pub async fn generate(&self, api_key: Option<&str>, model: &str, contents: &[Content]) -> Result<Option<String>, GeminiError> {
        let api_key = resolve_key(api_key, self.api_key.as_deref())?;
        let url = generate_url(&self.base_url, model)?;

        let req = self.client
            .post(url)
            .header("x-goog-api-key", api_key)
            .json(&GenerateRequest { contents })
            .send().await?;

        let status = req.status();
        let json = req.text().await?;
        debug!("gemini answered {} for model {}", status, model);

        decode_reply(status.as_u16(), &json)
    }
}

/// Url of the generateContent method of a model, the model name is escaped as one path segment
///
/// # Arguments
///
/// * 'base' - api base url
/// * 'model' - model name
fn generate_url(base: &Url, model: &str) -> Result<Url, GeminiError> {
    if matches!(model, "" | "." | "..") {
        return Err(GeminiError::Gemini(format!("invalid model name '{}'", model)));
    }

    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| GeminiError::Gemini(format!("{} can not be a base url", base)))?
        .pop_if_empty()
        .push("models")
        .push(&format!("{}:generateContent", model));

    Ok(url)
}

/// Picks the api key to use, blank keys count as missing
///
/// # Arguments
///
/// * 'requested' - key sent by the caller
/// * 'configured' - key from configuration
fn resolve_key<'a>(requested: Option<&'a str>, configured: Option<&'a str>) -> Result<&'a str, GeminiError> {
    requested
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .or(configured.map(str::trim).filter(|k| !k.is_empty()))
        .ok_or(GeminiError::MissingKey)
}

/// Decodes a generateContent response
///
/// # Arguments
///
/// * 'status' - http status of the response
/// * 'json' - the response body
fn decode_reply(status: u16, json: &str) -> Result<Option<String>, GeminiError> {
    if !(200..300).contains(&status) {
        let message = serde_json::from_str::<ErrorEnvelope>(json)
            .ok()
            .and_then(|e| e.error.message);
        return Err(GeminiError::Status { status, message });
    }

    let response: GenerateResponse = serde_json::from_str(json)?;
    let text: String = response.candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        Ok(None)
    } else {
        Ok(Some(text))
    }
}
