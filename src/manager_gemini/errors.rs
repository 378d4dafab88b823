use std::fmt;

#[derive(Debug)]
pub enum GeminiError {
    Gemini(String),
    Document(String),
    Status { status: u16, message: Option<String> },
    MissingKey,
}

impl fmt::Display for GeminiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GeminiError::Gemini(e) => write!(f, "GeminiError::Gemini: {}", e),
            GeminiError::Document(e) => write!(f, "GeminiError::Document: {}", e),
            GeminiError::Status { status, message } => {
                write!(f, "GeminiError::Status: {} {}", status, message.as_deref().unwrap_or(""))
            }
            GeminiError::MissingKey => write!(f, "GeminiError::MissingKey"),
        }
    }
}
impl From<reqwest::Error> for GeminiError {
    fn from(e: reqwest::Error) -> Self {
        GeminiError::Gemini(e.to_string())
    }
}
impl From<serde_json::Error> for GeminiError {
    fn from(e: serde_json::Error) -> Self {
        GeminiError::Document(e.to_string())
    }
}
