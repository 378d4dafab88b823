use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Part {
    pub text: String,
}

/// One turn of a conversation in the generateContent wire format
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Content {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl Content {
    pub fn new(role: Role, text: &str) -> Self {
        Self { role, parts: vec![Part { text: text.to_string() }] }
    }
}

#[derive(Serialize)]
pub struct GenerateRequest<'a> {
    pub contents: &'a [Content],
}

#[derive(Deserialize)]
pub struct CandidatePart {
    pub text: Option<String>,
}

#[derive(Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
}

#[derive(Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
pub struct ErrorBody {
    pub message: Option<String>,
}

#[derive(Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}
