use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct Owner {
    pub login: String,
}

#[derive(Deserialize)]
pub struct FullRepository {
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub html_url: String,
    #[serde(default)]
    pub stargazers_count: u32,
    pub language: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Deserialize)]
pub struct FullIssue {
    pub number: u64,
    pub title: String,
    pub html_url: String,
    pub user: Owner,
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize)]
pub struct UpstreamMessage {
    pub message: Option<String>,
}

#[derive(Serialize, Debug, PartialEq)]
pub struct Repository {
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub url: String,
    pub stars: u32,
    pub language: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, Debug, PartialEq)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    pub url: String,
    pub user: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

impl From<FullRepository> for Repository {
    fn from(r: FullRepository) -> Self {
        Self {
            name: r.name,
            full_name: r.full_name,
            description: r.description,
            url: r.html_url,
            stars: r.stargazers_count,
            language: r.language,
            updated_at: r.updated_at,
        }
    }
}

impl From<FullIssue> for Issue {
    fn from(i: FullIssue) -> Self {
        Self {
            number: i.number,
            title: i.title,
            url: i.html_url,
            user: i.user.login,
            created_at: i.created_at.format("%m/%d").to_string(),
        }
    }
}
