use std::fmt;

#[derive(Debug)]
pub enum GitHubError {
    GitHub(String),
    Document(String),
    Status { status: u16, message: Option<String> },
}

impl fmt::Display for GitHubError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GitHubError::GitHub(e) => write!(f, "GitHubError::GitHub: {}", e),
            GitHubError::Document(e) => write!(f, "GitHubError::Document: {}", e),
            GitHubError::Status { status, message } => {
                write!(f, "GitHubError::Status: {} {}", status, message.as_deref().unwrap_or(""))
            }
        }
    }
}
impl From<reqwest::Error> for GitHubError {
    fn from(e: reqwest::Error) -> Self {
        GitHubError::GitHub(e.to_string())
    }
}
impl From<serde_json::Error> for GitHubError {
    fn from(e: serde_json::Error) -> Self {
        GitHubError::Document(e.to_string())
    }
}
