pub mod errors;
pub mod models;

use std::time::Duration;
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use crate::initialization::GitHubConfig;
use crate::manager_github::errors::GitHubError;
use crate::manager_github::models::{FullIssue, FullRepository, Issue, Repository, UpstreamMessage};

/// Struct for listing repositories and issues through the GitHub REST api
pub struct GitHub {
    client: Client,
    base_url: Url,
    per_page: u8,
}

impl GitHub {
    /// Returns a GitHub struct with user agent, accept header and optional token preset
    ///
    /// # Arguments
    ///
    /// * 'config' - base url, user agent, token and page size
    pub fn new(config: &GitHubConfig) -> Result<GitHub, GitHubError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github.v3+json"));
        if let Some(token) = &config.token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| GitHubError::GitHub(e.to_string()))?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: Url::parse(&config.base_url).map_err(|e| GitHubError::GitHub(format!("base url {}: {}", config.base_url, e)))?,
            per_page: config.per_page,
        })
    }

    /// Lists the most recently updated public repositories of a user or organization
    ///
    /// # Arguments
    ///
    /// * 'owner' - user or organization login
    pub async fn repositories(&self, owner: &str) -> Result<Vec<Repository>, GitHubError> {
        let url = endpoint(&self.base_url, &["users", owner, "repos"])?;
        let per_page = self.per_page.to_string();
        let query = [("sort", "updated"), ("per_page", per_page.as_str())];

        let repos: Vec<FullRepository> = self.get(url, &query).await?;

        Ok(repos.into_iter().map(Repository::from).collect())
    }

    /// Lists the newest open issues of a repository
    ///
    /// # Arguments
    ///
    /// * 'owner' - user or organization login
    /// * 'repo' - repository name
    pub async fn issues(&self, owner: &str, repo: &str) -> Result<Vec<Issue>, GitHubError> {
        let url = endpoint(&self.base_url, &["repos", owner, repo, "issues"])?;
        let per_page = self.per_page.to_string();
        let query = [
            ("state", "open"),
            ("sort", "created"),
            ("direction", "desc"),
            ("per_page", per_page.as_str()),
        ];

        let issues: Vec<FullIssue> = self.get(url, &query).await?;

        Ok(issues.into_iter().map(Issue::from).collect())
    }

    async fn get<T: DeserializeOwned>(&self, url: Url, query: &[(&str, &str)]) -> Result<T, GitHubError> {
        debug!("github request to {}", url.path());

        let req = self.client
            .get(url)
            .query(query)
            .send().await?;

        let status = req.status();
        let json = req.text().await?;
        debug!("github answered {}", status);

        decode(status.as_u16(), &json)
    }
}

/// Appends path segments to the base url, escaping each one so that a caller
/// supplied name can never leave its segment
///
/// # Arguments
///
/// * 'base' - api base url
/// * 'segments' - path segments to append
fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, GitHubError> {
    if let Some(bad) = segments.iter().find(|s| matches!(**s, "" | "." | "..")) {
        return Err(GitHubError::GitHub(format!("invalid path segment '{}'", bad)));
    }

    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| GitHubError::GitHub(format!("{} can not be a base url", base)))?
        .pop_if_empty()
        .extend(segments);

    Ok(url)
}

/// Decodes a GitHub response body, turning non success statuses into errors carrying the upstream message
///
/// # Arguments
///
/// * 'status' - http status of the response
/// * 'json' - the response body
fn decode<T: DeserializeOwned>(status: u16, json: &str) -> Result<T, GitHubError> {
    if !(200..300).contains(&status) {
        let message = serde_json::from_str::<UpstreamMessage>(json)
            .ok()
            .and_then(|m| m.message);
        return Err(GitHubError::Status { status, message });
    }

    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ISSUES: &str = r#"[
        {
            "number": 42,
            "title": "Forecast is off by a day",
            "html_url": "https://github.com/octocat/hello/issues/42",
            "state": "open",
            "user": {"login": "octocat", "id": 1},
            "created_at": "2024-11-19T08:30:00Z",
            "labels": []
        },
        {
            "number": 7,
            "title": "Add dark mode",
            "html_url": "https://github.com/octocat/hello/issues/7",
            "user": {"login": "hubot"},
            "created_at": "2024-01-03T23:59:59Z"
        }
    ]"#;

    const REPOS: &str = r#"[
        {
            "id": 1,
            "name": "hello",
            "full_name": "octocat/hello",
            "description": null,
            "html_url": "https://github.com/octocat/hello",
            "stargazers_count": 12,
            "language": "Rust",
            "updated_at": "2024-11-20T10:00:00Z",
            "fork": false
        }
    ]"#;

    #[test]
    fn issues_are_reduced() {
        let issues: Vec<FullIssue> = decode(200, ISSUES).unwrap();
        let issues: Vec<Issue> = issues.into_iter().map(Issue::from).collect();

        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0], Issue {
            number: 42,
            title: "Forecast is off by a day".to_string(),
            url: "https://github.com/octocat/hello/issues/42".to_string(),
            user: "octocat".to_string(),
            created_at: "11/19".to_string(),
        });
        assert_eq!(issues[1].created_at, "01/03");

        let json = serde_json::to_value(&issues[0]).unwrap();
        assert_eq!(json["createdAt"], "11/19");
        assert!(json.get("created_at").is_none());
    }

    #[test]
    fn repositories_are_reduced() {
        let repos: Vec<FullRepository> = decode(200, REPOS).unwrap();
        let repos: Vec<Repository> = repos.into_iter().map(Repository::from).collect();

        assert_eq!(repos[0].name, "hello");
        assert_eq!(repos[0].url, "https://github.com/octocat/hello");
        assert_eq!(repos[0].stars, 12);
        assert_eq!(repos[0].description, None);
    }

    #[test]
    fn upstream_status_is_kept() {
        let result: Result<Vec<FullIssue>, GitHubError> = decode(404, r#"{"message": "Not Found"}"#);
        match result {
            Err(GitHubError::Status { status, message }) => {
                assert_eq!(status, 404);
                assert_eq!(message.as_deref(), Some("Not Found"));
            }
            _ => panic!("expected status error"),
        }

        let result: Result<Vec<FullIssue>, GitHubError> = decode(502, "Bad gateway");
        assert!(matches!(result, Err(GitHubError::Status { status: 502, message: None })));
    }

    #[test]
    fn names_stay_inside_their_segment() {
        let base = Url::parse("https://api.github.com").unwrap();

        let url = endpoint(&base, &["users", "octocat", "repos"]).unwrap();
        assert_eq!(url.as_str(), "https://api.github.com/users/octocat/repos");

        let url = endpoint(&base, &["users", "../user", "repos"]).unwrap();
        assert_eq!(url.path(), "/users/..%2Fuser/repos");

        let url = endpoint(&base, &["repos", "octocat", "hello?state=all#x", "issues"]).unwrap();
        assert_eq!(url.path(), "/repos/octocat/hello%3Fstate=all%23x/issues");
        assert_eq!(url.query(), None);

        assert!(endpoint(&base, &["users", "..", "repos"]).is_err());
        assert!(endpoint(&base, &["repos", "octocat", ".", "issues"]).is_err());
    }

    #[test]
    fn base_url_path_is_kept() {
        let base = Url::parse("http://127.0.0.1:8080/github/").unwrap();
        let url = endpoint(&base, &["repos", "octocat", "hello", "issues"]).unwrap();

        assert_eq!(url.as_str(), "http://127.0.0.1:8080/github/repos/octocat/hello/issues");
    }

    #[test]
    fn bad_document() {
        let result: Result<Vec<FullIssue>, GitHubError> = decode(200, r#"{"not": "a list"}"#);
        assert!(matches!(result, Err(GitHubError::Document(_))));
    }
}
