//! GitHub commit enrichment.
//!
//! Tasks that link a repository get their week's commits attached to
//! the preview display and the summarization prompt. Lookup failures
//! never fail the run; a missing or rate-limited repo just contributes
//! no commits.

use regex::Regex;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::notion::WeekWindow;

/// GitHub API base URL.
const GITHUB_BASE_URL: &str = "https://api.github.com";

/// Commits fetched per repository.
const PER_PAGE: usize = 100;

/// A commit made during the week.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commit {
    /// Short sha.
    pub sha: String,
    /// First line of the commit message.
    pub message: String,
    /// Author name.
    pub author: String,
    /// Commit date, as reported by the API.
    pub date: String,
    /// Link to the commit.
    pub url: String,
}

/// Client for the GitHub commits API.
pub struct GitHubClient {
    client: Client,
    token: Option<String>,
    base_url: String,
    repo_pattern: Regex,
}

impl GitHubClient {
    /// Create a client. A token is optional but raises the rate limit.
    #[must_use]
    pub fn new(token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            token,
            base_url: GITHUB_BASE_URL.to_string(),
            repo_pattern: Regex::new(r"https?://github\.com/(?P<owner>[^/]+)/(?P<repo>[^/?#]+)")
                .unwrap(),
        }
    }

    /// Set a custom base URL (used by tests).
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Extract `(owner, repo)` from a repository URL.
    #[must_use]
    pub fn parse_repo_url(&self, url: &str) -> Option<(String, String)> {
        let captures = self.repo_pattern.captures(url)?;
        let owner = captures.name("owner")?.as_str().to_string();
        let repo = captures
            .name("repo")?
            .as_str()
            .trim_end_matches(".git")
            .to_string();
        Some((owner, repo))
    }

    /// List commits in the window for the repository behind `repo_url`.
    ///
    /// Returns an empty list when the URL does not parse, the repo is
    /// missing (404), or the API rate limit is hit (403).
    pub async fn commits_in_window(&self, repo_url: &str, window: &WeekWindow) -> Vec<Commit> {
        let Some((owner, repo)) = self.parse_repo_url(repo_url) else {
            tracing::warn!(url = repo_url, "Not a GitHub repository URL, skipping");
            return Vec::new();
        };

        match self.fetch_commits(&owner, &repo, window).await {
            Ok(commits) => commits,
            Err(e) => {
                tracing::warn!(owner, repo, error = %e, "Commit lookup failed");
                Vec::new()
            }
        }
    }

    async fn fetch_commits(
        &self,
        owner: &str,
        repo: &str,
        window: &WeekWindow,
    ) -> Result<Vec<Commit>, reqwest::Error> {
        let url = format!("{}/repos/{}/{}/commits", self.base_url, owner, repo);

        let mut request = self
            .client
            .get(&url)
            .header("Accept", "application/vnd.github.v3+json")
            .header("User-Agent", "weekly-report")
            .query(&[
                ("since", window.start_rfc3339()),
                ("until", window.end_rfc3339()),
                ("per_page", PER_PAGE.to_string()),
            ]);
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("token {token}"));
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            tracing::debug!(owner, repo, "Repository not found or not accessible");
            return Ok(Vec::new());
        }
        if status == StatusCode::FORBIDDEN {
            tracing::warn!(owner, repo, "GitHub rate limit hit, set github.token");
            return Ok(Vec::new());
        }

        let items: Vec<RawCommit> = response.error_for_status()?.json().await?;

        Ok(items.into_iter().map(RawCommit::into_commit).collect())
    }
}

/// Commit object as returned by the API.
#[derive(Debug, Deserialize)]
struct RawCommit {
    sha: String,
    commit: RawCommitDetail,
    #[serde(default)]
    html_url: String,
}

#[derive(Debug, Deserialize)]
struct RawCommitDetail {
    message: String,
    author: Option<RawCommitAuthor>,
}

#[derive(Debug, Deserialize)]
struct RawCommitAuthor {
    name: Option<String>,
    date: Option<String>,
}

impl RawCommit {
    fn into_commit(self) -> Commit {
        let author = self.commit.author.unwrap_or(RawCommitAuthor {
            name: None,
            date: None,
        });
        Commit {
            sha: self.sha.chars().take(7).collect(),
            message: self
                .commit
                .message
                .lines()
                .next()
                .unwrap_or_default()
                .to_string(),
            author: author.name.unwrap_or_else(|| "Unknown".to_string()),
            date: author.date.unwrap_or_default(),
            url: self.html_url,
        }
    }
}
