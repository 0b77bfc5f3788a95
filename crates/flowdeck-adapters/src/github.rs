//! GitHub REST API v3 adapter.
//!
//! Implements [`FileSource`] over the repository contents API and
//! [`ExecutionControl`] over the Actions workflow-runs API.  Supports both
//! github.com and GitHub Enterprise via a configurable base URL.  A token is
//! optional; public repositories can be read anonymously.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use flowdeck_workflow::RunSummary;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::error::{AdapterError, Result};
use crate::traits::{
    DefinitionFile, ExecutionControl, FileSource, RepositoryKey, default_extensions,
    has_definition_extension,
};

/// Default GitHub API base URL.
const DEFAULT_BASE_URL: &str = "https://api.github.com";

/// Seconds before a single HTTP request is abandoned.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Connection settings for [`GitHubSource`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// API base URL (default: `https://api.github.com`).
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Personal access token or OAuth token.
    #[serde(default, skip_serializing)]
    pub token: Option<String>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
        }
    }
}

/// GitHub-backed file source and execution control.
pub struct GitHubSource {
    /// GitHub personal access token or OAuth token.
    token: Option<String>,
    /// Base URL for the GitHub API (default: `https://api.github.com`).
    base_url: String,
    /// Extensions treated as definition files.
    extensions: Vec<String>,
    /// HTTP client for making requests.
    client: reqwest::Client,
}

impl GitHubSource {
    /// Create an anonymous adapter against github.com.
    pub fn new() -> Self {
        Self::from_config(&GitHubConfig::default())
    }

    /// Create an adapter from connection settings.
    pub fn from_config(config: &GitHubConfig) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(concat!("flowdeck/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();

        Self {
            token: config.token.clone().filter(|t| !t.is_empty()),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            extensions: default_extensions(),
            client,
        }
    }

    /// Use a pre-configured token.
    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string()).filter(|t| !t.is_empty());
        self
    }

    /// Point at a GitHub Enterprise instance.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Override the extensions treated as definition files.
    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions;
        self
    }

    // -----------------------------------------------------------------------
    // HTTP helpers
    // -----------------------------------------------------------------------

    /// Build an API URL from path segments.  Each segment is
    /// percent-encoded, so `#`, `?` and `/` inside a name stay part of it.
    fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Result<Url> {
        let invalid = |reason: &str| {
            AdapterError::Config(format!("base URL `{}` {reason}", self.base_url))
        };
        let mut url =
            Url::parse(&self.base_url).map_err(|e| invalid(&format!("is invalid: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| invalid("cannot take a path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// URL of a repository-scoped resource.  `path` is split on `/` so that
    /// every component is encoded on its own.
    fn repo_endpoint(&self, repo: &RepositoryKey, kind: &str, path: &str) -> Result<Url> {
        let base = ["repos", repo.owner.as_str(), repo.name.as_str(), kind];
        let rest = path.split('/').filter(|part| !part.is_empty());
        self.endpoint(base.into_iter().filter(|part| !part.is_empty()).chain(rest))
    }

    /// Build a GET request with standard GitHub headers.
    fn get_request(&self, url: Url, accept: &str) -> reqwest::RequestBuilder {
        let request = self
            .client
            .get(url)
            .header("Accept", accept)
            .header("X-GitHub-Api-Version", "2022-11-28");
        match &self.token {
            Some(token) => request.header("Authorization", format!("Bearer {token}")),
            None => request,
        }
    }

    /// Confirm the repository is visible.  GitHub answers 404 both for a
    /// missing path and for a repository that does not exist or that the
    /// token cannot see.
    async fn ensure_repository(&self, repo: &RepositoryKey) -> Result<()> {
        let url = self.repo_endpoint(repo, "", "")?;
        let request = self.get_request(url, "application/vnd.github+json");
        match self.send(request, "get_repository").await {
            Ok(_) => Ok(()),
            Err(e) if e.is_not_found() => Err(AdapterError::NotFound {
                resource: format!("repository {repo}"),
            }),
            Err(e) => Err(e),
        }
    }

    /// Send a request and return the body text, handling rate limits and
    /// non-success statuses.
    async fn send(&self, request: reqwest::RequestBuilder, operation: &str) -> Result<String> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                AdapterError::Timeout {
                    seconds: REQUEST_TIMEOUT_SECS,
                    reason: format!("GitHub API request timed out: {e}"),
                }
            } else {
                AdapterError::Request {
                    operation: operation.to_string(),
                    reason: e.to_string(),
                }
            }
        })?;

        let status = response.status();

        let rate_remaining = response
            .headers()
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());
        if let Some(remaining) = rate_remaining
            && remaining < 10
        {
            warn!(remaining, operation, "GitHub API rate limit is low");
        }

        let body = response.text().await.map_err(|e| AdapterError::Request {
            operation: operation.to_string(),
            reason: format!("failed to read response body: {e}"),
        })?;

        if !status.is_success() {
            return Err(status_error(operation, status.as_u16(), &body));
        }
        Ok(body)
    }

    async fn send_json(&self, request: reqwest::RequestBuilder, operation: &str) -> Result<Value> {
        let body = self.send(request, operation).await?;
        Ok(serde_json::from_str(&body)?)
    }
}

impl Default for GitHubSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FileSource for GitHubSource {
    async fn list_definition_files(
        &self,
        repo: &RepositoryKey,
        dir: &str,
    ) -> Result<Vec<DefinitionFile>> {
        let url = self.repo_endpoint(repo, "contents", dir)?;
        debug!(url = %url, "listing workflow directory");

        let request = self.get_request(url, "application/vnd.github+json");
        match self.send_json(request, "list_definition_files").await {
            Ok(listing) => Ok(parse_contents_listing(&listing, &self.extensions)),
            Err(e) if e.is_not_found() => {
                self.ensure_repository(repo).await?;
                debug!(repo = %repo, dir, "workflow directory not found");
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    async fn read_file_content(&self, repo: &RepositoryKey, path: &str) -> Result<String> {
        let url = self.repo_endpoint(repo, "contents", path)?;
        debug!(url = %url, "reading file content");
        let request = self.get_request(url, "application/vnd.github.raw+json");
        self.send(request, "read_file_content").await
    }
}

#[async_trait]
impl ExecutionControl for GitHubSource {
    async fn list_executions(
        &self,
        repo: &RepositoryKey,
        workflow: &str,
        limit: usize,
    ) -> Result<Vec<RunSummary>> {
        let mut url = self.endpoint([
            "repos",
            repo.owner.as_str(),
            repo.name.as_str(),
            "actions",
            "workflows",
            workflow,
            "runs",
        ])?;
        url.query_pairs_mut()
            .append_pair("per_page", &limit.clamp(1, 100).to_string());
        debug!(url = %url, "listing workflow runs");
        let request = self.get_request(url, "application/vnd.github+json");
        let page = self.send_json(request, "list_executions").await?;
        let mut runs = parse_runs(page)?;
        runs.truncate(limit);
        Ok(runs)
    }
}

// ---------------------------------------------------------------------------
// Response mapping
// ---------------------------------------------------------------------------

fn status_error(operation: &str, status: u16, body: &str) -> AdapterError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_owned))
        .unwrap_or_else(|| body.to_string());
    if status == 404 {
        return AdapterError::NotFound {
            resource: format!("{operation}: {message}"),
        };
    }
    AdapterError::Status {
        operation: operation.to_string(),
        status,
        message,
    }
}

/// Pick the definition files out of a contents-API directory listing.
fn parse_contents_listing(listing: &Value, extensions: &[String]) -> Vec<DefinitionFile> {
    let Some(entries) = listing.as_array() else {
        return Vec::new();
    };
    entries
        .iter()
        .filter(|entry| entry.get("type").and_then(Value::as_str) == Some("file"))
        .filter_map(|entry| {
            let name = entry.get("name")?.as_str()?;
            let path = entry.get("path")?.as_str()?;
            has_definition_extension(name, extensions).then(|| DefinitionFile {
                name: name.to_string(),
                path: path.to_string(),
            })
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct RunsPage {
    #[serde(default)]
    workflow_runs: Vec<ApiRun>,
}

#[derive(Debug, Deserialize)]
struct ApiRun {
    id: u64,
    status: Option<String>,
    conclusion: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(default)]
    html_url: String,
    #[serde(default)]
    run_number: u64,
    #[serde(default)]
    head_sha: String,
    #[serde(default)]
    event: String,
}

impl From<ApiRun> for RunSummary {
    fn from(run: ApiRun) -> Self {
        Self {
            id: run.id,
            status: run.status.unwrap_or_else(|| "unknown".to_string()),
            conclusion: run.conclusion,
            created_at: run.created_at,
            updated_at: run.updated_at,
            html_url: run.html_url,
            run_number: run.run_number,
            head_sha: run.head_sha,
            event: run.event,
        }
    }
}

fn parse_runs(page: Value) -> Result<Vec<RunSummary>> {
    let page: RunsPage = serde_json::from_value(page)?;
    Ok(page.workflow_runs.into_iter().map(RunSummary::from).collect())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
