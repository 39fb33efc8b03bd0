use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::GitHubConfig;
use crate::error::{RepoLensError, Result};
use crate::reference::RepositoryRef;

use super::types::{
    Commit, Contributor, Issue, LanguageBytes, PullRequest, RemoteMetadataSet, RepoInfo,
};
use super::MetadataSource;

const CONTRIBUTORS_PER_PAGE: u32 = 5;
const ISSUES_PER_PAGE: u32 = 100;
const PULLS_PER_PAGE: u32 = 100;
const COMMITS_PER_PAGE: u32 = 5;

/// GitHub API client for README text and repository metadata.
#[derive(Clone)]
pub struct GitHubClient {
    /// HTTP client
    client: Client,
    /// Base URL for the REST API
    api_url: Url,
    /// Base URL for raw file contents
    raw_url: Url,
}

impl GitHubClient {
    /// Create a new GitHub API client.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a base URL or the token is malformed,
    /// or if the HTTP client cannot be built.
    pub fn new(config: &GitHubConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );

        if let Some(token) = config.token.as_deref().filter(|t| !t.is_empty()) {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| RepoLensError::Config(format!("Invalid GitHub token: {e}")))?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .user_agent(concat!("repolens/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .timeout(config.timeout())
            .build()
            .map_err(|e| RepoLensError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_url: parse_base_url(&config.api_url)?,
            raw_url: parse_base_url(&config.raw_url)?,
        })
    }

    fn repo_url(&self, repo: &RepositoryRef, suffix: &str) -> Result<Url> {
        self.api_url
            .join(&format!("repos/{}/{}{suffix}", repo.owner, repo.name))
            .map_err(|e| RepoLensError::Config(format!("Invalid repository URL: {e}")))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!("GET {url}");

        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(RepoLensError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }

    /// Fetch the README from the default branch.
    ///
    /// Returns `Ok(None)` when the file does not exist or is blank.
    pub async fn readme(&self, repo: &RepositoryRef) -> Result<Option<String>> {
        let url = self
            .raw_url
            .join(&format!("{}/{}/HEAD/README.md", repo.owner, repo.name))
            .map_err(|e| RepoLensError::Config(format!("Invalid README URL: {e}")))?;

        debug!("GET {url}");
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            debug!("README request returned {}", response.status());
            return Ok(None);
        }

        let text = response.text().await?;
        if text.trim().is_empty() {
            debug!("README for {repo} is blank");
            return Ok(None);
        }
        Ok(Some(text))
    }

    pub async fn repo_info(&self, repo: &RepositoryRef) -> Result<RepoInfo> {
        self.get_json(self.repo_url(repo, "")?).await
    }

    pub async fn contributors(&self, repo: &RepositoryRef) -> Result<Vec<Contributor>> {
        let suffix = format!("/contributors?per_page={CONTRIBUTORS_PER_PAGE}");
        self.get_json(self.repo_url(repo, &suffix)?).await
    }

    pub async fn languages(&self, repo: &RepositoryRef) -> Result<LanguageBytes> {
        self.get_json(self.repo_url(repo, "/languages")?).await
    }

    pub async fn issues(&self, repo: &RepositoryRef) -> Result<Vec<Issue>> {
        let suffix = format!("/issues?state=open&per_page={ISSUES_PER_PAGE}");
        self.get_json(self.repo_url(repo, &suffix)?).await
    }

    pub async fn pulls(&self, repo: &RepositoryRef) -> Result<Vec<PullRequest>> {
        let suffix = format!("/pulls?state=open&per_page={PULLS_PER_PAGE}");
        self.get_json(self.repo_url(repo, &suffix)?).await
    }

    pub async fn commits(&self, repo: &RepositoryRef) -> Result<Vec<Commit>> {
        let suffix = format!("/commits?per_page={COMMITS_PER_PAGE}");
        self.get_json(self.repo_url(repo, &suffix)?).await
    }
}

/// Ensures the base URL ends with `/` so that `Url::join` appends rather than replaces.
fn parse_base_url(raw: &str) -> Result<Url> {
    let normalized = format!("{}/", raw.trim_end_matches('/'));
    Url::parse(&normalized).map_err(|e| RepoLensError::Config(format!("Invalid base URL {raw}: {e}")))
}

/// Turns a failed collection request into an absent field.
fn settle<T>(collection: &str, repo: &RepositoryRef, result: Result<T>) -> Option<T> {
    result
        .inspect_err(|e| warn!("Failed to fetch {collection} for {repo}: {e}"))
        .ok()
}

#[async_trait]
impl MetadataSource for GitHubClient {
    async fn fetch_readme(&self, repo: &RepositoryRef) -> Option<String> {
        match self.readme(repo).await {
            Ok(readme) => readme,
            Err(e) => {
                warn!("Failed to fetch README for {repo}: {e}");
                None
            }
        }
    }

    async fn fetch_metadata(&self, repo: &RepositoryRef) -> RemoteMetadataSet {
        let (repo_info, contributors, languages, issues, pulls, commits) = tokio::join!(
            self.repo_info(repo),
            self.contributors(repo),
            self.languages(repo),
            self.issues(repo),
            self.pulls(repo),
            self.commits(repo),
        );

        let metadata = RemoteMetadataSet {
            repo_info: settle("repository info", repo, repo_info),
            contributors: settle("contributors", repo, contributors),
            languages: settle("languages", repo, languages),
            issues: settle("issues", repo, issues),
            pulls: settle("pull requests", repo, pulls),
            commits: settle("commits", repo, commits),
        };

        let degraded = metadata.degraded_fields();
        if degraded.is_empty() {
            info!("Fetched all metadata collections for {repo}");
        } else {
            warn!("Metadata for {repo} is missing: {}", degraded.join(", "));
        }

        metadata
    }
}
