mod client;
pub(crate) mod types;

use async_trait::async_trait;

use crate::reference::RepositoryRef;

pub use client::GitHubClient;
pub use types::{
    Commit, Contributor, Issue, LanguageBytes, PullRequest, RemoteMetadataSet, RepoInfo,
};

/// Source of README text and repository metadata.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// README text from the default branch, or `None` when it cannot be fetched.
    async fn fetch_readme(&self, repo: &RepositoryRef) -> Option<String>;

    /// Fetches all metadata collections concurrently.
    ///
    /// Never fails as a whole: each collection that cannot be fetched is left
    /// as `None` in the returned set.
    async fn fetch_metadata(&self, repo: &RepositoryRef) -> RemoteMetadataSet;
}
