use serde::{Deserialize, Serialize};

use crate::github::{Commit, Contributor, Issue, LanguageBytes, PullRequest, RemoteMetadataSet, RepoInfo};
use crate::synthesis::{NarrativeBundle, PlagiarismResult};

/// Final result of one repository analysis.
///
/// Metadata collections that could not be fetched are `None` and serialize
/// as `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub summary: String,
    pub repo_info: Option<RepoInfo>,
    pub contributors: Option<Vec<Contributor>>,
    pub languages: Option<LanguageBytes>,
    pub issues: Option<Vec<Issue>>,
    pub pulls: Option<Vec<PullRequest>>,
    pub commits: Option<Vec<Commit>>,
    pub plagiarism_results: Vec<PlagiarismResult>,
}

impl AnalysisReport {
    pub fn assemble(metadata: RemoteMetadataSet, narrative: NarrativeBundle) -> Self {
        Self {
            summary: narrative.summary,
            repo_info: metadata.repo_info,
            contributors: metadata.contributors,
            languages: metadata.languages,
            issues: metadata.issues,
            pulls: metadata.pulls,
            commits: metadata.commits,
            plagiarism_results: narrative.plagiarism_results,
        }
    }

    /// Open issues that are not pull requests.
    pub fn open_issue_count(&self) -> Option<usize> {
        self.issues
            .as_ref()
            .map(|issues| issues.iter().filter(|issue| !issue.is_pull_request()).count())
    }
}
