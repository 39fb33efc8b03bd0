use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Repository metadata from `GET /repos/{owner}/{repo}`.
///
/// Every field is optional: a missing or renamed field in the API response
/// becomes `None` instead of failing the whole record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoInfo {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub full_name: Option<String>,
    pub description: Option<String>,
    pub html_url: Option<String>,
    pub homepage: Option<String>,
    pub owner: Option<Owner>,
    pub language: Option<String>,
    pub default_branch: Option<String>,
    pub stargazers_count: Option<u64>,
    pub forks_count: Option<u64>,
    pub watchers_count: Option<u64>,
    pub subscribers_count: Option<u64>,
    pub open_issues_count: Option<u64>,
    pub license: Option<License>,
    pub topics: Vec<String>,
    pub archived: Option<bool>,
    pub fork: Option<bool>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub pushed_at: Option<DateTime<Utc>>,
}

/// Account reference embedded in most GitHub payloads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Owner {
    pub login: Option<String>,
    pub avatar_url: Option<String>,
    pub html_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct License {
    pub key: Option<String>,
    pub name: Option<String>,
    pub spdx_id: Option<String>,
}

/// Entry from `GET /repos/{owner}/{repo}/contributors`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Contributor {
    pub login: Option<String>,
    pub avatar_url: Option<String>,
    pub html_url: Option<String>,
    pub contributions: Option<u64>,
}

/// Entry from `GET /repos/{owner}/{repo}/issues`.
///
/// GitHub lists pull requests here too; those carry a `pull_request` link.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Issue {
    pub number: Option<u64>,
    pub title: Option<String>,
    pub state: Option<String>,
    pub html_url: Option<String>,
    pub user: Option<Owner>,
    pub labels: Vec<Label>,
    pub comments: Option<u64>,
    pub pull_request: Option<PullRequestLink>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Issue {
    pub fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Label {
    pub name: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PullRequestLink {
    pub url: Option<String>,
    pub html_url: Option<String>,
}

/// Entry from `GET /repos/{owner}/{repo}/pulls`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PullRequest {
    pub number: Option<u64>,
    pub title: Option<String>,
    pub state: Option<String>,
    pub html_url: Option<String>,
    pub user: Option<Owner>,
    pub draft: Option<bool>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Entry from `GET /repos/{owner}/{repo}/commits`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Commit {
    pub sha: Option<String>,
    pub html_url: Option<String>,
    pub commit: Option<CommitDetail>,
    pub author: Option<Owner>,
}

impl Commit {
    /// First line of the commit message.
    pub fn headline(&self) -> Option<&str> {
        self.commit
            .as_ref()
            .and_then(|detail| detail.message.as_deref())
            .and_then(|message| message.lines().next())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitDetail {
    pub message: Option<String>,
    pub author: Option<CommitAuthor>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitAuthor {
    pub name: Option<String>,
    pub email: Option<String>,
    pub date: Option<DateTime<Utc>>,
}

/// Language name to byte count, in the order GitHub reports them.
pub type LanguageBytes = IndexMap<String, u64>;

/// Results of the six metadata requests.
///
/// Each field is fetched independently; `None` means that request failed
/// and says nothing about the others.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemoteMetadataSet {
    pub repo_info: Option<RepoInfo>,
    pub contributors: Option<Vec<Contributor>>,
    pub languages: Option<LanguageBytes>,
    pub issues: Option<Vec<Issue>>,
    pub pulls: Option<Vec<PullRequest>>,
    pub commits: Option<Vec<Commit>>,
}

impl RemoteMetadataSet {
    /// Names of the collections that could not be fetched.
    pub fn degraded_fields(&self) -> Vec<&'static str> {
        [
            ("repo_info", self.repo_info.is_none()),
            ("contributors", self.contributors.is_none()),
            ("languages", self.languages.is_none()),
            ("issues", self.issues.is_none()),
            ("pulls", self.pulls.is_none()),
            ("commits", self.commits.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, missing)| missing.then_some(name))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_info_tolerates_missing_and_unknown_fields() {
        let info: RepoInfo = serde_json::from_str(
            r#"{
                "full_name": "acme/widgets",
                "stargazers_count": 42,
                "license": null,
                "something_new": {"nested": true},
                "pushed_at": "2024-05-01T10:00:00Z"
            }"#,
        )
        .unwrap();

        assert_eq!(info.full_name.as_deref(), Some("acme/widgets"));
        assert_eq!(info.stargazers_count, Some(42));
        assert_eq!(info.forks_count, None);
        assert!(info.license.is_none());
        assert!(info.topics.is_empty());
        assert!(info.pushed_at.is_some());
    }

    #[test]
    fn test_issue_detects_pull_requests() {
        let issues: Vec<Issue> = serde_json::from_str(
            r#"[
                {"number": 1, "title": "Bug"},
                {"number": 2, "title": "Feature", "pull_request": {"url": "https://api.github.com/x"}}
            ]"#,
        )
        .unwrap();

        assert!(!issues[0].is_pull_request());
        assert!(issues[1].is_pull_request());
    }

    #[test]
    fn test_commit_headline_takes_first_line() {
        let commit: Commit = serde_json::from_str(
            r#"{"sha": "abc", "commit": {"message": "Fix parser\n\nLonger body"}}"#,
        )
        .unwrap();
        assert_eq!(commit.headline(), Some("Fix parser"));
        assert_eq!(Commit::default().headline(), None);
    }

    #[test]
    fn test_languages_preserve_response_order() {
        let languages: LanguageBytes =
            serde_json::from_str(r#"{"TypeScript": 900, "Solidity": 300, "CSS": 10}"#).unwrap();
        let names: Vec<_> = languages.keys().cloned().collect();
        assert_eq!(names, vec!["TypeScript", "Solidity", "CSS"]);
    }

    #[test]
    fn test_degraded_fields_lists_only_missing() {
        let metadata = RemoteMetadataSet {
            repo_info: Some(RepoInfo::default()),
            contributors: Some(vec![]),
            languages: None,
            issues: Some(vec![]),
            pulls: Some(vec![]),
            commits: Some(vec![]),
        };
        assert_eq!(metadata.degraded_fields(), vec!["languages"]);
    }
}
