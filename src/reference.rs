use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{RepoLensError, Result};

/// Matches the owner and name segments that follow a GitHub host, in either
/// URL (`github.com/owner/name`) or SCP (`git@github.com:owner/name`) form.
static GITHUB_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)github\.com[/:]([A-Za-z0-9_.-]+)/([A-Za-z0-9_.-]+)")
        .expect("GitHub reference pattern is valid")
});

/// Owner and name of a GitHub repository, resolved once per analysis run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryRef {
    pub owner: String,
    pub name: String,
}

impl RepositoryRef {
    /// Extracts owner and name from an arbitrary identifier string.
    ///
    /// Extra path segments, query strings and fragments after the name are
    /// ignored, and a trailing `.git` is stripped.
    ///
    /// # Errors
    ///
    /// Returns `InvalidReference` when no owner/name pair follows a GitHub host.
    pub fn parse(identifier: &str) -> Result<Self> {
        let invalid = || RepoLensError::InvalidReference(identifier.trim().to_string());

        let captures = GITHUB_PATTERN
            .captures(identifier.trim())
            .ok_or_else(invalid)?;

        let owner = captures[1].to_string();
        let name = captures[2].trim_end_matches(".git").to_string();

        if owner.trim_matches('.').is_empty() || name.trim_matches('.').is_empty() {
            return Err(invalid());
        }

        Ok(Self { owner, name })
    }

    /// `owner/name`
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    /// Clone URL under the given web base (e.g. <https://github.com>).
    pub fn clone_url(&self, web_base_url: &str) -> String {
        format!(
            "{}/{}/{}.git",
            web_base_url.trim_end_matches('/'),
            self.owner,
            self.name
        )
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(identifier: &str) -> (String, String) {
        let repo = RepositoryRef::parse(identifier).unwrap();
        (repo.owner, repo.name)
    }

    #[test]
    fn test_parse_plain_host_path() {
        assert_eq!(
            parsed("github.com/acme/widgets"),
            ("acme".to_string(), "widgets".to_string())
        );
    }

    #[test]
    fn test_parse_ignores_extra_segments() {
        assert_eq!(
            parsed("https://github.com/acme/widgets/tree/main"),
            ("acme".to_string(), "widgets".to_string())
        );
        assert_eq!(
            parsed("https://www.github.com/acme/widgets?tab=readme-ov-file#usage"),
            ("acme".to_string(), "widgets".to_string())
        );
    }

    #[test]
    fn test_parse_strips_git_suffix() {
        assert_eq!(
            parsed("https://github.com/acme/widgets.git"),
            ("acme".to_string(), "widgets".to_string())
        );
        assert_eq!(
            parsed("git@github.com:acme/widgets.git"),
            ("acme".to_string(), "widgets".to_string())
        );
    }

    #[test]
    fn test_parse_keeps_dotted_names() {
        assert_eq!(
            parsed("https://github.com/socketio/socket.io"),
            ("socketio".to_string(), "socket.io".to_string())
        );
    }

    #[test]
    fn test_parse_rejects_missing_name() {
        for input in [
            "",
            "not a url",
            "https://github.com/acme",
            "https://github.com/acme/",
            "https://gitlab.com/acme/widgets",
            "acme/widgets",
            "https://github.com/acme/.git",
        ] {
            let err = RepositoryRef::parse(input).unwrap_err();
            assert!(
                matches!(err, RepoLensError::InvalidReference(_)),
                "expected InvalidReference for {input:?}"
            );
        }
    }

    #[test]
    fn test_slug_and_clone_url() {
        let repo = RepositoryRef::parse("github.com/acme/widgets").unwrap();
        assert_eq!(repo.slug(), "acme/widgets");
        assert_eq!(repo.to_string(), "acme/widgets");
        assert_eq!(
            repo.clone_url("https://github.com/"),
            "https://github.com/acme/widgets.git"
        );
    }
}
