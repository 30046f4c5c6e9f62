//! MCP servers launched by the assistant through the generated MCP config.
//!
//! - [`comment::CommentServer`] updates the tracking comment.
//! - [`ci::CiServer`] inspects workflow runs of a pull request.

pub mod ci;
pub mod comment;

use crate::error::{ActionError, Result};

/// Repository both servers operate on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoTarget {
    pub owner: String,
    pub repo: String,
}

impl RepoTarget {
    pub fn new(owner: &str, repo: &str) -> Result<Self> {
        sanitize_github_name(owner, "owner")?;
        sanitize_github_name(repo, "repo")?;
        Ok(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
    }

    /// `/repos/{owner}/{repo}` prefix for raw API routes.
    pub fn route(&self) -> String {
        format!("/repos/{}/{}", self.owner, self.repo)
    }
}

/// Build an authenticated client against `api_url`.
pub fn build_client(token: Option<&str>, api_url: &str) -> Result<octocrab::Octocrab> {
    let builder = octocrab::OctocrabBuilder::new().base_uri(api_url)?;
    let github = match token.filter(|t| !t.is_empty()) {
        Some(t) => builder.personal_token(t.to_string()).build()?,
        None => {
            tracing::warn!("No GitHub token provided; API rate limits will be very restrictive");
            builder.build()?
        }
    };
    Ok(github)
}

/// Validate that a GitHub owner/repo name doesn't contain characters that
/// could be used for URL injection in raw API routes.
pub fn sanitize_github_name(name: &str, field: &str) -> Result<()> {
    if name.is_empty() {
        return Err(ActionError::InvalidParam(format!(
            "{} must not be empty",
            field
        )));
    }
    for ch in ['/', '?', '#', '%', '\0', ' ', '\n', '\t'] {
        if name.contains(ch) {
            return Err(ActionError::InvalidParam(format!(
                "{} contains invalid character '{}'",
                field, ch
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_github_name_valid() {
        assert!(sanitize_github_name("my-org", "owner").is_ok());
        assert!(sanitize_github_name("user_name", "owner").is_ok());
        assert!(sanitize_github_name("repo.name", "repo").is_ok());
    }

    #[test]
    fn test_sanitize_github_name_empty() {
        assert!(sanitize_github_name("", "owner").is_err());
    }

    #[test]
    fn test_sanitize_github_name_slash() {
        assert!(sanitize_github_name("owner/repo", "owner").is_err());
        assert!(sanitize_github_name("../etc", "owner").is_err());
    }

    #[test]
    fn test_sanitize_github_name_query() {
        assert!(sanitize_github_name("owner?evil=1", "owner").is_err());
        assert!(sanitize_github_name("repo#fragment", "repo").is_err());
    }

    #[test]
    fn test_repo_target_route() {
        let target = RepoTarget::new("acme", "widgets").unwrap();
        assert_eq!(target.route(), "/repos/acme/widgets");
        assert!(RepoTarget::new("acme", "wid gets").is_err());
    }
}
