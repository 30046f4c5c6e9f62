//! Snapshot of the environment variables the action reads.
//!
//! The process environment is read once at start-up. Everything downstream
//! takes an [`ActionEnv`] by reference, so tests can build one from a plain
//! map instead of mutating process state.

use std::collections::HashMap;

pub const GITHUB_RUN_ID: &str = "GITHUB_RUN_ID";
pub const GITHUB_EVENT_NAME: &str = "GITHUB_EVENT_NAME";
pub const GITHUB_EVENT_PATH: &str = "GITHUB_EVENT_PATH";
pub const GITHUB_REPOSITORY: &str = "GITHUB_REPOSITORY";
pub const GITHUB_ACTOR: &str = "GITHUB_ACTOR";
pub const GITHUB_API_URL: &str = "GITHUB_API_URL";
pub const GITHUB_OUTPUT: &str = "GITHUB_OUTPUT";
pub const ISSUE_DATA: &str = "ISSUE_DATA";
pub const TRIGGER_PHRASE: &str = "TRIGGER_PHRASE";
pub const ASSIGNEE_TRIGGER: &str = "ASSIGNEE_TRIGGER";
pub const LABEL_TRIGGER: &str = "LABEL_TRIGGER";
pub const ALLOWED_TOOLS: &str = "ALLOWED_TOOLS";
pub const DISALLOWED_TOOLS: &str = "DISALLOWED_TOOLS";
pub const CUSTOM_INSTRUCTIONS: &str = "CUSTOM_INSTRUCTIONS";
pub const DIRECT_PROMPT: &str = "DIRECT_PROMPT";
pub const OVERRIDE_PROMPT: &str = "OVERRIDE_PROMPT";
pub const BASE_BRANCH: &str = "BASE_BRANCH";
pub const BRANCH_PREFIX: &str = "BRANCH_PREFIX";
pub const USE_STICKY_COMMENT: &str = "USE_STICKY_COMMENT";
pub const DISABLE_COMMENTS: &str = "DISABLE_COMMENTS";
pub const ADDITIONAL_PERMISSIONS: &str = "ADDITIONAL_PERMISSIONS";
pub const USE_COMMIT_SIGNING: &str = "USE_COMMIT_SIGNING";
pub const MCP_CONFIG: &str = "MCP_CONFIG";

pub const DEFAULT_TRIGGER_PHRASE: &str = "@claude";
pub const DEFAULT_BRANCH_PREFIX: &str = "claude/";
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Raw, unparsed values of every environment variable the action consumes.
///
/// `None` means the variable was unset. Interpretation (defaults, parsing,
/// required checks) happens in [`crate::context::parse_github_context`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionEnv {
    pub run_id: Option<String>,
    pub event_name: Option<String>,
    pub event_path: Option<String>,
    pub repository: Option<String>,
    pub actor: Option<String>,
    pub api_url: Option<String>,
    pub output_path: Option<String>,
    pub issue_data: Option<String>,
    pub trigger_phrase: Option<String>,
    pub assignee_trigger: Option<String>,
    pub label_trigger: Option<String>,
    pub allowed_tools: Option<String>,
    pub disallowed_tools: Option<String>,
    pub custom_instructions: Option<String>,
    pub direct_prompt: Option<String>,
    pub override_prompt: Option<String>,
    pub base_branch: Option<String>,
    pub branch_prefix: Option<String>,
    pub use_sticky_comment: Option<String>,
    pub disable_comments: Option<String>,
    pub additional_permissions: Option<String>,
    pub use_commit_signing: Option<String>,
    pub mcp_config: Option<String>,
}

impl ActionEnv {
    /// Read the current process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from a map, mostly for tests.
    pub fn from_map(vars: &HashMap<String, String>) -> Self {
        Self::from_lookup(|name| vars.get(name).cloned())
    }

    /// Build from any variable lookup function.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            run_id: lookup(GITHUB_RUN_ID),
            event_name: lookup(GITHUB_EVENT_NAME),
            event_path: lookup(GITHUB_EVENT_PATH),
            repository: lookup(GITHUB_REPOSITORY),
            actor: lookup(GITHUB_ACTOR),
            api_url: lookup(GITHUB_API_URL),
            output_path: lookup(GITHUB_OUTPUT),
            issue_data: lookup(ISSUE_DATA),
            trigger_phrase: lookup(TRIGGER_PHRASE),
            assignee_trigger: lookup(ASSIGNEE_TRIGGER),
            label_trigger: lookup(LABEL_TRIGGER),
            allowed_tools: lookup(ALLOWED_TOOLS),
            disallowed_tools: lookup(DISALLOWED_TOOLS),
            custom_instructions: lookup(CUSTOM_INSTRUCTIONS),
            direct_prompt: lookup(DIRECT_PROMPT),
            override_prompt: lookup(OVERRIDE_PROMPT),
            base_branch: lookup(BASE_BRANCH),
            branch_prefix: lookup(BRANCH_PREFIX),
            use_sticky_comment: lookup(USE_STICKY_COMMENT),
            disable_comments: lookup(DISABLE_COMMENTS),
            additional_permissions: lookup(ADDITIONAL_PERMISSIONS),
            use_commit_signing: lookup(USE_COMMIT_SIGNING),
            mcp_config: lookup(MCP_CONFIG),
        }
    }

    /// API base URL, falling back to github.com when unset or blank.
    pub fn api_url(&self) -> &str {
        non_empty(self.api_url.as_deref()).unwrap_or(DEFAULT_API_URL)
    }
}

/// Treat blank values the same as unset ones.
pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_map_reads_named_variables() {
        let vars = HashMap::from([
            (GITHUB_RUN_ID.to_string(), "1234".to_string()),
            (DISABLE_COMMENTS.to_string(), "true".to_string()),
            ("UNRELATED".to_string(), "x".to_string()),
        ]);
        let env = ActionEnv::from_map(&vars);
        assert_eq!(env.run_id.as_deref(), Some("1234"));
        assert_eq!(env.disable_comments.as_deref(), Some("true"));
        assert_eq!(env.issue_data, None);
    }

    #[test]
    fn test_empty_map_is_default() {
        assert_eq!(ActionEnv::from_map(&HashMap::new()), ActionEnv::default());
    }

    #[test]
    fn test_api_url_default() {
        let env = ActionEnv::default();
        assert_eq!(env.api_url(), "https://api.github.com");

        let env = ActionEnv {
            api_url: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(env.api_url(), "https://api.github.com");
    }

    #[test]
    fn test_api_url_enterprise() {
        let env = ActionEnv {
            api_url: Some("https://ghe.example.com/api/v3".to_string()),
            ..Default::default()
        };
        assert_eq!(env.api_url(), "https://ghe.example.com/api/v3");
    }
}
