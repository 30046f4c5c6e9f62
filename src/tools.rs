//! Allowed and disallowed tool lists passed to the assistant.

use serde::Serialize;

use crate::context::GitHubContext;
use crate::mcp_config::{McpConfig, CI_SERVER, COMMENT_SERVER};

pub const BASE_ALLOWED_TOOLS: &[&str] = &[
    "Edit",
    "MultiEdit",
    "Glob",
    "Grep",
    "LS",
    "Read",
    "Write",
];

pub const DEFAULT_DISALLOWED_TOOLS: &[&str] = &["WebSearch", "WebFetch"];

pub const COMMENT_TOOL: &str = "mcp__github_comment__update_comment";

pub const GIT_TOOLS: &[&str] = &[
    "Bash(git add:*)",
    "Bash(git commit:*)",
    "Bash(git push:*)",
    "Bash(git status:*)",
    "Bash(git diff:*)",
    "Bash(git log:*)",
    "Bash(git rm:*)",
];

/// Commits made through the API are signed by GitHub.
pub const SIGNED_COMMIT_TOOLS: &[&str] = &[
    "mcp__github__create_or_update_file",
    "mcp__github__push_files",
    "mcp__github__delete_file",
];

pub const CI_TOOLS: &[&str] = &[
    "mcp__github_ci__get_ci_status",
    "mcp__github_ci__get_workflow_run_details",
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ToolPolicy {
    pub allowed: Vec<String>,
    pub disallowed: Vec<String>,
}

impl ToolPolicy {
    pub fn allowed_string(&self) -> String {
        self.allowed.join(",")
    }

    pub fn disallowed_string(&self) -> String {
        self.disallowed.join(",")
    }
}

pub fn build_tool_policy(ctx: &GitHubContext, mcp: &McpConfig) -> ToolPolicy {
    let inputs = &ctx.inputs;
    let mut allowed: Vec<String> = BASE_ALLOWED_TOOLS.iter().map(|t| t.to_string()).collect();

    if mcp.has_server(COMMENT_SERVER) {
        allowed.push(COMMENT_TOOL.to_string());
    }

    let commit_tools = if inputs.use_commit_signing {
        SIGNED_COMMIT_TOOLS
    } else {
        GIT_TOOLS
    };
    allowed.extend(commit_tools.iter().map(|t| t.to_string()));

    if mcp.has_server(CI_SERVER) {
        allowed.extend(CI_TOOLS.iter().map(|t| t.to_string()));
    }

    allowed.extend(inputs.allowed_tools.iter().cloned());

    let mut disallowed: Vec<String> = DEFAULT_DISALLOWED_TOOLS
        .iter()
        .filter(|tool| !inputs.allowed_tools.iter().any(|a| a == *tool))
        .map(|t| t.to_string())
        .collect();
    disallowed.extend(inputs.disallowed_tools.iter().cloned());

    ToolPolicy {
        allowed,
        disallowed,
    }
}
