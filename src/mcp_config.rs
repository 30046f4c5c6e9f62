//! MCP server configuration handed to the assistant.
//!
//! The configuration is a map of server name to launch command. Which
//! servers appear depends on the context:
//!
//! - `github` is always present.
//! - `github_comment` is present unless comments are disabled.
//! - `github_ci` is present for pull requests when the workflow granted
//!   `actions: read` through `additional_permissions`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::GitHubContext;

pub const GITHUB_SERVER: &str = "github";
pub const COMMENT_SERVER: &str = "github_comment";
pub const CI_SERVER: &str = "github_ci";

pub const GITHUB_SERVER_IMAGE: &str = "ghcr.io/github/github-mcp-server:v0.5.0";

/// Launch description of one MCP server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct McpServerConfig {
    pub command: String,
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub env: IndexMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct McpConfig {
    #[serde(rename = "mcpServers")]
    pub mcp_servers: IndexMap<String, McpServerConfig>,
}

impl McpConfig {
    pub fn has_server(&self, name: &str) -> bool {
        self.mcp_servers.contains_key(name)
    }
}

/// Inputs to [`build_mcp_config`] that do not come from the context.
#[derive(Debug, Clone)]
pub struct McpConfigOptions {
    pub disable_comments: bool,
    /// Id of the tracking comment the assistant updates, when known.
    pub comment_id: Option<u64>,
    pub github_token: String,
    /// Executable that provides the `serve comment` and `serve ci` commands.
    pub server_command: String,
    pub api_url: String,
}

/// Whether the workflow granted read access to Actions data.
pub fn has_actions_read(ctx: &GitHubContext) -> bool {
    ctx.inputs
        .additional_permissions
        .get("actions")
        .is_some_and(|level| level == "read")
}

fn base_env(ctx: &GitHubContext, options: &McpConfigOptions) -> IndexMap<String, String> {
    IndexMap::from([
        ("GITHUB_TOKEN".to_string(), options.github_token.clone()),
        ("REPO_OWNER".to_string(), ctx.repository.owner.clone()),
        ("REPO_NAME".to_string(), ctx.repository.repo.clone()),
        ("GITHUB_EVENT_NAME".to_string(), ctx.event_name.clone()),
        ("GITHUB_API_URL".to_string(), options.api_url.clone()),
    ])
}

pub fn build_mcp_config(ctx: &GitHubContext, options: &McpConfigOptions) -> McpConfig {
    let mut servers = IndexMap::new();

    servers.insert(
        GITHUB_SERVER.to_string(),
        McpServerConfig {
            command: "docker".to_string(),
            args: [
                "run",
                "-i",
                "--rm",
                "-e",
                "GITHUB_PERSONAL_ACCESS_TOKEN",
                GITHUB_SERVER_IMAGE,
            ]
            .map(String::from)
            .to_vec(),
            env: IndexMap::from([(
                "GITHUB_PERSONAL_ACCESS_TOKEN".to_string(),
                options.github_token.clone(),
            )]),
        },
    );

    if !options.disable_comments {
        let mut env = base_env(ctx, options);
        if let Some(id) = options.comment_id {
            env.insert("COMMENT_ID".to_string(), id.to_string());
        }
        servers.insert(
            COMMENT_SERVER.to_string(),
            McpServerConfig {
                command: options.server_command.clone(),
                args: vec!["serve".to_string(), "comment".to_string()],
                env,
            },
        );
    }

    if ctx.is_pr && has_actions_read(ctx) {
        let mut env = base_env(ctx, options);
        env.insert("PR_NUMBER".to_string(), ctx.entity_number.to_string());
        servers.insert(
            CI_SERVER.to_string(),
            McpServerConfig {
                command: options.server_command.clone(),
                args: vec!["serve".to_string(), "ci".to_string()],
                env,
            },
        );
    }

    tracing::debug!(
        servers = ?servers.keys().collect::<Vec<_>>(),
        "Built MCP configuration"
    );

    McpConfig {
        mcp_servers: servers,
    }
}

/// Merge user-supplied MCP configuration JSON on top of `base`.
///
/// Servers with the same name are replaced by the user's entry; other
/// top-level keys are copied over. Invalid JSON is logged and ignored.
pub fn merge_additional_config(base: &McpConfig, additional: Option<&str>) -> Value {
    let mut merged = serde_json::to_value(base).unwrap_or_else(|_| serde_json::json!({}));

    let Some(raw) = additional.filter(|s| !s.trim().is_empty()) else {
        return merged;
    };

    let extra: Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring MCP_CONFIG: invalid JSON");
            return merged;
        }
    };
    let Value::Object(extra) = extra else {
        tracing::warn!("Ignoring MCP_CONFIG: not a JSON object");
        return merged;
    };

    let Some(target) = merged.as_object_mut() else {
        return merged;
    };
    for (key, value) in extra {
        match value {
            Value::Object(servers) if key == "mcpServers" => {
                let entry = target
                    .entry("mcpServers")
                    .or_insert_with(|| Value::Object(Default::default()));
                if let Some(existing) = entry.as_object_mut() {
                    for (name, server) in servers {
                        if existing.contains_key(&name) {
                            tracing::info!(server = %name, "MCP_CONFIG overrides built-in server");
                        }
                        existing.insert(name, server);
                    }
                }
            }
            _ if key == "mcpServers" => {
                tracing::warn!("Ignoring MCP_CONFIG mcpServers: not a JSON object");
            }
            value => {
                target.insert(key, value);
            }
        }
    }

    merged
}
