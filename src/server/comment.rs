use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::*;
use rmcp::{tool, tool_handler, tool_router, ServerHandler};
use schemars::JsonSchema;
use serde::Deserialize;

use super::RepoTarget;
use crate::error::ActionError;

/// Serves `update_comment` for the tracking comment of one run.
#[derive(Clone)]
pub struct CommentServer {
    github: Arc<octocrab::Octocrab>,
    repo: RepoTarget,
    comment_id: Option<u64>,
    event_name: String,
    tool_router: ToolRouter<Self>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateCommentParams {
    #[schemars(description = "New comment body (GitHub-flavored markdown)")]
    pub body: String,
}

impl CommentServer {
    pub fn new(
        github: octocrab::Octocrab,
        repo: RepoTarget,
        comment_id: Option<u64>,
        event_name: String,
    ) -> Self {
        Self {
            github: Arc::new(github),
            repo,
            comment_id,
            event_name,
            tool_router: Self::tool_router(),
        }
    }

    /// Review comments on a diff live under `pulls`, everything else under `issues`.
    fn comment_route(&self, id: u64) -> String {
        let kind = if self.event_name == "pull_request_review_comment" {
            "pulls"
        } else {
            "issues"
        };
        format!("{}/{}/comments/{}", self.repo.route(), kind, id)
    }

    fn err(&self, e: ActionError) -> ErrorData {
        e.to_mcp_error()
    }
}

#[tool_router]
impl CommentServer {
    #[tool(
        name = "update_comment",
        description = "Replace the body of the tracking comment with progress or final results"
    )]
    async fn update_comment(
        &self,
        Parameters(params): Parameters<UpdateCommentParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let id = self.comment_id.ok_or_else(|| {
            self.err(ActionError::InvalidParam(
                "no tracking comment configured (COMMENT_ID is unset)".to_string(),
            ))
        })?;
        if params.body.trim().is_empty() {
            return Err(self.err(ActionError::InvalidParam(
                "body must not be empty".to_string(),
            )));
        }

        let route = self.comment_route(id);
        let response: serde_json::Value = self
            .github
            .patch(&route, Some(&serde_json::json!({ "body": params.body })))
            .await
            .map_err(|e| self.err(ActionError::GitHub(e)))?;

        tracing::info!(comment_id = id, "Updated tracking comment");

        let text = serde_json::to_string_pretty(&serde_json::json!({
            "id": response.get("id"),
            "html_url": response.get("html_url"),
            "updated_at": response.get("updated_at"),
        }))
        .unwrap_or_else(|_| "{}".to_string());
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }
}

#[tool_handler]
impl ServerHandler for CommentServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "github_comment".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(
                "Use update_comment to report progress and results in the issue or pull \
                 request comment that tracks this run."
                    .to_string(),
            ),
        }
    }
}
