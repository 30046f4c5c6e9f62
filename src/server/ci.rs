use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::*;
use rmcp::{tool, tool_handler, tool_router, ServerHandler};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;

use super::RepoTarget;
use crate::error::ActionError;

/// Read-only view of CI results for one pull request.
#[derive(Clone)]
pub struct CiServer {
    github: Arc<octocrab::Octocrab>,
    repo: RepoTarget,
    pr_number: u64,
    max_results: u32,
    tool_router: ToolRouter<Self>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CiStatusParams {
    #[schemars(description = "Filter by status: completed, in_progress, queued")]
    #[serde(default)]
    pub status: Option<String>,

    #[schemars(description = "Maximum number of workflow runs")]
    #[serde(default)]
    pub per_page: Option<u32>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct RunDetailsParams {
    #[schemars(description = "Workflow run id, as returned by get_ci_status")]
    pub run_id: u64,
}

const FAILED_CONCLUSIONS: &[&str] = &[
    "failure",
    "timed_out",
    "cancelled",
    "action_required",
    "startup_failure",
];

impl CiServer {
    pub fn new(
        github: octocrab::Octocrab,
        repo: RepoTarget,
        pr_number: u64,
        max_results: u32,
    ) -> Self {
        Self {
            github: Arc::new(github),
            repo,
            pr_number,
            max_results,
            tool_router: Self::tool_router(),
        }
    }

    /// Cap per_page to 100 (GitHub API maximum).
    fn capped_per_page(&self, per_page: Option<u32>) -> u32 {
        std::cmp::min(per_page.unwrap_or(self.max_results), 100)
    }

    fn err(&self, e: ActionError) -> ErrorData {
        e.to_mcp_error()
    }

    async fn get_json(&self, route: String) -> Result<Value, ErrorData> {
        self.github
            .get(route, None::<&()>)
            .await
            .map_err(|e| self.err(ActionError::GitHub(e)))
    }
}

/// Reduce an `actions/runs` response to counts plus one row per run.
pub fn summarize_runs(response: &Value) -> Value {
    let runs = response
        .get("workflow_runs")
        .and_then(|r| r.as_array())
        .map(Vec::as_slice)
        .unwrap_or_default();

    let (mut passed, mut failed, mut pending) = (0, 0, 0);
    let rows: Vec<Value> = runs
        .iter()
        .map(|run| {
            let status = run.get("status").and_then(Value::as_str).unwrap_or("");
            let conclusion = run.get("conclusion").and_then(Value::as_str);
            match conclusion {
                _ if status != "completed" => pending += 1,
                Some(c) if FAILED_CONCLUSIONS.contains(&c) => failed += 1,
                Some("success") => passed += 1,
                _ => {}
            }
            serde_json::json!({
                "id": run.get("id"),
                "name": run.get("name"),
                "status": run.get("status"),
                "conclusion": run.get("conclusion"),
                "event": run.get("event"),
                "url": run.get("html_url"),
            })
        })
        .collect();

    serde_json::json!({
        "total": rows.len(),
        "passed": passed,
        "failed": failed,
        "pending": pending,
        "runs": rows,
    })
}

/// Reduce an `actions/runs/{id}/jobs` response to jobs and their failed steps.
pub fn summarize_jobs(response: &Value) -> Vec<Value> {
    response
        .get("jobs")
        .and_then(|j| j.as_array())
        .map(|jobs| {
            jobs.iter()
                .map(|job| {
                    let failed_steps: Vec<Value> = job
                        .get("steps")
                        .and_then(|s| s.as_array())
                        .map(|steps| {
                            steps
                                .iter()
                                .filter(|s| {
                                    s.get("conclusion").and_then(Value::as_str)
                                        == Some("failure")
                                })
                                .map(|s| {
                                    serde_json::json!({
                                        "number": s.get("number"),
                                        "name": s.get("name"),
                                    })
                                })
                                .collect()
                        })
                        .unwrap_or_default();
                    serde_json::json!({
                        "id": job.get("id"),
                        "name": job.get("name"),
                        "status": job.get("status"),
                        "conclusion": job.get("conclusion"),
                        "url": job.get("html_url"),
                        "failed_steps": failed_steps,
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

#[tool_router]
impl CiServer {
    #[tool(
        name = "get_ci_status",
        description = "Summarize GitHub Actions workflow runs for the pull request's head commit"
    )]
    async fn get_ci_status(
        &self,
        Parameters(params): Parameters<CiStatusParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let pr = self
            .get_json(format!("{}/pulls/{}", self.repo.route(), self.pr_number))
            .await?;
        let sha = pr
            .pointer("/head/sha")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                self.err(ActionError::Other(format!(
                    "pull request #{} has no head commit",
                    self.pr_number
                )))
            })?;

        let mut route = format!(
            "{}/actions/runs?head_sha={}&per_page={}",
            self.repo.route(),
            sha,
            self.capped_per_page(params.per_page)
        );
        if let Some(ref status) = params.status {
            match status.as_str() {
                "completed" | "in_progress" | "queued" => {
                    route.push_str(&format!("&status={}", status));
                }
                other => {
                    return Err(self.err(ActionError::InvalidParam(format!(
                        "unsupported status filter: {}",
                        other
                    ))))
                }
            }
        }

        let response = self.get_json(route).await?;
        let mut summary = summarize_runs(&response);
        summary["pr_number"] = serde_json::json!(self.pr_number);
        summary["head_sha"] = serde_json::json!(sha);

        let text = serde_json::to_string_pretty(&summary).unwrap_or_else(|_| "{}".to_string());
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    #[tool(
        name = "get_workflow_run_details",
        description = "Get a workflow run with its jobs and the steps that failed"
    )]
    async fn get_workflow_run_details(
        &self,
        Parameters(params): Parameters<RunDetailsParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let base = format!("{}/actions/runs/{}", self.repo.route(), params.run_id);
        let run = self.get_json(base.clone()).await?;
        let jobs = self.get_json(format!("{}/jobs", base)).await?;

        let text = serde_json::to_string_pretty(&serde_json::json!({
            "id": run.get("id"),
            "name": run.get("name"),
            "status": run.get("status"),
            "conclusion": run.get("conclusion"),
            "branch": run.get("head_branch"),
            "sha": run.get("head_sha"),
            "url": run.get("html_url"),
            "jobs": summarize_jobs(&jobs),
        }))
        .unwrap_or_else(|_| "{}".to_string());
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }
}

#[tool_handler]
impl ServerHandler for CiServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "github_ci".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(
                "CI inspection for the current pull request. Use get_ci_status for an \
                 overview and get_workflow_run_details to see which jobs and steps failed."
                    .to_string(),
            ),
        }
    }
}
