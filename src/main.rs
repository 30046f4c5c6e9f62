use std::path::{Path, PathBuf};

use agent_action::config::{ActionEnv, DEFAULT_API_URL};
use agent_action::mcp_config::{build_mcp_config, merge_additional_config, McpConfigOptions};
use agent_action::server::ci::CiServer;
use agent_action::server::comment::CommentServer;
use agent_action::server::{build_client, RepoTarget};
use agent_action::{outputs, parse_github_context, tools, trigger};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rmcp::{transport::stdio, ServiceExt};
use tracing_subscriber::EnvFilter;

/// Turn GitHub issue and pull request events into context, tool policy, and
/// MCP configuration for an AI coding assistant
#[derive(Parser)]
#[command(name = "agent-action", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve the event context and write step outputs to $GITHUB_OUTPUT
    Prepare(PrepareArgs),

    /// Print the resolved event context as JSON
    Context {
        /// Event payload file. Default: $GITHUB_EVENT_PATH
        #[arg(long)]
        event_path: Option<PathBuf>,
    },

    /// Run one of the bundled MCP servers over stdio
    Serve {
        #[command(subcommand)]
        server: ServeCommand,
    },
}

#[derive(Args)]
struct PrepareArgs {
    /// Event payload file. Default: $GITHUB_EVENT_PATH
    #[arg(long)]
    event_path: Option<PathBuf>,

    /// Token handed to the MCP servers
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    github_token: Option<String>,

    /// Id of the tracking comment the assistant should update
    #[arg(long, env = "COMMENT_ID")]
    comment_id: Option<u64>,

    /// Command the MCP config uses to launch `serve`. Default: this executable
    #[arg(long)]
    server_command: Option<String>,
}

#[derive(Subcommand)]
enum ServeCommand {
    /// Tracking comment updates
    Comment {
        #[command(flatten)]
        common: ServeArgs,

        /// Comment to update
        #[arg(long, env = "COMMENT_ID")]
        comment_id: Option<u64>,

        /// Triggering event name, selects issue vs review comment routes
        #[arg(long, env = "GITHUB_EVENT_NAME", default_value = "")]
        event_name: String,
    },

    /// CI status of a pull request
    Ci {
        #[command(flatten)]
        common: ServeArgs,

        /// Pull request number
        #[arg(long, env = "PR_NUMBER")]
        pr_number: u64,

        /// Maximum results per API call (default: 30)
        #[arg(long, default_value = "30")]
        max_results: u32,
    },
}

#[derive(Args)]
struct ServeArgs {
    /// GitHub token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Repository owner
    #[arg(long, env = "REPO_OWNER")]
    owner: String,

    /// Repository name
    #[arg(long, env = "REPO_NAME")]
    repo: String,

    /// GitHub API base URL
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,
}

fn load_payload(path: Option<&Path>) -> Result<serde_json::Value> {
    let Some(path) = path else {
        tracing::warn!("No event payload path; using an empty payload");
        return Ok(serde_json::json!({}));
    };
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(
                path = %path.display(),
                "Event payload file not found; using an empty payload"
            );
            return Ok(serde_json::json!({}));
        }
        Err(e) => {
            return Err(e)
                .with_context(|| format!("Failed to read event payload {}", path.display()));
        }
    };
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse event payload {}", path.display()))
}

fn payload_path(arg: Option<PathBuf>, env: &ActionEnv) -> Option<PathBuf> {
    arg.or_else(|| env.event_path.as_ref().map(PathBuf::from))
}

fn prepare(args: PrepareArgs) -> Result<()> {
    let env = ActionEnv::from_env();
    let payload = load_payload(payload_path(args.event_path, &env).as_deref())?;
    let ctx = parse_github_context(&env, payload)?;

    let contains_trigger = trigger::check_contains_trigger(&ctx);

    let server_command = match args.server_command {
        Some(cmd) => cmd,
        None => std::env::current_exe()
            .context("Failed to locate the current executable")?
            .display()
            .to_string(),
    };
    let options = McpConfigOptions {
        disable_comments: ctx.inputs.disable_comments,
        comment_id: args.comment_id,
        github_token: args.github_token.unwrap_or_default(),
        server_command,
        api_url: env.api_url().to_string(),
    };
    let mcp = build_mcp_config(&ctx, &options);
    let mcp_json = merge_additional_config(&mcp, env.mcp_config.as_deref());
    let policy = tools::build_tool_policy(&ctx, &mcp);

    tracing::info!(
        event = %ctx.event_kind,
        entity_number = ctx.entity_number,
        is_pr = ctx.is_pr,
        contains_trigger,
        servers = mcp.mcp_servers.len(),
        "Prepared assistant run"
    );

    let step_outputs = [
        ("contains_trigger", contains_trigger.to_string()),
        ("entity_number", ctx.entity_number.to_string()),
        ("is_pr", ctx.is_pr.to_string()),
        ("allowed_tools", policy.allowed_string()),
        ("disallowed_tools", policy.disallowed_string()),
        ("mcp_config", serde_json::to_string_pretty(&mcp_json)?),
    ];

    match env.output_path.as_deref().filter(|p| !p.is_empty()) {
        Some(path) => outputs::write_outputs(Path::new(path), &step_outputs)?,
        None => {
            let summary: serde_json::Map<String, serde_json::Value> = step_outputs
                .into_iter()
                .map(|(k, v)| (k.to_string(), serde_json::Value::String(v)))
                .collect();
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }
    Ok(())
}

fn print_context(event_path: Option<PathBuf>) -> Result<()> {
    let env = ActionEnv::from_env();
    let payload = load_payload(payload_path(event_path, &env).as_deref())?;
    let ctx = parse_github_context(&env, payload)?;
    println!("{}", serde_json::to_string_pretty(&ctx)?);
    Ok(())
}

async fn serve(server: ServeCommand) -> Result<()> {
    match server {
        ServeCommand::Comment {
            common,
            comment_id,
            event_name,
        } => {
            let github = build_client(common.token.as_deref(), &common.api_url)?;
            let repo = RepoTarget::new(&common.owner, &common.repo)?;
            tracing::info!(
                repo = %repo.route(),
                comment_id = ?comment_id,
                "Starting github_comment server"
            );
            let service = CommentServer::new(github, repo, comment_id, event_name);
            let running = service.serve(stdio()).await?;
            running.waiting().await?;
        }
        ServeCommand::Ci {
            common,
            pr_number,
            max_results,
        } => {
            let github = build_client(common.token.as_deref(), &common.api_url)?;
            let repo = RepoTarget::new(&common.owner, &common.repo)?;
            tracing::info!(repo = %repo.route(), pr_number, "Starting github_ci server");
            let service = CiServer::new(github, repo, pr_number, max_results);
            let running = service.serve(stdio()).await?;
            running.waiting().await?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Prepare(args) => prepare(args),
        Command::Context { event_path } => print_context(event_path),
        Command::Serve { server } => serve(server).await,
    }
}
