//! GitHub Actions glue for an AI coding assistant.
//!
//! Turns the job environment and the webhook payload into a [`GitHubContext`],
//! decides whether the assistant was asked to act, and derives the tool
//! policy and MCP server configuration handed to it. Also ships the small
//! MCP servers that configuration points at.

pub mod config;
pub mod context;
pub mod error;
pub mod event;
pub mod mcp_config;
pub mod outputs;
pub mod parse;
pub mod server;
pub mod tools;
pub mod trigger;

pub use config::ActionEnv;
pub use context::{parse_github_context, GitHubContext};
pub use error::{ActionError, Result};
