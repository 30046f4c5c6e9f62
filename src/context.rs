//! Resolution of the canonical [`GitHubContext`] for one job run.

use serde::Serialize;
use serde_json::Value;

use crate::config::{self, non_empty, ActionEnv};
use crate::error::{ActionError, Result};
use crate::event::{as_entity_number, is_truthy, EntityRef, EventKind, EventPayload};
use crate::parse::{
    parse_additional_permissions, parse_bool_flag, parse_multiline_input, Permissions,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Repository {
    pub owner: String,
    pub repo: String,
    pub full_name: String,
}

impl Repository {
    /// Parse `owner/name` as found in `GITHUB_REPOSITORY`.
    pub fn from_full_name(full_name: &str) -> Option<Self> {
        let (owner, repo) = full_name.trim().split_once('/')?;
        if owner.is_empty() || repo.is_empty() || repo.contains('/') {
            return None;
        }
        Some(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
            full_name: format!("{}/{}", owner, repo),
        })
    }

    fn from_payload(payload: &Value) -> Option<Self> {
        let repo = payload.get("repository")?;
        let name = repo.get("name").and_then(Value::as_str)?;
        let owner = repo.pointer("/owner/login").and_then(Value::as_str)?;
        if name.is_empty() || owner.is_empty() {
            return None;
        }
        Some(Self {
            owner: owner.to_string(),
            repo: name.to_string(),
            full_name: format!("{}/{}", owner, name),
        })
    }
}

/// User-supplied action inputs after parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextInputs {
    pub trigger_phrase: String,
    pub assignee_trigger: String,
    pub label_trigger: String,
    pub allowed_tools: Vec<String>,
    pub disallowed_tools: Vec<String>,
    pub custom_instructions: String,
    pub direct_prompt: String,
    pub override_prompt: String,
    pub base_branch: Option<String>,
    pub branch_prefix: String,
    pub use_sticky_comment: bool,
    pub disable_comments: bool,
    pub additional_permissions: Permissions,
    pub use_commit_signing: bool,
}

/// Everything downstream steps need to know about the triggering event.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GitHubContext {
    pub run_id: String,
    pub event_name: String,
    pub event_kind: EventKind,
    pub event_action: Option<String>,
    pub repository: Repository,
    pub actor: String,
    /// Issue or PR number; 0 when no source provided one.
    pub entity_number: u64,
    #[serde(rename = "isPR")]
    pub is_pr: bool,
    #[serde(skip)]
    pub payload: EventPayload,
    #[serde(rename = "payload")]
    pub raw_payload: Value,
    pub inputs: ContextInputs,
}

impl GitHubContext {
    pub fn entity_type(&self) -> &'static str {
        if self.is_pr {
            "pr"
        } else {
            "issue"
        }
    }
}

/// What `ISSUE_DATA` contributed, if it parsed.
#[derive(Debug, Default)]
struct IssueData {
    number: Option<u64>,
    is_pr: bool,
}

fn parse_issue_data(raw: Option<&str>) -> Option<IssueData> {
    let raw = non_empty(raw)?;
    let value: Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring ISSUE_DATA: invalid JSON");
            return None;
        }
    };
    if !value.is_object() {
        tracing::warn!("Ignoring ISSUE_DATA: not a JSON object");
        return None;
    }
    // Issue numbers start at 1; 0 is the "no entity" sentinel.
    let number = value
        .get("number")
        .and_then(as_entity_number)
        .filter(|n| *n != 0);
    Some(IssueData {
        number,
        is_pr: value.get("pull_request").is_some_and(is_truthy),
    })
}

/// Resolve the issue/PR number and kind, first match wins:
/// `ISSUE_DATA`, then dispatch `issue_number` or the payload's own entity.
fn resolve_entity(issue_data: Option<&IssueData>, payload: &EventPayload) -> EntityRef {
    let data_is_pr = issue_data.is_some_and(|d| d.is_pr);

    if let Some(number) = issue_data.and_then(|d| d.number) {
        return EntityRef {
            number,
            is_pr: data_is_pr,
        };
    }

    let fallback = match payload.dispatch() {
        Some(dispatch) => dispatch.input("issue_number").and_then(|raw| {
            match raw.trim().parse::<u64>() {
                Ok(number) => Some(EntityRef {
                    number,
                    is_pr: false,
                }),
                Err(_) => {
                    tracing::warn!(issue_number = %raw, "Ignoring non-numeric issue_number input");
                    None
                }
            }
        }),
        None => payload.entity(),
    };

    match fallback {
        Some(entity) => EntityRef {
            number: entity.number,
            is_pr: entity.is_pr || data_is_pr,
        },
        None => EntityRef {
            number: 0,
            is_pr: data_is_pr,
        },
    }
}

fn parse_inputs(env: &ActionEnv, payload: &EventPayload) -> ContextInputs {
    let text = |v: &Option<String>| v.clone().unwrap_or_default();

    let direct_prompt = non_empty(env.direct_prompt.as_deref())
        .map(String::from)
        .or_else(|| payload.dispatch().and_then(|d| d.input("prompt")))
        .unwrap_or_default();

    ContextInputs {
        trigger_phrase: non_empty(env.trigger_phrase.as_deref())
            .unwrap_or(config::DEFAULT_TRIGGER_PHRASE)
            .to_string(),
        assignee_trigger: text(&env.assignee_trigger),
        label_trigger: text(&env.label_trigger),
        allowed_tools: parse_multiline_input(env.allowed_tools.as_deref().unwrap_or("")),
        disallowed_tools: parse_multiline_input(env.disallowed_tools.as_deref().unwrap_or("")),
        custom_instructions: text(&env.custom_instructions),
        direct_prompt,
        override_prompt: text(&env.override_prompt),
        base_branch: non_empty(env.base_branch.as_deref()).map(String::from),
        branch_prefix: non_empty(env.branch_prefix.as_deref())
            .unwrap_or(config::DEFAULT_BRANCH_PREFIX)
            .to_string(),
        use_sticky_comment: parse_bool_flag(env.use_sticky_comment.as_deref()),
        disable_comments: parse_bool_flag(env.disable_comments.as_deref()),
        additional_permissions: parse_additional_permissions(
            env.additional_permissions.as_deref().unwrap_or(""),
        ),
        use_commit_signing: parse_bool_flag(env.use_commit_signing.as_deref()),
    }
}

/// Build the context for this run from an environment snapshot and the
/// event payload.
///
/// Malformed optional input degrades to defaults. Only a missing run id,
/// event name, or repository identity is an error.
pub fn parse_github_context(env: &ActionEnv, raw_payload: Value) -> Result<GitHubContext> {
    let run_id = non_empty(env.run_id.as_deref())
        .ok_or(ActionError::MissingEnv(config::GITHUB_RUN_ID))?
        .to_string();
    let event_name = non_empty(env.event_name.as_deref())
        .ok_or(ActionError::MissingEnv(config::GITHUB_EVENT_NAME))?
        .trim()
        .to_string();

    let repository = non_empty(env.repository.as_deref())
        .and_then(|full| {
            let parsed = Repository::from_full_name(full);
            if parsed.is_none() {
                tracing::warn!(repository = full, "GITHUB_REPOSITORY is not owner/name");
            }
            parsed
        })
        .or_else(|| Repository::from_payload(&raw_payload))
        .ok_or(ActionError::MissingEnv(config::GITHUB_REPOSITORY))?;

    let actor = non_empty(env.actor.as_deref())
        .map(String::from)
        .or_else(|| {
            raw_payload
                .pointer("/sender/login")
                .and_then(Value::as_str)
                .map(String::from)
        })
        .unwrap_or_default();

    let event_kind = EventKind::from_name(&event_name);
    let payload = EventPayload::from_value(&event_kind, &raw_payload);
    let issue_data = parse_issue_data(env.issue_data.as_deref());
    let entity = resolve_entity(issue_data.as_ref(), &payload);
    let inputs = parse_inputs(env, &payload);

    tracing::debug!(
        event = %event_kind,
        entity_number = entity.number,
        is_pr = entity.is_pr,
        repository = %repository.full_name,
        "Resolved GitHub context"
    );

    Ok(GitHubContext {
        run_id,
        event_name,
        event_action: payload.action().map(String::from),
        event_kind,
        repository,
        actor,
        entity_number: entity.number,
        is_pr: entity.is_pr,
        payload,
        raw_payload,
        inputs,
    })
}
