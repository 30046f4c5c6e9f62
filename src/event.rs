//! Typed view of the webhook payloads the action responds to.
//!
//! Only the fields the action actually reads are modelled. A payload whose
//! event kind is unknown, or whose shape does not match its kind, is kept
//! as [`EventPayload::Other`] and probed on a best-effort basis.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// The triggering event, keyed by `GITHUB_EVENT_NAME`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    IssueComment,
    PullRequestReviewComment,
    PullRequestReview,
    Issues,
    /// `pull_request` and `pull_request_target`.
    PullRequest,
    WorkflowDispatch,
    Other(String),
}

impl EventKind {
    pub fn from_name(name: &str) -> Self {
        match name {
            "issue_comment" => Self::IssueComment,
            "pull_request_review_comment" => Self::PullRequestReviewComment,
            "pull_request_review" => Self::PullRequestReview,
            "issues" => Self::Issues,
            "pull_request" | "pull_request_target" => Self::PullRequest,
            "workflow_dispatch" => Self::WorkflowDispatch,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::IssueComment => "issue_comment",
            Self::PullRequestReviewComment => "pull_request_review_comment",
            Self::PullRequestReview => "pull_request_review",
            Self::Issues => "issues",
            Self::PullRequest => "pull_request",
            Self::WorkflowDispatch => "workflow_dispatch",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for EventKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// -- Payload fragments --

#[derive(Debug, Clone, Default, Deserialize)]
pub struct User {
    #[serde(default)]
    pub login: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Label {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Issue {
    pub number: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    /// Present (as an object) when the issue is actually a pull request.
    #[serde(default)]
    pub pull_request: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Comment {
    pub id: u64,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Review {
    #[serde(default)]
    pub body: Option<String>,
}

// -- Per-event payloads --

#[derive(Debug, Clone, Deserialize)]
pub struct IssueCommentEvent {
    #[serde(default)]
    pub action: Option<String>,
    pub issue: Issue,
    pub comment: Comment,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestReviewCommentEvent {
    #[serde(default)]
    pub action: Option<String>,
    pub pull_request: PullRequest,
    pub comment: Comment,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestReviewEvent {
    #[serde(default)]
    pub action: Option<String>,
    pub pull_request: PullRequest,
    pub review: Review,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssuesEvent {
    #[serde(default)]
    pub action: Option<String>,
    pub issue: Issue,
    #[serde(default)]
    pub assignee: Option<User>,
    #[serde(default)]
    pub label: Option<Label>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestEvent {
    #[serde(default)]
    pub action: Option<String>,
    pub pull_request: PullRequest,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkflowDispatchEvent {
    /// Dispatch inputs. Usually strings, but boolean and number inputs
    /// arrive as JSON booleans and numbers.
    #[serde(default)]
    pub inputs: Option<HashMap<String, Value>>,
}

impl WorkflowDispatchEvent {
    /// A dispatch input rendered as a string, if present and non-null.
    pub fn input(&self, name: &str) -> Option<String> {
        match self.inputs.as_ref()?.get(name)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// Event payload as a closed union over the supported event kinds.
#[derive(Debug, Clone)]
pub enum EventPayload {
    IssueComment(IssueCommentEvent),
    PullRequestReviewComment(PullRequestReviewCommentEvent),
    PullRequestReview(PullRequestReviewEvent),
    Issues(IssuesEvent),
    PullRequest(PullRequestEvent),
    WorkflowDispatch(WorkflowDispatchEvent),
    Other(Value),
}

/// Issue or pull request number found in a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityRef {
    pub number: u64,
    pub is_pr: bool,
}

impl EventPayload {
    /// Interpret `raw` according to `kind`. Never fails: a payload that
    /// does not fit its kind degrades to [`EventPayload::Other`].
    pub fn from_value(kind: &EventKind, raw: &Value) -> Self {
        let typed = match kind {
            EventKind::IssueComment => {
                serde_json::from_value(raw.clone()).map(Self::IssueComment)
            }
            EventKind::PullRequestReviewComment => {
                serde_json::from_value(raw.clone()).map(Self::PullRequestReviewComment)
            }
            EventKind::PullRequestReview => {
                serde_json::from_value(raw.clone()).map(Self::PullRequestReview)
            }
            EventKind::Issues => serde_json::from_value(raw.clone()).map(Self::Issues),
            EventKind::PullRequest => serde_json::from_value(raw.clone()).map(Self::PullRequest),
            EventKind::WorkflowDispatch => {
                serde_json::from_value(raw.clone()).map(Self::WorkflowDispatch)
            }
            EventKind::Other(_) => return Self::Other(raw.clone()),
        };

        typed.unwrap_or_else(|e| {
            tracing::warn!(
                event = %kind,
                error = %e,
                "Event payload does not match its event kind"
            );
            Self::Other(raw.clone())
        })
    }

    pub fn action(&self) -> Option<&str> {
        match self {
            Self::IssueComment(e) => e.action.as_deref(),
            Self::PullRequestReviewComment(e) => e.action.as_deref(),
            Self::PullRequestReview(e) => e.action.as_deref(),
            Self::Issues(e) => e.action.as_deref(),
            Self::PullRequest(e) => e.action.as_deref(),
            Self::WorkflowDispatch(_) => None,
            Self::Other(v) => v.get("action").and_then(Value::as_str),
        }
    }

    /// The issue or pull request this event is about, from the payload's
    /// own shape. Workflow dispatch payloads carry no entity.
    pub fn entity(&self) -> Option<EntityRef> {
        match self {
            Self::IssueComment(e) => Some(EntityRef {
                number: e.issue.number,
                is_pr: e.issue.pull_request.as_ref().is_some_and(is_truthy),
            }),
            Self::PullRequestReviewComment(e) => Some(EntityRef {
                number: e.pull_request.number,
                is_pr: true,
            }),
            Self::PullRequestReview(e) => Some(EntityRef {
                number: e.pull_request.number,
                is_pr: true,
            }),
            Self::Issues(e) => Some(EntityRef {
                number: e.issue.number,
                is_pr: false,
            }),
            Self::PullRequest(e) => Some(EntityRef {
                number: e.pull_request.number,
                is_pr: true,
            }),
            Self::WorkflowDispatch(_) => None,
            Self::Other(v) => probe_entity(v),
        }
    }

    /// The workflow dispatch payload, if this is one.
    pub fn dispatch(&self) -> Option<&WorkflowDispatchEvent> {
        match self {
            Self::WorkflowDispatch(e) => Some(e),
            _ => None,
        }
    }

    /// Comment id of the triggering comment, for comment events.
    pub fn comment_id(&self) -> Option<u64> {
        match self {
            Self::IssueComment(e) => Some(e.comment.id),
            Self::PullRequestReviewComment(e) => Some(e.comment.id),
            _ => None,
        }
    }
}

fn probe_entity(v: &Value) -> Option<EntityRef> {
    if let Some(issue) = v.get("issue") {
        if let Some(number) = issue.get("number").and_then(as_entity_number) {
            return Some(EntityRef {
                number,
                is_pr: issue.get("pull_request").is_some_and(is_truthy),
            });
        }
    }
    if let Some(number) = v.pointer("/pull_request/number").and_then(as_entity_number) {
        return Some(EntityRef { number, is_pr: true });
    }
    v.get("number")
        .and_then(as_entity_number)
        .map(|number| EntityRef { number, is_pr: false })
}

/// Read a non-negative integer from a JSON number or a numeric string.
pub(crate) fn as_entity_number(v: &Value) -> Option<u64> {
    match v {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// JavaScript-style truthiness, used for `pull_request` markers.
pub(crate) fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_kind_round_trips_names() {
        for name in [
            "issue_comment",
            "pull_request_review_comment",
            "pull_request_review",
            "issues",
            "pull_request",
            "workflow_dispatch",
            "schedule",
        ] {
            assert_eq!(EventKind::from_name(name).as_str(), name);
        }
        assert_eq!(
            EventKind::from_name("pull_request_target"),
            EventKind::PullRequest
        );
    }

    #[test]
    fn test_issue_comment_on_issue() {
        let raw = json!({
            "action": "created",
            "issue": { "number": 42, "title": "Bug" },
            "comment": { "id": 7, "body": "@claude help", "user": { "login": "octo" } }
        });
        let payload = EventPayload::from_value(&EventKind::IssueComment, &raw);
        assert_eq!(
            payload.entity(),
            Some(EntityRef { number: 42, is_pr: false })
        );
        assert_eq!(payload.action(), Some("created"));
        assert_eq!(payload.comment_id(), Some(7));
    }

    #[test]
    fn test_issue_comment_on_pull_request() {
        let raw = json!({
            "issue": { "number": 5, "pull_request": { "url": "https://api.github.com/x" } },
            "comment": { "id": 1 }
        });
        let payload = EventPayload::from_value(&EventKind::IssueComment, &raw);
        assert_eq!(payload.entity(), Some(EntityRef { number: 5, is_pr: true }));
    }

    #[test]
    fn test_issue_comment_null_pull_request_is_issue() {
        let raw = json!({
            "issue": { "number": 5, "pull_request": null },
            "comment": { "id": 1 }
        });
        let payload = EventPayload::from_value(&EventKind::IssueComment, &raw);
        assert_eq!(payload.entity(), Some(EntityRef { number: 5, is_pr: false }));
    }

    #[test]
    fn test_pull_request_kinds_are_pr() {
        let pr = json!({ "action": "opened", "pull_request": { "number": 9 } });
        let payload = EventPayload::from_value(&EventKind::PullRequest, &pr);
        assert_eq!(payload.entity(), Some(EntityRef { number: 9, is_pr: true }));

        let review = json!({ "pull_request": { "number": 10 }, "review": { "body": "lgtm" } });
        let payload = EventPayload::from_value(&EventKind::PullRequestReview, &review);
        assert_eq!(payload.entity(), Some(EntityRef { number: 10, is_pr: true }));

        let rc = json!({ "pull_request": { "number": 11 }, "comment": { "id": 3 } });
        let payload = EventPayload::from_value(&EventKind::PullRequestReviewComment, &rc);
        assert_eq!(payload.entity(), Some(EntityRef { number: 11, is_pr: true }));
        assert_eq!(payload.comment_id(), Some(3));
    }

    #[test]
    fn test_issues_event_labeled() {
        let raw = json!({
            "action": "labeled",
            "issue": { "number": 3 },
            "label": { "name": "ai" }
        });
        let payload = EventPayload::from_value(&EventKind::Issues, &raw);
        match &payload {
            EventPayload::Issues(e) => {
                assert_eq!(e.label.as_ref().map(|l| l.name.as_str()), Some("ai"));
            }
            other => panic!("expected issues payload, got {:?}", other),
        }
        assert_eq!(payload.entity(), Some(EntityRef { number: 3, is_pr: false }));
    }

    #[test]
    fn test_mismatched_shape_degrades_to_other() {
        let raw = json!({ "pull_request": { "number": 12 } });
        let payload = EventPayload::from_value(&EventKind::Issues, &raw);
        assert!(matches!(payload, EventPayload::Other(_)));
        // Best-effort probing still finds the number.
        assert_eq!(payload.entity(), Some(EntityRef { number: 12, is_pr: true }));
    }

    #[test]
    fn test_unknown_event_best_effort() {
        let kind = EventKind::from_name("discussion_comment");
        let payload = EventPayload::from_value(&kind, &json!({ "number": "17" }));
        assert_eq!(payload.entity(), Some(EntityRef { number: 17, is_pr: false }));

        let payload = EventPayload::from_value(&kind, &json!({ "schedule": "* * * * *" }));
        assert_eq!(payload.entity(), None);
    }

    #[test]
    fn test_dispatch_inputs() {
        let raw = json!({ "inputs": { "issue_number": "789", "dry_run": true, "note": null } });
        let payload = EventPayload::from_value(&EventKind::WorkflowDispatch, &raw);
        let dispatch = payload.dispatch().unwrap();
        assert_eq!(dispatch.input("issue_number").as_deref(), Some("789"));
        assert_eq!(dispatch.input("dry_run").as_deref(), Some("true"));
        assert_eq!(dispatch.input("note"), None);
        assert_eq!(dispatch.input("missing"), None);
        assert_eq!(payload.entity(), None);
    }

    #[test]
    fn test_dispatch_without_inputs() {
        let payload = EventPayload::from_value(&EventKind::WorkflowDispatch, &json!({}));
        assert!(payload.dispatch().is_some());
        assert_eq!(payload.dispatch().unwrap().input("prompt"), None);
    }

    #[test]
    fn test_is_truthy() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!({})));
        assert!(is_truthy(&json!(true)));
        assert!(is_truthy(&json!("yes")));
    }

    #[test]
    fn test_as_entity_number() {
        assert_eq!(as_entity_number(&json!(12)), Some(12));
        assert_eq!(as_entity_number(&json!(" 34 ")), Some(34));
        assert_eq!(as_entity_number(&json!(-1)), None);
        assert_eq!(as_entity_number(&json!("abc")), None);
        assert_eq!(as_entity_number(&json!(1.5)), None);
    }
}
