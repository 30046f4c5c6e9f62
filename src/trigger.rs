//! Decide whether the assistant was actually asked to act on this event.

use regex::Regex;

use crate::context::GitHubContext;
use crate::event::EventPayload;

/// True when `text` mentions `phrase` as a standalone word: preceded by the
/// start of text or whitespace, followed by whitespace, `.,!?;:` or the end.
pub fn contains_trigger_phrase(text: &str, phrase: &str) -> bool {
    if phrase.is_empty() {
        return false;
    }
    let pattern = format!(r"(^|\s){}([\s.,!?;:]|$)", regex::escape(phrase));
    match Regex::new(&pattern) {
        Ok(re) => re.is_match(text),
        Err(e) => {
            tracing::warn!(error = %e, phrase, "Could not build trigger phrase pattern");
            false
        }
    }
}

fn mentions(text: Option<&str>, phrase: &str) -> bool {
    text.is_some_and(|t| contains_trigger_phrase(t, phrase))
}

/// Whether this event should start the assistant.
pub fn check_contains_trigger(ctx: &GitHubContext) -> bool {
    let inputs = &ctx.inputs;
    let phrase = inputs.trigger_phrase.as_str();

    if !inputs.direct_prompt.is_empty() {
        tracing::info!("Direct prompt provided, triggering");
        return true;
    }

    let triggered = match &ctx.payload {
        EventPayload::Issues(event) => match event.action.as_deref() {
            Some("assigned") => {
                let wanted = inputs.assignee_trigger.trim_start_matches('@');
                let assignee = event.assignee.as_ref().map_or("", |u| u.login.as_str());
                !wanted.is_empty() && assignee == wanted
            }
            Some("labeled") => {
                let label = event.label.as_ref().map_or("", |l| l.name.as_str());
                !inputs.label_trigger.is_empty() && label == inputs.label_trigger
            }
            Some("opened") => {
                mentions(event.issue.body.as_deref(), phrase)
                    || mentions(event.issue.title.as_deref(), phrase)
            }
            _ => false,
        },
        EventPayload::PullRequest(event) => {
            mentions(event.pull_request.body.as_deref(), phrase)
                || mentions(event.pull_request.title.as_deref(), phrase)
        }
        EventPayload::PullRequestReview(event) => {
            matches!(event.action.as_deref(), Some("submitted") | Some("edited"))
                && mentions(event.review.body.as_deref(), phrase)
        }
        EventPayload::IssueComment(event) => mentions(event.comment.body.as_deref(), phrase),
        EventPayload::PullRequestReviewComment(event) => {
            mentions(event.comment.body.as_deref(), phrase)
        }
        EventPayload::WorkflowDispatch(_) | EventPayload::Other(_) => false,
    };

    tracing::info!(
        event = %ctx.event_kind,
        action = ctx.event_action.as_deref().unwrap_or(""),
        triggered,
        "Checked for trigger"
    );
    triggered
}
