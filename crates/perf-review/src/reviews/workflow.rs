//! Review status transitions and the permissions derived from them.
//!
//! Every transition is described once in [`TRANSITIONS`]. Edit flags, submit
//! and approval checks all consult that table, so the presentation layer and
//! the service share a single answer to "may this actor do this now".

use std::fmt;

use serde::{Deserialize, Serialize};

use super::domain::{Actor, Review, ReviewStatus, Role};
use super::validation::ValidationError;
use crate::config::WorkflowConfig;

/// Status-changing operations a caller can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewAction {
    Submit,
    Complete,
    Approve,
    Reject,
}

impl ReviewAction {
    pub const ALL: [ReviewAction; 4] = [
        ReviewAction::Submit,
        ReviewAction::Complete,
        ReviewAction::Approve,
        ReviewAction::Reject,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            ReviewAction::Submit => "submit",
            ReviewAction::Complete => "complete",
            ReviewAction::Approve => "approve",
            ReviewAction::Reject => "reject",
        }
    }

    /// Status a review lands in once the action is applied.
    pub fn target(self) -> ReviewStatus {
        transition_for(self).to
    }
}

impl fmt::Display for ReviewAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActorRule {
    Reviewer,
    Approver,
}

#[derive(Debug)]
struct Transition {
    action: ReviewAction,
    from: &'static [ReviewStatus],
    to: ReviewStatus,
    actor: ActorRule,
    requires_scores: bool,
}

const TRANSITIONS: &[Transition] = &[
    Transition {
        action: ReviewAction::Submit,
        from: &[ReviewStatus::Draft],
        to: ReviewStatus::Pending,
        actor: ActorRule::Reviewer,
        requires_scores: true,
    },
    Transition {
        action: ReviewAction::Complete,
        from: &[ReviewStatus::Pending],
        to: ReviewStatus::Completed,
        actor: ActorRule::Reviewer,
        requires_scores: true,
    },
    Transition {
        action: ReviewAction::Approve,
        from: &[ReviewStatus::Completed],
        to: ReviewStatus::Approved,
        actor: ActorRule::Approver,
        requires_scores: false,
    },
    Transition {
        action: ReviewAction::Reject,
        from: &[ReviewStatus::Completed],
        to: ReviewStatus::Rejected,
        actor: ActorRule::Approver,
        requires_scores: false,
    },
];

fn transition_for(action: ReviewAction) -> &'static Transition {
    let index = match action {
        ReviewAction::Submit => 0,
        ReviewAction::Complete => 1,
        ReviewAction::Approve => 2,
        ReviewAction::Reject => 3,
    };
    let transition = &TRANSITIONS[index];
    debug_assert_eq!(transition.action, action);
    transition
}

/// Whether the caller is rendering an editable form or a read-only view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditMode {
    #[default]
    Interactive,
    ReadOnly,
}

/// Flags the presentation layer uses to decide which controls to offer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permissions {
    pub can_edit: bool,
    pub can_edit_details: bool,
    pub can_score: bool,
    pub can_submit: bool,
    pub can_complete: bool,
    pub can_approve: bool,
    pub can_reject: bool,
    pub is_reviewer: bool,
}

/// An action was requested that the current status or actor does not allow.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PermissionDenied {
    #[error("cannot {action} a review in {status} status")]
    InvalidStatus {
        action: ReviewAction,
        status: ReviewStatus,
    },
    #[error("only the assigned reviewer may {action} this review")]
    NotReviewer { action: ReviewAction },
    #[error("only an admin or manager may {action} a review (actor is {role})")]
    NotApprover { action: ReviewAction, role: Role },
    #[error("review is not editable in {status} status")]
    ReadOnly { status: ReviewStatus },
    #[error("only the assigned reviewer may score criteria")]
    NotReviewerForScoring,
    #[error("{role} users may not edit review details")]
    DetailsRestricted { role: Role },
    #[error("{role} users may not create reviews")]
    CannotCreate { role: Role },
    #[error("{role} users may not edit templates")]
    TemplateRestricted { role: Role },
}

/// Either half of a refused transition: who/when, or what is still missing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransitionError {
    #[error(transparent)]
    PermissionDenied(#[from] PermissionDenied),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Serializable result of the submission pre-flight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionCheck {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<Result<(), ValidationError>> for SubmissionCheck {
    fn from(result: Result<(), ValidationError>) -> Self {
        match result {
            Ok(()) => Self {
                ok: true,
                message: None,
            },
            Err(error) => Self {
                ok: false,
                message: Some(error.to_string()),
            },
        }
    }
}

/// Pre-flight check run before any submit request leaves the client.
pub fn validate_submission(review: &Review) -> Result<(), ValidationError> {
    if review.employee_id.0.trim().is_empty() {
        return Err(ValidationError::MissingEmployee);
    }
    if review.template_id.0.trim().is_empty() {
        return Err(ValidationError::MissingTemplate);
    }
    if review.title.trim().is_empty() {
        return Err(ValidationError::MissingTitle);
    }
    if review.criteria.is_empty() {
        return Err(ValidationError::NoCriteria);
    }

    let remaining = review
        .criteria
        .iter()
        .filter(|criterion| !criterion.is_complete())
        .count();
    if remaining > 0 {
        return Err(ValidationError::IncompleteCriteria { remaining });
    }

    Ok(())
}

/// Matches on user id, or on display name when the review records one.
pub fn is_reviewer(review: &Review, actor: &Actor) -> bool {
    if review.reviewer_id == actor.user_id {
        return true;
    }

    let display_name = actor.display_name.trim();
    !display_name.is_empty()
        && review
            .reviewer_name
            .as_deref()
            .map(str::trim)
            .is_some_and(|name| name == display_name)
}

/// Authoritative source for review transitions and edit permissions.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkflowGate {
    allow_pending_approval: bool,
}

impl WorkflowGate {
    pub fn new(config: WorkflowConfig) -> Self {
        Self {
            allow_pending_approval: config.allow_pending_approval,
        }
    }

    fn accepts_source(&self, transition: &Transition, status: ReviewStatus) -> bool {
        if transition.from.contains(&status) {
            return true;
        }
        self.allow_pending_approval
            && transition.actor == ActorRule::Approver
            && status == ReviewStatus::Pending
    }

    /// Status and actor checks only; returns the target status when allowed.
    pub fn can_transition(
        &self,
        review: &Review,
        actor: &Actor,
        action: ReviewAction,
    ) -> Result<ReviewStatus, PermissionDenied> {
        let transition = transition_for(action);

        if !self.accepts_source(transition, review.status) {
            return Err(PermissionDenied::InvalidStatus {
                action,
                status: review.status,
            });
        }

        match transition.actor {
            ActorRule::Reviewer if !is_reviewer(review, actor) => {
                Err(PermissionDenied::NotReviewer { action })
            }
            ActorRule::Approver if !actor.role.is_approver() => Err(PermissionDenied::NotApprover {
                action,
                role: actor.role,
            }),
            _ => Ok(transition.to),
        }
    }

    /// Full local gate: permission first, then the completion precondition.
    pub fn check_transition(
        &self,
        review: &Review,
        actor: &Actor,
        action: ReviewAction,
    ) -> Result<ReviewStatus, TransitionError> {
        let target = self.can_transition(review, actor, action)?;
        if transition_for(action).requires_scores {
            validate_submission(review)?;
        }
        Ok(target)
    }

    /// Actions currently legal for this actor, in table order.
    pub fn available_actions(&self, review: &Review, actor: &Actor) -> Vec<ReviewAction> {
        ReviewAction::ALL
            .into_iter()
            .filter(|action| self.check_transition(review, actor, *action).is_ok())
            .collect()
    }

    pub fn permissions_for(&self, review: &Review, actor: &Actor, mode: EditMode) -> Permissions {
        let is_reviewer = is_reviewer(review, actor);
        let interactive = mode == EditMode::Interactive;
        let can_edit = interactive
            && matches!(review.status, ReviewStatus::Draft | ReviewStatus::Pending);
        let can_edit_details = interactive
            && review.status == ReviewStatus::Draft
            && (is_reviewer || actor.role.is_approver());
        let allowed = |action| self.check_transition(review, actor, action).is_ok();

        Permissions {
            can_edit,
            can_edit_details,
            can_score: can_edit && is_reviewer,
            can_submit: allowed(ReviewAction::Submit),
            can_complete: allowed(ReviewAction::Complete),
            can_approve: allowed(ReviewAction::Approve),
            can_reject: allowed(ReviewAction::Reject),
            is_reviewer,
        }
    }

    /// Guard for criterion score/comment and overall-comment edits.
    pub fn authorize_scoring(&self, review: &Review, actor: &Actor) -> Result<(), PermissionDenied> {
        let permissions = self.permissions_for(review, actor, EditMode::Interactive);
        if !permissions.can_edit {
            return Err(PermissionDenied::ReadOnly {
                status: review.status,
            });
        }
        if !permissions.can_score {
            return Err(PermissionDenied::NotReviewerForScoring);
        }
        Ok(())
    }

    /// Guard for title/description/period edits, which only drafts allow.
    pub fn authorize_details(&self, review: &Review, actor: &Actor) -> Result<(), PermissionDenied> {
        if review.status != ReviewStatus::Draft {
            return Err(PermissionDenied::ReadOnly {
                status: review.status,
            });
        }
        if !is_reviewer(review, actor) && !actor.role.is_approver() {
            return Err(PermissionDenied::DetailsRestricted { role: actor.role });
        }
        Ok(())
    }

    pub fn authorize_creation(&self, actor: &Actor) -> Result<(), PermissionDenied> {
        if actor.role.is_approver() {
            Ok(())
        } else {
            Err(PermissionDenied::CannotCreate { role: actor.role })
        }
    }

    pub fn authorize_template_edit(&self, actor: &Actor) -> Result<(), PermissionDenied> {
        if actor.role.is_approver() {
            Ok(())
        } else {
            Err(PermissionDenied::TemplateRestricted { role: actor.role })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_action_has_exactly_one_transition() {
        for action in ReviewAction::ALL {
            let matches = TRANSITIONS
                .iter()
                .filter(|transition| transition.action == action)
                .count();
            assert_eq!(matches, 1, "{action} should appear once");
            assert_eq!(transition_for(action).action, action);
        }
    }

    #[test]
    fn action_targets_follow_lifecycle() {
        assert_eq!(ReviewAction::Submit.target(), ReviewStatus::Pending);
        assert_eq!(ReviewAction::Complete.target(), ReviewStatus::Completed);
        assert_eq!(ReviewAction::Approve.target(), ReviewStatus::Approved);
        assert_eq!(ReviewAction::Reject.target(), ReviewStatus::Rejected);
    }

    #[test]
    fn terminal_states_have_no_outgoing_transitions() {
        for transition in TRANSITIONS {
            assert!(transition.from.iter().all(|status| !status.is_terminal()));
        }
    }

    #[test]
    fn submission_check_reports_message() {
        let failed: SubmissionCheck =
            Err(ValidationError::IncompleteCriteria { remaining: 2 }).into();
        assert!(!failed.ok);
        assert_eq!(
            failed.message.as_deref(),
            Some("please score all criteria before submitting (2 remaining)")
        );

        let passed: SubmissionCheck = Ok(()).into();
        assert!(passed.ok);
        assert!(passed.message.is_none());
    }
}
