use super::common::*;

use crate::config::WorkflowConfig;
use crate::reviews::domain::{Actor, ReviewStatus, Role};
use crate::reviews::validation::ValidationError;
use crate::reviews::workflow::{
    is_reviewer, validate_submission, EditMode, PermissionDenied, ReviewAction, TransitionError,
    WorkflowGate,
};

fn gate() -> WorkflowGate {
    WorkflowGate::default()
}

#[test]
fn draft_with_unscored_criterion_cannot_be_submitted() {
    let review = scored(draft_review(), &[4.0]);
    let permissions = gate().permissions_for(&review, &reviewer(), EditMode::Interactive);

    assert!(permissions.can_edit);
    assert!(permissions.is_reviewer);
    assert!(!permissions.can_submit);
}

#[test]
fn fully_scored_draft_is_submittable_only_by_the_reviewer() {
    let review = scored(draft_review(), &[4.0, 2.0]);

    let as_reviewer = gate().permissions_for(&review, &reviewer(), EditMode::Interactive);
    assert!(as_reviewer.can_submit);

    let as_manager = gate().permissions_for(&review, &manager(), EditMode::Interactive);
    assert!(!as_manager.can_submit);
    assert!(!as_manager.is_reviewer);
    assert!(!as_manager.can_score);
    assert!(as_manager.can_edit);
}

#[test]
fn approved_reviews_are_read_only_for_every_role() {
    let review = with_status(scored(draft_review(), &[4.0, 2.0]), ReviewStatus::Approved);

    for actor in [reviewer(), manager(), admin(), employee()] {
        let permissions = gate().permissions_for(&review, &actor, EditMode::Interactive);
        assert!(!permissions.can_edit, "{} should not edit", actor.role);
        assert!(!permissions.can_score);
        assert!(!permissions.can_approve);
        assert!(!permissions.can_reject);
    }
}

#[test]
fn read_only_mode_only_clears_edit_flags() {
    let review = scored(draft_review(), &[4.0, 2.0]);
    let permissions = gate().permissions_for(&review, &reviewer(), EditMode::ReadOnly);

    assert!(!permissions.can_edit);
    assert!(!permissions.can_edit_details);
    assert!(!permissions.can_score);
    assert!(permissions.can_submit);
}

#[test]
fn approval_requires_completed_status_and_approver_role() {
    let pending = with_status(scored(draft_review(), &[4.0, 2.0]), ReviewStatus::Pending);
    let completed = with_status(pending.clone(), ReviewStatus::Completed);

    assert_eq!(
        gate().can_transition(&pending, &manager(), ReviewAction::Approve),
        Err(PermissionDenied::InvalidStatus {
            action: ReviewAction::Approve,
            status: ReviewStatus::Pending,
        })
    );
    assert_eq!(
        gate().can_transition(&completed, &manager(), ReviewAction::Approve),
        Ok(ReviewStatus::Approved)
    );
    assert_eq!(
        gate().can_transition(&completed, &admin(), ReviewAction::Reject),
        Ok(ReviewStatus::Rejected)
    );
    assert_eq!(
        gate().can_transition(&completed, &employee(), ReviewAction::Approve),
        Err(PermissionDenied::NotApprover {
            action: ReviewAction::Approve,
            role: Role::Employee,
        })
    );

    let permissions = gate().permissions_for(&completed, &manager(), EditMode::Interactive);
    assert!(permissions.can_approve);
    assert!(permissions.can_reject);
    assert!(!permissions.can_edit);
}

#[test]
fn pending_approval_flag_widens_source_status() {
    let lenient = WorkflowGate::new(WorkflowConfig {
        allow_pending_approval: true,
    });
    let pending = with_status(scored(draft_review(), &[4.0, 2.0]), ReviewStatus::Pending);

    assert_eq!(
        lenient.can_transition(&pending, &manager(), ReviewAction::Approve),
        Ok(ReviewStatus::Approved)
    );
    assert!(lenient
        .can_transition(&pending, &reviewer(), ReviewAction::Approve)
        .is_err());

    let draft = scored(draft_review(), &[4.0, 2.0]);
    assert!(lenient
        .can_transition(&draft, &manager(), ReviewAction::Approve)
        .is_err());
}

#[test]
fn complete_moves_pending_to_completed_for_the_reviewer() {
    let pending = with_status(scored(draft_review(), &[4.0, 2.0]), ReviewStatus::Pending);

    assert_eq!(
        gate().check_transition(&pending, &reviewer(), ReviewAction::Complete),
        Ok(ReviewStatus::Completed)
    );
    assert_eq!(
        gate().available_actions(&pending, &reviewer()),
        vec![ReviewAction::Complete]
    );
    assert!(gate().available_actions(&pending, &manager()).is_empty());
}

#[test]
fn submit_reports_remaining_criteria() {
    let review = draft_review();
    let error = gate()
        .check_transition(&review, &reviewer(), ReviewAction::Submit)
        .expect_err("unscored review cannot be submitted");

    assert_eq!(
        error,
        TransitionError::Validation(ValidationError::IncompleteCriteria { remaining: 2 })
    );
    assert!(error.to_string().contains("2 remaining"));
}

#[test]
fn permission_is_checked_before_completion() {
    let review = draft_review();
    let error = gate()
        .check_transition(&review, &manager(), ReviewAction::Submit)
        .expect_err("manager is not the reviewer");

    assert!(matches!(
        error,
        TransitionError::PermissionDenied(PermissionDenied::NotReviewer { .. })
    ));
}

#[test]
fn terminal_statuses_offer_no_actions() {
    for status in [ReviewStatus::Approved, ReviewStatus::Rejected] {
        let review = with_status(scored(draft_review(), &[5.0, 5.0]), status);
        for actor in [reviewer(), manager(), admin()] {
            assert!(gate().available_actions(&review, &actor).is_empty());
        }
    }
}

#[test]
fn review_without_criteria_is_not_submittable() {
    let mut review = draft_review();
    review.criteria.clear();

    assert_eq!(validate_submission(&review), Err(ValidationError::NoCriteria));
    let permissions = gate().permissions_for(&review, &reviewer(), EditMode::Interactive);
    assert!(!permissions.can_submit);
}

#[test]
fn reviewer_matches_on_display_name() {
    let review = draft_review();
    let same_name = Actor {
        user_id: unused_user(),
        display_name: " Riley Chen ".to_string(),
        role: Role::Employee,
    };
    let anonymous = Actor {
        user_id: unused_user(),
        display_name: String::new(),
        role: Role::Employee,
    };

    assert!(is_reviewer(&review, &same_name));
    assert!(!is_reviewer(&review, &anonymous));
}

#[test]
fn details_are_restricted_to_drafts() {
    let draft = draft_review();
    assert!(gate().authorize_details(&draft, &reviewer()).is_ok());
    assert!(gate().authorize_details(&draft, &manager()).is_ok());
    assert_eq!(
        gate().authorize_details(&draft, &employee()),
        Err(PermissionDenied::DetailsRestricted {
            role: Role::Employee
        })
    );

    let pending = with_status(draft, ReviewStatus::Pending);
    assert_eq!(
        gate().authorize_details(&pending, &reviewer()),
        Err(PermissionDenied::ReadOnly {
            status: ReviewStatus::Pending
        })
    );
}
