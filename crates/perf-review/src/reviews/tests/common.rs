use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::config::WorkflowConfig;
use crate::reviews::domain::{
    Actor, Criterion, CriterionDefinition, CriterionId, CriterionUpdate, EmployeeId, NewReview,
    Review, ReviewId, ReviewPeriod, ReviewStatus, Role, Template, TemplateId, UserId,
};
use crate::reviews::memory::{InMemoryReviewStore, InMemoryTemplateStore};
use crate::reviews::repository::{RepositoryError, ReviewRepository};
use crate::reviews::service::ReviewService;
use crate::reviews::workflow::ReviewAction;

pub(super) const TEMPLATE_ID: &str = "tpl-engineering";

pub(super) fn reviewer() -> Actor {
    Actor::new("u-riley", "Riley Chen", Role::Employee)
}

pub(super) fn manager() -> Actor {
    Actor::new("u-morgan", "Morgan Diaz", Role::Manager)
}

pub(super) fn admin() -> Actor {
    Actor::new("u-admin", "Avery Admin", Role::Admin)
}

pub(super) fn employee() -> Actor {
    Actor::new("u-sam", "Sam Patel", Role::Employee)
}

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn template() -> Template {
    Template {
        id: Some(TemplateId(TEMPLATE_ID.to_string())),
        name: "Engineering annual".to_string(),
        description: "Yearly review for engineers".to_string(),
        kind: "annual".to_string(),
        active: true,
        criteria: vec![
            CriterionDefinition {
                name: "Delivery".to_string(),
                description: Some("Ships what was committed".to_string()),
                weight: 60.0,
                sort_order: 1,
            },
            CriterionDefinition {
                name: "Teamwork".to_string(),
                description: None,
                weight: 40.0,
                sort_order: 2,
            },
        ],
    }
}

pub(super) fn weighted_template(weights: &[f64]) -> Template {
    Template {
        id: None,
        name: "Support quarterly".to_string(),
        description: String::new(),
        kind: "quarterly".to_string(),
        active: true,
        criteria: weights
            .iter()
            .enumerate()
            .map(|(index, weight)| CriterionDefinition {
                name: format!("Criterion {}", index + 1),
                description: None,
                weight: *weight,
                sort_order: index as u32,
            })
            .collect(),
    }
}

pub(super) fn new_review_form() -> NewReview {
    NewReview {
        employee_id: EmployeeId("emp-042".to_string()),
        reviewer_id: reviewer().user_id,
        reviewer_name: Some(reviewer().display_name),
        template_id: TemplateId(TEMPLATE_ID.to_string()),
        title: "2025 annual review".to_string(),
        description: String::new(),
        period_start: date(2025, 1, 1),
        period_end: date(2025, 12, 31),
    }
}

/// Detached review with two unscored criteria, used by the pure gate tests.
pub(super) fn draft_review() -> Review {
    Review {
        id: ReviewId("rev-test".to_string()),
        employee_id: EmployeeId("emp-042".to_string()),
        reviewer_id: reviewer().user_id,
        reviewer_name: Some(reviewer().display_name),
        template_id: TemplateId(TEMPLATE_ID.to_string()),
        title: "2025 annual review".to_string(),
        description: String::new(),
        period: ReviewPeriod::new(date(2025, 1, 1), date(2025, 12, 31)).expect("valid period"),
        status: ReviewStatus::Draft,
        overall_comments: String::new(),
        overall_score: 0.0,
        criteria: vec![
            Criterion::new(CriterionId("rev-test-c01".to_string()), "Delivery", 60.0)
                .expect("valid criterion"),
            Criterion::new(CriterionId("rev-test-c02".to_string()), "Teamwork", 40.0)
                .expect("valid criterion"),
        ],
    }
}

pub(super) fn scored(mut review: Review, scores: &[f64]) -> Review {
    for (criterion, score) in review.criteria.iter_mut().zip(scores) {
        criterion.set_score(*score).expect("score in range");
    }
    review.refresh_overall_score();
    review
}

pub(super) fn with_status(mut review: Review, status: ReviewStatus) -> Review {
    review.status = status;
    review
}

pub(super) type MemoryService = ReviewService<InMemoryReviewStore, InMemoryTemplateStore>;

pub(super) fn build_service(config: WorkflowConfig) -> (MemoryService, Arc<InMemoryReviewStore>) {
    let reviews = Arc::new(InMemoryReviewStore::default());
    let templates = Arc::new(InMemoryTemplateStore::with_templates([template()]));
    let service = ReviewService::new(reviews.clone(), templates, config);
    (service, reviews)
}

pub(super) fn create_draft(service: &MemoryService) -> Review {
    service
        .create_review(new_review_form(), &admin())
        .expect("review created")
}

pub(super) fn score_all(service: &MemoryService, review: &Review, scores: &[f64]) -> Review {
    let mut latest = review.clone();
    for (criterion, score) in review.criteria.iter().zip(scores) {
        latest = service
            .score_criterion(
                &review.id,
                &criterion.id,
                CriterionUpdate {
                    score: Some(*score),
                    comments: None,
                },
                &reviewer(),
            )
            .expect("reviewer may score");
    }
    latest
}

/// Store that accepts reads and writes but refuses every transition.
#[derive(Default, Clone)]
pub(super) struct RefusingStore {
    inner: InMemoryReviewStore,
    pub(super) attempts: Arc<Mutex<Vec<ReviewAction>>>,
}

impl RefusingStore {
    pub(super) fn attempts(&self) -> Vec<ReviewAction> {
        self.attempts.lock().expect("attempt mutex poisoned").clone()
    }
}

impl ReviewRepository for RefusingStore {
    fn fetch(&self, id: &ReviewId) -> Result<Option<Review>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn insert(&self, review: Review) -> Result<Review, RepositoryError> {
        self.inner.insert(review)
    }

    fn update(&self, review: Review) -> Result<Review, RepositoryError> {
        self.inner.update(review)
    }

    fn transition(&self, _id: &ReviewId, action: ReviewAction) -> Result<Review, RepositoryError> {
        self.attempts
            .lock()
            .expect("attempt mutex poisoned")
            .push(action);
        Err(RepositoryError::Rejected(
            "review was modified by another user".to_string(),
        ))
    }
}

pub(super) struct UnavailableStore;

impl ReviewRepository for UnavailableStore {
    fn fetch(&self, _id: &ReviewId) -> Result<Option<Review>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn insert(&self, _review: Review) -> Result<Review, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _review: Review) -> Result<Review, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn transition(&self, _id: &ReviewId, _action: ReviewAction) -> Result<Review, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn unused_user() -> UserId {
    UserId("u-nobody".to_string())
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
