use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use super::domain::{
    Actor, Criterion, CriterionId, CriterionUpdate, NewReview, Review, ReviewDetailsUpdate,
    ReviewId, ReviewPeriod, ReviewStatus, Template, TemplateId,
};
use super::repository::{RepositoryError, ReviewRepository, TemplateRepository};
use super::scoring::{self, AlertBand, Completion, Grade};
use super::validation::{self, ValidationError};
use super::workflow::{
    self, EditMode, PermissionDenied, Permissions, ReviewAction, SubmissionCheck,
    TransitionError, WorkflowGate,
};
use crate::config::WorkflowConfig;

static REVIEW_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static TEMPLATE_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_review_id() -> ReviewId {
    let id = REVIEW_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ReviewId(format!("rev-{id:06}"))
}

fn next_template_id() -> TemplateId {
    let id = TEMPLATE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    TemplateId(format!("tpl-{id:06}"))
}

/// Scoring and permission snapshot handed to the presentation layer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSummary {
    pub review: Review,
    pub overall_score: f64,
    pub completion: Completion,
    pub grade: Grade,
    pub alert: AlertBand,
    pub permissions: Permissions,
    pub available_actions: Vec<ReviewAction>,
}

/// Service composing the workflow gate with the review and template stores.
///
/// Local validation and permission checks always run before a store call, so a
/// refused request never reaches the backend.
pub struct ReviewService<R, T> {
    reviews: Arc<R>,
    templates: Arc<T>,
    gate: WorkflowGate,
}

impl<R, T> ReviewService<R, T>
where
    R: ReviewRepository + 'static,
    T: TemplateRepository + 'static,
{
    pub fn new(reviews: Arc<R>, templates: Arc<T>, config: WorkflowConfig) -> Self {
        Self {
            reviews,
            templates,
            gate: WorkflowGate::new(config),
        }
    }

    pub fn gate(&self) -> &WorkflowGate {
        &self.gate
    }

    /// Create a draft review whose criteria are copied from the chosen template.
    pub fn create_review(
        &self,
        form: NewReview,
        actor: &Actor,
    ) -> Result<Review, ReviewServiceError> {
        self.gate.authorize_creation(actor)?;
        validation::validate_new_review(&form)?;
        let period = ReviewPeriod::new(form.period_start, form.period_end)?;

        let template = self
            .templates
            .fetch(&form.template_id)?
            .ok_or(RepositoryError::NotFound)?;
        if !template.active {
            return Err(ValidationError::InactiveTemplate(form.template_id).into());
        }

        let id = next_review_id();
        let criteria = template
            .ordered_criteria()
            .into_iter()
            .enumerate()
            .map(|(index, definition)| {
                let criterion_id = CriterionId(format!("{}-c{:02}", id.0, index + 1));
                Criterion::from_definition(criterion_id, definition)
            })
            .collect();

        let review = Review {
            id,
            employee_id: form.employee_id,
            reviewer_id: form.reviewer_id,
            reviewer_name: form.reviewer_name,
            template_id: form.template_id,
            title: form.title.trim().to_string(),
            description: form.description,
            period,
            status: ReviewStatus::Draft,
            overall_comments: String::new(),
            overall_score: 0.0,
            criteria,
        };

        let stored = self.reviews.insert(review)?;
        info!(
            review_id = %stored.id,
            template_id = %stored.template_id,
            criteria = stored.criteria.len(),
            "review created"
        );
        Ok(stored)
    }

    pub fn get(&self, id: &ReviewId) -> Result<Review, ReviewServiceError> {
        let review = self.reviews.fetch(id)?.ok_or(RepositoryError::NotFound)?;
        Ok(review)
    }

    pub fn summary(
        &self,
        id: &ReviewId,
        actor: &Actor,
        mode: EditMode,
    ) -> Result<ReviewSummary, ReviewServiceError> {
        let review = self.get(id)?;
        Ok(ReviewSummary::new(&self.gate, review, actor, mode))
    }

    pub fn update_details(
        &self,
        id: &ReviewId,
        update: ReviewDetailsUpdate,
        actor: &Actor,
    ) -> Result<Review, ReviewServiceError> {
        let mut review = self.get(id)?;
        self.gate.authorize_details(&review, actor)?;

        if let Some(title) = update.title {
            let title = title.trim();
            if title.is_empty() {
                return Err(ValidationError::MissingTitle.into());
            }
            review.title = title.to_string();
        }
        if let Some(description) = update.description {
            review.description = description;
        }
        if update.period_start.is_some() || update.period_end.is_some() {
            let start = update.period_start.unwrap_or(review.period.start());
            let end = update.period_end.unwrap_or(review.period.end());
            review.period = ReviewPeriod::new(start, end)?;
        }

        Ok(self.reviews.update(review)?)
    }

    /// Apply a reviewer's score and/or comments to one criterion.
    pub fn score_criterion(
        &self,
        id: &ReviewId,
        criterion_id: &CriterionId,
        update: CriterionUpdate,
        actor: &Actor,
    ) -> Result<Review, ReviewServiceError> {
        let mut review = self.get(id)?;
        self.gate.authorize_scoring(&review, actor)?;

        let criterion = review
            .criterion_mut(criterion_id)
            .ok_or_else(|| ValidationError::UnknownCriterion(criterion_id.clone()))?;
        if let Some(score) = update.score {
            criterion.set_score(score)?;
        }
        if let Some(comments) = update.comments {
            criterion.set_comments(comments);
        }

        review.refresh_overall_score();
        Ok(self.reviews.update(review)?)
    }

    pub fn set_overall_comments(
        &self,
        id: &ReviewId,
        comments: impl Into<String>,
        actor: &Actor,
    ) -> Result<Review, ReviewServiceError> {
        let mut review = self.get(id)?;
        self.gate.authorize_scoring(&review, actor)?;
        review.overall_comments = comments.into();
        Ok(self.reviews.update(review)?)
    }

    pub fn submission_check(&self, id: &ReviewId) -> Result<SubmissionCheck, ReviewServiceError> {
        let review = self.get(id)?;
        Ok(workflow::validate_submission(&review).into())
    }

    /// Gate the action locally, then issue exactly one transition request.
    pub fn transition(
        &self,
        id: &ReviewId,
        action: ReviewAction,
        actor: &Actor,
    ) -> Result<Review, ReviewServiceError> {
        let review = self.get(id)?;

        if let Err(error) = self.gate.check_transition(&review, actor, action) {
            warn!(
                review_id = %review.id,
                %action,
                status = %review.status,
                user_id = %actor.user_id.0,
                %error,
                "transition refused locally"
            );
            return Err(error.into());
        }

        let updated = match self.reviews.transition(id, action) {
            Ok(updated) => updated,
            Err(error) => {
                warn!(review_id = %review.id, %action, %error, "backend rejected transition");
                return Err(error.into());
            }
        };

        info!(
            review_id = %updated.id,
            %action,
            from = %review.status,
            to = %updated.status,
            overall_score = updated.overall_score,
            "review transitioned"
        );
        Ok(updated)
    }

    pub fn template(&self, id: &TemplateId) -> Result<Template, ReviewServiceError> {
        let template = self.templates.fetch(id)?.ok_or(RepositoryError::NotFound)?;
        Ok(template)
    }

    pub fn active_templates(&self) -> Result<Vec<Template>, ReviewServiceError> {
        Ok(self.templates.list_active()?)
    }

    /// Validate and persist a template. New templates receive an id here.
    pub fn save_template(
        &self,
        mut template: Template,
        actor: &Actor,
    ) -> Result<Template, ReviewServiceError> {
        self.gate.authorize_template_edit(actor)?;
        if let Err(error) = validation::validate_template(&template) {
            warn!(name = %template.name, %error, "template refused");
            return Err(error.into());
        }

        let saved = match template.id {
            Some(_) => self.templates.update(template)?,
            None => {
                template.id = Some(next_template_id());
                self.templates.insert(template)?
            }
        };

        info!(
            template_id = ?saved.id,
            criteria = saved.criteria.len(),
            "template saved"
        );
        Ok(saved)
    }
}

impl ReviewSummary {
    /// Derives scores, grade and permissions for one actor from a review snapshot.
    pub fn new(gate: &WorkflowGate, review: Review, actor: &Actor, mode: EditMode) -> Self {
        let overall_score = scoring::overall_score(&review.criteria);
        let completion = scoring::completion(&review.criteria);
        let permissions = gate.permissions_for(&review, actor, mode);
        let available_actions = gate.available_actions(&review, actor);

        Self {
            overall_score,
            completion,
            grade: scoring::grade_for(overall_score),
            alert: scoring::alert_band(overall_score),
            permissions,
            available_actions,
            review,
        }
    }
}

/// Error raised by the review service, mirroring where the failure happened.
#[derive(Debug, thiserror::Error)]
pub enum ReviewServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    PermissionDenied(#[from] PermissionDenied),
    #[error(transparent)]
    BackendRejected(#[from] RepositoryError),
}

impl From<TransitionError> for ReviewServiceError {
    fn from(error: TransitionError) -> Self {
        match error {
            TransitionError::PermissionDenied(denied) => Self::PermissionDenied(denied),
            TransitionError::Validation(invalid) => Self::Validation(invalid),
        }
    }
}
