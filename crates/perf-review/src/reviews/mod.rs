//! Performance review engine: criteria model, score calculator, and workflow gate,
//! plus the service, stores, and HTTP router that sit around them.

pub mod domain;
pub mod import;
pub mod memory;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;
pub mod validation;
pub mod workflow;

#[cfg(test)]
mod tests;

pub use domain::{
    Actor, Criterion, CriterionDefinition, CriterionId, CriterionUpdate, EmployeeId, NewReview,
    Review, ReviewDetailsUpdate, ReviewId, ReviewPeriod, ReviewStatus, Role, Score, Template,
    TemplateId, UserId,
};
pub use import::{TemplateImportError, TemplateImporter};
pub use memory::{InMemoryReviewStore, InMemoryTemplateStore};
pub use repository::{RepositoryError, ReviewRepository, TemplateRepository};
pub use router::{actor_from_headers, review_router, IdentityError};
pub use scoring::{
    alert_band, completion, grade_band, grade_for, overall_score, AlertBand, Completion, Grade,
    GradeBand,
};
pub use service::{ReviewService, ReviewServiceError, ReviewSummary};
pub use validation::{validate_new_review, validate_template, ValidationError};
pub use workflow::{
    is_reviewer, validate_submission, EditMode, PermissionDenied, Permissions, ReviewAction,
    SubmissionCheck, TransitionError, WorkflowGate,
};
