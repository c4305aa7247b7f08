use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{
    Actor, CriterionId, CriterionUpdate, NewReview, Review, ReviewDetailsUpdate, ReviewId, Role,
    Template, TemplateId, UnknownRole, UserId,
};
use super::repository::{RepositoryError, ReviewRepository, TemplateRepository};
use super::service::{ReviewService, ReviewServiceError, ReviewSummary};
use super::workflow::{EditMode, ReviewAction};

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_NAME_HEADER: &str = "x-user-name";
pub const USER_ROLE_HEADER: &str = "x-user-role";

type SharedService<R, T> = Arc<ReviewService<R, T>>;

/// Router builder exposing review and template endpoints.
pub fn review_router<R, T>(service: SharedService<R, T>) -> Router
where
    R: ReviewRepository + 'static,
    T: TemplateRepository + 'static,
{
    Router::new()
        .route("/api/v1/reviews", post(create_handler::<R, T>))
        .route(
            "/api/v1/reviews/:review_id",
            get(summary_handler::<R, T>).put(details_handler::<R, T>),
        )
        .route(
            "/api/v1/reviews/:review_id/criteria/:criterion_id",
            put(criterion_handler::<R, T>),
        )
        .route(
            "/api/v1/reviews/:review_id/comments",
            put(comments_handler::<R, T>),
        )
        .route(
            "/api/v1/reviews/:review_id/submission-check",
            get(submission_check_handler::<R, T>),
        )
        .route(
            "/api/v1/reviews/:review_id/transitions/:action",
            post(transition_handler::<R, T>),
        )
        .route(
            "/api/v1/templates",
            get(templates_handler::<R, T>).post(save_template_handler::<R, T>),
        )
        .route(
            "/api/v1/templates/:template_id",
            get(template_handler::<R, T>),
        )
        .with_state(service)
}

/// Identity headers were missing or malformed.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("missing {0} header")]
    Missing(&'static str),
    #[error(transparent)]
    InvalidRole(#[from] UnknownRole),
}

/// The session layer forwards identity as headers; nothing is verified here.
pub fn actor_from_headers(headers: &HeaderMap) -> Result<Actor, IdentityError> {
    let read = |name: &'static str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    };

    let user_id = read(USER_ID_HEADER).ok_or(IdentityError::Missing(USER_ID_HEADER))?;
    let role: Role = read(USER_ROLE_HEADER)
        .ok_or(IdentityError::Missing(USER_ROLE_HEADER))?
        .parse()?;
    let display_name = read(USER_NAME_HEADER).unwrap_or_default();

    Ok(Actor {
        user_id: UserId(user_id.to_string()),
        display_name: display_name.to_string(),
        role,
    })
}

fn identity_response(error: IdentityError) -> Response {
    let payload = json!({ "error": error.to_string() });
    (StatusCode::UNAUTHORIZED, Json(payload)).into_response()
}

pub(crate) fn error_response(error: ReviewServiceError) -> Response {
    let status = match &error {
        ReviewServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ReviewServiceError::PermissionDenied(_) => StatusCode::FORBIDDEN,
        ReviewServiceError::BackendRejected(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        ReviewServiceError::BackendRejected(
            RepositoryError::Conflict | RepositoryError::Rejected(_),
        ) => StatusCode::CONFLICT,
        ReviewServiceError::BackendRejected(RepositoryError::Unavailable(_)) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
    };

    let payload = json!({ "error": error.to_string() });
    (status, Json(payload)).into_response()
}

fn summary_response<R, T>(
    service: &ReviewService<R, T>,
    status: StatusCode,
    review: Review,
    actor: &Actor,
) -> Response
where
    R: ReviewRepository + 'static,
    T: TemplateRepository + 'static,
{
    let summary = ReviewSummary::new(service.gate(), review, actor, EditMode::Interactive);
    (status, Json(summary)).into_response()
}

pub(crate) async fn create_handler<R, T>(
    State(service): State<SharedService<R, T>>,
    headers: HeaderMap,
    Json(form): Json<NewReview>,
) -> Response
where
    R: ReviewRepository + 'static,
    T: TemplateRepository + 'static,
{
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(error) => return identity_response(error),
    };

    match service.create_review(form, &actor) {
        Ok(review) => summary_response(&service, StatusCode::CREATED, review, &actor),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn summary_handler<R, T>(
    State(service): State<SharedService<R, T>>,
    headers: HeaderMap,
    Path(review_id): Path<String>,
) -> Response
where
    R: ReviewRepository + 'static,
    T: TemplateRepository + 'static,
{
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(error) => return identity_response(error),
    };

    match service.summary(&ReviewId(review_id), &actor, EditMode::Interactive) {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn details_handler<R, T>(
    State(service): State<SharedService<R, T>>,
    headers: HeaderMap,
    Path(review_id): Path<String>,
    Json(update): Json<ReviewDetailsUpdate>,
) -> Response
where
    R: ReviewRepository + 'static,
    T: TemplateRepository + 'static,
{
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(error) => return identity_response(error),
    };

    match service.update_details(&ReviewId(review_id), update, &actor) {
        Ok(review) => summary_response(&service, StatusCode::OK, review, &actor),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn criterion_handler<R, T>(
    State(service): State<SharedService<R, T>>,
    headers: HeaderMap,
    Path((review_id, criterion_id)): Path<(String, String)>,
    Json(update): Json<CriterionUpdate>,
) -> Response
where
    R: ReviewRepository + 'static,
    T: TemplateRepository + 'static,
{
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(error) => return identity_response(error),
    };

    let result = service.score_criterion(
        &ReviewId(review_id),
        &CriterionId(criterion_id),
        update,
        &actor,
    );
    match result {
        Ok(review) => summary_response(&service, StatusCode::OK, review, &actor),
        Err(error) => error_response(error),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OverallCommentsUpdate {
    pub(crate) overall_comments: String,
}

pub(crate) async fn comments_handler<R, T>(
    State(service): State<SharedService<R, T>>,
    headers: HeaderMap,
    Path(review_id): Path<String>,
    Json(update): Json<OverallCommentsUpdate>,
) -> Response
where
    R: ReviewRepository + 'static,
    T: TemplateRepository + 'static,
{
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(error) => return identity_response(error),
    };

    match service.set_overall_comments(&ReviewId(review_id), update.overall_comments, &actor) {
        Ok(review) => summary_response(&service, StatusCode::OK, review, &actor),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn submission_check_handler<R, T>(
    State(service): State<SharedService<R, T>>,
    Path(review_id): Path<String>,
) -> Response
where
    R: ReviewRepository + 'static,
    T: TemplateRepository + 'static,
{
    match service.submission_check(&ReviewId(review_id)) {
        Ok(check) => (StatusCode::OK, Json(check)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn transition_handler<R, T>(
    State(service): State<SharedService<R, T>>,
    headers: HeaderMap,
    Path((review_id, action)): Path<(String, ReviewAction)>,
) -> Response
where
    R: ReviewRepository + 'static,
    T: TemplateRepository + 'static,
{
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(error) => return identity_response(error),
    };

    match service.transition(&ReviewId(review_id), action, &actor) {
        Ok(review) => summary_response(&service, StatusCode::OK, review, &actor),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn templates_handler<R, T>(
    State(service): State<SharedService<R, T>>,
) -> Response
where
    R: ReviewRepository + 'static,
    T: TemplateRepository + 'static,
{
    match service.active_templates() {
        Ok(templates) => (StatusCode::OK, Json(templates)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn template_handler<R, T>(
    State(service): State<SharedService<R, T>>,
    Path(template_id): Path<String>,
) -> Response
where
    R: ReviewRepository + 'static,
    T: TemplateRepository + 'static,
{
    match service.template(&TemplateId(template_id)) {
        Ok(template) => (StatusCode::OK, Json(template)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn save_template_handler<R, T>(
    State(service): State<SharedService<R, T>>,
    headers: HeaderMap,
    Json(template): Json<Template>,
) -> Response
where
    R: ReviewRepository + 'static,
    T: TemplateRepository + 'static,
{
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(error) => return identity_response(error),
    };

    let status = if template.id.is_some() {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    match service.save_template(template, &actor) {
        Ok(saved) => (status, Json(saved)).into_response(),
        Err(error) => error_response(error),
    }
}
