use super::domain::{Review, ReviewId, Template, TemplateId};
use super::workflow::ReviewAction;

/// Backend store for reviews. The backend owns persistence and has the final
/// say on transitions; it may refuse one the local gate allowed.
pub trait ReviewRepository: Send + Sync {
    fn fetch(&self, id: &ReviewId) -> Result<Option<Review>, RepositoryError>;
    fn insert(&self, review: Review) -> Result<Review, RepositoryError>;
    fn update(&self, review: Review) -> Result<Review, RepositoryError>;
    fn transition(&self, id: &ReviewId, action: ReviewAction) -> Result<Review, RepositoryError>;
}

/// Backend store for templates. Only used to seed new reviews and to save
/// template edits.
pub trait TemplateRepository: Send + Sync {
    fn fetch(&self, id: &TemplateId) -> Result<Option<Template>, RepositoryError>;
    fn insert(&self, template: Template) -> Result<Template, RepositoryError>;
    fn update(&self, template: Template) -> Result<Template, RepositoryError>;
    fn list_active(&self) -> Result<Vec<Template>, RepositoryError>;
}

/// Error enumeration for store failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("backend rejected the request: {0}")]
    Rejected(String),
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
