//! In-process stores for local runs, demos and tests.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::domain::{Review, ReviewId, ReviewStatus, Template, TemplateId};
use super::repository::{RepositoryError, ReviewRepository, TemplateRepository};
use super::workflow::ReviewAction;

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable("store mutex poisoned".to_string()))
}

/// Review store keyed by id. Applies transitions the way a backend would:
/// only from a status the action can start from, last write wins otherwise.
#[derive(Debug, Default, Clone)]
pub struct InMemoryReviewStore {
    records: Arc<Mutex<BTreeMap<ReviewId, Review>>>,
    transitions: Arc<Mutex<Vec<(ReviewId, ReviewAction)>>>,
}

impl InMemoryReviewStore {
    /// Transition requests that reached the store, in arrival order.
    pub fn transition_log(&self) -> Vec<(ReviewId, ReviewAction)> {
        self.transitions
            .lock()
            .map(|log| log.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|records| records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn backend_accepts(action: ReviewAction, review: &Review) -> bool {
    match action {
        ReviewAction::Submit => review.status == ReviewStatus::Draft,
        ReviewAction::Complete => review.status == ReviewStatus::Pending,
        ReviewAction::Approve | ReviewAction::Reject => {
            matches!(review.status, ReviewStatus::Pending | ReviewStatus::Completed)
        }
    }
}

impl ReviewRepository for InMemoryReviewStore {
    fn fetch(&self, id: &ReviewId) -> Result<Option<Review>, RepositoryError> {
        Ok(lock(&self.records)?.get(id).cloned())
    }

    fn insert(&self, review: Review) -> Result<Review, RepositoryError> {
        let mut records = lock(&self.records)?;
        if records.contains_key(&review.id) {
            return Err(RepositoryError::Conflict);
        }
        records.insert(review.id.clone(), review.clone());
        Ok(review)
    }

    fn update(&self, review: Review) -> Result<Review, RepositoryError> {
        let mut records = lock(&self.records)?;
        match records.get_mut(&review.id) {
            Some(existing) => {
                *existing = review.clone();
                Ok(review)
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn transition(&self, id: &ReviewId, action: ReviewAction) -> Result<Review, RepositoryError> {
        lock(&self.transitions)?.push((id.clone(), action));

        let mut records = lock(&self.records)?;
        let review = records.get_mut(id).ok_or(RepositoryError::NotFound)?;
        if !backend_accepts(action, review) {
            return Err(RepositoryError::Rejected(format!(
                "cannot {action} a review in {} status",
                review.status
            )));
        }
        review.status = action.target();
        Ok(review.clone())
    }
}

/// Template store keyed by id.
#[derive(Debug, Default, Clone)]
pub struct InMemoryTemplateStore {
    records: Arc<Mutex<BTreeMap<TemplateId, Template>>>,
}

impl InMemoryTemplateStore {
    pub fn with_templates(templates: impl IntoIterator<Item = Template>) -> Self {
        let records = templates
            .into_iter()
            .filter_map(|template| template.id.clone().map(|id| (id, template)))
            .collect();
        Self {
            records: Arc::new(Mutex::new(records)),
        }
    }
}

impl TemplateRepository for InMemoryTemplateStore {
    fn fetch(&self, id: &TemplateId) -> Result<Option<Template>, RepositoryError> {
        Ok(lock(&self.records)?.get(id).cloned())
    }

    fn insert(&self, template: Template) -> Result<Template, RepositoryError> {
        let id = template
            .id
            .clone()
            .ok_or_else(|| RepositoryError::Rejected("template id missing".to_string()))?;
        let mut records = lock(&self.records)?;
        if records.contains_key(&id) {
            return Err(RepositoryError::Conflict);
        }
        records.insert(id, template.clone());
        Ok(template)
    }

    fn update(&self, template: Template) -> Result<Template, RepositoryError> {
        let id = template.id.clone().ok_or(RepositoryError::NotFound)?;
        let mut records = lock(&self.records)?;
        match records.get_mut(&id) {
            Some(existing) => {
                *existing = template.clone();
                Ok(template)
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn list_active(&self) -> Result<Vec<Template>, RepositoryError> {
        Ok(lock(&self.records)?
            .values()
            .filter(|template| template.active)
            .cloned()
            .collect())
    }
}
