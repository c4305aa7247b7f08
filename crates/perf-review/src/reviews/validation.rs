use chrono::NaiveDate;

use super::domain::{CriterionId, NewReview, Template, TemplateId};

pub const NAME_MIN_CHARS: usize = 3;
pub const NAME_MAX_CHARS: usize = 100;
pub const REQUIRED_WEIGHT_TOTAL: f64 = 100.0;
const WEIGHT_TOLERANCE: f64 = 0.01;

/// Local, synchronous validation failures. These never reach the backend.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("employee is required")]
    MissingEmployee,
    #[error("template is required")]
    MissingTemplate,
    #[error("template {0} is inactive and cannot seed new reviews")]
    InactiveTemplate(TemplateId),
    #[error("title is required")]
    MissingTitle,
    #[error("review period must start before it ends ({start} is not before {end})")]
    InvalidPeriod { start: NaiveDate, end: NaiveDate },
    #[error("review has no criteria to score")]
    NoCriteria,
    #[error("please score all criteria before submitting ({remaining} remaining)")]
    IncompleteCriteria { remaining: usize },
    #[error("score must be 0 (unrated) or between 0 and 5, got {0}")]
    ScoreOutOfRange(f64),
    #[error("criterion {0} is not part of this review")]
    UnknownCriterion(CriterionId),
    #[error("criterion name '{name}' must be 3-100 characters")]
    CriterionName { name: String },
    #[error("criterion '{name}' has invalid weight {weight} (expected 0-100)")]
    InvalidWeight { name: String, weight: f64 },
    #[error("template name must be 3-100 characters")]
    TemplateName,
    #[error("template must define at least one criterion")]
    TemplateWithoutCriteria,
    #[error("criteria weights must equal 100% (currently {total}%)")]
    TemplateWeightTotal { total: f64 },
}

fn name_in_bounds(name: &str) -> bool {
    let length = name.trim().chars().count();
    (NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&length)
}

pub(crate) fn check_criterion_name(name: &str) -> Result<(), ValidationError> {
    if name_in_bounds(name) {
        Ok(())
    } else {
        Err(ValidationError::CriterionName {
            name: name.to_string(),
        })
    }
}

pub(crate) fn check_weight(name: &str, weight: f64) -> Result<(), ValidationError> {
    if weight.is_finite() && (0.0..=REQUIRED_WEIGHT_TOTAL).contains(&weight) {
        Ok(())
    } else {
        Err(ValidationError::InvalidWeight {
            name: name.to_string(),
            weight,
        })
    }
}

/// Form-level checks for a new review, run before the template is even fetched.
pub fn validate_new_review(form: &NewReview) -> Result<(), ValidationError> {
    if form.employee_id.0.trim().is_empty() {
        return Err(ValidationError::MissingEmployee);
    }
    if form.template_id.0.trim().is_empty() {
        return Err(ValidationError::MissingTemplate);
    }
    if form.title.trim().is_empty() {
        return Err(ValidationError::MissingTitle);
    }
    if form.period_start >= form.period_end {
        return Err(ValidationError::InvalidPeriod {
            start: form.period_start,
            end: form.period_end,
        });
    }
    Ok(())
}

/// Save-time checks for a template, including the 100% weight invariant.
pub fn validate_template(template: &Template) -> Result<(), ValidationError> {
    if !name_in_bounds(&template.name) {
        return Err(ValidationError::TemplateName);
    }
    if template.criteria.is_empty() {
        return Err(ValidationError::TemplateWithoutCriteria);
    }

    for definition in &template.criteria {
        check_criterion_name(&definition.name)?;
        check_weight(&definition.name, definition.weight)?;
    }

    let total = template.total_weight();
    if (total - REQUIRED_WEIGHT_TOTAL).abs() > WEIGHT_TOLERANCE {
        return Err(ValidationError::TemplateWeightTotal { total });
    }

    Ok(())
}
