use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::validation::{self, ValidationError};

/// Identifier wrapper for performance reviews.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReviewId(pub String);

/// Identifier of the employee being reviewed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmployeeId(pub String);

/// Identifier of a user account (reviewers, approvers).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CriterionId(pub String);

impl fmt::Display for ReviewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for CriterionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Application roles that drive dashboard selection and approval rights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    Employee,
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Employee => "employee",
        }
    }

    /// Admins and managers may approve or reject completed reviews.
    pub const fn is_approver(self) -> bool {
        matches!(self, Role::Admin | Role::Manager)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role '{0}' (expected admin, manager, or employee)")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            "employee" => Ok(Role::Employee),
            _ => Err(UnknownRole(value.to_string())),
        }
    }
}

/// Identity of whoever is acting on a review. Supplied by the caller's session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub user_id: UserId,
    pub display_name: String,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: impl Into<String>, display_name: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: UserId(user_id.into()),
            display_name: display_name.into(),
            role,
        }
    }
}

/// Lifecycle position of a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Draft,
    Pending,
    Completed,
    Approved,
    Rejected,
}

impl ReviewStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ReviewStatus::Draft => "draft",
            ReviewStatus::Pending => "pending",
            ReviewStatus::Completed => "completed",
            ReviewStatus::Approved => "approved",
            ReviewStatus::Rejected => "rejected",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, ReviewStatus::Approved | ReviewStatus::Rejected)
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Rating on the 0-5 scale where 0 means "unrated".
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Score(f64);

impl Score {
    pub const UNRATED: Score = Score(0.0);
    pub const MAX: f64 = 5.0;

    /// Out-of-range and non-finite values are rejected, never clamped.
    pub fn new(value: f64) -> Result<Self, ValidationError> {
        if value.is_finite() && (0.0..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ValidationError::ScoreOutOfRange(value))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn is_rated(self) -> bool {
        self.0 > 0.0
    }
}

impl TryFrom<f64> for Score {
    type Error = ValidationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Score> for f64 {
    fn from(score: Score) -> Self {
        score.0
    }
}

/// A single weighted, scorable item owned by a review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawCriterion")]
pub struct Criterion {
    pub id: CriterionId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub weight: f64,
    #[serde(default)]
    score: Score,
    #[serde(default)]
    pub comments: String,
    #[serde(default)]
    pub sort_order: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCriterion {
    id: CriterionId,
    name: String,
    #[serde(default)]
    description: Option<String>,
    weight: f64,
    #[serde(default)]
    score: Score,
    #[serde(default)]
    comments: String,
    #[serde(default)]
    sort_order: u32,
}

impl TryFrom<RawCriterion> for Criterion {
    type Error = ValidationError;

    fn try_from(raw: RawCriterion) -> Result<Self, Self::Error> {
        let mut criterion = Self::new(raw.id, raw.name, raw.weight)?;
        criterion.description = raw.description;
        criterion.score = raw.score;
        criterion.comments = raw.comments;
        criterion.sort_order = raw.sort_order;
        Ok(criterion)
    }
}

impl Criterion {
    pub fn new(
        id: CriterionId,
        name: impl Into<String>,
        weight: f64,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        validation::check_criterion_name(&name)?;
        validation::check_weight(&name, weight)?;

        Ok(Self {
            id,
            name,
            description: None,
            weight,
            score: Score::UNRATED,
            comments: String::new(),
            sort_order: 0,
        })
    }

    /// Copies a template definition into a fresh, unrated criterion.
    pub fn from_definition(id: CriterionId, definition: &CriterionDefinition) -> Self {
        Self {
            id,
            name: definition.name.clone(),
            description: definition.description.clone(),
            weight: definition.weight,
            score: Score::UNRATED,
            comments: String::new(),
            sort_order: definition.sort_order,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_sort_order(mut self, sort_order: u32) -> Self {
        self.sort_order = sort_order;
        self
    }

    pub fn score(&self) -> f64 {
        self.score.value()
    }

    pub fn set_score(&mut self, value: f64) -> Result<(), ValidationError> {
        self.score = Score::new(value)?;
        Ok(())
    }

    pub fn set_comments(&mut self, text: impl Into<String>) {
        self.comments = text.into();
    }

    pub fn is_complete(&self) -> bool {
        self.score.is_rated()
    }
}

/// Start/end dates of the evaluated period. The start always precedes the end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawPeriod")]
pub struct ReviewPeriod {
    period_start: NaiveDate,
    period_end: NaiveDate,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPeriod {
    period_start: NaiveDate,
    period_end: NaiveDate,
}

impl TryFrom<RawPeriod> for ReviewPeriod {
    type Error = ValidationError;

    fn try_from(raw: RawPeriod) -> Result<Self, Self::Error> {
        Self::new(raw.period_start, raw.period_end)
    }
}

impl ReviewPeriod {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ValidationError> {
        if start < end {
            Ok(Self {
                period_start: start,
                period_end: end,
            })
        } else {
            Err(ValidationError::InvalidPeriod { start, end })
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.period_start
    }

    pub fn end(&self) -> NaiveDate {
        self.period_end
    }
}

/// A performance review and the criteria it exclusively owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    pub employee_id: EmployeeId,
    pub reviewer_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewer_name: Option<String>,
    pub template_id: TemplateId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(flatten)]
    pub period: ReviewPeriod,
    pub status: ReviewStatus,
    #[serde(default)]
    pub overall_comments: String,
    #[serde(default)]
    pub overall_score: f64,
    #[serde(default)]
    pub criteria: Vec<Criterion>,
}

impl Review {
    pub fn criterion(&self, id: &CriterionId) -> Option<&Criterion> {
        self.criteria.iter().find(|criterion| &criterion.id == id)
    }

    pub fn criterion_mut(&mut self, id: &CriterionId) -> Option<&mut Criterion> {
        self.criteria.iter_mut().find(|criterion| &criterion.id == id)
    }

    /// Recomputes the cached overall score from the current criteria.
    pub fn refresh_overall_score(&mut self) -> f64 {
        self.overall_score = super::scoring::overall_score(&self.criteria);
        self.overall_score
    }
}

/// Form input for creating a review from a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    pub employee_id: EmployeeId,
    pub reviewer_id: UserId,
    #[serde(default)]
    pub reviewer_name: Option<String>,
    pub template_id: TemplateId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
}

/// Editable header fields of a draft review.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDetailsUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub period_start: Option<NaiveDate>,
    #[serde(default)]
    pub period_end: Option<NaiveDate>,
}

/// Reviewer input for one criterion. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriterionUpdate {
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub comments: Option<String>,
}

/// Criterion blueprint carried by a template and copied into new reviews.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriterionDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub weight: f64,
    #[serde(default)]
    pub sort_order: u32,
}

/// Reusable named set of criteria definitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<TemplateId>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub criteria: Vec<CriterionDefinition>,
}

fn default_active() -> bool {
    true
}

impl Template {
    pub fn total_weight(&self) -> f64 {
        self.criteria.iter().map(|definition| definition.weight).sum()
    }

    /// Definitions in evaluation order; ties keep their declared order.
    pub fn ordered_criteria(&self) -> Vec<&CriterionDefinition> {
        let mut ordered: Vec<&CriterionDefinition> = self.criteria.iter().collect();
        ordered.sort_by_key(|definition| definition.sort_order);
        ordered
    }
}
