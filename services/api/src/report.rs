use clap::Args;
use perf_review::config::AppConfig;
use perf_review::error::AppError;
use perf_review::reviews::{
    validate_submission, Actor, EditMode, Review, ReviewSummary, Role, SubmissionCheck, Template,
    TemplateImporter, UserId, WorkflowGate,
};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct TemplateValidateArgs {
    /// CSV file with `name,description,weight,sort_order` rows
    pub(crate) csv: PathBuf,
    /// Template name to validate against the naming rules
    #[arg(long)]
    pub(crate) name: String,
    /// Template type label (annual, quarterly, probation, ...)
    #[arg(long, default_value = "annual")]
    pub(crate) kind: String,
}

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Review JSON document, as returned by the review store
    pub(crate) review: PathBuf,
    /// Acting user id (defaults to the review's reviewer)
    #[arg(long)]
    pub(crate) user_id: Option<String>,
    /// Acting user display name
    #[arg(long)]
    pub(crate) user_name: Option<String>,
    /// Acting user role
    #[arg(long, default_value = "employee")]
    pub(crate) role: Role,
    /// Derive permissions as if the review were opened read-only
    #[arg(long)]
    pub(crate) read_only: bool,
    /// Print the summary as JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_template_validate(args: TemplateValidateArgs) -> Result<(), AppError> {
    let template = TemplateImporter::from_path(&args.csv, &args.name, &args.kind)?;
    for line in template_lines(&template) {
        println!("{line}");
    }
    Ok(())
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let raw = std::fs::read_to_string(&args.review)?;
    let review: Review = serde_json::from_str(&raw)?;

    let actor = acting_user(&args, &review);
    let mode = if args.read_only {
        EditMode::ReadOnly
    } else {
        EditMode::Interactive
    };
    let check = SubmissionCheck::from(validate_submission(&review));
    let summary = ReviewSummary::new(&WorkflowGate::new(config.workflow), review, &actor, mode);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        for line in score_lines(&summary, &check) {
            println!("{line}");
        }
    }
    Ok(())
}

fn acting_user(args: &ScoreArgs, review: &Review) -> Actor {
    match &args.user_id {
        Some(user_id) => Actor {
            user_id: UserId(user_id.clone()),
            display_name: args.user_name.clone().unwrap_or_default(),
            role: args.role,
        },
        None => Actor {
            user_id: review.reviewer_id.clone(),
            display_name: review.reviewer_name.clone().unwrap_or_default(),
            role: args.role,
        },
    }
}

pub(crate) fn template_lines(template: &Template) -> Vec<String> {
    let mut lines = vec![format!(
        "Template '{}' ({}) is valid: {} criteria totalling {}%",
        template.name,
        template.kind,
        template.criteria.len(),
        template.total_weight()
    )];
    for definition in template.ordered_criteria() {
        lines.push(format!(
            "  - {} ({}%){}",
            definition.name,
            definition.weight,
            definition
                .description
                .as_deref()
                .map(|description| format!(": {description}"))
                .unwrap_or_default()
        ));
    }
    lines
}

pub(crate) fn score_lines(summary: &ReviewSummary, check: &SubmissionCheck) -> Vec<String> {
    let review = &summary.review;
    let mut lines = vec![
        format!("{} [{}]", review.title, review.status),
        format!(
            "Period {} to {} | employee {} | reviewer {}",
            review.period.start(),
            review.period.end(),
            review.employee_id.0,
            review
                .reviewer_name
                .as_deref()
                .unwrap_or(review.reviewer_id.0.as_str())
        ),
        "Criteria:".to_string(),
    ];

    for criterion in &review.criteria {
        let score = if criterion.is_complete() {
            format!("{:.1}", criterion.score())
        } else {
            "unrated".to_string()
        };
        lines.push(format!(
            "  - {} ({}%): {}",
            criterion.name, criterion.weight, score
        ));
    }

    lines.push(format!(
        "Overall {:.1} | {} ({}) | alert {}",
        summary.overall_score,
        summary.grade.label,
        summary.grade.letter,
        summary.alert.label()
    ));
    lines.push(format!(
        "Completion {}/{} ({}%)",
        summary.completion.completed, summary.completion.total, summary.completion.percentage
    ));
    lines.push(match &check.message {
        None => "Ready to submit".to_string(),
        Some(message) => format!("Not ready to submit: {message}"),
    });

    let actions: Vec<&str> = summary
        .available_actions
        .iter()
        .map(|action| action.label())
        .collect();
    lines.push(if actions.is_empty() {
        "Available actions: none".to_string()
    } else {
        format!("Available actions: {}", actions.join(", "))
    });
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::seed_templates;

    fn review_json(scores: [f64; 2]) -> String {
        serde_json::json!({
            "id": "rev-000042",
            "employeeId": "emp-9",
            "reviewerId": "u-quinn",
            "reviewerName": "Quinn Park",
            "templateId": "tpl-annual",
            "title": "FY25 annual review",
            "periodStart": "2025-01-01",
            "periodEnd": "2025-12-31",
            "status": "draft",
            "criteria": [
                { "id": "c-1", "name": "Delivery", "weight": 60, "score": scores[0] },
                { "id": "c-2", "name": "Teamwork", "weight": 40, "score": scores[1] }
            ]
        })
        .to_string()
    }

    fn summarize(raw: &str, actor: &Actor) -> (ReviewSummary, SubmissionCheck) {
        let review: Review = serde_json::from_str(raw).expect("review parses");
        let check = SubmissionCheck::from(validate_submission(&review));
        let summary = ReviewSummary::new(
            &WorkflowGate::default(),
            review,
            actor,
            EditMode::Interactive,
        );
        (summary, check)
    }

    #[test]
    fn score_lines_report_remaining_criteria() {
        let reviewer = Actor::new("u-quinn", "Quinn Park", Role::Employee);
        let (summary, check) = summarize(&review_json([4.0, 0.0]), &reviewer);
        let lines = score_lines(&summary, &check);

        assert!(lines.contains(&"  - Teamwork (40%): unrated".to_string()));
        assert!(lines.contains(&"Overall 2.4 | Poor (D) | alert poor".to_string()));
        assert!(lines.contains(&"Completion 1/2 (50%)".to_string()));
        assert!(lines
            .iter()
            .any(|line| line.contains("Not ready to submit") && line.contains("1 remaining")));
        assert_eq!(
            lines.last().map(String::as_str),
            Some("Available actions: none")
        );
    }

    #[test]
    fn score_lines_offer_submit_to_reviewer() {
        let reviewer = Actor::new("u-quinn", "Quinn Park", Role::Employee);
        let (summary, check) = summarize(&review_json([4.0, 2.0]), &reviewer);
        let lines = score_lines(&summary, &check);

        assert!(lines.contains(&"Overall 3.2 | Satisfactory (B) | alert fair".to_string()));
        assert!(lines.contains(&"Ready to submit".to_string()));
        assert_eq!(
            lines.last().map(String::as_str),
            Some("Available actions: submit")
        );
    }

    #[test]
    fn out_of_range_scores_fail_to_parse() {
        let result = serde_json::from_str::<Review>(&review_json([7.0, 2.0]));
        assert!(result.is_err());
    }

    #[test]
    fn acting_user_defaults_to_reviewer() {
        let review: Review = serde_json::from_str(&review_json([1.0, 1.0])).expect("parses");
        let args = ScoreArgs {
            review: PathBuf::from("review.json"),
            user_id: None,
            user_name: None,
            role: Role::Employee,
            read_only: false,
            json: false,
        };

        let actor = acting_user(&args, &review);
        assert_eq!(actor.user_id.0, "u-quinn");
        assert_eq!(actor.display_name, "Quinn Park");
    }

    #[test]
    fn template_lines_follow_sort_order() {
        let template = seed_templates()
            .into_iter()
            .next()
            .expect("seed template present");
        let lines = template_lines(&template);

        assert!(lines[0].contains("is valid"));
        assert!(lines[0].ends_with("totalling 100%"));
        assert_eq!(lines.len(), template.criteria.len() + 1);
    }
}
