use metrics_exporter_prometheus::PrometheusHandle;
use perf_review::reviews::{CriterionDefinition, Template, TemplateId};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

fn definition(name: &str, description: &str, weight: f64, sort_order: u32) -> CriterionDefinition {
    CriterionDefinition {
        name: name.to_string(),
        description: Some(description.to_string()),
        weight,
        sort_order,
    }
}

/// Templates available to a freshly started in-memory service.
pub(crate) fn seed_templates() -> Vec<Template> {
    vec![
        Template {
            id: Some(TemplateId("tpl-annual".to_string())),
            name: "Annual performance review".to_string(),
            description: "Standard yearly evaluation".to_string(),
            kind: "annual".to_string(),
            active: true,
            criteria: vec![
                definition("Job Knowledge", "Understands the role and its tools", 25.0, 1),
                definition("Quality of Work", "Accuracy and thoroughness", 25.0, 2),
                definition("Communication", "Clear written and verbal updates", 20.0, 3),
                definition("Teamwork", "Supports and unblocks colleagues", 15.0, 4),
                definition("Initiative", "Acts without waiting to be asked", 15.0, 5),
            ],
        },
        Template {
            id: Some(TemplateId("tpl-probation".to_string())),
            name: "Probation review".to_string(),
            description: "End-of-probation check".to_string(),
            kind: "probation".to_string(),
            active: true,
            criteria: vec![
                definition("Role Fit", "Meets the expectations of the role", 50.0, 1),
                definition("Reliability", "Attendance and follow-through", 30.0, 2),
                definition("Learning", "Picks up processes and feedback", 20.0, 3),
            ],
        },
    ]
}
