use crate::{
    models::{
        assignment::AssignmentMap,
        common::Degraded,
        timetable::{effective_days, Period, PlanDetail, TimetablePlan, TimetableTemplate},
    },
    upstream::{FetchError, UpstreamClient},
};

/// The plan a view is built on, plus its template and ordered periods.
#[derive(Debug, Clone, Default)]
pub struct ResolvedPlan {
    pub plan: Option<TimetablePlan>,
    /// `block_assignments` of the plan detail, when the server sent one.
    pub block_assignments: Option<AssignmentMap>,
    pub template: Option<TimetableTemplate>,
    pub periods: Vec<Period>,
    pub degraded: Vec<Degraded>,
}

impl ResolvedPlan {
    pub fn effective_days(&self) -> Vec<u8> {
        effective_days(self.template.as_ref().map(|t| t.days_active.as_slice()))
    }
}

/// Picks the plan for a view.
///
/// With `plan_id`, that plan's detail is fetched; if it cannot be, the first
/// plan of the list is used instead. Without it, the first listed plan is
/// used. Template and period failures leave those pieces empty and are
/// recorded in `degraded`. Only a failing plan list is an error.
pub async fn resolve_plan(
    api: &UpstreamClient,
    plan_id: Option<i64>,
) -> Result<ResolvedPlan, FetchError> {
    let mut resolved = ResolvedPlan::default();

    let requested = match plan_id {
        Some(id) => match api.get_plan(id).await {
            Ok(detail) => Some(detail),
            Err(e) => {
                tracing::warn!("Plan {} unavailable, falling back to first plan: {}", id, e);
                resolved.degraded.push(Degraded::new(format!("plan {id}"), &e));
                None
            }
        },
        None => None,
    };

    let detail = match requested {
        Some(detail) => Some(detail),
        None => match api.list_plans().await?.into_iter().next() {
            Some(first) => match api.get_plan(first.id).await {
                Ok(detail) => Some(detail),
                Err(e) => {
                    tracing::warn!("Plan {} detail unavailable: {}", first.id, e);
                    resolved.degraded.push(Degraded::new(format!("plan {}", first.id), &e));
                    Some(PlanDetail {
                        plan: first,
                        block_assignments: None,
                    })
                }
            },
            None => None,
        },
    };

    let Some(detail) = detail else {
        return Ok(resolved);
    };

    if let Some(template_id) = detail.plan.template {
        let (template, periods) = futures::join!(
            api.get_template(template_id),
            api.list_periods(template_id)
        );
        match template {
            Ok(t) => resolved.template = Some(t),
            Err(e) => {
                tracing::warn!("Template {} unavailable: {}", template_id, e);
                resolved.degraded.push(Degraded::new("template", &e));
            }
        }
        match periods {
            Ok(p) => resolved.periods = p,
            Err(e) => {
                tracing::warn!("Periods of template {} unavailable: {}", template_id, e);
                resolved.degraded.push(Degraded::new("periods", &e));
            }
        }
    }

    resolved.plan = Some(detail.plan);
    resolved.block_assignments = detail.block_assignments;
    Ok(resolved)
}
