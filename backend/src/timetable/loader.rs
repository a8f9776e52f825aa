//! Fetch orchestration for the timetable views. Auxiliary data that cannot
//! be fetched degrades to empty and is reported, never fatal.

use futures::{stream, StreamExt};

use super::{
    assignments::{load_assignments, AssignmentCache, AssignmentSource},
    plan_resolver::{resolve_plan, ResolvedPlan},
    roster::Roster,
};
use crate::{
    models::{assignment::AssignmentMap, common::Degraded, roster::TeacherDetail},
    upstream::{FetchError, UpstreamClient},
};

/// Everything a grid needs for one request.
#[derive(Debug, Clone)]
pub struct TimetableContext {
    pub resolved: ResolvedPlan,
    pub days: Vec<u8>,
    pub assignments: AssignmentMap,
    pub assignment_source: AssignmentSource,
    pub roster: Roster,
    pub degraded: Vec<Degraded>,
}

impl TimetableContext {
    pub async fn load(
        api: &UpstreamClient,
        cache: &AssignmentCache,
        plan_id: Option<i64>,
    ) -> Result<Self, FetchError> {
        let (resolved, (roster, roster_degraded)) =
            futures::join!(resolve_plan(api, plan_id), load_roster(api));
        let mut resolved = resolved?;

        let (assignments, assignment_source) = match &resolved.plan {
            Some(plan) => load_assignments(plan.id, resolved.block_assignments.take(), cache).await,
            None => (AssignmentMap::new(), AssignmentSource::None),
        };

        let mut degraded = std::mem::take(&mut resolved.degraded);
        degraded.extend(roster_degraded);

        Ok(Self {
            days: resolved.effective_days(),
            resolved,
            assignments,
            assignment_source,
            roster,
            degraded,
        })
    }

    pub fn has_grid(&self) -> bool {
        self.resolved.plan.is_some() && !self.resolved.periods.is_empty()
    }
}

/// Upstream requests in flight per kind (class detail, subject teachers)
/// while loading the roster.
pub const ROSTER_FETCH_CONCURRENCY: usize = 8;

/// Classes (list merged with detail) and their subject teachers.
pub async fn load_roster(api: &UpstreamClient) -> (Roster, Vec<Degraded>) {
    let mut degraded = Vec::new();

    let listed = match api.list_classes().await {
        Ok(classes) => classes,
        Err(e) => {
            tracing::warn!("Class list unavailable: {}", e);
            degraded.push(Degraded::new("classes", &e));
            return (Roster::default(), degraded);
        }
    };

    let ids: Vec<i64> = listed.iter().map(|c| c.id).collect();
    let details = stream::iter(ids.clone().into_iter().map(|id| api.get_class(id)))
        .buffered(ROSTER_FETCH_CONCURRENCY)
        .collect::<Vec<_>>();
    let mappings = stream::iter(ids.into_iter().map(|id| api.list_class_subject_teachers(id)))
        .buffered(ROSTER_FETCH_CONCURRENCY)
        .collect::<Vec<_>>();
    let (details, mappings) = futures::join!(details, mappings);

    let mut classes = Vec::with_capacity(listed.len());
    for (entry, detail) in listed.into_iter().zip(details) {
        match detail {
            Ok(detail) => classes.push(entry.merge_detail(detail)),
            Err(e) => {
                tracing::debug!("Class {} detail unavailable: {}", entry.id, e);
                classes.push(entry);
            }
        }
    }

    let mut rows = Vec::new();
    for (class, result) in classes.iter().zip(mappings) {
        match result {
            Ok(mut batch) => rows.append(&mut batch),
            Err(e) => {
                tracing::warn!("Subject teachers of class {} unavailable: {}", class.id, e);
                degraded.push(Degraded::new(format!("class_subject_teachers {}", class.id), &e));
            }
        }
    }

    (Roster::new(classes, rows), degraded)
}

pub async fn load_teachers(api: &UpstreamClient) -> (Vec<TeacherDetail>, Option<Degraded>) {
    match api.list_teachers().await {
        Ok(teachers) => (teachers, None),
        Err(e) => {
            tracing::warn!("Teacher list unavailable: {}", e);
            (Vec::new(), Some(Degraded::new("teachers", &e)))
        }
    }
}
