use std::convert::Infallible;

use axum::{
    extract::{Query, State},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::Stream;
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::{
    auth::UpstreamAuth,
    error::{AppError, Result},
    models::{
        roster::{TeacherDetail, TeacherOption, TeacherRef},
        timetable::{day_label, TimetablePlan},
        view::{
            BlockTimetable, ClassOption, ClassTimetable, CurrentPeriodView, DayInfo, GridMeta,
            TeacherTimetable, NO_DATA_MESSAGE, SELECT_TEACHER_MESSAGE,
        },
    },
    timetable::{
        current_period::{current_period_index, CurrentPeriodTracker},
        grid::{block_grid, class_grid, teacher_grid},
        loader::{load_teachers, TimetableContext},
        next_class::{next_class as find_next_class, NextClass},
        plan_resolver::resolve_plan,
    },
    AppState,
};

/// View selection taken from the URL.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TimetableQuery {
    #[validate(range(min = 1))]
    pub plan_id: Option<i64>,
    #[validate(range(min = 1))]
    pub class_id: Option<i64>,
    #[validate(range(min = 1))]
    pub teacher_id: Option<i64>,
    #[validate(range(min = 1, max = 7))]
    pub day: Option<u8>,
}

pub async fn list_plans(
    State(state): State<AppState>,
    auth: UpstreamAuth,
) -> Result<Json<Vec<TimetablePlan>>> {
    let plans = state.upstream.with_token(auth.0).list_plans().await?;
    Ok(Json(plans))
}

pub async fn class_timetable(
    State(state): State<AppState>,
    auth: UpstreamAuth,
    Query(q): Query<TimetableQuery>,
) -> Result<Json<ClassTimetable>> {
    q.validate()?;

    let api = state.upstream.with_token(auth.0);
    let ctx = TimetableContext::load(&api, &state.cache, q.plan_id).await?;
    let now = state.clock.now();
    let current = current_period_index(&ctx.resolved.periods, now.time);

    let class_id = q
        .class_id
        .or_else(|| ctx.roster.classes().first().map(|c| c.id));
    let rows = match class_id {
        Some(id) if ctx.has_grid() => class_grid(
            &ctx.days,
            &ctx.resolved.periods,
            id,
            &ctx.assignments,
            &ctx.roster,
            current,
        ),
        _ => Vec::new(),
    };

    let mut meta = GridMeta::from_context(&ctx, current, now);
    if class_id.is_none() {
        meta.message = Some(NO_DATA_MESSAGE);
    }

    Ok(Json(ClassTimetable {
        meta,
        class: class_id
            .and_then(|id| ctx.roster.class(id))
            .map(ClassOption::from),
        classes: ctx.roster.classes().iter().map(ClassOption::from).collect(),
        rows,
    }))
}

fn select_teacher(teachers: &[TeacherDetail], teacher_id: i64) -> (TeacherRef, Option<TeacherOption>) {
    match teachers.iter().find(|t| t.id == Some(teacher_id)) {
        Some(t) => (TeacherRef::from(t), TeacherOption::from_detail(t)),
        None => (
            TeacherRef {
                id: Some(teacher_id),
                user_id: None,
            },
            None,
        ),
    }
}

pub async fn teacher_timetable(
    State(state): State<AppState>,
    auth: UpstreamAuth,
    Query(q): Query<TimetableQuery>,
) -> Result<Json<TeacherTimetable>> {
    q.validate()?;

    let api = state.upstream.with_token(auth.0);
    let (ctx, (teachers, teachers_degraded)) = futures::join!(
        TimetableContext::load(&api, &state.cache, q.plan_id),
        load_teachers(&api)
    );
    let mut ctx = ctx?;
    ctx.degraded.extend(teachers_degraded);

    let now = state.clock.now();
    let current = current_period_index(&ctx.resolved.periods, now.time);

    let selected = q.teacher_id.map(|id| select_teacher(&teachers, id));
    let rows = match &selected {
        Some((teacher, _)) if ctx.has_grid() => teacher_grid(
            &ctx.days,
            &ctx.resolved.periods,
            teacher,
            &ctx.assignments,
            &ctx.roster,
            current,
        ),
        _ => Vec::new(),
    };

    let mut meta = GridMeta::from_context(&ctx, current, now);
    if selected.is_none() && meta.message.is_none() {
        meta.message = Some(SELECT_TEACHER_MESSAGE);
    }

    Ok(Json(TeacherTimetable {
        meta,
        teacher: selected.and_then(|(_, option)| option),
        teachers: teachers.iter().filter_map(TeacherOption::from_detail).collect(),
        rows,
    }))
}

pub async fn block_timetable(
    State(state): State<AppState>,
    auth: UpstreamAuth,
    Query(q): Query<TimetableQuery>,
) -> Result<Json<BlockTimetable>> {
    q.validate()?;

    let api = state.upstream.with_token(auth.0);
    let ctx = TimetableContext::load(&api, &state.cache, q.plan_id).await?;
    let now = state.clock.now();
    let current = current_period_index(&ctx.resolved.periods, now.time);

    let day = q.day.or_else(|| ctx.days.first().copied());
    let rows = match day {
        Some(day) if ctx.has_grid() => block_grid(
            day,
            &ctx.resolved.periods,
            &ctx.assignments,
            &ctx.roster,
            current,
        ),
        _ => Vec::new(),
    };

    Ok(Json(BlockTimetable {
        meta: GridMeta::from_context(&ctx, current, now),
        day: day.map(|day| DayInfo {
            day,
            label: day_label(day),
        }),
        rows,
    }))
}

pub async fn current_period(
    State(state): State<AppState>,
    auth: UpstreamAuth,
    Query(q): Query<TimetableQuery>,
) -> Result<Json<CurrentPeriodView>> {
    q.validate()?;

    let api = state.upstream.with_token(auth.0);
    let resolved = resolve_plan(&api, q.plan_id).await?;
    let now = state.clock.now();

    Ok(Json(CurrentPeriodView {
        plan_id: resolved.plan.as_ref().map(|p| p.id),
        current_period_index: current_period_index(&resolved.periods, now.time),
        now,
        degraded: resolved.degraded,
    }))
}

/// Server-sent `period` events: the current period index on connect and
/// whenever it changes. The tracker's timer lives as long as the stream.
pub async fn current_period_stream(
    State(state): State<AppState>,
    auth: UpstreamAuth,
    Query(q): Query<TimetableQuery>,
) -> Result<Sse<impl Stream<Item = std::result::Result<Event, Infallible>>>> {
    q.validate()?;

    let api = state.upstream.with_token(auth.0);
    let resolved = resolve_plan(&api, q.plan_id).await?;
    let plan_id = resolved.plan.as_ref().map(|p| p.id);

    let tracker = CurrentPeriodTracker::spawn(resolved.periods, state.clock.clone(), state.period_refresh);
    let rx = tracker.subscribe();

    let stream = futures::stream::unfold((tracker, rx, true), move |(tracker, mut rx, first)| async move {
        if !first && rx.changed().await.is_err() {
            return None;
        }
        let current = *rx.borrow_and_update();
        let payload = json!({ "plan_id": plan_id, "current_period_index": current });
        let event = Event::default()
            .event("period")
            .json_data(&payload)
            .unwrap_or_else(|_| Event::default().event("period").data("null"));
        Some((Ok::<_, Infallible>(event), (tracker, rx, false)))
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

pub async fn next_class(
    State(state): State<AppState>,
    auth: UpstreamAuth,
    Query(q): Query<TimetableQuery>,
) -> Result<Json<Option<NextClass>>> {
    q.validate()?;
    let teacher_id = q
        .teacher_id
        .ok_or_else(|| AppError::BadRequest("teacherId is required".into()))?;

    let api = state.upstream.with_token(auth.0);
    let (ctx, (teachers, _)) = futures::join!(
        TimetableContext::load(&api, &state.cache, q.plan_id),
        load_teachers(&api)
    );
    let ctx = ctx?;
    let (teacher, _) = select_teacher(&teachers, teacher_id);

    Ok(Json(find_next_class(
        &ctx.roster,
        &ctx.assignments,
        &ctx.resolved.periods,
        &ctx.days,
        &teacher,
        state.clock.now(),
    )))
}
