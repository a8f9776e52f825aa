use serde::Serialize;

use super::{
    common::Degraded,
    roster::{Class, TeacherDetail, TeacherOption},
    timetable::{day_label, Period, TimetablePlan},
};
use crate::timetable::{
    assignments::AssignmentSource,
    clock::LocalNow,
    grid::{ClassRow, DayRow},
    loader::TimetableContext,
};

pub const NO_DATA_MESSAGE: &str = "No timetable data.";
pub const SELECT_TEACHER_MESSAGE: &str = "Select a teacher to view timetable.";

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DayInfo {
    pub day: u8,
    pub label: &'static str,
}

/// Fields shared by every grid response.
#[derive(Debug, Clone, Serialize)]
pub struct GridMeta {
    pub plan: Option<TimetablePlan>,
    pub days: Vec<DayInfo>,
    pub periods: Vec<Period>,
    pub current_period_index: Option<i64>,
    pub now: LocalNow,
    pub assignment_source: AssignmentSource,
    pub degraded: Vec<Degraded>,
    pub message: Option<&'static str>,
}

impl GridMeta {
    pub fn from_context(ctx: &TimetableContext, current_period_index: Option<i64>, now: LocalNow) -> Self {
        Self {
            plan: ctx.resolved.plan.clone(),
            days: ctx
                .days
                .iter()
                .map(|&day| DayInfo {
                    day,
                    label: day_label(day),
                })
                .collect(),
            periods: ctx.resolved.periods.clone(),
            current_period_index,
            now,
            assignment_source: ctx.assignment_source,
            degraded: ctx.degraded.clone(),
            message: (!ctx.has_grid()).then_some(NO_DATA_MESSAGE),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ClassOption {
    pub id: i64,
    pub name: String,
    pub grade_level: Option<String>,
}

impl From<&Class> for ClassOption {
    fn from(c: &Class) -> Self {
        ClassOption {
            id: c.id,
            name: c.name.clone(),
            grade_level: c.grade_level.clone(),
        }
    }
}

impl TeacherOption {
    pub fn from_detail(t: &TeacherDetail) -> Option<Self> {
        Some(TeacherOption {
            id: t.id?,
            user_id: t.user_id,
            name: t.display_name(),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassTimetable {
    #[serde(flatten)]
    pub meta: GridMeta,
    pub class: Option<ClassOption>,
    pub classes: Vec<ClassOption>,
    pub rows: Vec<DayRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TeacherTimetable {
    #[serde(flatten)]
    pub meta: GridMeta,
    pub teacher: Option<TeacherOption>,
    pub teachers: Vec<TeacherOption>,
    pub rows: Vec<DayRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BlockTimetable {
    #[serde(flatten)]
    pub meta: GridMeta,
    pub day: Option<DayInfo>,
    pub rows: Vec<ClassRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CurrentPeriodView {
    pub plan_id: Option<i64>,
    pub current_period_index: Option<i64>,
    pub now: LocalNow,
    pub degraded: Vec<Degraded>,
}
