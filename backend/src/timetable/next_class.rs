use serde::Serialize;

use super::{clock::LocalNow, current_period::seconds_between, roster::Roster};
use crate::models::{
    assignment::{AssignmentMap, SlotKey},
    common::clock_time,
    roster::TeacherRef,
    timetable::Period,
};

/// The lesson a teacher has now or next today.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NextClass {
    pub day: u8,
    pub period_index: i64,
    pub class_id: i64,
    pub class_name: String,
    pub subject_id: i64,
    pub subject: String,
    #[serde(with = "clock_time")]
    pub start_time: time::Time,
    #[serde(with = "clock_time")]
    pub end_time: time::Time,
    pub in_progress: bool,
    /// 0 while in progress.
    pub seconds_until_start: i64,
    pub seconds_until_end: i64,
}

/// First lesson period today that has not ended and in which the teacher
/// takes some class. Classes without a subject teacher count for their
/// class teacher.
pub fn next_class(
    roster: &Roster,
    assignments: &AssignmentMap,
    periods: &[Period],
    days: &[u8],
    teacher: &TeacherRef,
    now: LocalNow,
) -> Option<NextClass> {
    if !days.contains(&now.weekday) {
        return None;
    }

    periods
        .iter()
        .filter(|p| p.kind.is_lesson() && now.time < p.end_time)
        .find_map(|period| {
            roster.classes().iter().find_map(|class| {
                let key = SlotKey::new(now.weekday, class.id, period.period_index);
                let subject_id = assignments.subject_at(key)?;
                if !roster.teaches(teacher, class.id, subject_id) {
                    return None;
                }
                let in_progress = period.start_time <= now.time;
                Some(NextClass {
                    day: now.weekday,
                    period_index: period.period_index,
                    class_id: class.id,
                    class_name: class.name.clone(),
                    subject_id,
                    subject: roster.subject_label(subject_id),
                    start_time: period.start_time,
                    end_time: period.end_time,
                    in_progress,
                    seconds_until_start: seconds_between(now.time, period.start_time).max(0),
                    seconds_until_end: seconds_between(now.time, period.end_time),
                })
            })
        })
}
