//! Day x period matrices for the class, teacher and block views.

use serde::Serialize;

use super::roster::Roster;
use crate::models::{
    assignment::{AssignmentMap, SlotKey},
    roster::TeacherRef,
    timetable::{day_label, Period, PeriodKind},
};

pub const EMPTY_PLACEHOLDER: &str = "—";
pub const SESSION_PLACEHOLDER: &str = "Session";

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Cell {
    /// Break or lunch.
    Badge {
        kind: PeriodKind,
        text: String,
        highlight: bool,
    },
    Lesson {
        subject_id: i64,
        subject: String,
        teacher: String,
        highlight: bool,
    },
    /// Teacher view: every class the teacher has in this slot.
    Classes {
        entries: Vec<String>,
        highlight: bool,
    },
    Empty {
        text: &'static str,
        highlight: bool,
    },
}

impl Cell {
    pub fn highlight(&self) -> bool {
        match self {
            Cell::Badge { highlight, .. }
            | Cell::Lesson { highlight, .. }
            | Cell::Classes { highlight, .. }
            | Cell::Empty { highlight, .. } => *highlight,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DayRow {
    pub day: u8,
    pub label: &'static str,
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ClassRow {
    pub class_id: i64,
    pub class_name: String,
    pub cells: Vec<Cell>,
}

/// Letter of "BREAK"/"LUNCH" shown on the row of `day` (Mon = B .. Fri = K),
/// so the word reads down a Mon-Fri column. Each letter stays on its weekday
/// when some days are inactive; weekends get none.
pub fn badge_letter(kind: PeriodKind, day: u8) -> String {
    usize::from(day)
        .checked_sub(1)
        .and_then(|i| kind.badge_word().chars().nth(i))
        .map(String::from)
        .unwrap_or_default()
}

fn badge_word(period: &Period) -> String {
    period
        .label
        .clone()
        .unwrap_or_else(|| period.kind.badge_word().to_string())
}

fn is_current(period: &Period, current: Option<i64>) -> bool {
    current == Some(period.period_index)
}

/// One class, rows = days, cells = subject + teacher.
pub fn class_grid(
    days: &[u8],
    periods: &[Period],
    class_id: i64,
    assignments: &AssignmentMap,
    roster: &Roster,
    current: Option<i64>,
) -> Vec<DayRow> {
    days.iter()
        .map(|&day| DayRow {
            day,
            label: day_label(day),
            cells: periods
                .iter()
                .map(|period| {
                    let highlight = is_current(period, current);
                    if !period.kind.is_lesson() {
                        return Cell::Badge {
                            kind: period.kind,
                            text: badge_letter(period.kind, day),
                            highlight,
                        };
                    }
                    match assignments.subject_at(SlotKey::new(day, class_id, period.period_index)) {
                        Some(subject_id) => Cell::Lesson {
                            subject_id,
                            subject: roster.subject_label(subject_id),
                            teacher: roster.resolve_teacher_label(class_id, subject_id),
                            highlight,
                        },
                        None => Cell::Empty {
                            text: EMPTY_PLACEHOLDER,
                            highlight,
                        },
                    }
                })
                .collect(),
        })
        .collect()
}

/// One teacher, rows = days, cells = every class they take in the slot.
pub fn teacher_grid(
    days: &[u8],
    periods: &[Period],
    teacher: &TeacherRef,
    assignments: &AssignmentMap,
    roster: &Roster,
    current: Option<i64>,
) -> Vec<DayRow> {
    days.iter()
        .map(|&day| DayRow {
            day,
            label: day_label(day),
            cells: periods
                .iter()
                .map(|period| {
                    let highlight = is_current(period, current);
                    if !period.kind.is_lesson() {
                        return Cell::Badge {
                            kind: period.kind,
                            text: badge_letter(period.kind, day),
                            highlight,
                        };
                    }
                    let entries =
                        roster.find_slots_for_teacher(assignments, teacher, day, period.period_index);
                    if entries.is_empty() {
                        Cell::Empty {
                            text: EMPTY_PLACEHOLDER,
                            highlight,
                        }
                    } else {
                        Cell::Classes { entries, highlight }
                    }
                })
                .collect(),
        })
        .collect()
}

/// One day, rows = every class.
pub fn block_grid(
    day: u8,
    periods: &[Period],
    assignments: &AssignmentMap,
    roster: &Roster,
    current: Option<i64>,
) -> Vec<ClassRow> {
    roster
        .classes()
        .iter()
        .map(|class| ClassRow {
            class_id: class.id,
            class_name: class.name.clone(),
            cells: periods
                .iter()
                .map(|period| {
                    let highlight = is_current(period, current);
                    if !period.kind.is_lesson() {
                        return Cell::Badge {
                            kind: period.kind,
                            text: badge_word(period),
                            highlight,
                        };
                    }
                    match assignments.subject_at(SlotKey::new(day, class.id, period.period_index)) {
                        Some(subject_id) => Cell::Lesson {
                            subject_id,
                            subject: roster.subject_label(subject_id),
                            teacher: roster.resolve_teacher_label(class.id, subject_id),
                            highlight,
                        },
                        None => Cell::Empty {
                            text: SESSION_PLACEHOLDER,
                            highlight,
                        },
                    }
                })
                .collect(),
        })
        .collect()
}
