use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::assignment::AssignmentMap;
use super::common::{clock_time, parse_clock_time, IdRef};

pub const DEFAULT_DAYS: [u8; 5] = [1, 2, 3, 4, 5];

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct TermDetail {
    pub name: String,
    pub number: Option<i64>,
    pub academic_year_label: Option<String>,
}

/// A named timetable configuration tied to an academic term.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TimetablePlan {
    pub id: i64,
    pub name: String,
    pub template: Option<i64>,
    pub term_detail: Option<TermDetail>,
}

/// Plan detail as returned by `/plans/{id}/`. `block_assignments` is `None`
/// when the server has never stored any.
#[derive(Debug, Clone)]
pub struct PlanDetail {
    pub plan: TimetablePlan,
    pub block_assignments: Option<AssignmentMap>,
}

/// Weekly structure of a plan: which weekdays (1 = Mon .. 7 = Sun) are taught.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TimetableTemplate {
    pub id: i64,
    pub days_active: Vec<u8>,
}

impl TimetableTemplate {
    /// Active days in ascending order, restricted to 1..=7. Falls back to
    /// Mon-Fri when nothing usable is configured.
    pub fn effective_days(&self) -> Vec<u8> {
        effective_days(Some(self.days_active.as_slice()))
    }
}

pub fn effective_days(days_active: Option<&[u8]>) -> Vec<u8> {
    let mut days: Vec<u8> = days_active
        .unwrap_or_default()
        .iter()
        .copied()
        .filter(|d| (1..=7).contains(d))
        .collect();
    days.sort_unstable();
    days.dedup();
    if days.is_empty() {
        DEFAULT_DAYS.to_vec()
    } else {
        days
    }
}

pub fn day_label(day: u8) -> &'static str {
    match day {
        1 => "Mon",
        2 => "Tue",
        3 => "Wed",
        4 => "Thu",
        5 => "Fri",
        6 => "Sat",
        7 => "Sun",
        _ => "",
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PeriodKind {
    Lesson,
    Break,
    Lunch,
}

impl PeriodKind {
    pub fn is_lesson(self) -> bool {
        matches!(self, PeriodKind::Lesson)
    }

    /// Word spelled across the weekdays by the class-view badges.
    pub fn badge_word(self) -> &'static str {
        match self {
            PeriodKind::Lesson => "",
            PeriodKind::Break => "BREAK",
            PeriodKind::Lunch => "LUNCH",
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Period {
    pub period_index: i64,
    pub kind: PeriodKind,
    pub label: Option<String>,
    #[serde(with = "clock_time")]
    pub start_time: time::Time,
    #[serde(with = "clock_time")]
    pub end_time: time::Time,
}

// -- Wire shapes --

#[derive(Debug, Deserialize)]
pub struct RawTermDetail {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub number: Option<i64>,
    #[serde(default)]
    pub academic_year_label: Option<String>,
    /// Nested year record or bare FK id; only a nested record yields a label.
    #[serde(default)]
    pub academic_year: Option<serde_json::Value>,
}

impl From<RawTermDetail> for TermDetail {
    fn from(raw: RawTermDetail) -> Self {
        let nested_label = match raw.academic_year {
            Some(serde_json::Value::String(s)) => Some(s),
            Some(serde_json::Value::Object(o)) => o
                .get("label")
                .or_else(|| o.get("name"))
                .and_then(|v| v.as_str())
                .map(str::to_string),
            _ => None,
        };
        TermDetail {
            name: raw.name.unwrap_or_default(),
            number: raw.number,
            academic_year_label: raw
                .academic_year_label
                .filter(|l| !l.trim().is_empty())
                .or(nested_label),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RawPlan {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub template: Option<IdRef>,
    /// FK of the term; the readable copy travels in `term_detail`.
    #[serde(default)]
    pub term: Option<IdRef>,
    #[serde(default)]
    pub term_detail: Option<RawTermDetail>,
    #[serde(default)]
    pub block_assignments: Option<BTreeMap<String, serde_json::Value>>,
}

impl From<RawPlan> for PlanDetail {
    fn from(raw: RawPlan) -> Self {
        let block_assignments = raw
            .block_assignments
            .map(AssignmentMap::from_wire_entries);
        PlanDetail {
            plan: TimetablePlan {
                id: raw.id,
                name: raw.name.unwrap_or_default(),
                template: raw.template.map(|t| t.id()),
                term_detail: raw.term_detail.map(TermDetail::from),
            },
            block_assignments,
        }
    }
}

impl From<RawPlan> for TimetablePlan {
    fn from(raw: RawPlan) -> Self {
        PlanDetail::from(raw).plan
    }
}

#[derive(Debug, Deserialize)]
pub struct RawTemplate {
    pub id: i64,
    #[serde(default)]
    pub days_active: Option<Vec<i64>>,
}

impl From<RawTemplate> for TimetableTemplate {
    fn from(raw: RawTemplate) -> Self {
        TimetableTemplate {
            id: raw.id,
            days_active: raw
                .days_active
                .unwrap_or_default()
                .into_iter()
                .filter_map(|d| u8::try_from(d).ok())
                .collect(),
        }
    }
}

/// Period as served. Older endpoints spell the fields `index`/`order`,
/// `name` and `start`/`end`, sometimes next to the current names.
#[derive(Debug, Deserialize)]
pub struct RawPeriod {
    #[serde(default)]
    pub period_index: Option<i64>,
    #[serde(default)]
    pub index: Option<i64>,
    #[serde(default)]
    pub order: Option<i64>,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
}

impl RawPeriod {
    /// Normalizes a period. Periods without an index or with unreadable
    /// times are dropped.
    pub fn normalize(self) -> Option<Period> {
        let period_index = self.period_index.or(self.index).or(self.order)?;
        let start_time = parse_clock_time(self.start_time.as_deref().or(self.start.as_deref())?)?;
        let end_time = parse_clock_time(self.end_time.as_deref().or(self.end.as_deref())?)?;
        let kind = match self.kind.as_deref().map(str::to_ascii_lowercase).as_deref() {
            Some("break") => PeriodKind::Break,
            Some("lunch") => PeriodKind::Lunch,
            _ => PeriodKind::Lesson,
        };
        let non_blank = |l: &String| !l.trim().is_empty();
        Some(Period {
            period_index,
            kind,
            label: self.label.filter(non_blank).or(self.name.filter(non_blank)),
            start_time,
            end_time,
        })
    }
}
