use serde::{Deserialize, Serialize};
use time::{macros::format_description, Time};

/// Serializes a `time::Time` as a wall-clock string (`08:40:00`).
pub mod clock_time {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};
    use time::{macros::format_description, Time};

    pub fn serialize<S: Serializer>(t: &Time, s: S) -> Result<S::Ok, S::Error> {
        let text = t
            .format(format_description!("[hour]:[minute]:[second]"))
            .map_err(serde::ser::Error::custom)?;
        s.serialize_str(&text)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Time, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_clock_time(&raw)
            .ok_or_else(|| D::Error::custom(format!("invalid clock time: {raw}")))
    }
}

/// Parses an upstream wall-clock string. Accepts `HH:MM:SS` and `HH:MM`.
pub fn parse_clock_time(raw: &str) -> Option<Time> {
    let raw = raw.trim();
    Time::parse(raw, format_description!("[hour]:[minute]:[second]"))
        .or_else(|_| Time::parse(raw, format_description!("[hour]:[minute]")))
        .ok()
}

/// The two list shapes the school API returns: a bare array, or a DRF-style
/// page with a `next` link.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Page<T> {
    Paged {
        results: Vec<T>,
        #[serde(default)]
        next: Option<String>,
    },
    Bare(Vec<T>),
}

impl<T> Page<T> {
    pub fn into_parts(self) -> (Vec<T>, Option<String>) {
        match self {
            Page::Paged { results, next } => (results, next.filter(|n| !n.is_empty())),
            Page::Bare(items) => (items, None),
        }
    }
}

/// An id that the API sometimes sends inline and sometimes as a nested
/// object (`{"id": 3, ...}`).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IdRef {
    Id(i64),
    Object { id: i64 },
}

impl IdRef {
    pub fn id(&self) -> i64 {
        match self {
            IdRef::Id(id) | IdRef::Object { id } => *id,
        }
    }
}

/// Why part of a response is empty even though data may exist upstream.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Degraded {
    pub resource: String,
    pub error: String,
}

impl Degraded {
    pub fn new(resource: impl Into<String>, error: impl ToString) -> Self {
        Self {
            resource: resource.into(),
            error: error.to_string(),
        }
    }
}
