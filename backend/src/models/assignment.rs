use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use serde_json::{json, Value};

/// `(day, class, period)` coordinate of a slot. Travels as
/// `"{day}-{classId}-{periodIndex}"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotKey {
    pub day: u8,
    pub class_id: i64,
    pub period_index: i64,
}

impl SlotKey {
    pub fn new(day: u8, class_id: i64, period_index: i64) -> Self {
        Self {
            day,
            class_id,
            period_index,
        }
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.day, self.class_id, self.period_index)
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
#[error("malformed slot key: {0:?}")]
pub struct SlotKeyError(pub String);

impl FromStr for SlotKey {
    type Err = SlotKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || SlotKeyError(s.to_string());
        let mut parts = s.split('-');
        let (Some(day), Some(class_id), Some(period_index), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(bad());
        };
        let day: u8 = day.trim().parse().map_err(|_| bad())?;
        if !(1..=7).contains(&day) {
            return Err(bad());
        }
        Ok(SlotKey {
            day,
            class_id: class_id.trim().parse().map_err(|_| bad())?,
            period_index: period_index.trim().parse().map_err(|_| bad())?,
        })
    }
}

/// "This class has this subject during this day/period." Missing keys are
/// unassigned slots.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssignmentMap {
    slots: BTreeMap<SlotKey, i64>,
}

impl AssignmentMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: SlotKey, subject_id: i64) {
        self.slots.insert(key, subject_id);
    }

    pub fn subject_at(&self, key: SlotKey) -> Option<i64> {
        self.slots.get(&key).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Builds the map from the JSON object form. Entries with a malformed key
    /// or without a subject id are skipped.
    pub fn from_wire_entries(entries: BTreeMap<String, Value>) -> Self {
        let mut map = AssignmentMap::new();
        for (raw_key, value) in entries {
            let key = match raw_key.parse::<SlotKey>() {
                Ok(key) => key,
                Err(e) => {
                    tracing::warn!("Skipping slot assignment: {}", e);
                    continue;
                }
            };
            match wire_subject_id(&value) {
                Some(subject_id) => map.insert(key, subject_id),
                None => tracing::debug!("Slot {} has no subject", key),
            }
        }
        map
    }

    pub fn to_wire(&self) -> BTreeMap<String, Value> {
        self.slots
            .iter()
            .map(|(k, subject)| (k.to_string(), json!({ "subjectId": subject })))
            .collect()
    }
}

impl Serialize for AssignmentMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_wire().serialize(serializer)
    }
}

fn wire_subject_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::Object(o) => ["subjectId", "subject_id", "subject"]
            .iter()
            .find_map(|field| o.get(*field))
            .and_then(|v| match v {
                Value::Number(n) => n.as_i64(),
                Value::String(s) => s.parse().ok(),
                Value::Object(inner) => inner.get("id").and_then(Value::as_i64),
                _ => None,
            }),
        _ => None,
    }
}
