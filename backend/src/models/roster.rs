use serde::{Deserialize, Serialize};

use super::common::IdRef;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Subject {
    pub id: i64,
    pub code: String,
    pub name: String,
}

impl Subject {
    /// Short label for a grid cell: the code, or the name when there is none.
    pub fn short_label(&self) -> &str {
        if self.code.trim().is_empty() {
            &self.name
        } else {
            &self.code
        }
    }
}

/// Someone who teaches. `user_id` is the account id, which some endpoints use
/// instead of the teacher record id.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TeacherDetail {
    pub id: Option<i64>,
    pub user_id: Option<i64>,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
}

impl TeacherDetail {
    /// `"{first} {last}"`, or the username when both names are blank.
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }

    pub fn matches(&self, teacher: &TeacherRef) -> bool {
        (teacher.id.is_some() && self.id == teacher.id)
            || (teacher.user_id.is_some() && self.user_id == teacher.user_id)
    }
}

/// Identity used to look up a teacher's slots: either id may be known.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TeacherRef {
    pub id: Option<i64>,
    pub user_id: Option<i64>,
}

impl From<&TeacherDetail> for TeacherRef {
    fn from(t: &TeacherDetail) -> Self {
        TeacherRef {
            id: t.id,
            user_id: t.user_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Class {
    pub id: i64,
    pub name: String,
    pub grade_level: Option<String>,
    pub subjects: Vec<Subject>,
    pub class_teacher_detail: Option<TeacherDetail>,
}

impl Class {
    /// Fields present on the detail record replace those of the list entry.
    pub fn merge_detail(self, detail: Class) -> Class {
        Class {
            id: self.id,
            name: if detail.name.is_empty() {
                self.name
            } else {
                detail.name
            },
            grade_level: detail.grade_level.or(self.grade_level),
            subjects: if detail.subjects.is_empty() {
                self.subjects
            } else {
                detail.subjects
            },
            class_teacher_detail: detail.class_teacher_detail.or(self.class_teacher_detail),
        }
    }
}

/// `(class, subject) -> teacher` row.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ClassSubjectTeacher {
    pub class_id: i64,
    pub subject: Subject,
    pub teacher: Option<TeacherDetail>,
}

/// Entry of the teacher picker.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TeacherOption {
    pub id: i64,
    pub user_id: Option<i64>,
    pub name: String,
}

// -- Wire shapes --

#[derive(Debug, Default, Deserialize)]
pub struct RawUser {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawTeacher {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub user: Option<RawUserRef>,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
}

/// `user` is either an id or a nested account object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawUserRef {
    Id(i64),
    Object(RawUser),
}

impl From<RawTeacher> for TeacherDetail {
    fn from(raw: RawTeacher) -> Self {
        let (user_id, user) = match raw.user {
            Some(RawUserRef::Id(id)) => (Some(id), RawUser::default()),
            Some(RawUserRef::Object(u)) => (u.id, u),
            None => (None, RawUser::default()),
        };
        let pick = |own: Option<String>, nested: Option<String>| {
            own.filter(|s| !s.trim().is_empty())
                .or(nested)
                .unwrap_or_default()
        };
        let mut first_name = pick(raw.first_name, user.first_name);
        let mut last_name = pick(raw.last_name, user.last_name);
        if first_name.trim().is_empty() && last_name.trim().is_empty() {
            if let Some(full) = raw.full_name.filter(|f| !f.trim().is_empty()) {
                let mut parts = full.trim().splitn(2, ' ');
                first_name = parts.next().unwrap_or_default().to_string();
                last_name = parts.next().unwrap_or_default().trim().to_string();
            }
        }
        TeacherDetail {
            id: raw.id,
            user_id: user_id.or(raw.user_id),
            first_name,
            last_name,
            username: pick(raw.username, user.username),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawSubjectRef {
    Id(i64),
    Object(RawSubject),
}

#[derive(Debug, Deserialize)]
pub struct RawSubject {
    pub id: i64,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl From<RawSubjectRef> for Subject {
    fn from(raw: RawSubjectRef) -> Self {
        match raw {
            RawSubjectRef::Id(id) => Subject {
                id,
                code: String::new(),
                name: String::new(),
            },
            RawSubjectRef::Object(s) => Subject {
                id: s.id,
                code: s.code.unwrap_or_default(),
                name: s.name.unwrap_or_default(),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RawClass {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub grade_level: Option<serde_json::Value>,
    #[serde(default)]
    pub subjects: Option<Vec<RawSubjectRef>>,
    #[serde(default)]
    pub class_teacher_detail: Option<RawTeacher>,
    #[serde(default)]
    pub class_teacher: Option<IdRef>,
}

impl From<RawClass> for Class {
    fn from(raw: RawClass) -> Self {
        let grade_level = match raw.grade_level {
            Some(serde_json::Value::String(s)) => Some(s),
            Some(serde_json::Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };
        let class_teacher_detail = raw.class_teacher_detail.map(TeacherDetail::from).or_else(|| {
            raw.class_teacher.map(|t| TeacherDetail {
                id: Some(t.id()),
                user_id: None,
                first_name: String::new(),
                last_name: String::new(),
                username: String::new(),
            })
        });
        Class {
            id: raw.id,
            name: raw.name.unwrap_or_default(),
            grade_level,
            subjects: raw
                .subjects
                .unwrap_or_default()
                .into_iter()
                .map(Subject::from)
                .collect(),
            class_teacher_detail,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RawClassSubjectTeacher {
    pub klass: IdRef,
    pub subject: RawSubjectRef,
    #[serde(default)]
    pub subject_detail: Option<RawSubject>,
    #[serde(default)]
    pub teacher: Option<IdRef>,
    #[serde(default)]
    pub teacher_detail: Option<RawTeacher>,
}

impl From<RawClassSubjectTeacher> for ClassSubjectTeacher {
    fn from(raw: RawClassSubjectTeacher) -> Self {
        let subject = match (raw.subject, raw.subject_detail) {
            (_, Some(detail)) => Subject::from(RawSubjectRef::Object(detail)),
            (subject, None) => Subject::from(subject),
        };
        let teacher = match (raw.teacher_detail, raw.teacher) {
            (Some(detail), teacher) => {
                let mut t = TeacherDetail::from(detail);
                t.id = t.id.or(teacher.map(|r| r.id()));
                Some(t)
            }
            (None, Some(teacher)) => Some(TeacherDetail {
                id: Some(teacher.id()),
                user_id: None,
                first_name: String::new(),
                last_name: String::new(),
                username: String::new(),
            }),
            (None, None) => None,
        };
        ClassSubjectTeacher {
            class_id: raw.klass.id(),
            subject,
            teacher,
        }
    }
}
