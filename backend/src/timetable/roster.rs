use std::collections::HashMap;

use crate::models::{
    assignment::{AssignmentMap, SlotKey},
    roster::{Class, ClassSubjectTeacher, Subject, TeacherDetail, TeacherRef},
};

/// Joins classes, subjects and subject teachers so slots can be labelled.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    classes: Vec<Class>,
    subjects: HashMap<i64, Subject>,
    teachers: HashMap<(i64, i64), TeacherDetail>,
}

impl Roster {
    pub fn new(classes: Vec<Class>, mappings: Vec<ClassSubjectTeacher>) -> Self {
        let mut subjects = HashMap::new();
        for subject in classes.iter().flat_map(|c| c.subjects.iter()) {
            subjects.entry(subject.id).or_insert_with(|| subject.clone());
        }

        let mut teachers = HashMap::new();
        for m in mappings {
            let known = subjects.get(&m.subject.id);
            if known.map_or(true, |s: &Subject| s.short_label().is_empty()) {
                subjects.insert(m.subject.id, m.subject.clone());
            }
            if let Some(teacher) = m.teacher {
                teachers.insert((m.class_id, m.subject.id), teacher);
            }
        }

        Self {
            classes,
            subjects,
            teachers,
        }
    }

    pub fn classes(&self) -> &[Class] {
        &self.classes
    }

    pub fn class(&self, id: i64) -> Option<&Class> {
        self.classes.iter().find(|c| c.id == id)
    }

    pub fn subject(&self, id: i64) -> Option<&Subject> {
        self.subjects.get(&id)
    }

    /// Subject code (or name); empty when the subject is unknown.
    pub fn subject_label(&self, id: i64) -> String {
        self.subject(id)
            .map(|s| s.short_label().to_string())
            .unwrap_or_default()
    }

    pub fn teacher_for(&self, class_id: i64, subject_id: i64) -> Option<&TeacherDetail> {
        self.teachers.get(&(class_id, subject_id))
    }

    /// Display name of whoever teaches `subject_id` in `class_id`, or `""`.
    pub fn resolve_teacher_label(&self, class_id: i64, subject_id: i64) -> String {
        self.teacher_for(class_id, subject_id)
            .map(TeacherDetail::display_name)
            .unwrap_or_default()
    }

    /// Whether `teacher` takes this class for this subject. Without an
    /// explicit subject teacher, the class teacher is assumed to teach it.
    pub fn teaches(&self, teacher: &TeacherRef, class_id: i64, subject_id: i64) -> bool {
        match self.teacher_for(class_id, subject_id) {
            Some(t) => t.matches(teacher),
            None => self
                .class(class_id)
                .and_then(|c| c.class_teacher_detail.as_ref())
                .is_some_and(|t| t.matches(teacher)),
        }
    }

    /// Every `"{class} — {subject}"` the teacher has at this day and period,
    /// in class order. Double bookings all show up.
    pub fn find_slots_for_teacher(
        &self,
        assignments: &AssignmentMap,
        teacher: &TeacherRef,
        day: u8,
        period_index: i64,
    ) -> Vec<String> {
        self.classes
            .iter()
            .filter_map(|class| {
                let subject_id = assignments.subject_at(SlotKey::new(day, class.id, period_index))?;
                self.teaches(teacher, class.id, subject_id).then(|| {
                    format!("{} — {}", class.name, self.subject_label(subject_id))
                })
            })
            .collect()
    }
}
