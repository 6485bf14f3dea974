use std::collections::{HashMap, VecDeque};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calendar::CalendarEvent;

pub const DEFAULT_ACTIVITY_LIMIT: usize = 10;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teacher_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_id: Option<String>,
    pub status: String,
    pub progress: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_id: Option<String>,
    pub due_date: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub from: String,
    pub to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub body: String,
    pub sent_at: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemorizationEntry {
    pub surah: String,
    pub ayahs_done: u32,
    pub ayahs_total: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub text: String,
    pub time: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_teachers: usize,
    pub total_classes: usize,
    pub total_students: usize,
    pub active_students: usize,
    pub avg_progress: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub subject: Option<String>,
    pub phone: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassPatch {
    pub name: Option<String>,
    pub subject: Option<String>,
    pub teacher_id: Option<String>,
    pub room: Option<String>,
    pub schedule: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub parent_email: Option<String>,
    pub class_id: Option<String>,
    pub status: Option<String>,
    pub progress: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentPatch {
    pub title: Option<String>,
    pub class_id: Option<String>,
    pub due_date: Option<String>,
    pub status: Option<String>,
    pub points: Option<f64>,
}

/// Authoritative in-memory collections for the school roster plus the
/// dashboard side-channels (events, assignments, messages, memorization,
/// activity feed). One instance lives in `AppState` for the process lifetime.
#[derive(Debug)]
pub struct Store {
    teachers: Vec<Teacher>,
    classes: Vec<Class>,
    students: Vec<Student>,
    events: Vec<CalendarEvent>,
    assignments: Vec<Assignment>,
    messages: Vec<Message>,
    memorization: HashMap<String, Vec<MemorizationEntry>>,
    activity: VecDeque<ActivityEntry>,
    activity_limit: usize,
}

impl Store {
    pub fn new() -> Self {
        Store {
            teachers: Vec::new(),
            classes: Vec::new(),
            students: Vec::new(),
            events: Vec::new(),
            assignments: Vec::new(),
            messages: Vec::new(),
            memorization: HashMap::new(),
            activity: VecDeque::new(),
            activity_limit: DEFAULT_ACTIVITY_LIMIT,
        }
    }

    pub fn teachers(&self) -> &[Teacher] {
        &self.teachers
    }

    pub fn classes(&self) -> &[Class] {
        &self.classes
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn events(&self) -> &[CalendarEvent] {
        &self.events
    }

    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn teacher_exists(&self, id: &str) -> bool {
        self.teachers.iter().any(|t| t.id == id)
    }

    pub fn class_exists(&self, id: &str) -> bool {
        self.classes.iter().any(|c| c.id == id)
    }

    pub fn student_exists(&self, id: &str) -> bool {
        self.students.iter().any(|s| s.id == id)
    }

    pub fn student_count_for_class(&self, class_id: &str) -> usize {
        self.students
            .iter()
            .filter(|s| s.class_id.as_deref() == Some(class_id))
            .count()
    }

    pub fn add_teacher(&mut self, mut teacher: Teacher) -> String {
        if teacher.id.is_empty() {
            teacher.id = Uuid::new_v4().to_string();
        }
        self.log_activity(format!("New teacher {} added", teacher.name), "teacher");
        let id = teacher.id.clone();
        self.teachers.push(teacher);
        id
    }

    pub fn update_teacher(&mut self, id: &str, patch: TeacherPatch) -> bool {
        let Some(teacher) = self.teachers.iter_mut().find(|t| t.id == id) else {
            return false;
        };
        if let Some(v) = patch.name {
            teacher.name = v;
        }
        if patch.email.is_some() {
            teacher.email = patch.email;
        }
        if patch.subject.is_some() {
            teacher.subject = patch.subject;
        }
        if patch.phone.is_some() {
            teacher.phone = patch.phone;
        }
        if let Some(v) = patch.status {
            teacher.status = v;
        }
        true
    }

    pub fn remove_teacher(&mut self, id: &str) -> bool {
        let before = self.teachers.len();
        self.teachers.retain(|t| t.id != id);
        self.teachers.len() != before
    }

    pub fn add_class(&mut self, mut class: Class) -> String {
        if class.id.is_empty() {
            class.id = Uuid::new_v4().to_string();
        }
        self.log_activity(format!("Class {} created", class.name), "class");
        let id = class.id.clone();
        self.classes.push(class);
        id
    }

    pub fn update_class(&mut self, id: &str, patch: ClassPatch) -> bool {
        let Some(class) = self.classes.iter_mut().find(|c| c.id == id) else {
            return false;
        };
        if let Some(v) = patch.name {
            class.name = v;
        }
        if patch.subject.is_some() {
            class.subject = patch.subject;
        }
        if patch.teacher_id.is_some() {
            class.teacher_id = patch.teacher_id;
        }
        if patch.room.is_some() {
            class.room = patch.room;
        }
        if patch.schedule.is_some() {
            class.schedule = patch.schedule;
        }
        true
    }

    pub fn remove_class(&mut self, id: &str) -> bool {
        let before = self.classes.len();
        self.classes.retain(|c| c.id != id);
        self.classes.len() != before
    }

    pub fn add_student(&mut self, mut student: Student) -> String {
        if student.id.is_empty() {
            student.id = Uuid::new_v4().to_string();
        }
        self.log_activity(format!("New student {} enrolled", student.name), "student");
        let id = student.id.clone();
        self.students.push(student);
        id
    }

    pub fn update_student(&mut self, id: &str, patch: StudentPatch) -> bool {
        let Some(student) = self.students.iter_mut().find(|s| s.id == id) else {
            return false;
        };
        if let Some(v) = patch.name {
            student.name = v;
        }
        if patch.email.is_some() {
            student.email = patch.email;
        }
        if patch.parent_email.is_some() {
            student.parent_email = patch.parent_email;
        }
        if patch.class_id.is_some() {
            student.class_id = patch.class_id;
        }
        if let Some(v) = patch.status {
            student.status = v;
        }
        if let Some(v) = patch.progress {
            student.progress = v;
        }
        true
    }

    pub fn remove_student(&mut self, id: &str) -> bool {
        let before = self.students.len();
        self.students.retain(|s| s.id != id);
        self.students.len() != before
    }

    pub fn add_event(&mut self, mut event: CalendarEvent) -> String {
        if event.id.is_empty() {
            event.id = Uuid::new_v4().to_string();
        }
        self.log_activity(format!("Event {} scheduled", event.title), "event");
        let id = event.id.clone();
        self.events.push(event);
        id
    }

    pub fn remove_event(&mut self, id: &str) -> bool {
        let before = self.events.len();
        self.events.retain(|e| e.id != id);
        self.events.len() != before
    }

    pub fn add_assignment(&mut self, mut assignment: Assignment) -> String {
        if assignment.id.is_empty() {
            assignment.id = Uuid::new_v4().to_string();
        }
        self.log_activity(
            format!("Assignment {} posted", assignment.title),
            "assignment",
        );
        let id = assignment.id.clone();
        self.assignments.push(assignment);
        id
    }

    pub fn update_assignment(&mut self, id: &str, patch: AssignmentPatch) -> bool {
        let Some(assignment) = self.assignments.iter_mut().find(|a| a.id == id) else {
            return false;
        };
        if let Some(v) = patch.title {
            assignment.title = v;
        }
        if patch.class_id.is_some() {
            assignment.class_id = patch.class_id;
        }
        if let Some(v) = patch.due_date {
            assignment.due_date = v;
        }
        if let Some(v) = patch.status {
            assignment.status = v;
        }
        if patch.points.is_some() {
            assignment.points = patch.points;
        }
        true
    }

    pub fn remove_assignment(&mut self, id: &str) -> bool {
        let before = self.assignments.len();
        self.assignments.retain(|a| a.id != id);
        self.assignments.len() != before
    }

    pub fn add_message(&mut self, mut message: Message) -> String {
        if message.id.is_empty() {
            message.id = Uuid::new_v4().to_string();
        }
        self.log_activity(format!("New message from {}", message.from), "message");
        let id = message.id.clone();
        self.messages.push(message);
        id
    }

    /// Upserts one surah row for a student, keyed by surah name.
    pub fn set_memorization(&mut self, student_id: &str, entry: MemorizationEntry) {
        let rows = self.memorization.entry(student_id.to_string()).or_default();
        if let Some(existing) = rows.iter_mut().find(|e| e.surah == entry.surah) {
            *existing = entry;
        } else {
            rows.push(entry);
        }
    }

    pub fn memorization_for(&self, student_id: &str) -> &[MemorizationEntry] {
        self.memorization
            .get(student_id)
            .map(|rows| rows.as_slice())
            .unwrap_or(&[])
    }

    /// Derived counts, recomputed from the live collections on every call.
    pub fn stats(&self) -> Stats {
        let total_students = self.students.len();
        let active_students = self
            .students
            .iter()
            .filter(|s| s.status == "active")
            .count();
        let avg_progress = if total_students == 0 {
            0.0
        } else {
            self.students.iter().map(|s| s.progress).sum::<f64>() / total_students as f64
        };
        Stats {
            total_teachers: self.teachers.len(),
            total_classes: self.classes.len(),
            total_students,
            active_students,
            avg_progress,
        }
    }

    pub fn set_activity_limit(&mut self, limit: usize) {
        self.activity_limit = limit;
        self.activity.truncate(limit);
    }

    fn log_activity(&mut self, text: String, kind: &str) {
        self.activity.push_front(ActivityEntry {
            text,
            time: "Just now".to_string(),
            kind: kind.to_string(),
            timestamp: Utc::now().timestamp_millis(),
        });
        self.activity.truncate(self.activity_limit);
    }

    /// Newest first.
    pub fn recent_activity(&self) -> impl Iterator<Item = &ActivityEntry> {
        self.activity.iter()
    }
}

impl Default for Store {
    fn default() -> Self {
        Store::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(id: &str, status: &str, progress: f64) -> Student {
        Student {
            id: id.to_string(),
            name: format!("Student {}", id),
            email: None,
            parent_email: None,
            class_id: None,
            status: status.to_string(),
            progress,
        }
    }

    #[test]
    fn stats_track_collection_lengths() {
        let mut store = Store::new();
        assert_eq!(store.stats().total_students, 0);

        store.add_student(student("S1", "active", 85.0));
        store.add_student(student("S2", "inactive", 55.0));
        let stats = store.stats();
        assert_eq!(stats.total_students, 2);
        assert_eq!(stats.active_students, 1);
        assert!((stats.avg_progress - 70.0).abs() < 1e-9);

        assert!(store.remove_student("S1"));
        let stats = store.stats();
        assert_eq!(stats.total_students, 1);
        assert_eq!(stats.active_students, 0);
    }

    #[test]
    fn remove_unknown_id_reports_miss() {
        let mut store = Store::new();
        store.add_student(student("S1", "active", 10.0));
        assert!(!store.remove_student("nope"));
        assert_eq!(store.stats().total_students, 1);
        assert!(!store.update_student("nope", StudentPatch::default()));
    }

    #[test]
    fn update_merges_only_present_fields() {
        let mut store = Store::new();
        store.add_student(student("S1", "active", 40.0));
        let ok = store.update_student(
            "S1",
            StudentPatch {
                progress: Some(90.0),
                ..Default::default()
            },
        );
        assert!(ok);
        let s = &store.students()[0];
        assert_eq!(s.status, "active");
        assert!((s.progress - 90.0).abs() < 1e-9);
        assert_eq!(s.name, "Student S1");
    }

    #[test]
    fn add_assigns_fresh_id_when_absent() {
        let mut store = Store::new();
        let mut s = student("", "active", 0.0);
        s.name = "Aisha".to_string();
        let id = store.add_student(s);
        assert!(!id.is_empty());
        assert!(store.student_exists(&id));
    }

    #[test]
    fn activity_feed_keeps_most_recent_newest_first() {
        let mut store = Store::new();
        for i in 0..12 {
            store.add_student(student(&format!("S{}", i), "active", 0.0));
        }
        let texts: Vec<&str> = store
            .recent_activity()
            .map(|e| e.text.as_str())
            .collect();
        assert_eq!(texts.len(), DEFAULT_ACTIVITY_LIMIT);
        assert_eq!(texts[0], "New student Student S11 enrolled");
        assert_eq!(texts[9], "New student Student S2 enrolled");
    }

    #[test]
    fn memorization_upserts_by_surah() {
        let mut store = Store::new();
        store.set_memorization(
            "S1",
            MemorizationEntry {
                surah: "Al-Fatihah".to_string(),
                ayahs_done: 3,
                ayahs_total: 7,
            },
        );
        store.set_memorization(
            "S1",
            MemorizationEntry {
                surah: "Al-Fatihah".to_string(),
                ayahs_done: 7,
                ayahs_total: 7,
            },
        );
        let rows = store.memorization_for("S1");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].ayahs_done, 7);
        assert!(store.memorization_for("S2").is_empty());
    }
}
