use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    Excused,
    Unmarked,
}

impl AttendanceStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "present" => Some(AttendanceStatus::Present),
            "absent" => Some(AttendanceStatus::Absent),
            "late" => Some(AttendanceStatus::Late),
            "excused" => Some(AttendanceStatus::Excused),
            "unmarked" => Some(AttendanceStatus::Unmarked),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
            AttendanceStatus::Late => "late",
            AttendanceStatus::Excused => "excused",
            AttendanceStatus::Unmarked => "unmarked",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub status: AttendanceStatus,
    pub note: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub date: String,
    pub record: AttendanceRecord,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceHistory {
    pub present: usize,
    pub absent: usize,
    pub late: usize,
    pub excused: usize,
    pub entries: Vec<HistoryEntry>,
}

/// Per-day attendance, keyed date -> class -> student. Date keys use the
/// canonical `YYYY-MM-DD` form, so the BTreeMap order is chronological.
/// Records are only ever superseded, never deleted.
#[derive(Debug, Default)]
pub struct AttendanceLedger {
    days: BTreeMap<String, HashMap<String, HashMap<String, AttendanceRecord>>>,
}

impl AttendanceLedger {
    /// Upsert; the last mark for a (date, class, student) triple wins.
    pub fn mark(&mut self, date: &str, class_id: &str, student_id: &str, record: AttendanceRecord) {
        self.days
            .entry(date.to_string())
            .or_default()
            .entry(class_id.to_string())
            .or_default()
            .insert(student_id.to_string(), record);
    }

    /// Records for one class on one date. Empty for anything unrecorded.
    pub fn day<'a>(
        &'a self,
        date: &str,
        class_id: &str,
    ) -> impl Iterator<Item = (&'a str, &'a AttendanceRecord)> {
        self.days
            .get(date)
            .and_then(|classes| classes.get(class_id))
            .into_iter()
            .flatten()
            .map(|(student_id, record)| (student_id.as_str(), record))
    }

    /// Students with no record on that day count toward no status.
    pub fn count_by_status(&self, date: &str, class_id: &str, status: AttendanceStatus) -> usize {
        self.day(date, class_id)
            .filter(|(_, record)| record.status == status)
            .count()
    }

    /// Full marked history for one (student, class) pair, newest date first.
    /// Dates where the class was taken but this student has no record are
    /// skipped entirely rather than counted as absent.
    pub fn history_for(&self, student_id: &str, class_id: &str) -> AttendanceHistory {
        let mut history = AttendanceHistory::default();
        for (date, classes) in self.days.iter().rev() {
            let Some(record) = classes
                .get(class_id)
                .and_then(|students| students.get(student_id))
            else {
                continue;
            };
            match record.status {
                AttendanceStatus::Present => history.present += 1,
                AttendanceStatus::Absent => history.absent += 1,
                AttendanceStatus::Late => history.late += 1,
                AttendanceStatus::Excused => history.excused += 1,
                AttendanceStatus::Unmarked => {}
            }
            history.entries.push(HistoryEntry {
                date: date.clone(),
                record: record.clone(),
            });
        }
        history
    }
}
