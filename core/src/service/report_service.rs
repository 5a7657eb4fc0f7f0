use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::NaiveDate;

use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::day::Day;
use crate::model::entity::Entity;
use crate::model::student::Student;
use crate::model::time_slot::TimeSlot;

/// Percentages under this are flagged in every report.
pub const ATTENDANCE_THRESHOLD: u32 = 75;

/// A whole-number percentage, rounded half up on the exact ratio. Float
/// rounding of `present / total * 100` can land one lower at representation
/// edges (29/200 gives 15 here).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Percentage(u32);

impl Percentage {
    pub fn of(present: u32, total: u32) -> Option<Percentage> {
        if total == 0 {
            return None;
        }
        let (present, total) = (u64::from(present), u64::from(total));
        Some(Percentage(((200 * present + total) / (2 * total)) as u32))
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    pub fn is_flagged(&self) -> bool {
        self.0 < ATTENDANCE_THRESHOLD
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tally {
    pub present: u32,
    pub total: u32,
}

impl Tally {
    fn count(&mut self, status: AttendanceStatus) {
        self.total += 1;
        if status.is_attended() {
            self.present += 1;
        }
    }

    fn absorb(&mut self, other: Tally) {
        self.present += other.present;
        self.total += other.total;
    }

    pub fn percentage(&self) -> Option<Percentage> {
        Percentage::of(self.present, self.total)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailyRow<'a> {
    pub student: &'a Student,
    /// Recorded periods only; a missing period has not been marked yet.
    pub statuses: BTreeMap<u32, AttendanceStatus>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailyMatrix<'a> {
    pub date: NaiveDate,
    pub periods: Vec<u32>,
    pub rows: Vec<DailyRow<'a>>,
}

impl DailyMatrix<'_> {
    pub fn status(&self, student_id: &str, period: u32) -> Option<AttendanceStatus> {
        self.rows
            .iter()
            .find(|row| row.student.id == student_id)
            .and_then(|row| row.statuses.get(&period).copied())
    }
}

/// Per-student, per-period statuses of one class on one date.
pub fn daily_matrix<'a>(
    students: &'a [Student],
    records: &[AttendanceRecord],
    time_slots: &[TimeSlot],
    class_id: &str,
    date: NaiveDate,
) -> DailyMatrix<'a> {
    let periods: Vec<u32> = time_slots.iter().map(|slot| slot.period).collect();

    let mut by_student: HashMap<&str, BTreeMap<u32, AttendanceStatus>> = HashMap::new();
    for record in records
        .iter()
        .filter(|r| r.date == date && r.entity_id == class_id && periods.contains(&r.period))
    {
        by_student
            .entry(record.student_id.as_str())
            .or_default()
            .insert(record.period, record.status);
    }

    let rows = students
        .iter()
        .filter(|s| s.class_id == class_id)
        .map(|student| DailyRow {
            student,
            statuses: by_student.remove(student.id.as_str()).unwrap_or_default(),
        })
        .collect();

    DailyMatrix { date, periods, rows }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StudentRollup<'a> {
    pub student: &'a Student,
    /// Aligned with `SubjectReport::subjects`.
    pub subjects: Vec<Tally>,
    pub overall: Tally,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubjectReport<'a> {
    /// Sorted, upper-cased subjects of the class's own timetable.
    pub subjects: Vec<String>,
    pub students: Vec<StudentRollup<'a>>,
    /// Class-wide tallies, aligned with `subjects`.
    pub class_subjects: Vec<Tally>,
    pub class_overall: Tally,
}

/// Subject-wise attendance of one class.
///
/// A record counts towards the subject the class timetable holds at the
/// record's weekday and period. Records on days or periods with no entry, or
/// whose subject is not among the class's columns, are left out. An unknown
/// class yields an empty report.
pub fn subject_rollup<'a>(
    entities: &[Entity],
    students: &'a [Student],
    records: &[AttendanceRecord],
    class_id: &str,
) -> SubjectReport<'a> {
    let class = entities.iter().find(|e| e.id == class_id);
    let subjects: Vec<String> = class
        .map(|c| c.schedule.subjects().into_iter().collect())
        .unwrap_or_default();
    let column: HashMap<&str, usize> = subjects
        .iter()
        .enumerate()
        .map(|(idx, subject)| (subject.as_str(), idx))
        .collect();

    let mut tallies: HashMap<&str, Vec<Tally>> = HashMap::new();
    if let Some(class) = class {
        for record in records.iter().filter(|r| r.entity_id == class_id) {
            let Some(day) = Day::of_date(record.date) else {
                continue;
            };
            let Some(entry) = class.schedule.get(day, record.period) else {
                continue;
            };
            let subject = entry.subject.trim().to_uppercase();
            let Some(&idx) = column.get(subject.as_str()) else {
                continue;
            };
            tallies
                .entry(record.student_id.as_str())
                .or_insert_with(|| vec![Tally::default(); subjects.len()])[idx]
                .count(record.status);
        }
    }

    let mut class_subjects = vec![Tally::default(); subjects.len()];
    let mut class_overall = Tally::default();

    let rollups: Vec<StudentRollup<'a>> = students
        .iter()
        .filter(|s| s.class_id == class_id)
        .map(|student| {
            let per_subject = tallies
                .remove(student.id.as_str())
                .unwrap_or_else(|| vec![Tally::default(); subjects.len()]);
            let mut overall = Tally::default();
            for (idx, tally) in per_subject.iter().enumerate() {
                overall.absorb(*tally);
                class_subjects[idx].absorb(*tally);
            }
            class_overall.absorb(overall);
            StudentRollup {
                student,
                subjects: per_subject,
                overall,
            }
        })
        .collect();

    SubjectReport {
        subjects,
        students: rollups,
        class_subjects,
        class_overall,
    }
}
