use std::collections::HashMap;

use chrono::NaiveDate;

use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::day::Day;
use crate::model::entity::{Entity, EntityKind};
use crate::model::student::Student;
use crate::resolver;

/// Inserts `incoming`, replacing any stored record with the same key.
pub fn upsert(records: &mut Vec<AttendanceRecord>, incoming: Vec<AttendanceRecord>) {
    records.retain(|existing| !incoming.iter().any(|new| new.same_key(existing)));
    for record in incoming {
        // A batch may repeat a key; the later entry wins.
        if let Some(pos) = records.iter().position(|r| r.same_key(&record)) {
            records[pos] = record;
        } else {
            records.push(record);
        }
    }
}

pub fn records_for_period<'a>(
    records: &'a [AttendanceRecord],
    date: NaiveDate,
    entity_id: &str,
    period: u32,
) -> Vec<&'a AttendanceRecord> {
    records
        .iter()
        .filter(|r| r.date == date && r.entity_id == entity_id && r.period == period)
        .collect()
}

/// The class whose register a slot belongs to. For a class that is the
/// entity itself; for a teacher it is the class named by the slot.
pub fn resolve_register_class<'a>(
    entities: &'a [Entity],
    entity_id: &str,
    day: Day,
    period: u32,
) -> Option<&'a Entity> {
    let root = entities.iter().find(|e| e.id == entity_id)?;
    match root.kind {
        EntityKind::Class => Some(root),
        EntityKind::Teacher => {
            let code = root.schedule.get(day, period)?.teacher_or_class.as_deref()?;
            resolver::resolve(entities, code, EntityKind::Class)
        }
    }
}

/// Builds a full register for one period: every student of the class gets a
/// record, taken from `overrides` by student id, else the stored status,
/// else PRESENT.
pub fn take_register<'a>(
    students: impl IntoIterator<Item = &'a Student>,
    existing: &[AttendanceRecord],
    class_id: &str,
    date: NaiveDate,
    period: u32,
    overrides: &HashMap<String, AttendanceStatus>,
) -> Vec<AttendanceRecord> {
    let stored = records_for_period(existing, date, class_id, period);
    students
        .into_iter()
        .map(|student| {
            let status = overrides
                .get(&student.id)
                .copied()
                .or_else(|| {
                    stored
                        .iter()
                        .find(|r| r.student_id == student.id)
                        .map(|r| r.status)
                })
                .unwrap_or_default();
            AttendanceRecord::new(date, class_id, period, student.id.clone(), status)
        })
        .collect()
}

/// The status after the stored one in the toggle order. An unmarked student
/// counts as PRESENT, so the first toggle gives ABSENT.
pub fn toggled_status(
    existing: &[AttendanceRecord],
    class_id: &str,
    date: NaiveDate,
    period: u32,
    student_id: &str,
) -> AttendanceStatus {
    records_for_period(existing, date, class_id, period)
        .into_iter()
        .find(|r| r.student_id == student_id)
        .map(|r| r.status)
        .unwrap_or_default()
        .next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::schedule::TimetableEntry;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
    }

    #[test]
    fn test_upsert_is_idempotent() {
        let mut records = Vec::new();
        let record = AttendanceRecord::new(date(6), "c-1", 1, "s-1", AttendanceStatus::Absent);

        upsert(&mut records, vec![record.clone()]);
        upsert(&mut records, vec![record.clone()]);

        assert_eq!(records, vec![record]);
    }

    #[test]
    fn test_upsert_replaces_status_and_keeps_other_keys() {
        let mut records = vec![
            AttendanceRecord::new(date(6), "c-1", 1, "s-1", AttendanceStatus::Absent),
            AttendanceRecord::new(date(6), "c-1", 2, "s-1", AttendanceStatus::Present),
        ];

        upsert(
            &mut records,
            vec![
                AttendanceRecord::new(date(6), "c-1", 1, "s-1", AttendanceStatus::Late),
                AttendanceRecord::new(date(6), "c-1", 1, "s-1", AttendanceStatus::Excused),
            ],
        );

        assert_eq!(records.len(), 2);
        let replaced = records.iter().find(|r| r.period == 1).unwrap();
        assert_eq!(replaced.status, AttendanceStatus::Excused);
    }

    #[test]
    fn test_resolve_register_class_from_teacher_slot() {
        let mut class = Entity::new("Grade 10 A", Some("10A".to_string()), EntityKind::Class);
        class.id = "c-1".to_string();
        let mut teacher = Entity::new("Jane Doe", Some("JD".to_string()), EntityKind::Teacher);
        teacher.id = "t-1".to_string();
        teacher
            .schedule
            .set(Day::Mon, 2, Some(TimetableEntry::new("MATH").with_counterpart("10A")));
        let entities = vec![teacher, class];

        assert_eq!(
            resolve_register_class(&entities, "t-1", Day::Mon, 2).map(|e| e.id.as_str()),
            Some("c-1")
        );
        assert_eq!(
            resolve_register_class(&entities, "c-1", Day::Thu, 9).map(|e| e.id.as_str()),
            Some("c-1")
        );
        assert!(resolve_register_class(&entities, "t-1", Day::Mon, 3).is_none());
    }

    #[test]
    fn test_take_register_defaults_to_present() {
        let students = vec![
            Student::new("Alice", "01", "c-1"),
            Student::new("Bob", "02", "c-1"),
            Student::new("Cara", "03", "c-1"),
        ];
        let existing = vec![AttendanceRecord::new(
            date(6),
            "c-1",
            1,
            students[2].id.clone(),
            AttendanceStatus::Late,
        )];
        let mut overrides = HashMap::new();
        overrides.insert(students[1].id.clone(), AttendanceStatus::Absent);

        let register = take_register(&students, &existing, "c-1", date(6), 1, &overrides);

        let statuses: Vec<_> = register.iter().map(|r| r.status).collect();
        assert_eq!(
            statuses,
            vec![AttendanceStatus::Present, AttendanceStatus::Absent, AttendanceStatus::Late]
        );
        assert!(register.iter().all(|r| r.entity_id == "c-1" && r.period == 1));
    }

    #[test]
    fn test_toggled_status_follows_stored_status() {
        let existing = vec![AttendanceRecord::new(date(6), "c-1", 2, "s-1", AttendanceStatus::Excused)];
        assert_eq!(toggled_status(&existing, "c-1", date(6), 2, "s-1"), AttendanceStatus::Present);
        assert_eq!(toggled_status(&existing, "c-1", date(6), 2, "s-2"), AttendanceStatus::Absent);
        assert_eq!(toggled_status(&existing, "c-1", date(7), 2, "s-1"), AttendanceStatus::Absent);
    }
}
