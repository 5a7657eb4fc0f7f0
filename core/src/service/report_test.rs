#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
    use crate::model::day::Day;
    use crate::model::entity::{Entity, EntityKind};
    use crate::model::schedule::TimetableEntry;
    use crate::model::student::Student;
    use crate::model::time_slot::default_time_slots;
    use crate::service::export_service::{daily_csv, register_csv, subject_csv};
    use crate::service::report_service::{daily_matrix, subject_rollup, Tally};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn student(id: &str, name: &str, roll: &str) -> Student {
        let mut s = Student::new(name, roll, "c-10a");
        s.id = id.to_string();
        s
    }

    fn fixture() -> (Vec<Entity>, Vec<Student>) {
        let mut class = Entity::new("Grade 10A", Some("10A".to_string()), EntityKind::Class);
        class.id = "c-10a".to_string();
        class.schedule.set(Day::Mon, 1, Some(TimetableEntry::new("Math").with_counterpart("JD")));
        class.schedule.set(Day::Mon, 2, Some(TimetableEntry::new("ENG")));
        class.schedule.set(Day::Mon, 4, Some(TimetableEntry::new("  ")));

        let mut other = Entity::new("Grade 9B", Some("9B".to_string()), EntityKind::Class);
        other.id = "c-9b".to_string();

        let mut outsider = Student::new("Dumisani", "900", "c-9b");
        outsider.id = "s-out".to_string();

        let students = vec![
            student("s-1", "Alice Banda", "01"),
            student("s-2", "Bob \"BJ\" Phiri", "02"),
            outsider,
        ];
        (vec![class, other], students)
    }

    fn record(d: NaiveDate, period: u32, student: &str, status: AttendanceStatus) -> AttendanceRecord {
        AttendanceRecord::new(d, "c-10a", period, student, status)
    }

    #[test]
    fn test_subject_rollup_counts_late_as_attended() {
        let (entities, students) = fixture();
        let records = vec![
            record(date(2025, 6, 2), 1, "s-1", AttendanceStatus::Present),
            record(date(2025, 6, 9), 1, "s-1", AttendanceStatus::Absent),
            record(date(2025, 6, 16), 1, "s-1", AttendanceStatus::Late),
        ];

        let report = subject_rollup(&entities, &students, &records, "c-10a");

        assert_eq!(report.subjects, vec!["ENG".to_string(), "MATH".to_string()]);
        assert_eq!(report.students.len(), 2);
        let alice = &report.students[0];
        assert_eq!(alice.student.id, "s-1");
        assert_eq!(alice.subjects[1], Tally { present: 2, total: 3 });
        assert_eq!(alice.subjects[1].percentage().unwrap().value(), 67);
        assert_eq!(alice.subjects[0].percentage(), None);
        assert_eq!(alice.overall.percentage().unwrap().to_string(), "67%");
        assert!(alice.overall.percentage().unwrap().is_flagged());
    }

    #[test]
    fn test_subject_rollup_skips_unscheduled_records() {
        let (entities, students) = fixture();
        let records = vec![
            // Friday
            record(date(2025, 6, 6), 1, "s-1", AttendanceStatus::Absent),
            // Monday period with no entry
            record(date(2025, 6, 2), 3, "s-1", AttendanceStatus::Absent),
            // Monday period whose subject is blank
            record(date(2025, 6, 2), 4, "s-1", AttendanceStatus::Absent),
            // Another class
            AttendanceRecord::new(date(2025, 6, 2), "c-9b", 1, "s-out", AttendanceStatus::Absent),
            record(date(2025, 6, 2), 2, "s-1", AttendanceStatus::Excused),
        ];

        let report = subject_rollup(&entities, &students, &records, "c-10a");
        let alice = &report.students[0];

        assert_eq!(alice.overall, Tally { present: 1, total: 1 });
        assert_eq!(alice.subjects[0], Tally { present: 1, total: 1 });
        assert_eq!(alice.subjects[1], Tally::default());
    }

    #[test]
    fn test_class_averages() {
        let (entities, students) = fixture();
        let records = vec![
            record(date(2025, 6, 2), 1, "s-1", AttendanceStatus::Present),
            record(date(2025, 6, 2), 1, "s-2", AttendanceStatus::Absent),
            record(date(2025, 6, 2), 2, "s-1", AttendanceStatus::Present),
            record(date(2025, 6, 2), 2, "s-2", AttendanceStatus::Present),
        ];

        let report = subject_rollup(&entities, &students, &records, "c-10a");

        assert_eq!(report.class_subjects[0].percentage().unwrap().value(), 100);
        assert_eq!(report.class_subjects[1].percentage().unwrap().value(), 50);
        assert_eq!(report.class_overall, Tally { present: 3, total: 4 });
        assert!(!report.class_overall.percentage().unwrap().is_flagged());
    }

    #[test]
    fn test_unknown_class_yields_empty_report() {
        let (entities, students) = fixture();
        let report = subject_rollup(&entities, &students, &[], "c-missing");
        assert!(report.subjects.is_empty());
        assert!(report.students.is_empty());
        assert_eq!(report.class_overall.percentage(), None);
    }

    #[test]
    fn test_daily_matrix_distinguishes_unmarked_from_absent() {
        let (_, students) = fixture();
        let slots = default_time_slots();
        let records = vec![
            record(date(2025, 6, 2), 1, "s-1", AttendanceStatus::Present),
            record(date(2025, 6, 2), 2, "s-1", AttendanceStatus::Absent),
            record(date(2025, 6, 3), 1, "s-2", AttendanceStatus::Absent),
        ];

        let matrix = daily_matrix(&students, &records, &slots, "c-10a", date(2025, 6, 2));

        assert_eq!(matrix.periods.len(), 9);
        assert_eq!(matrix.rows.len(), 2);
        assert_eq!(matrix.status("s-1", 1), Some(AttendanceStatus::Present));
        assert_eq!(matrix.status("s-1", 2), Some(AttendanceStatus::Absent));
        assert_eq!(matrix.status("s-1", 3), None);
        assert_eq!(matrix.status("s-2", 1), None);
    }

    #[test]
    fn test_daily_csv() {
        let (_, students) = fixture();
        let slots = &default_time_slots()[..2];
        let records = vec![record(date(2025, 6, 2), 2, "s-1", AttendanceStatus::Late)];
        let matrix = daily_matrix(&students, &records, slots, "c-10a", date(2025, 6, 2));

        let csv = daily_csv(&matrix);
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "Student Name,Roll Number,Period 1,Period 2");
        assert_eq!(lines[1], "\"Alice Banda\",01,N/A,LATE");
        assert_eq!(lines[2], "\"Bob \"\"BJ\"\" Phiri\",02,N/A,N/A");
    }

    #[test]
    fn test_subject_csv() {
        let (entities, students) = fixture();
        let records = vec![
            record(date(2025, 6, 2), 1, "s-1", AttendanceStatus::Present),
            record(date(2025, 6, 9), 1, "s-1", AttendanceStatus::Absent),
            record(date(2025, 6, 16), 1, "s-1", AttendanceStatus::Late),
        ];
        let report = subject_rollup(&entities, &students, &records, "c-10a");

        let csv = subject_csv(&report);
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "Student Name,Roll Number,ENG,MATH,Overall %");
        assert_eq!(lines[1], "\"Alice Banda\",01,0%,67%,67%");
        assert_eq!(lines[2], "\"Bob \"\"BJ\"\" Phiri\",02,0%,0%,0%");
    }

    #[test]
    fn test_register_csv() {
        let (_, students) = fixture();
        let roster: Vec<&Student> = students.iter().filter(|s| s.class_id == "c-10a").collect();
        let register = vec![
            record(date(2025, 6, 2), 1, "s-1", AttendanceStatus::Present),
            record(date(2025, 6, 2), 1, "s-2", AttendanceStatus::Excused),
        ];

        let csv = register_csv(&roster, &register, "MATH");
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "Student Name,Roll Number,Status,Date,Period,Subject");
        assert_eq!(lines[1], "\"Alice Banda\",01,PRESENT,2025-06-02,Period 1,\"MATH\"");
        assert_eq!(lines[2], "\"Bob \"\"BJ\"\" Phiri\",02,EXCUSED,2025-06-02,Period 1,\"MATH\"");
    }
}
