#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use anyhow::Result;
    use chrono::NaiveDate;

    use crate::error::ValidationError;
    use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
    use crate::model::day::Day;
    use crate::model::entity::EntityKind;
    use crate::model::school::SchoolState;
    use crate::repository::StateRepository;
    use crate::service::school_service::{EntityPatch, SchoolService, StudentPatch};
    use crate::service::schedule_service::SlotInput;

    struct MockRepo {
        state: RefCell<SchoolState>,
        saves: RefCell<usize>,
    }

    impl MockRepo {
        fn new(state: SchoolState) -> Self {
            Self { state: RefCell::new(state), saves: RefCell::new(0) }
        }
    }

    impl StateRepository for &MockRepo {
        fn load(&self) -> Result<SchoolState> {
            Ok(self.state.borrow().clone())
        }

        fn save(&self, state: &SchoolState) -> Result<()> {
            *self.state.borrow_mut() = state.clone();
            *self.saves.borrow_mut() += 1;
            Ok(())
        }
    }

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
    }

    fn slot(subject: &str, room: Option<&str>, counterpart: Option<&str>) -> SlotInput {
        SlotInput {
            subject: subject.to_string(),
            room: room.map(str::to_string),
            counterpart: counterpart.map(str::to_string),
        }
    }

    /// One teacher "JD", one class "10A" with two students.
    fn school() -> (SchoolState, String, String) {
        let mut state = SchoolState {
            entities: Vec::new(),
            ..SchoolState::default()
        };
        let teacher = state.add_entity("John Doe", Some("jd"), EntityKind::Teacher).unwrap();
        let class = state.add_entity("Grade 10A", Some("10A"), EntityKind::Class).unwrap();
        state.add_student("Alice", "01", &class.id).unwrap();
        state.add_student("Bob", "02", &class.id).unwrap();
        (state, teacher.id, class.id)
    }

    #[test]
    fn test_add_entity_defaults_short_code() {
        let mut state = SchoolState::default();
        let teacher = state.add_entity("  mary smith ", None, EntityKind::Teacher).unwrap();
        assert_eq!(teacher.name, "mary smith");
        assert_eq!(teacher.short_code.as_deref(), Some("MAR"));
        assert!(teacher.id.starts_with("teacher-"));

        assert_eq!(
            state.add_entity("   ", None, EntityKind::Class),
            Err(ValidationError::MissingName)
        );
    }

    #[test]
    fn test_edit_slot_mirrors_to_counterpart() {
        let (mut state, teacher_id, class_id) = school();
        state
            .edit_slot(&teacher_id, Day::Mon, 1, Some(slot(" math ", Some("R1"), Some("10A"))))
            .unwrap();

        let class = state.entity(&class_id).unwrap();
        let mirrored = class.schedule.get(Day::Mon, 1).unwrap();
        assert_eq!(mirrored.subject, "MATH");
        assert_eq!(mirrored.room.as_deref(), Some("R1"));
        assert_eq!(mirrored.teacher_or_class.as_deref(), Some("JD"));
    }

    #[test]
    fn test_edit_slot_rejects_blank_subject_without_writing() {
        let (mut state, teacher_id, _) = school();
        let before = state.clone();

        let err = state
            .edit_slot(&teacher_id, Day::Mon, 1, Some(slot("  ", None, Some("10A"))))
            .unwrap_err();

        assert_eq!(err, ValidationError::MissingSubject);
        assert_eq!(state, before);
        assert_eq!(
            state.edit_slot(&teacher_id, Day::Mon, 0, None),
            Err(ValidationError::InvalidPeriod(0))
        );
    }

    #[test]
    fn test_clear_keeps_counterpart_slot() {
        let (mut state, teacher_id, class_id) = school();
        state
            .edit_slot(&teacher_id, Day::Tue, 2, Some(slot("ENG", None, Some("10A"))))
            .unwrap();
        state.edit_slot(&teacher_id, Day::Tue, 2, None).unwrap();

        assert!(state.entity(&teacher_id).unwrap().schedule.get(Day::Tue, 2).is_none());
        assert!(state.entity(&class_id).unwrap().schedule.get(Day::Tue, 2).is_some());
    }

    #[test]
    fn test_delete_entity_cascades_attendance_only() {
        let (mut state, teacher_id, class_id) = school();
        state
            .edit_slot(&teacher_id, Day::Mon, 1, Some(slot("MATH", None, Some("10A"))))
            .unwrap();
        state
            .take_attendance(&class_id, monday(), 1, &HashMap::new())
            .unwrap();
        assert_eq!(state.attendance_records.len(), 2);

        assert!(state.delete_entity(&class_id));
        assert!(!state.delete_entity(&class_id));

        assert!(state.attendance_records.is_empty());
        // The teacher's slot still names the deleted class.
        let entry = state.entity(&teacher_id).unwrap().schedule.get(Day::Mon, 1).unwrap();
        assert_eq!(entry.teacher_or_class.as_deref(), Some("10A"));
    }

    #[test]
    fn test_delete_student_cascades_attendance() {
        let (mut state, _, class_id) = school();
        state
            .take_attendance(&class_id, monday(), 1, &HashMap::new())
            .unwrap();
        let alice = state.students[0].id.clone();

        assert!(state.delete_student(&alice));
        assert_eq!(state.students.len(), 1);
        assert!(state.attendance_records.iter().all(|r| r.student_id != alice));
        assert_eq!(state.attendance_records.len(), 1);
    }

    #[test]
    fn test_students_require_a_class() {
        let (mut state, teacher_id, class_id) = school();
        assert_eq!(
            state.add_student("Chidi", "03", &teacher_id),
            Err(ValidationError::UnknownClass(teacher_id.clone()))
        );
        assert_eq!(
            state.add_student("Chidi", " ", &class_id),
            Err(ValidationError::MissingRollNumber)
        );

        let imported = state.import_roster("03, Chidi\n04, Dalitso", &class_id).unwrap();
        assert_eq!(imported.len(), 2);
        assert_eq!(state.students_in(&class_id).count(), 4);
    }

    #[test]
    fn test_update_entity_and_student() {
        let (mut state, teacher_id, class_id) = school();
        let patch = EntityPatch { name: None, short_code: Some("jdo".to_string()) };
        assert_eq!(state.update_entity(&teacher_id, patch), Ok(true));
        assert_eq!(state.entity(&teacher_id).unwrap().short_code.as_deref(), Some("JDO"));
        assert_eq!(state.update_entity("nobody", EntityPatch::default()), Ok(false));

        let alice = state.students[0].id.clone();
        let patch = StudentPatch { roll_number: Some("11".to_string()), ..StudentPatch::default() };
        assert_eq!(state.update_student(&alice, patch), Ok(true));
        assert_eq!(state.students[0].roll_number, "11");
        assert_eq!(state.students[0].class_id, class_id);
    }

    #[test]
    fn test_take_attendance_defaults_and_overrides() {
        let (mut state, _, class_id) = school();
        let bob = state.students[1].id.clone();
        let mut overrides = HashMap::new();
        overrides.insert(bob.clone(), AttendanceStatus::Absent);

        let register = state.take_attendance(&class_id, monday(), 3, &overrides).unwrap();
        assert_eq!(register.len(), 2);
        assert_eq!(register[0].status, AttendanceStatus::Present);
        assert_eq!(register[1].status, AttendanceStatus::Absent);

        // Retaking keeps stored statuses and replaces rather than duplicates.
        let register = state.take_attendance(&class_id, monday(), 3, &HashMap::new()).unwrap();
        assert_eq!(register[1].status, AttendanceStatus::Absent);
        assert_eq!(state.attendance_records.len(), 2);
    }

    #[test]
    fn test_mark_attendance_upserts_by_key() {
        let (mut state, _, class_id) = school();
        let alice = state.students[0].id.clone();
        state.mark_attendance(vec![AttendanceRecord::new(
            monday(), class_id.as_str(), 1, alice.as_str(), AttendanceStatus::Late,
        )]);
        state.mark_attendance(vec![AttendanceRecord::new(
            monday(), class_id.as_str(), 1, alice.as_str(), AttendanceStatus::Excused,
        )]);

        assert_eq!(state.attendance_records.len(), 1);
        assert_eq!(state.attendance_records[0].status, AttendanceStatus::Excused);
    }

    #[test]
    fn test_service_saves_only_on_success() {
        let repo = MockRepo::new(SchoolState::default());
        let service = SchoolService::new(&repo);

        let created = service
            .apply(|state| state.add_entity("Grade 9", Some("9"), EntityKind::Class))
            .unwrap();
        assert_eq!(*repo.saves.borrow(), 1);
        assert!(service.state().unwrap().entity(&created.id).is_some());

        let failed = service.apply(|state| state.add_entity("", None, EntityKind::Class));
        assert!(failed.is_err());
        assert_eq!(*repo.saves.borrow(), 1);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let (mut state, _, _) = school();
        state.school_name = "Elsewhere".to_string();
        state.reset();
        assert_eq!(state, SchoolState::default());
    }
}
