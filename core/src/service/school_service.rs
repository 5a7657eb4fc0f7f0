use std::collections::HashMap;

use anyhow::Result;
use chrono::NaiveDate;
use tracing::info;

use crate::error::ValidationError;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::day::Day;
use crate::model::entity::{Entity, EntityKind};
use crate::model::school::SchoolState;
use crate::model::student::{parse_roster, Student};
use crate::model::time_slot::{validate_time_slots, TimeSlot};
use crate::repository::StateRepository;
use crate::service::attendance_service::{take_register, upsert};
use crate::service::import_service::default_short_code;
use crate::service::schedule_service::{write_slot, SlotInput};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityPatch {
    pub name: Option<String>,
    pub short_code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudentPatch {
    pub name: Option<String>,
    pub roll_number: Option<String>,
    pub class_id: Option<String>,
}

// State transitions. Each either applies fully or returns an error before
// touching anything.
impl SchoolState {
    pub fn add_entity(
        &mut self,
        name: &str,
        short_code: Option<&str>,
        kind: EntityKind,
    ) -> Result<Entity, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingName);
        }
        let code = short_code
            .map(|c| c.trim().to_uppercase())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| default_short_code(name));
        let entity = Entity::new(name, Some(code), kind);
        self.entities.push(entity.clone());
        Ok(entity)
    }

    /// Returns false when no entity has `id`.
    pub fn update_entity(&mut self, id: &str, patch: EntityPatch) -> Result<bool, ValidationError> {
        let name = match patch.name {
            Some(name) if name.trim().is_empty() => return Err(ValidationError::MissingName),
            Some(name) => Some(name.trim().to_string()),
            None => None,
        };
        let Some(entity) = self.entities.iter_mut().find(|e| e.id == id) else {
            return Ok(false);
        };
        if let Some(name) = name {
            entity.name = name;
        }
        if let Some(code) = patch.short_code {
            entity.short_code = Some(code.trim().to_uppercase());
        }
        Ok(true)
    }

    /// Removes the entity and every attendance record filed under it. Slots
    /// of other entities that name it are kept as they are.
    pub fn delete_entity(&mut self, id: &str) -> bool {
        let before = self.entities.len();
        self.entities.retain(|e| e.id != id);
        if self.entities.len() == before {
            return false;
        }
        self.attendance_records.retain(|r| r.entity_id != id);
        true
    }

    pub fn add_student(
        &mut self,
        name: &str,
        roll_number: &str,
        class_id: &str,
    ) -> Result<Student, ValidationError> {
        let (name, roll_number) = (name.trim(), roll_number.trim());
        if name.is_empty() {
            return Err(ValidationError::MissingName);
        }
        if roll_number.is_empty() {
            return Err(ValidationError::MissingRollNumber);
        }
        self.ensure_class(class_id)?;
        let student = Student::new(name, roll_number, class_id);
        self.students.push(student.clone());
        Ok(student)
    }

    pub fn import_roster(&mut self, text: &str, class_id: &str) -> Result<Vec<Student>, ValidationError> {
        self.ensure_class(class_id)?;
        let roster = parse_roster(text, class_id);
        self.students.extend(roster.iter().cloned());
        Ok(roster)
    }

    pub fn update_student(&mut self, id: &str, patch: StudentPatch) -> Result<bool, ValidationError> {
        if let Some(class_id) = &patch.class_id {
            self.ensure_class(class_id)?;
        }
        if matches!(&patch.name, Some(n) if n.trim().is_empty()) {
            return Err(ValidationError::MissingName);
        }
        let Some(student) = self.students.iter_mut().find(|s| s.id == id) else {
            return Ok(false);
        };
        if let Some(name) = patch.name {
            student.name = name.trim().to_string();
        }
        if let Some(roll_number) = patch.roll_number {
            student.roll_number = roll_number.trim().to_string();
        }
        if let Some(class_id) = patch.class_id {
            student.class_id = class_id;
        }
        Ok(true)
    }

    pub fn delete_student(&mut self, id: &str) -> bool {
        let before = self.students.len();
        self.students.retain(|s| s.id != id);
        if self.students.len() == before {
            return false;
        }
        self.attendance_records.retain(|r| r.student_id != id);
        true
    }

    /// Validates a manual edit and applies it through the mirror engine.
    pub fn edit_slot(
        &mut self,
        entity_id: &str,
        day: Day,
        period: u32,
        input: Option<SlotInput>,
    ) -> Result<(), ValidationError> {
        if period == 0 {
            return Err(ValidationError::InvalidPeriod(period));
        }
        let entry = input.map(SlotInput::into_entry).transpose()?;
        self.entities = write_slot(&self.entities, entity_id, day, period, entry);
        Ok(())
    }

    pub fn set_time_slots(&mut self, slots: Vec<TimeSlot>) -> Result<(), ValidationError> {
        validate_time_slots(&slots)?;
        self.time_slots = slots;
        Ok(())
    }

    pub fn mark_attendance(&mut self, records: Vec<AttendanceRecord>) {
        upsert(&mut self.attendance_records, records);
    }

    /// Files a full register for one period of a class and returns it.
    pub fn take_attendance(
        &mut self,
        class_id: &str,
        date: NaiveDate,
        period: u32,
        overrides: &HashMap<String, AttendanceStatus>,
    ) -> Result<Vec<AttendanceRecord>, ValidationError> {
        self.ensure_class(class_id)?;
        if period == 0 {
            return Err(ValidationError::InvalidPeriod(period));
        }
        let register = take_register(
            self.students.iter().filter(|s| s.class_id == class_id),
            &self.attendance_records,
            class_id,
            date,
            period,
            overrides,
        );
        self.mark_attendance(register.clone());
        Ok(register)
    }

    pub fn reset(&mut self) {
        *self = SchoolState::default();
    }

    fn ensure_class(&self, class_id: &str) -> Result<(), ValidationError> {
        match self.entity(class_id) {
            Some(entity) if entity.kind == EntityKind::Class => Ok(()),
            _ => Err(ValidationError::UnknownClass(class_id.to_string())),
        }
    }
}

/// Loads the state, applies one transition and saves it back.
pub struct SchoolService<R: StateRepository> {
    repo: R,
}

impl<R: StateRepository> SchoolService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn state(&self) -> Result<SchoolState> {
        self.repo.load()
    }

    /// Runs `op` against the stored state. The state is saved only if `op`
    /// succeeds.
    pub fn apply<T, E>(&self, op: impl FnOnce(&mut SchoolState) -> Result<T, E>) -> Result<T>
    where
        E: Into<anyhow::Error>,
    {
        let mut state = self.repo.load()?;
        let out = op(&mut state).map_err(Into::into)?;
        self.repo.save(&state)?;
        Ok(out)
    }

    pub fn replace(&self, state: &SchoolState) -> Result<()> {
        info!(entities = state.entities.len(), students = state.students.len(), "replacing stored state");
        self.repo.save(state)
    }
}
