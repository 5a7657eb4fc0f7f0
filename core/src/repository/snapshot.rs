use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::model::attendance::AttendanceRecord;
use crate::model::entity::Entity;
use crate::model::school::SchoolState;
use crate::model::student::Student;
use crate::model::time_slot::TimeSlot;

/// A whole-school backup document. On restore only the keys present in
/// the document replace the current values.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub school_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub academic_year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entities: Option<Vec<Entity>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub students: Option<Vec<Student>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_slots: Option<Vec<TimeSlot>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attendance_records: Option<Vec<AttendanceRecord>>,
}

impl Snapshot {
    pub fn of(state: &SchoolState) -> Self {
        let state = state.clone();
        Self {
            school_name: Some(state.school_name),
            academic_year: Some(state.academic_year),
            entities: Some(state.entities),
            students: Some(state.students),
            time_slots: Some(state.time_slots),
            attendance_records: Some(state.attendance_records),
        }
    }

    pub fn apply_to(self, state: &mut SchoolState) {
        if let Some(v) = self.school_name.filter(|v| !v.is_empty()) {
            state.school_name = v;
        }
        if let Some(v) = self.academic_year.filter(|v| !v.is_empty()) {
            state.academic_year = v;
        }
        if let Some(v) = self.entities {
            state.entities = v;
        }
        if let Some(v) = self.students {
            state.students = v;
        }
        if let Some(v) = self.time_slots {
            state.time_slots = v;
        }
        if let Some(v) = self.attendance_records {
            state.attendance_records = v;
        }
    }

    pub fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read backup {}", path.display()))?;
        serde_json::from_str(&content).with_context(|| format!("Invalid backup {}", path.display()))
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).with_context(|| format!("Could not write backup {}", path.display()))?;
        Ok(())
    }
}
