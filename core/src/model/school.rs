use serde::{Deserialize, Serialize};

use crate::model::attendance::AttendanceRecord;
use crate::model::entity::{Entity, EntityKind};
use crate::model::schedule::WeeklySchedule;
use crate::model::student::Student;
use crate::model::time_slot::{default_time_slots, TimeSlot};

pub const DEFAULT_SCHOOL_NAME: &str = "Mupini Combined School";
pub const DEFAULT_ACADEMIC_YEAR: &str = "2025";

/// Everything the application knows, as one snapshot.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SchoolState {
    pub school_name: String,
    pub academic_year: String,
    pub entities: Vec<Entity>,
    pub students: Vec<Student>,
    pub time_slots: Vec<TimeSlot>,
    pub attendance_records: Vec<AttendanceRecord>,
}

impl Default for SchoolState {
    fn default() -> Self {
        Self {
            school_name: DEFAULT_SCHOOL_NAME.to_string(),
            academic_year: DEFAULT_ACADEMIC_YEAR.to_string(),
            entities: default_entities(),
            students: Vec::new(),
            time_slots: default_time_slots(),
            attendance_records: Vec::new(),
        }
    }
}

impl SchoolState {
    pub fn entity(&self, id: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn entities_of(&self, kind: EntityKind) -> impl Iterator<Item = &Entity> + '_ {
        self.entities.iter().filter(move |e| e.kind == kind)
    }

    pub fn students_in(&self, class_id: &str) -> impl Iterator<Item = &Student> + '_ {
        let class_id = class_id.to_string();
        self.students.iter().filter(move |s| s.class_id == class_id)
    }
}

pub fn default_entities() -> Vec<Entity> {
    vec![
        Entity {
            id: "t-new-1".to_string(),
            name: "New Teacher".to_string(),
            short_code: Some("NT".to_string()),
            kind: EntityKind::Teacher,
            schedule: WeeklySchedule::new(),
        },
        Entity {
            id: "c-new-1".to_string(),
            name: "New Class".to_string(),
            short_code: Some("NC".to_string()),
            kind: EntityKind::Class,
            schedule: WeeklySchedule::new(),
        },
    ]
}
