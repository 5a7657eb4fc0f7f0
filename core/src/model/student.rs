use serde::{Deserialize, Serialize};

use crate::model::entity::generate_id;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    pub roll_number: String,
    pub class_id: String,
}

impl Student {
    pub fn new(
        name: impl Into<String>,
        roll_number: impl Into<String>,
        class_id: impl Into<String>,
    ) -> Self {
        Self {
            id: generate_id("stu"),
            name: name.into(),
            roll_number: roll_number.into(),
            class_id: class_id.into(),
        }
    }
}

/// Parses a pasted roster, one `roll, name` pair per line.
/// Lines with fewer than two fields are skipped; extra fields are ignored.
pub fn parse_roster(text: &str, class_id: &str) -> Vec<Student> {
    text.lines()
        .filter_map(|line| {
            let parts: Vec<&str> = line.split(',').map(str::trim).collect();
            if parts.len() < 2 {
                return None;
            }
            Some(Student::new(parts[1], parts[0], class_id))
        })
        .collect()
}
