use serde::{Deserialize, Serialize};

use crate::model::entity::{Entity, EntityKind};
use crate::model::schedule::WeeklySchedule;
use crate::resolver;

/// Which axis an extracted timetable is organised along.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportKind {
    TeacherWise,
    ClassWise,
}

impl ImportKind {
    /// Kind of the entities named by the profile headers.
    pub fn primary_kind(&self) -> EntityKind {
        match self {
            ImportKind::TeacherWise => EntityKind::Teacher,
            ImportKind::ClassWise => EntityKind::Class,
        }
    }

    /// Kind of the entities referenced by codes inside the slots.
    pub fn secondary_kind(&self) -> EntityKind {
        self.primary_kind().opposite()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RawProfile {
    pub name: String,
    pub schedule: WeeklySchedule,
}

/// Extracted timetable awaiting review. Slot cross-references are the raw
/// codes found in the document.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AiImportResult {
    pub detected_type: ImportKind,
    pub profiles: Vec<RawProfile>,
    pub unknown_codes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_text_response: Option<String>,
}

impl AiImportResult {
    /// Codes that do not yet name an existing entity of the secondary kind.
    pub fn unresolved_codes(&self, entities: &[Entity]) -> Vec<&str> {
        let kind = self.detected_type.secondary_kind();
        self.unknown_codes
            .iter()
            .map(String::as_str)
            .filter(|code| resolver::resolve(entities, code, kind).is_none())
            .collect()
    }
}
