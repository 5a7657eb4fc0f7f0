use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::schedule::WeeklySchedule;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityKind {
    Teacher,
    Class,
}

impl EntityKind {
    pub fn opposite(&self) -> EntityKind {
        match self {
            EntityKind::Teacher => EntityKind::Class,
            EntityKind::Class => EntityKind::Teacher,
        }
    }

    fn id_prefix(&self) -> &'static str {
        match self {
            EntityKind::Teacher => "teacher",
            EntityKind::Class => "class",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Teacher => f.write_str("Teacher"),
            EntityKind::Class => f.write_str("Class"),
        }
    }
}

impl FromStr for EntityKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "t" | "teacher" => Ok(EntityKind::Teacher),
            "c" | "class" => Ok(EntityKind::Class),
            _ => Err(anyhow!("Unknown entity type: '{}'", s)),
        }
    }
}

/// A teacher or a class, owning one weekly schedule.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_code: Option<String>,
    #[serde(rename = "type")]
    pub kind: EntityKind,
    #[serde(default)]
    pub schedule: WeeklySchedule,
}

impl Entity {
    pub fn new(name: impl Into<String>, short_code: Option<String>, kind: EntityKind) -> Self {
        Self {
            id: generate_id(kind.id_prefix()),
            name: name.into(),
            short_code,
            kind,
            schedule: WeeklySchedule::new(),
        }
    }

    /// The string other entities use to point at this one: the short code
    /// when set, otherwise the name.
    pub fn identifier(&self) -> &str {
        match self.short_code.as_deref() {
            Some(code) if !code.is_empty() => code,
            _ => &self.name,
        }
    }
}

pub(crate) fn generate_id(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4().simple())
}
