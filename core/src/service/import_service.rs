use std::collections::BTreeMap;

use tracing::debug;

use crate::model::entity::Entity;
use crate::model::import::{AiImportResult, ImportKind};
use crate::model::schedule::TimetableEntry;

/// First letter of each word, at most two, upper-cased: `"Jane Doe"` -> `"JD"`.
pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|word| word.chars().next())
        .take(2)
        .collect::<String>()
        .to_uppercase()
}

/// First three letters, upper-cased: `"Grade 10 A"` -> `"GRA"`.
pub fn alpha_code(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphabetic())
        .take(3)
        .collect::<String>()
        .to_uppercase()
}

/// Code for a manually added entity with no code given: the first three
/// characters of the name, upper-cased.
pub fn default_short_code(name: &str) -> String {
    name.trim().chars().take(3).collect::<String>().to_uppercase()
}

fn primary_code(kind: ImportKind, name: &str) -> String {
    match kind {
        ImportKind::TeacherWise => initials(name),
        ImportKind::ClassWise => alpha_code(name),
    }
}

fn secondary_code(kind: ImportKind, code: &str, real_name: &str) -> String {
    match kind {
        ImportKind::ClassWise => code.to_string(),
        ImportKind::TeacherWise => initials(real_name),
    }
}

/// Merges a reviewed import into `existing`.
///
/// Every profile becomes an entity of the primary kind. Every non-blank
/// mapping `code -> name` becomes an entity of the opposite kind; slots that
/// referenced `code` are repointed at the new entity and mirrored into its
/// schedule. Codes without a mapping stay as they are. Existing entities are
/// returned untouched, with the new ones appended.
pub fn finalize(
    existing: &[Entity],
    result: &AiImportResult,
    mappings: &BTreeMap<String, String>,
) -> Vec<Entity> {
    let kind = result.detected_type;

    let mut primaries: Vec<Entity> = result
        .profiles
        .iter()
        .map(|profile| {
            let mut entity = Entity::new(
                profile.name.clone(),
                Some(primary_code(kind, &profile.name)),
                kind.primary_kind(),
            );
            entity.schedule = profile.schedule.clone();
            entity
        })
        .collect();

    let mut secondaries = Vec::new();
    for (code, real_name) in mappings {
        let real_name = real_name.trim();
        if real_name.is_empty() {
            continue;
        }
        let mut secondary = Entity::new(
            real_name,
            Some(secondary_code(kind, code, real_name)),
            kind.secondary_kind(),
        );
        let pointer = secondary.identifier().to_string();

        // Match against the extracted schedules, not the repointed copies, so
        // one mapping's new code is never picked up by another mapping.
        for (profile, primary) in result.profiles.iter().zip(primaries.iter_mut()) {
            let back_pointer = primary.identifier().to_string();
            for (day, period, entry) in profile.schedule.slots() {
                if entry.teacher_or_class.as_deref() != Some(code.as_str()) {
                    continue;
                }
                primary.schedule.set(
                    day,
                    period,
                    Some(TimetableEntry {
                        teacher_or_class: Some(pointer.clone()),
                        ..entry.clone()
                    }),
                );
                secondary.schedule.set(
                    day,
                    period,
                    Some(TimetableEntry {
                        subject: entry.subject.clone(),
                        room: entry.room.clone(),
                        teacher_or_class: Some(back_pointer.clone()),
                    }),
                );
            }
        }

        debug!(code = %code, name = real_name, "created entity from import mapping");
        secondaries.push(secondary);
    }

    let mut merged = existing.to_vec();
    merged.extend(primaries);
    merged.extend(secondaries);
    merged
}
