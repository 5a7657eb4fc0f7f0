use tracing::debug;

use crate::error::ValidationError;
use crate::model::day::Day;
use crate::model::entity::Entity;
use crate::model::schedule::TimetableEntry;
use crate::resolver;

/// A slot edit as typed by a user, before validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlotInput {
    pub subject: String,
    pub room: Option<String>,
    pub counterpart: Option<String>,
}

impl SlotInput {
    /// Subject is required and upper-cased; blank room or counterpart means none.
    pub fn into_entry(self) -> Result<TimetableEntry, ValidationError> {
        let subject = self.subject.trim().to_uppercase();
        if subject.is_empty() {
            return Err(ValidationError::MissingSubject);
        }
        Ok(TimetableEntry {
            subject,
            room: non_blank(self.room),
            teacher_or_class: non_blank(self.counterpart),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Writes one slot of `source_id` and mirrors it onto the counterpart.
///
/// The counterpart is the first entity of the opposite kind whose code or
/// name equals `entry.teacher_or_class`; it receives the same subject and
/// room, pointing back at the source. Clearing (`None`) only touches the
/// source: whatever the counterpart holds in that slot is left alone.
///
/// Every entity in the result has the affected day rebuilt as a new
/// allocation; other days share their allocation with the input. An unknown
/// `source_id` returns the input unchanged.
pub fn write_slot(
    entities: &[Entity],
    source_id: &str,
    day: Day,
    period: u32,
    entry: Option<TimetableEntry>,
) -> Vec<Entity> {
    let Some(source_idx) = entities.iter().position(|e| e.id == source_id) else {
        debug!(source_id, "slot write for unknown entity ignored");
        return entities.to_vec();
    };

    let mut next: Vec<Entity> = entities
        .iter()
        .map(|e| {
            let mut e = e.clone();
            e.schedule.detach_day(day);
            e
        })
        .collect();

    let source_kind = next[source_idx].kind;
    let source_identifier = next[source_idx].identifier().to_string();

    let mirror = entry.as_ref().and_then(|entry| {
        let code = entry.teacher_or_class.as_deref().filter(|c| !c.is_empty())?;
        let target_idx = resolver::position(&next, code, source_kind.opposite());
        if target_idx.is_none() {
            debug!(code, "counterpart not found, mirror skipped");
        }
        target_idx.map(|idx| {
            let mirrored = TimetableEntry {
                subject: entry.subject.clone(),
                room: entry.room.clone(),
                teacher_or_class: Some(source_identifier.clone()),
            };
            (idx, mirrored)
        })
    });

    next[source_idx].schedule.set(day, period, entry);

    if let Some((target_idx, mirrored)) = mirror {
        debug!(
            source = %source_identifier,
            target = %next[target_idx].identifier(),
            %day,
            period,
            "mirrored slot"
        );
        next[target_idx].schedule.set(day, period, Some(mirrored));
    }

    next
}
