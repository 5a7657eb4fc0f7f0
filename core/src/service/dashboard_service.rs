use crate::model::day::Day;
use crate::model::entity::{Entity, EntityKind};
use crate::model::schedule::TimetableEntry;
use crate::model::time_slot::{current_period, next_period, TimeSlot};
use crate::resolver;

/// What one class is doing in a given period.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassNow<'a> {
    pub class: &'a Entity,
    pub entry: Option<&'a TimetableEntry>,
    /// Resolved teacher name, the raw code if it resolves to nobody, or
    /// `"Unassigned"` when the slot names no teacher.
    pub teacher: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard<'a> {
    pub day: Option<Day>,
    pub current: Option<&'a TimeSlot>,
    pub next: Option<&'a TimeSlot>,
    /// Empty outside school days and outside periods.
    pub classes: Vec<ClassNow<'a>>,
}

pub fn teacher_label(entities: &[Entity], code: Option<&str>) -> String {
    match code {
        None => "Unassigned".to_string(),
        Some(code) => resolver::resolve(entities, code, EntityKind::Teacher)
            .map(|t| t.name.clone())
            .unwrap_or_else(|| code.to_string()),
    }
}

/// Snapshot of the school at `minutes` past midnight on `day`.
pub fn dashboard<'a>(
    entities: &'a [Entity],
    time_slots: &'a [TimeSlot],
    day: Option<Day>,
    minutes: u32,
) -> Dashboard<'a> {
    let current = current_period(time_slots, minutes);
    let next = next_period(time_slots, minutes);

    let classes = match (day, current) {
        (Some(day), Some(slot)) => entities
            .iter()
            .filter(|e| e.kind == EntityKind::Class)
            .map(|class| {
                let entry = class.schedule.get(day, slot.period);
                ClassNow {
                    class,
                    entry,
                    teacher: teacher_label(entities, entry.and_then(|e| e.teacher_or_class.as_deref())),
                }
            })
            .collect(),
        _ => Vec::new(),
    };

    Dashboard {
        day,
        current,
        next,
        classes,
    }
}
