use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};

use crate::model::day::Day;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TimetableEntry {
    pub subject: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    /// Code or name of the opposite-type entity sharing this slot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher_or_class: Option<String>,
}

impl TimetableEntry {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            room: None,
            teacher_or_class: None,
        }
    }

    pub fn with_room(mut self, room: impl Into<String>) -> Self {
        self.room = Some(room.into());
        self
    }

    pub fn with_counterpart(mut self, code: impl Into<String>) -> Self {
        self.teacher_or_class = Some(code.into());
        self
    }
}

/// Period number -> entry for one day. Periods without an entry are absent.
pub type DaySchedule = BTreeMap<u32, TimetableEntry>;

/// Weekly schedule of one entity.
///
/// Each day map sits behind an `Arc` so a write can rebuild a single day while
/// every other day stays the same allocation, which lets callers detect what
/// changed with `Arc::ptr_eq`.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct WeeklySchedule(BTreeMap<Day, Arc<DaySchedule>>);

// Stored documents may hold `null` for an empty day or slot.
impl<'de> Deserialize<'de> for WeeklySchedule {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw: BTreeMap<Day, Option<BTreeMap<u32, Option<TimetableEntry>>>> =
            BTreeMap::deserialize(deserializer)?;
        let days = raw
            .into_iter()
            .map(|(day, slots)| {
                let slots: DaySchedule = slots
                    .unwrap_or_default()
                    .into_iter()
                    .filter_map(|(period, entry)| entry.map(|entry| (period, entry)))
                    .collect();
                (day, Arc::new(slots))
            })
            .collect();
        Ok(WeeklySchedule(days))
    }
}

impl WeeklySchedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, day: Day, period: u32) -> Option<&TimetableEntry> {
        self.0.get(&day).and_then(|slots| slots.get(&period))
    }

    pub fn day(&self, day: Day) -> Option<&Arc<DaySchedule>> {
        self.0.get(&day)
    }

    /// Sets or clears one slot, copying the day map only if it is shared.
    pub fn set(&mut self, day: Day, period: u32, entry: Option<TimetableEntry>) {
        let slots = Arc::make_mut(self.0.entry(day).or_default());
        match entry {
            Some(entry) => {
                slots.insert(period, entry);
            }
            None => {
                slots.remove(&period);
            }
        }
    }

    /// Replaces the day map with a fresh allocation holding the same slots.
    pub fn detach_day(&mut self, day: Day) {
        let fresh = self
            .0
            .get(&day)
            .map(|slots| slots.as_ref().clone())
            .unwrap_or_default();
        self.0.insert(day, Arc::new(fresh));
    }

    pub fn slots(&self) -> impl Iterator<Item = (Day, u32, &TimetableEntry)> + '_ {
        self.0
            .iter()
            .flat_map(|(day, slots)| slots.iter().map(move |(period, entry)| (*day, *period, entry)))
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(|slots| slots.is_empty())
    }

    /// Distinct upper-cased subject codes taught anywhere in the week.
    pub fn subjects(&self) -> BTreeSet<String> {
        self.slots()
            .map(|(_, _, entry)| entry.subject.trim().to_uppercase())
            .filter(|subject| !subject.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_clear() {
        let mut schedule = WeeklySchedule::new();
        schedule.set(Day::Mon, 1, Some(TimetableEntry::new("MATH")));
        assert_eq!(schedule.get(Day::Mon, 1).map(|e| e.subject.as_str()), Some("MATH"));

        schedule.set(Day::Mon, 1, None);
        assert!(schedule.get(Day::Mon, 1).is_none());
        assert!(schedule.is_empty());
    }

    #[test]
    fn test_set_copies_shared_day_only() {
        let mut original = WeeklySchedule::new();
        original.set(Day::Mon, 1, Some(TimetableEntry::new("MATH")));
        original.set(Day::Tue, 2, Some(TimetableEntry::new("ENG")));

        let mut copy = original.clone();
        copy.set(Day::Mon, 3, Some(TimetableEntry::new("BIO")));

        assert!(original.get(Day::Mon, 3).is_none());
        assert!(Arc::ptr_eq(original.day(Day::Tue).unwrap(), copy.day(Day::Tue).unwrap()));
        assert!(!Arc::ptr_eq(original.day(Day::Mon).unwrap(), copy.day(Day::Mon).unwrap()));
    }

    #[test]
    fn test_subjects_are_upper_cased_and_distinct() {
        let mut schedule = WeeklySchedule::new();
        schedule.set(Day::Mon, 1, Some(TimetableEntry::new("math")));
        schedule.set(Day::Wed, 4, Some(TimetableEntry::new("MATH")));
        schedule.set(Day::Thu, 2, Some(TimetableEntry::new("Eng")));

        let subjects: Vec<_> = schedule.subjects().into_iter().collect();
        assert_eq!(subjects, vec!["ENG".to_string(), "MATH".to_string()]);
    }

    #[test]
    fn test_serialized_layout() {
        let mut schedule = WeeklySchedule::new();
        schedule.set(
            Day::Sat,
            2,
            Some(TimetableEntry::new("ENG").with_room("S1").with_counterpart("10A")),
        );
        let json = serde_json::to_value(&schedule).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "Sat": { "2": { "subject": "ENG", "room": "S1", "teacherOrClass": "10A" } } })
        );
        let back: WeeklySchedule = serde_json::from_value(json).unwrap();
        assert_eq!(back, schedule);
    }

    #[test]
    fn test_null_slots_are_skipped() {
        let json = serde_json::json!({
            "Mon": { "1": { "subject": "MATH" }, "2": null },
            "Tue": null
        });
        let schedule: WeeklySchedule = serde_json::from_value(json).unwrap();
        assert_eq!(schedule.get(Day::Mon, 1).map(|e| e.subject.as_str()), Some("MATH"));
        assert!(schedule.get(Day::Mon, 2).is_none());
        assert_eq!(schedule.slots().count(), 1);
    }
}
