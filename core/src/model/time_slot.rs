use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::time::parse_clock;

/// One configured period. `time_range` is display text such as `"9:00 - 9:45"`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    pub period: u32,
    pub time_range: String,
}

impl TimeSlot {
    pub fn new(period: u32, time_range: impl Into<String>) -> Self {
        Self {
            period,
            time_range: time_range.into(),
        }
    }

    /// Start of the range in minutes since midnight, if it parses.
    pub fn start_minutes(&self) -> Option<u32> {
        self.time_range.split('-').next().and_then(parse_clock)
    }

    pub fn end_minutes(&self) -> Option<u32> {
        self.time_range.split('-').nth(1).and_then(parse_clock)
    }
}

pub fn default_time_slots() -> Vec<TimeSlot> {
    [
        (1, "6:45 - 7:45"),
        (2, "7:45 - 8:30"),
        (3, "9:00 - 9:45"),
        (4, "9:45 - 10:30"),
        (5, "10:40 - 11:25"),
        (6, "11:25 - 12:10"),
        (7, "12:10 - 12:55"),
        (8, "2:00 - 3:00"),
        (9, "3:00 - 4:00"),
    ]
    .into_iter()
    .map(|(period, range)| TimeSlot::new(period, range))
    .collect()
}

/// Period numbers must be positive and unique across the configuration.
pub fn validate_time_slots(slots: &[TimeSlot]) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for slot in slots {
        if slot.period == 0 {
            return Err(ValidationError::InvalidPeriod(slot.period));
        }
        if !seen.insert(slot.period) {
            return Err(ValidationError::DuplicatePeriod(slot.period));
        }
    }
    Ok(())
}

/// The slot whose range contains `minutes` (start inclusive, end exclusive).
pub fn current_period(slots: &[TimeSlot], minutes: u32) -> Option<&TimeSlot> {
    slots.iter().find(|slot| match (slot.start_minutes(), slot.end_minutes()) {
        (Some(start), Some(end)) => minutes >= start && minutes < end,
        _ => false,
    })
}

/// The slot with the earliest start strictly after `minutes`.
pub fn next_period(slots: &[TimeSlot], minutes: u32) -> Option<&TimeSlot> {
    slots
        .iter()
        .filter_map(|slot| slot.start_minutes().map(|start| (start, slot)))
        .filter(|(start, _)| *start > minutes)
        .min_by_key(|(start, _)| *start)
        .map(|(_, slot)| slot)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_parsing() {
        let slot = TimeSlot::new(5, "10:40 - 11:25");
        assert_eq!(slot.start_minutes(), Some(640));
        assert_eq!(slot.end_minutes(), Some(685));
        assert_eq!(TimeSlot::new(1, "morning").start_minutes(), None);
    }

    #[test]
    fn test_current_and_next_period() {
        let slots = default_time_slots();
        // 9:50
        assert_eq!(current_period(&slots, 590).map(|s| s.period), Some(4));
        assert_eq!(next_period(&slots, 590).map(|s| s.period), Some(5));
        // 8:45 falls in the break between periods 2 and 3
        assert!(current_period(&slots, 525).is_none());
        assert_eq!(next_period(&slots, 525).map(|s| s.period), Some(3));
        // A boundary belongs to the period that starts there.
        assert_eq!(current_period(&slots, 465).map(|s| s.period), Some(2));
    }

    #[test]
    fn test_validate_time_slots() {
        assert!(validate_time_slots(&default_time_slots()).is_ok());
        assert_eq!(
            validate_time_slots(&[TimeSlot::new(1, "a"), TimeSlot::new(1, "b")]),
            Err(ValidationError::DuplicatePeriod(1))
        );
        assert_eq!(
            validate_time_slots(&[TimeSlot::new(0, "a")]),
            Err(ValidationError::InvalidPeriod(0))
        );
    }
}
