use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::input::expand_key;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    Excused,
}

impl Default for AttendanceStatus {
    fn default() -> Self {
        AttendanceStatus::Present
    }
}

impl AttendanceStatus {
    pub const NAMES: [&'static str; 4] = ["present", "absent", "late", "excused"];

    /// Everything except ABSENT counts towards attendance percentages.
    pub fn is_attended(&self) -> bool {
        !matches!(self, AttendanceStatus::Absent)
    }

    /// Toggle order used when marking a register.
    pub fn next(&self) -> AttendanceStatus {
        match self {
            AttendanceStatus::Present => AttendanceStatus::Absent,
            AttendanceStatus::Absent => AttendanceStatus::Late,
            AttendanceStatus::Late => AttendanceStatus::Excused,
            AttendanceStatus::Excused => AttendanceStatus::Present,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "PRESENT",
            AttendanceStatus::Absent => "ABSENT",
            AttendanceStatus::Late => "LATE",
            AttendanceStatus::Excused => "EXCUSED",
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttendanceStatus {
    type Err = anyhow::Error;

    /// Accepts any unambiguous prefix, case-insensitively (`a`, `late`, `EXC`).
    fn from_str(s: &str) -> Result<Self> {
        let lowered = s.trim().to_lowercase();
        match expand_key(&lowered, &Self::NAMES)?.as_str() {
            "present" => Ok(AttendanceStatus::Present),
            "absent" => Ok(AttendanceStatus::Absent),
            "late" => Ok(AttendanceStatus::Late),
            _ => Ok(AttendanceStatus::Excused),
        }
    }
}

/// One student's status for one period of one class on one date.
/// `(date, entity_id, period, student_id)` identifies the record.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub date: NaiveDate,
    pub period: u32,
    /// Always a class id.
    pub entity_id: String,
    pub student_id: String,
    pub status: AttendanceStatus,
}

impl AttendanceRecord {
    pub fn new(
        date: NaiveDate,
        entity_id: impl Into<String>,
        period: u32,
        student_id: impl Into<String>,
        status: AttendanceStatus,
    ) -> Self {
        Self {
            date,
            period,
            entity_id: entity_id.into(),
            student_id: student_id.into(),
            status,
        }
    }

    pub fn same_key(&self, other: &AttendanceRecord) -> bool {
        self.date == other.date
            && self.period == other.period
            && self.entity_id == other.entity_id
            && self.student_id == other.student_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_prefixes() {
        assert_eq!("a".parse::<AttendanceStatus>().unwrap(), AttendanceStatus::Absent);
        assert_eq!("L".parse::<AttendanceStatus>().unwrap(), AttendanceStatus::Late);
        assert_eq!("EXCUSED".parse::<AttendanceStatus>().unwrap(), AttendanceStatus::Excused);
        assert_eq!("pres".parse::<AttendanceStatus>().unwrap(), AttendanceStatus::Present);
        assert!("x".parse::<AttendanceStatus>().is_err());
    }

    #[test]
    fn test_toggle_cycle_returns_to_present() {
        let mut status = AttendanceStatus::Present;
        for _ in 0..4 {
            status = status.next();
        }
        assert_eq!(status, AttendanceStatus::Present);
        assert_eq!(AttendanceStatus::Present.next(), AttendanceStatus::Absent);
    }

    #[test]
    fn test_only_absent_is_unattended() {
        assert!(AttendanceStatus::Present.is_attended());
        assert!(AttendanceStatus::Late.is_attended());
        assert!(AttendanceStatus::Excused.is_attended());
        assert!(!AttendanceStatus::Absent.is_attended());
    }

    #[test]
    fn test_record_wire_format() {
        let record = AttendanceRecord::new(
            NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
            "c-1",
            2,
            "stu-1",
            AttendanceStatus::Late,
        );
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "date": "2025-03-03",
                "period": 2,
                "entityId": "c-1",
                "studentId": "stu-1",
                "status": "LATE"
            })
        );
    }
}
