use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// School days, in timetable order. Friday is not a school day.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Day {
    Sat,
    Sun,
    Mon,
    Tue,
    Wed,
    Thu,
}

impl Day {
    pub const ALL: [Day; 6] = [Day::Sat, Day::Sun, Day::Mon, Day::Tue, Day::Wed, Day::Thu];

    pub fn as_str(&self) -> &'static str {
        match self {
            Day::Sat => "Sat",
            Day::Sun => "Sun",
            Day::Mon => "Mon",
            Day::Tue => "Tue",
            Day::Wed => "Wed",
            Day::Thu => "Thu",
        }
    }

    pub fn from_weekday(weekday: Weekday) -> Option<Day> {
        match weekday {
            Weekday::Sat => Some(Day::Sat),
            Weekday::Sun => Some(Day::Sun),
            Weekday::Mon => Some(Day::Mon),
            Weekday::Tue => Some(Day::Tue),
            Weekday::Wed => Some(Day::Wed),
            Weekday::Thu => Some(Day::Thu),
            Weekday::Fri => None,
        }
    }

    /// Calendar weekday of a date. Dates carry no timezone, so this is the
    /// same weekday a UTC reading of the ISO string yields.
    pub fn of_date(date: NaiveDate) -> Option<Day> {
        Day::from_weekday(date.weekday())
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Day {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "sat" | "saturday" => Ok(Day::Sat),
            "sun" | "sunday" => Ok(Day::Sun),
            "mon" | "monday" => Ok(Day::Mon),
            "tue" | "tuesday" => Ok(Day::Tue),
            "wed" | "wednesday" => Ok(Day::Wed),
            "thu" | "thursday" => Ok(Day::Thu),
            _ => Err(anyhow!("Not a school day: '{}'", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_of_date_uses_calendar_weekday() {
        // 2025-01-06 is a Monday, 2025-01-10 a Friday.
        let monday = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        let friday = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        assert_eq!(Day::of_date(monday), Some(Day::Mon));
        assert_eq!(Day::of_date(friday), None);
    }

    #[test]
    fn test_parse_day() {
        assert_eq!("mon".parse::<Day>().unwrap(), Day::Mon);
        assert_eq!("Thursday".parse::<Day>().unwrap(), Day::Thu);
        assert!("fri".parse::<Day>().is_err());
    }
}
