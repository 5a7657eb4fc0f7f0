use anyhow::{anyhow, Result};
use chrono::{Datelike, Duration, NaiveDate};

/// Parses `H:MM` (surrounding whitespace allowed) into minutes since midnight.
pub fn parse_clock(input: &str) -> Option<u32> {
    let (h, m) = input.trim().split_once(':')?;
    let hours: u32 = h.trim().parse().ok()?;
    let minutes: u32 = m.trim().parse().ok()?;
    if hours >= 24 || minutes >= 60 {
        return None;
    }
    Some(hours * 60 + minutes)
}

/// Resolves a register date relative to `today`.
///
/// Accepts `today`/`tod`, `yesterday`/`yes`, `-Nd`/`-Nw`, a weekday name (the
/// most recent such day, today included) and plain `YYYY-MM-DD`.
pub fn parse_date(input: &str, today: NaiveDate) -> Result<NaiveDate> {
    let input = input.trim();
    match input.to_lowercase().as_str() {
        "today" | "tod" => return Ok(today),
        "yesterday" | "yes" => return Ok(today - Duration::days(1)),
        _ => {}
    }

    if let Some(rest) = input.strip_prefix('-') {
        let invalid = || anyhow!("Invalid relative date: {}", input);
        let (num_str, span): (&str, fn(i64) -> Option<Duration>) =
            if let Some(n) = rest.strip_suffix('d') {
                (n, Duration::try_days)
            } else if let Some(n) = rest.strip_suffix('w') {
                (n, Duration::try_weeks)
            } else {
                return Err(anyhow!("Unknown unit in relative date: {}", input));
            };
        let count: i64 = num_str.parse().map_err(|_| invalid())?;
        return span(count)
            .and_then(|delta| today.checked_sub_signed(delta))
            .ok_or_else(invalid);
    }

    if let Some(weekday) = parse_weekday_str(input) {
        let back = (7 + today.weekday().num_days_from_sunday() as i64
            - weekday.num_days_from_sunday() as i64)
            % 7;
        return Ok(today - Duration::days(back));
    }

    NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|_| anyhow!("Could not parse date: {}", input))
}

fn parse_weekday_str(s: &str) -> Option<chrono::Weekday> {
    use chrono::Weekday;
    match s.to_lowercase().as_str() {
        "mon" | "monday" => Some(Weekday::Mon),
        "tue" | "tuesday" => Some(Weekday::Tue),
        "wed" | "wednesday" => Some(Weekday::Wed),
        "thu" | "thursday" => Some(Weekday::Thu),
        "fri" | "friday" => Some(Weekday::Fri),
        "sat" | "saturday" => Some(Weekday::Sat),
        "sun" | "sunday" => Some(Weekday::Sun),
        _ => None,
    }
}
