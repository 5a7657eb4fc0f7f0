use std::collections::{BTreeMap, HashSet};

use serde::Deserialize;
use tracing::debug;

use crate::ai::AiError;
use crate::model::day::Day;
use crate::model::import::{AiImportResult, ImportKind, RawProfile};
use crate::model::schedule::{TimetableEntry, WeeklySchedule};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawResponse {
    #[serde(default)]
    detected_type: Option<ImportKind>,
    #[serde(default)]
    profiles: Option<Vec<RawResponseProfile>>,
    #[serde(default)]
    unknown_codes: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct RawResponseProfile {
    name: String,
    #[serde(default)]
    schedule: Option<BTreeMap<String, Option<BTreeMap<String, Option<RawSlot>>>>>,
}

#[derive(Deserialize)]
struct RawSlot {
    #[serde(default)]
    subject: Option<String>,
    #[serde(default)]
    room: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

/// Models like to wrap JSON in a Markdown fence.
fn strip_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Turns the model's JSON reply into an import result. Each slot's generic
/// `code` becomes the entry's cross-reference. Unknown days, non-numeric
/// periods and slots without a subject are dropped. A missing type means
/// CLASS_WISE.
pub fn parse_import_response(text: &str) -> Result<AiImportResult, AiError> {
    let raw: RawResponse = serde_json::from_str(strip_fence(text))?;

    let mut codes = Vec::new();
    let mut seen = HashSet::new();
    let mut note_code = |code: &str| {
        if seen.insert(code.to_string()) {
            codes.push(code.to_string());
        }
    };
    for code in raw.unknown_codes.unwrap_or_default() {
        let code = code.trim();
        if !code.is_empty() {
            note_code(code);
        }
    }

    let mut profiles = Vec::new();
    for profile in raw.profiles.unwrap_or_default() {
        let mut schedule = WeeklySchedule::new();
        for (day_key, slots) in profile.schedule.unwrap_or_default() {
            let Ok(day) = day_key.parse::<Day>() else {
                debug!(day = %day_key, "skipping non-school day in AI response");
                continue;
            };
            for (period_key, slot) in slots.unwrap_or_default() {
                let (Ok(period), Some(slot)) = (period_key.trim().parse::<u32>(), slot) else {
                    continue;
                };
                let Some(subject) = non_empty(slot.subject) else {
                    continue;
                };
                if period == 0 {
                    continue;
                }
                let code = non_empty(slot.code);
                if let Some(code) = &code {
                    note_code(code);
                }
                schedule.set(
                    day,
                    period,
                    Some(TimetableEntry {
                        subject,
                        room: non_empty(slot.room),
                        teacher_or_class: code,
                    }),
                );
            }
        }
        profiles.push(RawProfile {
            name: profile.name.trim().to_string(),
            schedule,
        });
    }

    Ok(AiImportResult {
        detected_type: raw.detected_type.unwrap_or(ImportKind::ClassWise),
        profiles,
        unknown_codes: codes,
        raw_text_response: Some(text.to_string()),
    })
}
