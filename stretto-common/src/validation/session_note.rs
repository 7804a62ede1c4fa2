//! Session-note payloads (free-form practice journal written against a repertoire item)

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{path, Checker, Len, Validated, ISO_TIMESTAMP_RE, REP_ID_RE};

/// Kind of observation recorded in a session entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
    Question,
    Breakthrough,
    Discovery,
    Challenge,
    Love,
    Confusion,
}

impl EntryType {
    pub const ALL: [&'static str; 6] = [
        "question",
        "breakthrough",
        "discovery",
        "challenge",
        "love",
        "confusion",
    ];

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "question" => Some(Self::Question),
            "breakthrough" => Some(Self::Breakthrough),
            "discovery" => Some(Self::Discovery),
            "challenge" => Some(Self::Challenge),
            "love" => Some(Self::Love),
            "confusion" => Some(Self::Confusion),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measures: Option<String>,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionNote {
    pub rep_id: String,
    #[serde(default)]
    pub exercise_ids: Vec<String>,
    pub timestamp: String,
    pub duration: u32,
    pub raw_content: String,
    pub entries: Vec<SessionEntry>,
}

/// Validate a session-note payload
pub fn validate_session_note(payload: &Value) -> Validated<SessionNote> {
    let mut c = Checker::new();
    let Some(map) = c.object(payload, "") else {
        return c.fail();
    };

    let rep_id = c
        .required_str(map.get("rep_id"), "rep_id", Len::NON_EMPTY)
        .filter(|id| {
            c.pattern(
                id,
                "rep_id",
                &REP_ID_RE,
                "rep_id must be lowercase alphanumeric with underscores",
            )
        });

    let exercise_ids = c.string_array(map.get("exercise_ids"), "exercise_ids");

    let timestamp = c
        .required_str(map.get("timestamp"), "timestamp", Len::NON_EMPTY)
        .filter(|ts| {
            c.pattern(
                ts,
                "timestamp",
                &ISO_TIMESTAMP_RE,
                "\"timestamp\" must be in ISO 8601 date format",
            )
        });

    let duration = c.integer(map.get("duration"), "duration", 1, 480, true);

    let raw_content = c.required_str(
        map.get("raw_content"),
        "raw_content",
        Len::between(1, 10_000),
    );

    let mut entries = Vec::new();
    if let Some(items) = c.required_array(map.get("entries"), "entries", 1) {
        for (i, item) in items.iter().enumerate() {
            if let Some(entry) = session_entry(&mut c, item, &path("entries", &i.to_string())) {
                entries.push(entry);
            }
        }
    }

    match (rep_id, timestamp, duration, raw_content) {
        (Some(rep_id), Some(timestamp), Some(duration), Some(raw_content)) => {
            c.finish(SessionNote {
                rep_id,
                exercise_ids,
                timestamp,
                duration: duration as u32,
                raw_content,
                entries,
            })
        }
        _ => c.fail(),
    }
}

fn session_entry(c: &mut Checker, value: &Value, field: &str) -> Option<SessionEntry> {
    let map = c.object(value, field)?;

    let measures = c.optional_str(map.get("measures"), &path(field, "measures"), Len::ANY);
    let content = c.required_str(
        map.get("content"),
        &path(field, "content"),
        Len::between(1, 1000),
    );
    let tags = c.string_array(map.get("tags"), &path(field, "tags"));

    let type_field = path(field, "type");
    let entry_type = match map.get("type") {
        None | Some(Value::Null) => {
            c.error(type_field.clone(), format!("\"{type_field}\" is required"));
            None
        }
        Some(v) => {
            let parsed = v.as_str().and_then(EntryType::parse);
            if parsed.is_none() {
                c.error(
                    type_field.clone(),
                    format!(
                        "\"{type_field}\" must be one of [{}]",
                        EntryType::ALL.join(", ")
                    ),
                );
            }
            parsed
        }
    };

    Some(SessionEntry {
        measures,
        content: content?,
        tags,
        entry_type: entry_type?,
    })
}
