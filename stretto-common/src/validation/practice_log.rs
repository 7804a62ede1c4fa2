//! Practice-log payloads (one session for one piece on one day)

use serde_json::{Map, Value};
use uuid::Uuid;

use super::{path, Checker, Len, Validated};
use crate::model::{Entry, Focus, NoteRecord, PieceMetadata};
use crate::time::{is_calendar_date, parse_session_time};

/// Longest plausible session, in minutes
const MAX_DURATION_MINUTES: i64 = 24 * 60;

/// How to treat a payload without a `note_id`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteIdPolicy {
    /// Reject the payload
    Required,
    /// Assign a fresh UUID
    Generate,
}

/// Validate and normalize a practice-log payload
///
/// `noteId` is accepted as an alias for `note_id`. Tags are trimmed and
/// deduplicated in first-seen order; `time` is normalized to `HH:MM`.
pub fn validate_practice_log(payload: &Value, policy: NoteIdPolicy) -> Validated<NoteRecord> {
    let mut c = Checker::new();
    let Some(map) = c.object(payload, "") else {
        return c.fail();
    };

    let note_id_value = map.get("note_id").or_else(|| map.get("noteId"));
    let note_id = match (policy, note_id_value) {
        (NoteIdPolicy::Generate, None | Some(Value::Null)) => Some(Uuid::new_v4().to_string()),
        _ => c.required_str(note_id_value, "note_id", Len::NON_EMPTY),
    };

    let piece_id = c
        .required_str(map.get("piece_id"), "piece_id", Len::NON_EMPTY)
        .and_then(|id| {
            let trimmed = id.trim().to_string();
            if trimmed.is_empty() {
                c.error("piece_id", "\"piece_id\" is not allowed to be empty");
                None
            } else {
                Some(trimmed)
            }
        });

    let date = c
        .required_str(map.get("date"), "date", Len::NON_EMPTY)
        .and_then(|d| {
            if is_calendar_date(&d) {
                Some(d)
            } else {
                c.error("date", "\"date\" must be in YYYY-MM-DD format");
                None
            }
        });

    let time = c
        .optional_str(map.get("time"), "time", Len::NON_EMPTY)
        .and_then(|t| match parse_session_time(&t) {
            Some(parsed) => Some(parsed.format("%H:%M").to_string()),
            None => {
                c.error("time", "\"time\" must be in HH:MM format");
                None
            }
        });

    let duration_minutes = c
        .integer(
            map.get("duration_minutes"),
            "duration_minutes",
            0,
            MAX_DURATION_MINUTES,
            false,
        )
        .unwrap_or(0) as u32;

    let mut entries = Vec::new();
    if let Some(items) = c.required_array(map.get("entries"), "entries", 1) {
        for (i, item) in items.iter().enumerate() {
            if let Some(entry) = entry(&mut c, item, &path("entries", &i.to_string())) {
                entries.push(entry);
            }
        }
    }

    let metadata = metadata(&mut c, map);

    match (note_id, piece_id, date) {
        (Some(note_id), Some(piece_id), Some(date)) => c.finish(NoteRecord {
            note_id,
            piece_id,
            date,
            time,
            duration_minutes,
            entries,
            metadata,
        }),
        _ => c.fail(),
    }
}

fn entry(c: &mut Checker, value: &Value, field: &str) -> Option<Entry> {
    let map = c.object(value, field)?;

    let content = c
        .optional_str(map.get("content"), &path(field, "content"), Len::ANY)
        .unwrap_or_default();
    let tags = normalize_tags(c.string_array(map.get("tags"), &path(field, "tags")));
    let teacher_questions =
        c.string_array(map.get("teacher_questions"), &path(field, "teacher_questions"));

    let focus = match map.get("focus") {
        None | Some(Value::Null) => None,
        Some(v) => {
            let focus_field = path(field, "focus");
            let focus_map = c.object(v, &focus_field)?;
            Some(Focus {
                section: c.optional_text(focus_map.get("section"), &path(&focus_field, "section")),
                measures: c
                    .optional_text(focus_map.get("measures"), &path(&focus_field, "measures")),
                page: c.optional_text(focus_map.get("page"), &path(&focus_field, "page")),
                book: c.optional_text(focus_map.get("book"), &path(&focus_field, "book")),
            })
        }
    };

    Some(Entry {
        focus,
        content,
        tags,
        teacher_questions,
    })
}

fn metadata(c: &mut Checker, map: &Map<String, Value>) -> PieceMetadata {
    let time_signature = map
        .get("time_signature")
        .or_else(|| map.get("Time Signature"));

    PieceMetadata {
        title: c.optional_str(map.get("title"), "title", Len::ANY),
        composer: c.optional_str(map.get("composer"), "composer", Len::ANY),
        style: c.optional_str(map.get("style"), "style", Len::ANY),
        status: c.optional_str(map.get("status"), "status", Len::ANY),
        keys: c.string_array(map.get("keys"), "keys"),
        time_signature: c.string_array(time_signature, "time_signature"),
    }
}

fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !out.iter().any(|seen| seen == tag) {
            out.push(tag.to_string());
        }
    }
    out
}
