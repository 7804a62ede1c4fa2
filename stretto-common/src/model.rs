//! Practice-log domain model
//!
//! A [`NoteRecord`] is one practice session for one piece on one day. Records
//! are written by the log handlers and read back, per (piece_id, date), when
//! the day's document section is rebuilt.

use serde::{Deserialize, Serialize};

/// Structured location inside a score
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Focus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measures: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book: Option<String>,
}

impl Focus {
    /// True when no sub-field carries any text
    pub fn is_empty(&self) -> bool {
        [&self.section, &self.measures, &self.page, &self.book]
            .iter()
            .all(|part| part.as_deref().map_or(true, |s| s.trim().is_empty()))
    }
}

/// One observation inside a practice session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus: Option<Focus>,
    #[serde(default)]
    pub content: String,
    /// Display order is preserved; duplicates are removed during validation
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub teacher_questions: Vec<String>,
}

/// Optional repertoire metadata carried by a practice log
///
/// Only used when the piece has no document page yet and one is created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub composer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keys: Vec<String>,
    #[serde(
        default,
        rename = "time_signature",
        alias = "Time Signature",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub time_signature: Vec<String>,
}

/// One practice session for one piece on one calendar day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteRecord {
    pub note_id: String,
    pub piece_id: String,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM`, 24-hour
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default)]
    pub duration_minutes: u32,
    pub entries: Vec<Entry>,
    #[serde(flatten)]
    pub metadata: PieceMetadata,
}
