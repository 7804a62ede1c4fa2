//! Repertoire payloads (one piece in the player's repertoire)

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{path, Checker, Len, Validated, ISO_TIMESTAMP_RE, REP_ID_RE};
use crate::time::{is_iso_date, now_iso};

macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident, default = $default:ident, { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [&'static str] = &[$($text),+];

            pub fn parse(value: &str) -> Option<Self> {
                match value {
                    $($text => Some(Self::$variant),)+
                    _ => None,
                }
            }

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$default
            }
        }
    };
}

string_enum!(
    /// How much attention the piece currently gets
    Importance, default = Active, {
        Active => "active",
        Backburner => "backburner",
        Reference => "reference",
        Archived => "archived",
    }
);

string_enum!(
    /// Learning stage
    RepStatus, default = Learning, {
        Learning => "learning",
        Polishing => "polishing",
        PerformanceReady => "performance_ready",
        Paused => "paused",
    }
);

string_enum!(
    /// Memorization level
    Memorized, default = None, {
        None => "none",
        Shaky => "shaky",
        Confident => "confident",
        Solid => "solid",
    }
);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub composer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opus_info: Option<String>,
    #[serde(default)]
    pub keys: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_composed: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repertoire {
    pub rep_id: String,
    pub name: String,
    pub display_name: String,
    pub importance: Importance,
    pub status: RepStatus,
    pub memorized: Memorized,
    pub metadata: RepMetadata,
    pub aliases: Vec<String>,
    pub tags: Vec<String>,
    pub target_date: Option<String>,
    pub started_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_practiced: Option<String>,
}

/// Validate a repertoire payload, applying defaults for omitted fields
pub fn validate_repertoire(payload: &Value) -> Validated<Repertoire> {
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
    let name = c.required_str(map.get("name"), "name", Len::between(1, 200));
    let display_name = c.required_str(map.get("display_name"), "display_name", Len::between(1, 100));

    let importance = Importance::parse(&c.one_of(
        map.get("importance"),
        "importance",
        Importance::ALL,
        Importance::default().as_str(),
    ))
    .unwrap_or_default();
    let status = RepStatus::parse(&c.one_of(
        map.get("status"),
        "status",
        RepStatus::ALL,
        RepStatus::default().as_str(),
    ))
    .unwrap_or_default();
    let memorized = Memorized::parse(&c.one_of(
        map.get("memorized"),
        "memorized",
        Memorized::ALL,
        Memorized::default().as_str(),
    ))
    .unwrap_or_default();

    let metadata = match map.get("metadata") {
        None => RepMetadata::default(),
        Some(v) => rep_metadata(&mut c, v).unwrap_or_default(),
    };

    let aliases = c.string_array(map.get("aliases"), "aliases");
    let tags = c.string_array(map.get("tags"), "tags");

    let target_date = match map.get("target_date") {
        None | Some(Value::Null) => None,
        Some(v) => iso_date(&mut c, v, "target_date"),
    };
    let last_practiced = match map.get("last_practiced") {
        None => None,
        Some(v) => iso_date(&mut c, v, "last_practiced"),
    };
    let started_date = match map.get("started_date") {
        None => Some(now_iso()),
        Some(v) => c.required_str(Some(v), "started_date", Len::NON_EMPTY).filter(|d| {
            c.pattern(
                d,
                "started_date",
                &ISO_TIMESTAMP_RE,
                "\"started_date\" must be in ISO 8601 date format with time",
            )
        }),
    };

    match (rep_id, name, display_name, started_date) {
        (Some(rep_id), Some(name), Some(display_name), Some(started_date)) => {
            c.finish(Repertoire {
                rep_id,
                name,
                display_name,
                importance,
                status,
                memorized,
                metadata,
                aliases,
                tags,
                target_date,
                started_date,
                last_practiced,
            })
        }
        _ => c.fail(),
    }
}

fn rep_metadata(c: &mut Checker, value: &Value) -> Option<RepMetadata> {
    let map = c.object(value, "metadata")?;
    Some(RepMetadata {
        composer: c.optional_str(map.get("composer"), &path("metadata", "composer"), Len::ANY),
        opus_info: c.optional_str(map.get("opus_info"), &path("metadata", "opus_info"), Len::ANY),
        keys: c.string_array(map.get("keys"), &path("metadata", "keys")),
        year_composed: c.integer(
            map.get("year_composed"),
            &path("metadata", "year_composed"),
            1000,
            2100,
            false,
        ),
        difficulty: c.optional_str(
            map.get("difficulty"),
            &path("metadata", "difficulty"),
            Len::NON_EMPTY,
        ),
    })
}

fn iso_date(c: &mut Checker, value: &Value, field: &str) -> Option<String> {
    match value.as_str() {
        Some(s) if is_iso_date(s) => Some(s.to_string()),
        _ => {
            c.error(field, format!("\"{field}\" must be in ISO 8601 date format"));
            None
        }
    }
}
