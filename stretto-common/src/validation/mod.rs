//! Payload validation
//!
//! Each validator takes an untyped JSON payload and either returns the typed,
//! normalized value (unknown fields stripped, defaults applied) or every
//! field error found. Validation never stops at the first error.

mod practice_log;
mod repertoire;
mod session_note;

pub use practice_log::{validate_practice_log, NoteIdPolicy};
pub use repertoire::{
    validate_repertoire, Importance, Memorized, RepMetadata, RepStatus, Repertoire,
};
pub use session_note::{validate_session_note, EntryType, SessionEntry, SessionNote};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Lowercase alphanumeric identifiers with underscores
pub(crate) static REP_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9_]+$").expect("valid rep_id regex"));

/// ISO 8601 UTC timestamp with optional milliseconds
pub(crate) static ISO_TIMESTAMP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(\.\d{3})?Z$").expect("valid timestamp regex")
});

/// One failed field check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Dotted path, e.g. `entries.0.content`
    pub field: String,
    pub message: String,
}

/// Validation result alias
pub type Validated<T> = std::result::Result<T, Vec<FieldError>>;

/// Length bounds for string fields, in characters
#[derive(Debug, Clone, Copy)]
pub(crate) struct Len {
    pub min: usize,
    pub max: usize,
}

impl Len {
    pub const NON_EMPTY: Len = Len { min: 1, max: usize::MAX };
    pub const ANY: Len = Len { min: 0, max: usize::MAX };

    pub const fn between(min: usize, max: usize) -> Len {
        Len { min, max }
    }
}

/// Accumulates field errors across one payload
#[derive(Debug, Default)]
pub(crate) struct Checker {
    errors: Vec<FieldError>,
}

pub(crate) fn path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

impl Checker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Root payload must be a JSON object
    pub fn object<'a>(&mut self, value: &'a Value, field: &str) -> Option<&'a Map<String, Value>> {
        match value.as_object() {
            Some(map) => Some(map),
            None => {
                let label = if field.is_empty() { "value" } else { field };
                self.error(label, format!("\"{label}\" must be of type object"));
                None
            }
        }
    }

    /// Required string with length bounds
    pub fn required_str(&mut self, value: Option<&Value>, field: &str, len: Len) -> Option<String> {
        match value {
            None | Some(Value::Null) => {
                self.error(field, format!("\"{field}\" is required"));
                None
            }
            Some(v) => self.string(v, field, len),
        }
    }

    /// Optional string; absent or null yields `None`
    pub fn optional_str(&mut self, value: Option<&Value>, field: &str, len: Len) -> Option<String> {
        match value {
            None | Some(Value::Null) => None,
            Some(v) => self.string(v, field, len),
        }
    }

    fn string(&mut self, value: &Value, field: &str, len: Len) -> Option<String> {
        let Some(s) = value.as_str() else {
            self.error(field, format!("\"{field}\" must be a string"));
            return None;
        };
        let count = s.chars().count();
        if count == 0 && len.min > 0 {
            self.error(field, format!("\"{field}\" is not allowed to be empty"));
            return None;
        }
        if count < len.min {
            self.error(
                field,
                format!("\"{field}\" length must be at least {} characters long", len.min),
            );
            return None;
        }
        if count > len.max {
            self.error(
                field,
                format!(
                    "\"{field}\" length must be less than or equal to {} characters long",
                    len.max
                ),
            );
            return None;
        }
        Some(s.to_string())
    }

    /// String or number rendered as text, e.g. a page number
    pub fn optional_text(&mut self, value: Option<&Value>, field: &str) -> Option<String> {
        match value {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            Some(_) => {
                self.error(field, format!("\"{field}\" must be a string"));
                None
            }
        }
    }

    /// Check a present string against a pattern
    pub fn pattern(&mut self, value: &str, field: &str, re: &Regex, message: &str) -> bool {
        if re.is_match(value) {
            true
        } else {
            self.error(field, message);
            false
        }
    }

    /// Array of strings; absent yields an empty list
    pub fn string_array(&mut self, value: Option<&Value>, field: &str) -> Vec<String> {
        let Some(value) = value else {
            return Vec::new();
        };
        let Some(items) = value.as_array() else {
            self.error(field, format!("\"{field}\" must be an array"));
            return Vec::new();
        };
        let mut out = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            match item.as_str() {
                Some(s) => out.push(s.to_string()),
                None => {
                    let item_field = path(field, &i.to_string());
                    self.error(item_field.clone(), format!("\"{item_field}\" must be a string"));
                }
            }
        }
        out
    }

    /// Required array with at least `min` items
    pub fn required_array<'a>(
        &mut self,
        value: Option<&'a Value>,
        field: &str,
        min: usize,
    ) -> Option<&'a Vec<Value>> {
        match value {
            None | Some(Value::Null) => {
                self.error(field, format!("\"{field}\" is required"));
                None
            }
            Some(v) => match v.as_array() {
                None => {
                    self.error(field, format!("\"{field}\" must be an array"));
                    None
                }
                Some(items) if items.len() < min => {
                    self.error(
                        field,
                        format!("\"{field}\" must contain at least {min} items"),
                    );
                    None
                }
                Some(items) => Some(items),
            },
        }
    }

    /// Integer within inclusive bounds
    pub fn integer(
        &mut self,
        value: Option<&Value>,
        field: &str,
        min: i64,
        max: i64,
        required: bool,
    ) -> Option<i64> {
        let value = match value {
            None | Some(Value::Null) => {
                if required {
                    self.error(field, format!("\"{field}\" is required"));
                }
                return None;
            }
            Some(v) => v,
        };
        let Value::Number(number) = value else {
            self.error(field, format!("\"{field}\" must be a number"));
            return None;
        };
        let Some(n) = number.as_i64() else {
            self.error(field, format!("\"{field}\" must be an integer"));
            return None;
        };
        if n < min {
            self.error(
                field,
                format!("\"{field}\" must be greater than or equal to {min}"),
            );
            return None;
        }
        if n > max {
            self.error(field, format!("\"{field}\" must be less than or equal to {max}"));
            return None;
        }
        Some(n)
    }

    /// One of a fixed set of values, with a default when absent
    pub fn one_of(
        &mut self,
        value: Option<&Value>,
        field: &str,
        allowed: &[&str],
        default: &str,
    ) -> String {
        match value {
            None => default.to_string(),
            Some(Value::String(s)) if allowed.contains(&s.as_str()) => s.clone(),
            Some(_) => {
                self.error(
                    field,
                    format!("\"{field}\" must be one of [{}]", allowed.join(", ")),
                );
                default.to_string()
            }
        }
    }

    /// Give up on building a value and report what was found so far
    pub fn fail<T>(self) -> Validated<T> {
        Err(self.errors)
    }

    pub fn finish<T>(self, value: T) -> Validated<T> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(self.errors)
        }
    }
}
