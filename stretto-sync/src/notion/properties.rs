//! Page properties for new repertoire pages

use serde_json::{json, Map, Value};
use stretto_common::PieceMetadata;

/// Initial status of each progress column on a new page
const DEFAULT_STATUSES: [(&str, &str); 4] = [
    ("Teacher (Vivid)", "Needs Work"),
    ("Memorization", "Unfamiliar"),
    ("Control", "Not Yet Studied"),
    ("Expression", "Not Yet Shaped"),
];

fn text(content: &str) -> Value {
    json!([{ "text": { "content": content } }])
}

fn select(name: &str) -> Value {
    json!({ "select": { "name": name } })
}

fn multi_select(names: &[String]) -> Value {
    let options: Vec<Value> = names.iter().map(|name| json!({ "name": name })).collect();
    json!({ "multi_select": options })
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Properties of a repertoire page created for `piece_id`
pub fn page_properties(piece_id: &str, metadata: &PieceMetadata) -> Value {
    let name = non_blank(&metadata.title)
        .or(Some(piece_id).filter(|id| !id.is_empty()))
        .unwrap_or("Untitled");

    let mut properties = Map::new();
    properties.insert("Name".into(), json!({ "title": text(name) }));
    properties.insert("piece_id".into(), json!({ "rich_text": text(piece_id) }));

    if let Some(composer) = non_blank(&metadata.composer) {
        properties.insert("Composer".into(), select(composer));
    }
    if let Some(style) = non_blank(&metadata.style) {
        properties.insert("Style".into(), select(style));
    }
    if !metadata.keys.is_empty() {
        properties.insert("Keys".into(), multi_select(&metadata.keys));
    }
    if !metadata.time_signature.is_empty() {
        properties.insert("Time Signature".into(), multi_select(&metadata.time_signature));
    }
    if let Some(status) = non_blank(&metadata.status) {
        properties.insert("Status".into(), select(status));
    }

    for (column, status) in DEFAULT_STATUSES {
        properties.insert(column.into(), json!({ "status": { "name": status } }));
    }

    Value::Object(properties)
}
