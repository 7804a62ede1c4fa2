//! Aggregator: the deduplicated view of one piece's notes for one day

use std::cmp::Ordering;
use std::collections::HashMap;

use stretto_common::db::{NoteStore, StoredLog};
use stretto_common::time::parse_session_time;
use stretto_common::{Error, NoteRecord, Result};
use tracing::debug;

/// Notes stored for (`piece_id`, `date`), one per `note_id`
///
/// Any failure of the underlying query is reported as a store error; no
/// partial result is returned.
pub async fn aggregate(store: &dyn NoteStore, piece_id: &str, date: &str) -> Result<Vec<NoteRecord>> {
    let logs = store.query_logs(piece_id, date).await.map_err(|e| {
        if e.is_store_error() {
            e
        } else {
            Error::Store(e.to_string())
        }
    })?;

    let fetched = logs.len();
    let notes = latest_per_note(logs);
    debug!(piece_id, date, fetched, kept = notes.len(), "Aggregated practice logs");
    Ok(notes)
}

/// Keep the most recently written document per `note_id`
///
/// Equal write times keep the earliest in insertion order. The result is
/// ordered by session time (notes without a time last), then by `note_id`.
pub fn latest_per_note(mut logs: Vec<StoredLog>) -> Vec<NoteRecord> {
    logs.sort_by_key(|log| log.seq);

    let mut chosen: Vec<StoredLog> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for log in logs {
        match index.get(&log.record.note_id) {
            Some(&i) => {
                if log.updated_at > chosen[i].updated_at {
                    chosen[i] = log;
                }
            }
            None => {
                index.insert(log.record.note_id.clone(), chosen.len());
                chosen.push(log);
            }
        }
    }

    let mut notes: Vec<NoteRecord> = chosen.into_iter().map(|log| log.record).collect();
    notes.sort_by(session_order);
    notes
}

fn session_order(a: &NoteRecord, b: &NoteRecord) -> Ordering {
    let time_a = a.time.as_deref().and_then(parse_session_time);
    let time_b = b.time.as_deref().and_then(parse_session_time);
    let by_time = match (time_a, time_b) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_time.then_with(|| a.note_id.cmp(&b.note_id))
}
