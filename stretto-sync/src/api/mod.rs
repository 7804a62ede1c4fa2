//! HTTP API handlers for stretto-sync

pub mod health;
pub mod notes;
pub mod payload;
pub mod practice_logs;
pub mod repertoire;
pub mod sync;

pub use health::health_routes;
pub use notes::create_note;
pub use payload::parse_payload;
pub use practice_logs::{get_practice_day, save_practice_note, sync_practice_log, upsert_practice_log};
pub use repertoire::create_repertoire;
pub use sync::sync_date_section;
