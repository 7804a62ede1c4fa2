//! Mirror services: aggregation, rendering and section reconciliation

pub mod aggregator;
pub mod block_builder;
pub mod mirror;
pub mod outcome;
pub mod page_locator;
pub mod section_reconciler;

pub use aggregator::{aggregate, latest_per_note};
pub use block_builder::{build_day_blocks, build_entry_blocks, build_note_blocks, date_section};
pub use mirror::{mirror_day, sync_day, MirrorReport};
pub use outcome::{SecondaryResult, TwoPhaseOutcome};
pub use page_locator::{locate_or_create_page, locate_page};
pub use section_reconciler::{reconcile, ReconcileReport};
