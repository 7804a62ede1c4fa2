//! stretto-sync library
//!
//! HTTP service that stores practice-log notes and mirrors each practice
//! day into a collapsible section on the piece's document page.

use std::sync::Arc;

use axum::Router;
use stretto_common::config::MAX_CHILDREN_PAGE_SIZE;
use stretto_common::db::NoteStore;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;
pub mod notion;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use crate::notion::DocumentApi;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Note Store handle
    pub store: Arc<dyn NoteStore>,
    /// Remote document API; `None` disables mirroring
    pub documents: Option<Arc<dyn DocumentApi>>,
    /// Children listed per reconcile pass
    pub children_page_size: u32,
}

impl AppState {
    pub fn new(store: Arc<dyn NoteStore>, documents: Option<Arc<dyn DocumentApi>>) -> Self {
        Self {
            store,
            documents,
            children_page_size: MAX_CHILDREN_PAGE_SIZE,
        }
    }

    pub fn with_children_page_size(mut self, page_size: u32) -> Self {
        self.children_page_size = page_size;
        self
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    Router::new()
        .route("/notes", post(api::create_note))
        .route("/repertoire", post(api::create_repertoire))
        .route("/practice-logs", post(api::upsert_practice_log))
        .route("/practice-logs/sync", post(api::sync_practice_log))
        .route("/practice-logs/:piece_id/:date", get(api::get_practice_day))
        .route("/practice-notes", post(api::save_practice_note))
        .route("/sync/:piece_id/:date", post(api::sync_date_section))
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
