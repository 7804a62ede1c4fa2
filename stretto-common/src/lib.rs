//! # Stretto Common Library
//!
//! Shared code for the Stretto practice-log services including:
//! - Practice-log, session-note and repertoire models
//! - Payload validation
//! - The Note Store boundary and its SQLite implementation
//! - Configuration loading
//! - Time formatting helpers

pub mod config;
pub mod db;
pub mod error;
pub mod model;
pub mod time;
pub mod validation;

pub use error::{Error, Result};
pub use model::{Entry, Focus, NoteRecord, PieceMetadata};
pub use validation::FieldError;
