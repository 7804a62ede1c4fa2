//! Two-phase outcome of a primary write followed by a best-effort mirror

use serde::Serialize;
use std::fmt::Display;
use std::future::Future;
use tracing::warn;

/// Result of the best-effort phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SecondaryResult<S> {
    Succeeded(S),
    Failed { error: String },
    Skipped { reason: String },
}

/// Primary result plus what happened to the secondary phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TwoPhaseOutcome<P, S> {
    pub primary: P,
    pub secondary: SecondaryResult<S>,
}

impl<P, S> TwoPhaseOutcome<P, S> {
    /// Run `secondary` after a primary phase that already succeeded
    ///
    /// A secondary error is logged and recorded, never propagated.
    pub async fn after<F, E>(primary: P, secondary: F) -> Self
    where
        F: Future<Output = Result<S, E>>,
        E: Display,
    {
        let secondary = match secondary.await {
            Ok(value) => SecondaryResult::Succeeded(value),
            Err(e) => {
                warn!("Secondary phase failed: {}", e);
                SecondaryResult::Failed { error: e.to_string() }
            }
        };
        Self { primary, secondary }
    }

    pub fn skipped(primary: P, reason: impl Into<String>) -> Self {
        Self {
            primary,
            secondary: SecondaryResult::Skipped { reason: reason.into() },
        }
    }

    /// Primary succeeded but the secondary did not
    pub fn is_degraded(&self) -> bool {
        matches!(self.secondary, SecondaryResult::Failed { .. })
    }
}
