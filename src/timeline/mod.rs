//! Patient timeline: one event per non-deleted report, newest first, with
//! its analysis and notes, plus the analyses worth highlighting.

mod aggregate;
mod critical;
mod types;

pub use aggregate::*;
pub use critical::*;
pub use types::*;

use thiserror::Error;
use uuid::Uuid;

use crate::db::DatabaseError;

#[derive(Error, Debug)]
pub enum TimelineError {
    #[error("Patient not found: {0}")]
    PatientNotFound(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

// ── Tests ──────────────────────────────────────────────────────────────────
