//! Report analysis: one engine run per report, trend merge, validation and
//! persistence. Engine faults are stored as failed analyses, not raised.

pub mod orchestrator;
pub mod validation;

pub use orchestrator::*;
pub use validation::*;

use thiserror::Error;
use uuid::Uuid;

use crate::db::DatabaseError;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: Uuid },

    #[error("Report {0} has already been analyzed")]
    Conflict(Uuid),

    #[error("Analysis record failed validation: {}", .0.join("; "))]
    ValidationFailed(Vec<String>),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}
