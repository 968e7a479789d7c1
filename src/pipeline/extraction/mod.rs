//! Document extraction: raw report text → structured findings.
//!
//! `AnalysisEngine` is the capability seam; `RuleBasedEngine` is the shipped
//! implementation, a stateless battery of keyword and regex rules.

pub mod classify;
pub mod confidence;
pub mod labs;
pub mod imaging;
pub mod medications;
pub mod pathology;
pub mod rule_engine;
pub mod severity;
pub mod summary;
pub mod types;

pub use confidence::*;
pub use rule_engine::*;
pub use types::*;

use thiserror::Error;

/// Faults raised by an engine. The rule-based engine converts its own faults
/// into partial results; other engines may return them to the caller.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Cannot decode {format} content as text: {source}")]
    Undecodable {
        format: String,
        #[source]
        source: std::str::Utf8Error,
    },

    #[error("Unparseable value '{value}' for {analyte}")]
    InvalidNumber { analyte: String, value: String },

    #[error("Internal engine error: {0}")]
    Internal(String),
}
