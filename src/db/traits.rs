//! Capability interfaces the analysis core consumes.
//!
//! The core never owns persistence. Orchestrator and aggregator receive these
//! as trait objects so an in-memory map, SQLite, or any other backend can sit
//! behind them.

use uuid::Uuid;

use super::DatabaseError;
use crate::models::{AnalysisRecord, ClinicalNote, Patient, Report};

pub trait ReportLookup: Send + Sync {
    /// Soft-deleted reports are reported as absent.
    fn find_report(&self, id: &Uuid) -> Result<Option<Report>, DatabaseError>;

    /// All non-deleted reports of a patient, in no particular order.
    fn find_reports_by_patient(&self, patient_id: &Uuid) -> Result<Vec<Report>, DatabaseError>;
}

pub trait PatientLookup: Send + Sync {
    fn find_patient(&self, id: &Uuid) -> Result<Option<Patient>, DatabaseError>;
}

pub trait AnalysisStore: Send + Sync {
    /// Must fail with `DatabaseError::AlreadyExists` when the report already
    /// has an analysis.
    fn create_analysis(&self, record: &AnalysisRecord) -> Result<(), DatabaseError>;

    fn find_analysis_by_report(
        &self,
        report_id: &Uuid,
    ) -> Result<Option<AnalysisRecord>, DatabaseError>;

    fn find_analysis(&self, id: &Uuid) -> Result<Option<AnalysisRecord>, DatabaseError>;
}

pub trait ClinicalNoteStore: Send + Sync {
    /// Notes attached to a report in any order. May include soft-deleted notes.
    fn find_notes_by_report(&self, report_id: &Uuid) -> Result<Vec<ClinicalNote>, DatabaseError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traits_are_object_safe() {
        fn _assert_reports(_: &dyn ReportLookup) {}
        fn _assert_patients(_: &dyn PatientLookup) {}
        fn _assert_analyses(_: &dyn AnalysisStore) {}
        fn _assert_notes(_: &dyn ClinicalNoteStore) {}
    }
}
