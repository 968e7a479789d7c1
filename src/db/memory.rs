//! Mutex-guarded in-memory backend for every capability trait.
//!
//! Used by tests and for ephemeral runs. Enforces the same one-analysis-per-
//! report rule as the SQLite schema.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use uuid::Uuid;

use super::traits::{AnalysisStore, ClinicalNoteStore, PatientLookup, ReportLookup};
use super::DatabaseError;
use crate::models::{AnalysisRecord, ClinicalNote, Patient, Report};

#[derive(Default)]
pub struct InMemoryStore {
    patients: Mutex<HashMap<Uuid, Patient>>,
    reports: Mutex<HashMap<Uuid, Report>>,
    analyses: Mutex<HashMap<Uuid, AnalysisRecord>>,
    notes: Mutex<HashMap<Uuid, ClinicalNote>>,
}

fn guard<T>(m: &Mutex<T>) -> Result<MutexGuard<'_, T>, DatabaseError> {
    m.lock().map_err(|_| DatabaseError::LockPoisoned)
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_patient(&self, patient: Patient) -> Result<(), DatabaseError> {
        guard(&self.patients)?.insert(patient.id, patient);
        Ok(())
    }

    pub fn insert_report(&self, report: Report) -> Result<(), DatabaseError> {
        guard(&self.reports)?.insert(report.id, report);
        Ok(())
    }

    pub fn insert_note(&self, note: ClinicalNote) -> Result<(), DatabaseError> {
        guard(&self.notes)?.insert(note.id, note);
        Ok(())
    }

    pub fn soft_delete_report(&self, id: &Uuid) -> Result<(), DatabaseError> {
        let mut reports = guard(&self.reports)?;
        let report = reports.get_mut(id).ok_or_else(|| DatabaseError::NotFound {
            entity_type: "report".into(),
            id: id.to_string(),
        })?;
        report.deleted_at = Some(Utc::now());
        Ok(())
    }

    pub fn soft_delete_note(&self, id: &Uuid) -> Result<(), DatabaseError> {
        let mut notes = guard(&self.notes)?;
        let note = notes.get_mut(id).ok_or_else(|| DatabaseError::NotFound {
            entity_type: "clinical_note".into(),
            id: id.to_string(),
        })?;
        note.deleted_at = Some(Utc::now());
        Ok(())
    }

    pub fn analysis_count(&self) -> Result<usize, DatabaseError> {
        Ok(guard(&self.analyses)?.len())
    }
}

impl PatientLookup for InMemoryStore {
    fn find_patient(&self, id: &Uuid) -> Result<Option<Patient>, DatabaseError> {
        Ok(guard(&self.patients)?
            .get(id)
            .filter(|p| !p.is_deleted())
            .cloned())
    }
}

impl ReportLookup for InMemoryStore {
    fn find_report(&self, id: &Uuid) -> Result<Option<Report>, DatabaseError> {
        Ok(guard(&self.reports)?
            .get(id)
            .filter(|r| !r.is_deleted())
            .cloned())
    }

    fn find_reports_by_patient(&self, patient_id: &Uuid) -> Result<Vec<Report>, DatabaseError> {
        Ok(guard(&self.reports)?
            .values()
            .filter(|r| r.patient_id == *patient_id && !r.is_deleted())
            .cloned()
            .collect())
    }
}

impl AnalysisStore for InMemoryStore {
    fn create_analysis(&self, record: &AnalysisRecord) -> Result<(), DatabaseError> {
        let mut analyses = guard(&self.analyses)?;
        if analyses.values().any(|a| a.report_id == record.report_id) {
            return Err(DatabaseError::AlreadyExists {
                entity_type: "analysis".into(),
                key: record.report_id.to_string(),
            });
        }
        analyses.insert(record.id, record.clone());
        Ok(())
    }

    fn find_analysis_by_report(
        &self,
        report_id: &Uuid,
    ) -> Result<Option<AnalysisRecord>, DatabaseError> {
        Ok(guard(&self.analyses)?
            .values()
            .find(|a| a.report_id == *report_id)
            .cloned())
    }

    fn find_analysis(&self, id: &Uuid) -> Result<Option<AnalysisRecord>, DatabaseError> {
        Ok(guard(&self.analyses)?.get(id).cloned())
    }
}

impl ClinicalNoteStore for InMemoryStore {
    fn find_notes_by_report(&self, report_id: &Uuid) -> Result<Vec<ClinicalNote>, DatabaseError> {
        Ok(guard(&self.notes)?
            .values()
            .filter(|n| n.report_id == *report_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Builders shared by tests across the crate.

    use chrono::{DateTime, NaiveDate, Utc};
    use uuid::Uuid;

    use crate::models::enums::LabFlag;
    use crate::models::*;

    pub fn patient() -> Patient {
        Patient {
            id: Uuid::new_v4(),
            medical_record_number: "MRN-0001".into(),
            name: "Ada Example".into(),
            date_of_birth: NaiveDate::from_ymd_opt(1970, 3, 14).unwrap(),
            contact: None,
            created_at: Utc::now(),
            deleted_at: None,
        }
    }

    pub fn report(patient_id: Uuid, report_date: &str) -> Report {
        Report {
            id: Uuid::new_v4(),
            patient_id,
            report_date: NaiveDate::parse_from_str(report_date, "%Y-%m-%d").unwrap(),
            description: None,
            file_name: "report.txt".into(),
            file_reference: format!("mem://{report_date}"),
            file_hash: "a".repeat(64),
            file_format: "text/plain".into(),
            file_size: 128,
            upload_timestamp: Utc::now(),
            deleted_at: None,
        }
    }

    pub fn note(report_id: Uuid, content: &str, created_at: DateTime<Utc>) -> ClinicalNote {
        ClinicalNote {
            id: Uuid::new_v4(),
            report_id,
            content: content.into(),
            author_identifier: "dr.chen".into(),
            created_at,
            deleted_at: None,
        }
    }

    pub fn lab(name: &str, flag: LabFlag) -> LabValue {
        LabValue {
            name: name.into(),
            value: "1".into(),
            unit: "mg/dL".into(),
            reference_range: "0-2".into(),
            flag,
        }
    }

    pub fn diagnosis(description: &str) -> Diagnosis {
        Diagnosis {
            code: None,
            description: description.into(),
            confidence: 0.9,
        }
    }

    pub fn analysis(report_id: Uuid, data: ExtractedData, confidence_score: f64) -> AnalysisRecord {
        AnalysisRecord {
            id: Uuid::new_v4(),
            report_id,
            extracted_data: data,
            trend_indicators: TrendIndicators::default(),
            confidence_score,
            summary_text: "Analysis of report.txt:".into(),
            method: "rule_based".into(),
            outcome: AnalysisOutcome::Complete,
            analysis_timestamp: Utc::now(),
        }
    }
}
