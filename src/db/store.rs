//! SQLite-backed implementation of the capability traits.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::Connection;
use uuid::Uuid;

use super::repository;
use super::sqlite::{open_database, open_memory_database};
use super::traits::{AnalysisStore, ClinicalNoteStore, PatientLookup, ReportLookup};
use super::DatabaseError;
use crate::models::{AnalysisRecord, ClinicalNote, Patient, Report};

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        Ok(Self::from_connection(open_database(path)?))
    }

    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        Ok(Self::from_connection(open_memory_database()?))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Direct access for setup code that writes patients, reports and notes.
    pub fn conn(&self) -> Result<MutexGuard<'_, Connection>, DatabaseError> {
        self.conn.lock().map_err(|_| DatabaseError::LockPoisoned)
    }
}

impl PatientLookup for SqliteStore {
    fn find_patient(&self, id: &Uuid) -> Result<Option<Patient>, DatabaseError> {
        repository::get_patient(&*self.conn()?, id)
    }
}

impl ReportLookup for SqliteStore {
    fn find_report(&self, id: &Uuid) -> Result<Option<Report>, DatabaseError> {
        repository::get_report(&*self.conn()?, id)
    }

    fn find_reports_by_patient(&self, patient_id: &Uuid) -> Result<Vec<Report>, DatabaseError> {
        repository::get_reports_by_patient(&*self.conn()?, patient_id)
    }
}

impl AnalysisStore for SqliteStore {
    fn create_analysis(&self, record: &AnalysisRecord) -> Result<(), DatabaseError> {
        repository::insert_analysis(&*self.conn()?, record)
    }

    fn find_analysis_by_report(
        &self,
        report_id: &Uuid,
    ) -> Result<Option<AnalysisRecord>, DatabaseError> {
        repository::get_analysis_by_report(&*self.conn()?, report_id)
    }

    fn find_analysis(&self, id: &Uuid) -> Result<Option<AnalysisRecord>, DatabaseError> {
        repository::get_analysis(&*self.conn()?, id)
    }
}

impl ClinicalNoteStore for SqliteStore {
    fn find_notes_by_report(&self, report_id: &Uuid) -> Result<Vec<ClinicalNote>, DatabaseError> {
        repository::get_notes_by_report(&*self.conn()?, report_id)
    }
}
