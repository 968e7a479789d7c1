use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An uploaded medical document. `report_date` is the clinical date of the
/// document; `upload_timestamp` is when it entered the system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub report_date: NaiveDate,
    pub description: Option<String>,
    pub file_name: String,
    pub file_reference: String,
    pub file_hash: String,
    pub file_format: String,
    pub file_size: u64,
    pub upload_timestamp: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Report {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}
