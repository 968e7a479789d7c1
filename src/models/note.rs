use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinicalNote {
    pub id: Uuid,
    pub report_id: Uuid,
    pub content: String,
    pub author_identifier: String,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl ClinicalNote {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}
