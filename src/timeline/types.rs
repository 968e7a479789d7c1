use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::critical::{derive_critical_findings, HIGH_THRESHOLD};
use crate::models::enums::{CriticalSeverity, TimelineEventType};
use crate::models::{AnalysisRecord, ClinicalNote, Patient, Report};

/// One report on a patient's timeline, dated by the report date rather than
/// the upload date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub date: NaiveDate,
    pub event_type: TimelineEventType,
    pub payload: TimelineEventPayload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEventPayload {
    pub report: Report,
    pub analysis: Option<AnalysisRecord>,
    /// Non-deleted notes, newest first.
    pub notes: Vec<ClinicalNote>,
}

impl TimelineEvent {
    pub fn report_id(&self) -> Uuid {
        self.payload.report.id
    }

    /// True when the analysis confidence reaches the high tier.
    pub fn has_critical_findings(&self) -> bool {
        self.payload
            .analysis
            .as_ref()
            .is_some_and(|a| a.confidence_score >= HIGH_THRESHOLD)
    }

    pub fn within(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> bool {
        in_date_range(self.date, start, end)
    }
}

/// Inclusive range check. A missing bound leaves that side open.
pub fn in_date_range(date: NaiveDate, start: Option<NaiveDate>, end: Option<NaiveDate>) -> bool {
    start.map_or(true, |s| date >= s) && end.map_or(true, |e| date <= e)
}

/// An analysis singled out on a summary. Derived per request, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriticalFinding {
    pub report_id: Uuid,
    pub finding: String,
    pub severity: CriticalSeverity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientSummary {
    pub patient: Patient,
    /// Newest first.
    pub timeline: Vec<TimelineEvent>,
    pub critical_findings: Vec<CriticalFinding>,
}

impl PatientSummary {
    pub fn new(patient: Patient, timeline: Vec<TimelineEvent>) -> Self {
        let critical_findings = derive_critical_findings(&timeline);
        Self {
            patient,
            timeline,
            critical_findings,
        }
    }

    pub fn event_count(&self) -> usize {
        self.timeline.len()
    }

    pub fn critical_findings_count(&self) -> usize {
        self.critical_findings.len()
    }

    /// Narrow to an inclusive date range; critical findings are rederived
    /// from the remaining events.
    pub fn filter_by_date_range(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        let timeline = self
            .timeline
            .iter()
            .filter(|e| e.within(start, end))
            .cloned()
            .collect();
        Self::new(self.patient.clone(), timeline)
    }
}
