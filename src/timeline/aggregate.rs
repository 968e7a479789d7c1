use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;

use super::types::{in_date_range, PatientSummary, TimelineEvent, TimelineEventPayload};
use super::TimelineError;
use crate::db::{AnalysisStore, ClinicalNoteStore, PatientLookup, ReportLookup};
use crate::models::enums::TimelineEventType;
use crate::models::Report;

/// Builds patient summaries from the stores. Holds no state between calls;
/// the same stored data always yields the same summary.
pub struct TimelineAggregator {
    patients: Arc<dyn PatientLookup>,
    reports: Arc<dyn ReportLookup>,
    analyses: Arc<dyn AnalysisStore>,
    notes: Arc<dyn ClinicalNoteStore>,
}

impl TimelineAggregator {
    pub fn new(
        patients: Arc<dyn PatientLookup>,
        reports: Arc<dyn ReportLookup>,
        analyses: Arc<dyn AnalysisStore>,
        notes: Arc<dyn ClinicalNoteStore>,
    ) -> Self {
        Self {
            patients,
            reports,
            analyses,
            notes,
        }
    }

    /// Timeline of non-deleted reports, newest first, limited to the
    /// inclusive `[start, end]` range when either bound is given.
    pub fn generate_summary(
        &self,
        patient_id: &Uuid,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<PatientSummary, TimelineError> {
        let _span = tracing::info_span!("generate_summary", patient_id = %patient_id).entered();

        let patient = self
            .patients
            .find_patient(patient_id)?
            .ok_or(TimelineError::PatientNotFound(*patient_id))?;

        let mut reports: Vec<Report> = self
            .reports
            .find_reports_by_patient(patient_id)?
            .into_iter()
            .filter(|r| !r.is_deleted() && in_date_range(r.report_date, start, end))
            .collect();
        reports.sort_by(|a, b| {
            b.report_date
                .cmp(&a.report_date)
                .then_with(|| b.upload_timestamp.cmp(&a.upload_timestamp))
                .then_with(|| b.id.cmp(&a.id))
        });

        let mut timeline = Vec::with_capacity(reports.len());
        for report in reports {
            timeline.push(self.build_event(report)?);
        }

        let summary = PatientSummary::new(patient, timeline);
        tracing::debug!(
            events = summary.event_count(),
            critical_findings = summary.critical_findings_count(),
            "Patient summary generated"
        );
        Ok(summary)
    }

    fn build_event(&self, report: Report) -> Result<TimelineEvent, TimelineError> {
        let analysis = self.analyses.find_analysis_by_report(&report.id)?;

        let mut notes: Vec<_> = self
            .notes
            .find_notes_by_report(&report.id)?
            .into_iter()
            .filter(|n| !n.is_deleted())
            .collect();
        notes.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));

        Ok(TimelineEvent {
            date: report.report_date,
            event_type: TimelineEventType::Report,
            payload: TimelineEventPayload {
                report,
                analysis,
                notes,
            },
        })
    }
}
