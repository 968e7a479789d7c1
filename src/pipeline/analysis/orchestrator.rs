use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use super::validation::{
    truncate_chars, validate_record, ERROR_DETAILS_MAX_CHARS, SUMMARY_MAX_CHARS,
};
use super::AnalysisError;
use crate::db::{AnalysisStore, DatabaseError, ReportLookup};
use crate::models::{AnalysisOutcome, AnalysisRecord, ExtractedData, Report, TrendIndicators};
use crate::pipeline::extraction::{AnalysisEngine, ExtractionResult};
use crate::pipeline::trends::TrendCalculator;

const UNKNOWN_ERROR: &str = "Unknown error";

/// Runs the engine once per report and persists exactly one record for it:
/// a validated analysis on success, a failed analysis on an engine fault.
pub struct AnalysisOrchestrator {
    engine: Box<dyn AnalysisEngine + Send + Sync>,
    reports: Arc<dyn ReportLookup>,
    analyses: Arc<dyn AnalysisStore>,
}

impl AnalysisOrchestrator {
    pub fn new(
        engine: Box<dyn AnalysisEngine + Send + Sync>,
        reports: Arc<dyn ReportLookup>,
        analyses: Arc<dyn AnalysisStore>,
    ) -> Self {
        Self {
            engine,
            reports,
            analyses,
        }
    }

    pub fn engine_type(&self) -> &str {
        self.engine.engine_type()
    }

    /// Analyze one report's document bytes.
    ///
    /// Fails with `NotFound` for an unknown report and `Conflict` if the report
    /// already has an analysis. An engine fault still returns `Ok` with a
    /// persisted failed record.
    pub fn analyze_report(
        &self,
        report_id: &Uuid,
        content: &[u8],
        file_name: &str,
    ) -> Result<AnalysisRecord, AnalysisError> {
        let _span = tracing::info_span!("analyze_report", report_id = %report_id).entered();

        let report = self
            .reports
            .find_report(report_id)?
            .ok_or_else(|| AnalysisError::NotFound {
                entity_type: "report".into(),
                id: *report_id,
            })?;

        if self.analyses.find_analysis_by_report(report_id)?.is_some() {
            return Err(AnalysisError::Conflict(*report_id));
        }

        match self.engine.analyze(content, file_name, &report.file_format) {
            Ok(result) => self.persist_success(&report, result),
            Err(e) => self.persist_failure(&report, &e.to_string()),
        }
    }

    pub fn find_analysis(&self, id: &Uuid) -> Result<Option<AnalysisRecord>, AnalysisError> {
        Ok(self.analyses.find_analysis(id)?)
    }

    pub fn find_analysis_for_report(
        &self,
        report_id: &Uuid,
    ) -> Result<Option<AnalysisRecord>, AnalysisError> {
        Ok(self.analyses.find_analysis_by_report(report_id)?)
    }

    fn persist_success(
        &self,
        report: &Report,
        result: ExtractionResult,
    ) -> Result<AnalysisRecord, AnalysisError> {
        let computed = TrendCalculator::new(&*self.reports, &*self.analyses).compute_for_report(
            &report.patient_id,
            Some(&report.id),
            &result.extracted_data,
        )?;

        let record = AnalysisRecord {
            id: Uuid::new_v4(),
            report_id: report.id,
            extracted_data: result.extracted_data,
            trend_indicators: result.trend_indicators.merge(computed),
            confidence_score: result.confidence_score,
            summary_text: result.summary_text,
            method: self.engine.engine_type().to_string(),
            outcome: result.outcome,
            analysis_timestamp: Utc::now(),
        };

        if let Err(violations) = validate_record(&record) {
            tracing::warn!(
                report_id = %report.id,
                violations = violations.len(),
                "Analysis record failed validation"
            );
            return Err(AnalysisError::ValidationFailed(violations));
        }

        self.store(record)
    }

    fn persist_failure(
        &self,
        report: &Report,
        message: &str,
    ) -> Result<AnalysisRecord, AnalysisError> {
        let message = if message.trim().is_empty() {
            UNKNOWN_ERROR
        } else {
            message
        };
        tracing::warn!(report_id = %report.id, error = %message, "Engine fault, recording failed analysis");

        let record = AnalysisRecord {
            id: Uuid::new_v4(),
            report_id: report.id,
            extracted_data: ExtractedData::default(),
            trend_indicators: TrendIndicators::default(),
            confidence_score: 0.0,
            summary_text: truncate_chars(&format!("Analysis failed: {message}"), SUMMARY_MAX_CHARS),
            method: self.engine.engine_type().to_string(),
            outcome: AnalysisOutcome::Failed {
                error_details: truncate_chars(message, ERROR_DETAILS_MAX_CHARS),
            },
            analysis_timestamp: Utc::now(),
        };

        self.store(record)
    }

    /// A concurrent writer that got there first surfaces as `Conflict`.
    fn store(&self, record: AnalysisRecord) -> Result<AnalysisRecord, AnalysisError> {
        match self.analyses.create_analysis(&record) {
            Ok(()) => {
                tracing::info!(
                    report_id = %record.report_id,
                    analysis_id = %record.id,
                    status = %record.completion_status(),
                    confidence = record.confidence_score,
                    "Analysis persisted"
                );
                Ok(record)
            }
            Err(DatabaseError::AlreadyExists { .. }) => Err(AnalysisError::Conflict(record.report_id)),
            Err(e) => Err(e.into()),
        }
    }
}
