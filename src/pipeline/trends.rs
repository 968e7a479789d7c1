//! Change-over-time classification against a patient's analysis history.

use std::collections::HashSet;

use uuid::Uuid;

use crate::db::{AnalysisStore, DatabaseError, ReportLookup};
use crate::models::enums::LabFlag;
use crate::models::{AnalysisRecord, ExtractedData, TrendIndicators};

/// Minimum number of reports (current included) before any trend is drawn.
pub const MIN_REPORTS_FOR_TRENDS: usize = 2;

pub struct TrendCalculator<'a> {
    reports: &'a dyn ReportLookup,
    analyses: &'a dyn AnalysisStore,
}

impl<'a> TrendCalculator<'a> {
    pub fn new(reports: &'a dyn ReportLookup, analyses: &'a dyn AnalysisStore) -> Self {
        Self { reports, analyses }
    }

    /// Classify `current` against every stored analysis for the patient.
    pub fn compute(
        &self,
        patient_id: &Uuid,
        current: &ExtractedData,
    ) -> Result<TrendIndicators, DatabaseError> {
        self.compute_for_report(patient_id, None, current)
    }

    /// As `compute`, leaving out the analysis of `current_report` when one is
    /// already stored.
    ///
    /// Each current lab lands in exactly one of improving, declining or
    /// stable. Labs never seen before are not classified. Output lists are
    /// not deduplicated.
    pub fn compute_for_report(
        &self,
        patient_id: &Uuid,
        current_report: Option<&Uuid>,
        current: &ExtractedData,
    ) -> Result<TrendIndicators, DatabaseError> {
        let mut trends = TrendIndicators::default();

        let report_ids: Vec<Uuid> = self
            .reports
            .find_reports_by_patient(patient_id)?
            .into_iter()
            .map(|r| r.id)
            .collect();
        if report_ids.len() < MIN_REPORTS_FOR_TRENDS {
            return Ok(trends);
        }

        let prior = self.usable_analyses(
            report_ids
                .iter()
                .filter(|id| Some(*id) != current_report),
        )?;

        for lab in &current.lab_values {
            let prior_flags: Vec<LabFlag> = prior
                .iter()
                .flat_map(|a| &a.extracted_data.lab_values)
                .filter(|p| p.name == lab.name)
                .map(|p| p.flag)
                .collect();
            if prior_flags.is_empty() {
                continue;
            }

            let was_abnormal = prior_flags.iter().any(|f| *f != LabFlag::Normal);
            let is_normal = lab.flag == LabFlag::Normal;
            let bucket = match (was_abnormal, is_normal) {
                (true, true) => &mut trends.improving,
                (false, false) => &mut trends.declining,
                _ => &mut trends.stable,
            };
            bucket.push(lab.name.clone());
        }

        let prior_diagnoses: HashSet<&str> = prior
            .iter()
            .flat_map(|a| &a.extracted_data.diagnoses)
            .map(|d| d.description.as_str())
            .collect();
        for diagnosis in &current.diagnoses {
            if prior_diagnoses.contains(diagnosis.description.as_str()) {
                trends.recurring.push(diagnosis.description.clone());
            }
        }

        tracing::debug!(
            patient_id = %patient_id,
            prior_analyses = prior.len(),
            improving = trends.improving.len(),
            declining = trends.declining.len(),
            stable = trends.stable.len(),
            recurring = trends.recurring.len(),
            "Trends computed"
        );
        Ok(trends)
    }

    /// Union of the trend indicators already stored on the patient's usable
    /// analyses, deduplicated in first-seen order. Empty until at least two
    /// usable analyses exist.
    pub fn compare_trends(&self, patient_id: &Uuid) -> Result<TrendIndicators, DatabaseError> {
        let report_ids: Vec<Uuid> = self
            .reports
            .find_reports_by_patient(patient_id)?
            .into_iter()
            .map(|r| r.id)
            .collect();
        let analyses = self.usable_analyses(report_ids.iter())?;
        if analyses.len() < MIN_REPORTS_FOR_TRENDS {
            return Ok(TrendIndicators::default());
        }

        let mut combined = TrendIndicators::default();
        for analysis in analyses {
            combined = combined.merge(analysis.trend_indicators);
        }
        Ok(TrendIndicators {
            improving: dedup_in_order(combined.improving),
            declining: dedup_in_order(combined.declining),
            stable: dedup_in_order(combined.stable),
            recurring: dedup_in_order(combined.recurring),
        })
    }

    fn usable_analyses<'r>(
        &self,
        report_ids: impl Iterator<Item = &'r Uuid>,
    ) -> Result<Vec<AnalysisRecord>, DatabaseError> {
        let mut found = Vec::new();
        for id in report_ids {
            if let Some(analysis) = self.analyses.find_analysis_by_report(id)? {
                if analysis.is_usable() {
                    found.push(analysis);
                }
            }
        }
        Ok(found)
    }
}

fn dedup_in_order(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}
