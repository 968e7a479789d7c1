use super::classify::classify_document;
use super::confidence::compute_confidence;
use super::imaging::extract_imaging_findings;
use super::labs::extract_lab_values;
use super::medications::extract_medications;
use super::pathology::extract_pathology;
use super::summary::build_summary;
use super::types::{AnalysisEngine, ExtractionResult};
use super::ExtractionError;
use crate::models::{AnalysisOutcome, ExtractedData, TrendIndicators};

pub const RULE_BASED_ENGINE: &str = "rule_based";

/// Keyword and regex extraction over the document text. Stateless: the same
/// bytes always produce the same result.
#[derive(Debug, Default, Clone, Copy)]
pub struct RuleBasedEngine;

impl RuleBasedEngine {
    pub fn new() -> Self {
        Self
    }

    fn extract(&self, content: &[u8], declared_format: &str) -> Result<ExtractedData, ExtractionError> {
        let text = std::str::from_utf8(content).map_err(|source| ExtractionError::Undecodable {
            format: declared_format.to_string(),
            source,
        })?;

        let style = classify_document(text);
        let mut data = ExtractedData {
            lab_values: extract_lab_values(text)?,
            ..Default::default()
        };

        if style.imaging {
            data.findings.extend(extract_imaging_findings(text));
        }
        if style.pathology {
            let pathology = extract_pathology(text);
            data.diagnoses.extend(pathology.diagnoses);
            data.findings.extend(pathology.findings);
        }

        data.medications = extract_medications(text);

        tracing::debug!(
            imaging = style.imaging,
            pathology = style.pathology,
            lab_values = data.lab_values.len(),
            diagnoses = data.diagnoses.len(),
            medications = data.medications.len(),
            findings = data.findings.len(),
            "Rule extraction complete"
        );
        Ok(data)
    }
}

impl AnalysisEngine for RuleBasedEngine {
    fn engine_type(&self) -> &str {
        RULE_BASED_ENGINE
    }

    /// Never returns `Err`: internal faults become a partial result.
    fn analyze(
        &self,
        content: &[u8],
        file_name: &str,
        declared_format: &str,
    ) -> Result<ExtractionResult, ExtractionError> {
        let _span = tracing::info_span!(
            "rule_based_analyze",
            file_name,
            declared_format,
            bytes = content.len()
        )
        .entered();

        match self.extract(content, declared_format) {
            Ok(extracted_data) => {
                let confidence_score = compute_confidence(&extracted_data);
                let summary_text = build_summary(&extracted_data, file_name);
                Ok(ExtractionResult {
                    extracted_data,
                    trend_indicators: TrendIndicators::default(),
                    confidence_score,
                    summary_text,
                    outcome: AnalysisOutcome::Complete,
                })
            }
            Err(e) => {
                tracing::warn!(error = %e, "Rule extraction failed, returning partial result");
                Ok(ExtractionResult::partial(&e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::{CompletionStatus, FindingSeverity, LabFlag};

    fn analyze(text: &str) -> ExtractionResult {
        RuleBasedEngine::new()
            .analyze(text.as_bytes(), "report.txt", "text/plain")
            .unwrap()
    }

    #[test]
    fn engine_identifier() {
        assert_eq!(RuleBasedEngine::new().engine_type(), "rule_based");
    }

    #[test]
    fn lab_panel_with_low_hemoglobin() {
        let result = analyze("CBC\nHemoglobin: 11.2 g/dL\nWBC: 7.0 K/uL\nGlucose: 92 mg/dL");

        assert_eq!(result.outcome, AnalysisOutcome::Complete);
        let labs = &result.extracted_data.lab_values;
        assert_eq!(labs.len(), 3);
        assert_eq!(labs[0].name, "Hemoglobin");
        assert_eq!(labs[0].flag, LabFlag::Low);
        assert_eq!(result.confidence_score, 0.6);
        assert!(result.summary_text.starts_with("Analysis of report.txt:"));
        assert!(result.summary_text.contains("1 abnormal lab value(s) detected."));
        assert!(result.trend_indicators.is_empty());
    }

    #[test]
    fn normal_chest_xray() {
        let result = analyze("CHEST X-RAY\n\nFINDINGS: Lungs clear.\n\nIMPRESSION: Normal study. No acute findings.");

        let findings = &result.extracted_data.findings;
        assert!(findings.iter().any(|f| f.category == "Imaging Impression"));
        assert!(findings.iter().any(|f| f.category == "Imaging Findings"));
        assert!(findings
            .iter()
            .any(|f| f.category == "General" && f.severity == FindingSeverity::Low));
        assert!(result.extracted_data.diagnoses.is_empty());
        assert_eq!(result.confidence_score, 0.6);
    }

    #[test]
    fn malignant_pathology_warns() {
        let result = analyze("SURGICAL PATHOLOGY\nSpecimen: Colon biopsy\n\nDiagnosis: Adenocarcinoma, moderately differentiated");

        let diagnoses = &result.extracted_data.diagnoses;
        assert!(diagnoses.iter().any(|d| d.description == "Malignant findings" && d.confidence == 0.9));
        assert!(result.extracted_data.has_critical_findings());
        assert_eq!(result.confidence_score, 0.75);
        assert!(result
            .summary_text
            .contains("WARNING: 1 critical finding(s) require immediate attention."));
    }

    #[test]
    fn negated_malignancy_in_impression_does_not_warn() {
        let result = analyze("CT CHEST\nIMPRESSION: Non-malignant appearing granuloma.");

        let impression = result
            .extracted_data
            .findings
            .iter()
            .find(|f| f.category == "Imaging Impression")
            .unwrap();
        assert_ne!(impression.severity, FindingSeverity::Critical);
        assert!(!result.extracted_data.has_critical_findings());
        assert!(!result.summary_text.contains("WARNING"));
    }

    #[test]
    fn full_document_is_capped() {
        let result = analyze(
            "Biopsy report\nDiagnosis: Benign nevus\n\nGlucose: 140\nMedications: Metformin 500 mg bid",
        );
        assert_eq!(result.confidence_score, 0.9);
        assert_eq!(result.extracted_data.medications[0].frequency, "bid");
    }

    #[test]
    fn plain_note_is_base_confidence() {
        let result = analyze("Follow-up visit. Patient feels well.");
        assert!(result.extracted_data.is_empty());
        assert_eq!(result.confidence_score, 0.5);
        assert_eq!(result.summary_text, "Analysis of report.txt:");
    }

    #[test]
    fn invalid_utf8_becomes_partial() {
        let result = RuleBasedEngine::new()
            .analyze(&[0x47, 0x6c, 0xff, 0xfe], "scan.pdf", "application/pdf")
            .unwrap();

        assert_eq!(result.outcome.status(), CompletionStatus::Partial);
        assert_eq!(result.confidence_score, 0.0);
        let details = result.outcome.error_details().unwrap();
        assert!(details.contains("application/pdf"));
        assert!(result.summary_text.starts_with("Analysis failed: "));
        assert_eq!(result.extracted_data.findings[0].category, "error");
    }

    #[test]
    fn same_input_same_output() {
        let text = "MRI\nIMPRESSION: Mild disc bulge.\nAspirin 81 mg daily";
        assert_eq!(analyze(text), analyze(text));
    }
}
