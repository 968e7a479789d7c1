use serde::{Deserialize, Serialize};

use super::ExtractionError;
use crate::models::enums::FindingSeverity;
use crate::models::{AnalysisOutcome, ExtractedData, Finding, TrendIndicators};

/// What an engine hands back for one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub extracted_data: ExtractedData,
    pub trend_indicators: TrendIndicators,
    pub confidence_score: f64,
    pub summary_text: String,
    #[serde(flatten)]
    pub outcome: AnalysisOutcome,
}

impl ExtractionResult {
    /// Result for a document the engine could only partly process: zero
    /// confidence and the error carried as a finding.
    pub fn partial(message: &str) -> Self {
        Self {
            extracted_data: ExtractedData {
                findings: vec![Finding {
                    category: "error".into(),
                    description: message.to_string(),
                    severity: FindingSeverity::Low,
                }],
                ..Default::default()
            },
            trend_indicators: TrendIndicators::default(),
            confidence_score: 0.0,
            summary_text: format!("Analysis failed: {message}"),
            outcome: AnalysisOutcome::Partial {
                error_details: Some(message.to_string()),
            },
        }
    }
}

/// Analysis engine abstraction. Alternate engines are injected, selected by
/// configuration.
pub trait AnalysisEngine: Send + Sync {
    /// Identifier stored as the analysis method.
    fn engine_type(&self) -> &str;

    fn analyze(
        &self,
        content: &[u8],
        file_name: &str,
        declared_format: &str,
    ) -> Result<ExtractionResult, ExtractionError>;
}
