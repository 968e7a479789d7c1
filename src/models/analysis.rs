use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{CompletionStatus, FindingSeverity, LabFlag};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabValue {
    pub name: String,
    pub value: String,
    pub unit: String,
    pub reference_range: String,
    pub flag: LabFlag,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnosis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub description: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Medication {
    pub name: String,
    pub dosage: String,
    pub frequency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub category: String,
    pub description: String,
    pub severity: FindingSeverity,
}

/// Structured content pulled out of one document. Empty categories are
/// omitted when serialized.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExtractedData {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lab_values: Vec<LabValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnoses: Vec<Diagnosis>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub medications: Vec<Medication>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub findings: Vec<Finding>,
}

impl ExtractedData {
    pub fn is_empty(&self) -> bool {
        self.lab_values.is_empty()
            && self.diagnoses.is_empty()
            && self.medications.is_empty()
            && self.findings.is_empty()
    }

    pub fn critical_finding_count(&self) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity == FindingSeverity::Critical)
            .count()
    }

    pub fn has_critical_findings(&self) -> bool {
        self.critical_finding_count() > 0
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrendIndicators {
    #[serde(default)]
    pub improving: Vec<String>,
    #[serde(default)]
    pub declining: Vec<String>,
    #[serde(default)]
    pub stable: Vec<String>,
    #[serde(default)]
    pub recurring: Vec<String>,
}

impl TrendIndicators {
    pub fn is_empty(&self) -> bool {
        self.improving.is_empty()
            && self.declining.is_empty()
            && self.stable.is_empty()
            && self.recurring.is_empty()
    }

    /// Concatenate each list of `other` onto the matching list of `self`.
    /// Duplicates are kept.
    pub fn merge(mut self, other: TrendIndicators) -> Self {
        self.improving.extend(other.improving);
        self.declining.extend(other.declining);
        self.stable.extend(other.stable);
        self.recurring.extend(other.recurring);
        self
    }
}

/// How an analysis ended. Only the failure cases carry error details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "completion_status", rename_all = "snake_case")]
pub enum AnalysisOutcome {
    Complete,
    Partial {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error_details: Option<String>,
    },
    Failed {
        error_details: String,
    },
}

impl AnalysisOutcome {
    pub fn status(&self) -> CompletionStatus {
        match self {
            Self::Complete => CompletionStatus::Complete,
            Self::Partial { .. } => CompletionStatus::Partial,
            Self::Failed { .. } => CompletionStatus::Failed,
        }
    }

    pub fn error_details(&self) -> Option<&str> {
        match self {
            Self::Complete => None,
            Self::Partial { error_details } => error_details.as_deref(),
            Self::Failed { error_details } => Some(error_details),
        }
    }
}

/// Persisted result of analysing one report. Created once, never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub id: Uuid,
    pub report_id: Uuid,
    pub extracted_data: ExtractedData,
    pub trend_indicators: TrendIndicators,
    pub confidence_score: f64,
    pub summary_text: String,
    pub method: String,
    #[serde(flatten)]
    pub outcome: AnalysisOutcome,
    pub analysis_timestamp: DateTime<Utc>,
}

/// Default confidence threshold for `AnalysisRecord::is_reliable`.
pub const DEFAULT_RELIABILITY_THRESHOLD: f64 = 0.7;

impl AnalysisRecord {
    pub fn completion_status(&self) -> CompletionStatus {
        self.outcome.status()
    }

    pub fn error_details(&self) -> Option<&str> {
        self.outcome.error_details()
    }

    /// Failed analyses never contribute to trend history.
    pub fn is_usable(&self) -> bool {
        self.completion_status() != CompletionStatus::Failed
    }

    pub fn has_critical_findings(&self) -> bool {
        self.extracted_data.has_critical_findings()
    }

    pub fn has_high_severity_findings(&self) -> bool {
        self.extracted_data
            .findings
            .iter()
            .any(|f| matches!(f.severity, FindingSeverity::High | FindingSeverity::Critical))
    }

    pub fn abnormal_lab_count(&self) -> usize {
        self.extracted_data
            .lab_values
            .iter()
            .filter(|l| l.flag != LabFlag::Normal)
            .count()
    }

    pub fn diagnosis_count(&self) -> usize {
        self.extracted_data.diagnoses.len()
    }

    pub fn shows_improvement(&self) -> bool {
        !self.trend_indicators.improving.is_empty()
    }

    pub fn shows_decline(&self) -> bool {
        !self.trend_indicators.declining.is_empty()
    }

    /// Complete and at or above `min_confidence`.
    pub fn is_reliable(&self, min_confidence: f64) -> bool {
        self.completion_status() == CompletionStatus::Complete
            && self.confidence_score >= min_confidence
    }
}
