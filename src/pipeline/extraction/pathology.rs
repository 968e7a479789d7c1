use std::sync::LazyLock;

use regex::Regex;

use super::severity::is_negated;
use crate::models::enums::FindingSeverity;
use crate::models::{Diagnosis, Finding};

/// Confidence for a diagnosis copied from the report's own diagnosis section.
pub const STATED_DIAGNOSIS_CONFIDENCE: f64 = 0.85;
pub const MALIGNANT_CONFIDENCE: f64 = 0.9;
pub const BENIGN_CONFIDENCE: f64 = 0.95;

static DIAGNOSIS_SECTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)diagnosis[:\s]+(.*?)(?:\n\n|$)")
        .expect("Invalid diagnosis section regex pattern")
});

static SPECIMEN_SECTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)specimen[:\s]+(.*?)(?:\n\n|$)")
        .expect("Invalid specimen section regex pattern")
});

static MALIGNANCY_TERMS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)malignant|carcinoma|cancer|metastatic")
        .expect("Invalid malignancy regex pattern")
});

static BENIGN_TERMS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)benign|non-malignant|negative for malignancy")
        .expect("Invalid benign regex pattern")
});

#[derive(Debug, Default)]
pub struct PathologyExtraction {
    pub diagnoses: Vec<Diagnosis>,
    pub findings: Vec<Finding>,
}

fn section(regex: &Regex, text: &str) -> Option<String> {
    let body = regex.captures(text)?.get(1)?.as_str().trim();
    (!body.is_empty()).then(|| body.to_string())
}

/// True when a malignancy term appears without a "non-" negation, so
/// "non-malignant" alone does not count.
fn mentions_malignancy(text: &str) -> bool {
    MALIGNANCY_TERMS
        .find_iter(text)
        .any(|m| !is_negated(text, m.start()))
}

pub fn extract_pathology(text: &str) -> PathologyExtraction {
    let mut out = PathologyExtraction::default();

    if let Some(description) = section(&DIAGNOSIS_SECTION, text) {
        out.diagnoses.push(Diagnosis {
            code: None,
            description,
            confidence: STATED_DIAGNOSIS_CONFIDENCE,
        });
    }

    if let Some(description) = section(&SPECIMEN_SECTION, text) {
        out.findings.push(Finding {
            category: "Specimen".into(),
            description,
            severity: FindingSeverity::Low,
        });
    }

    if mentions_malignancy(text) {
        out.diagnoses.push(Diagnosis {
            code: None,
            description: "Malignant findings".into(),
            confidence: MALIGNANT_CONFIDENCE,
        });
        out.findings.push(Finding {
            category: "Pathology".into(),
            description: "Malignant cells identified".into(),
            severity: FindingSeverity::Critical,
        });
    }

    if BENIGN_TERMS.is_match(text) {
        out.diagnoses.push(Diagnosis {
            code: None,
            description: "Benign findings".into(),
            confidence: BENIGN_CONFIDENCE,
        });
        out.findings.push(Finding {
            category: "Pathology".into(),
            description: "Benign tissue confirmed".into(),
            severity: FindingSeverity::Low,
        });
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malignant_biopsy() {
        let text = "PATHOLOGY REPORT\nSpecimen: Left breast core biopsy\n\nDiagnosis: Invasive ductal carcinoma";
        let out = extract_pathology(text);

        assert_eq!(out.diagnoses.len(), 2);
        assert_eq!(out.diagnoses[0].description, "Invasive ductal carcinoma");
        assert_eq!(out.diagnoses[0].confidence, STATED_DIAGNOSIS_CONFIDENCE);
        assert_eq!(out.diagnoses[1].description, "Malignant findings");
        assert_eq!(out.diagnoses[1].confidence, MALIGNANT_CONFIDENCE);

        assert_eq!(out.findings[0].category, "Specimen");
        assert_eq!(out.findings[0].description, "Left breast core biopsy");
        let malignant = &out.findings[1];
        assert_eq!(malignant.description, "Malignant cells identified");
        assert_eq!(malignant.severity, FindingSeverity::Critical);
    }

    #[test]
    fn benign_biopsy() {
        let text = "Biopsy\nDiagnosis: Benign fibroadenoma. Negative for malignancy.";
        let out = extract_pathology(text);

        let descriptions: Vec<&str> = out.diagnoses.iter().map(|d| d.description.as_str()).collect();
        assert_eq!(descriptions, vec!["Benign fibroadenoma. Negative for malignancy.", "Benign findings"]);
        assert_eq!(out.diagnoses[1].confidence, BENIGN_CONFIDENCE);
        assert_eq!(out.findings.len(), 1);
        assert_eq!(out.findings[0].description, "Benign tissue confirmed");
        assert_eq!(out.findings[0].severity, FindingSeverity::Low);
    }

    #[test]
    fn non_malignant_is_not_malignant() {
        let out = extract_pathology("Cytology: non-malignant cells only.");
        assert!(out.diagnoses.iter().all(|d| d.description != "Malignant findings"));
        assert!(out.diagnoses.iter().any(|d| d.description == "Benign findings"));
    }

    #[test]
    fn negation_applies_per_occurrence() {
        assert!(mentions_malignancy("Non-malignant margin; metastatic deposit in node"));
        assert!(!mentions_malignancy("Non-malignant"));
        assert!(mentions_malignancy("Malignant"));
    }

    #[test]
    fn nothing_to_extract() {
        let out = extract_pathology("Histology requested.");
        assert!(out.diagnoses.is_empty());
        assert!(out.findings.is_empty());
    }
}
