use crate::models::ExtractedData;

/// Confidence increments, in hundredths. Integer arithmetic keeps the cap
/// exactly representable.
pub mod points {
    pub const BASE: u32 = 50;
    pub const LAB_VALUES: u32 = 10;
    pub const DIAGNOSES: u32 = 15;
    pub const MEDICATIONS: u32 = 5;
    pub const FINDINGS: u32 = 10;
    pub const CAP: u32 = 90;
}

/// Score how much structure was recovered. Each non-empty category adds a
/// fixed increment; the total never exceeds 0.9.
pub fn compute_confidence(data: &ExtractedData) -> f64 {
    let mut score = points::BASE;
    if !data.lab_values.is_empty() {
        score += points::LAB_VALUES;
    }
    if !data.diagnoses.is_empty() {
        score += points::DIAGNOSES;
    }
    if !data.medications.is_empty() {
        score += points::MEDICATIONS;
    }
    if !data.findings.is_empty() {
        score += points::FINDINGS;
    }
    f64::from(score.min(points::CAP)) / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::fixtures;
    use crate::models::enums::{FindingSeverity, LabFlag};
    use crate::models::{Finding, Medication};

    fn medication() -> Medication {
        Medication {
            name: "Aspirin".into(),
            dosage: "81 mg".into(),
            frequency: "daily".into(),
        }
    }

    fn finding() -> Finding {
        Finding {
            category: "General".into(),
            description: "Unremarkable".into(),
            severity: FindingSeverity::Low,
        }
    }

    #[test]
    fn empty_is_base() {
        assert_eq!(compute_confidence(&ExtractedData::default()), 0.5);
    }

    #[test]
    fn labs_only() {
        let data = ExtractedData {
            lab_values: vec![fixtures::lab("Glucose", LabFlag::Normal)],
            ..Default::default()
        };
        assert_eq!(compute_confidence(&data), 0.6);
    }

    #[test]
    fn labs_and_medications() {
        let data = ExtractedData {
            lab_values: vec![fixtures::lab("Glucose", LabFlag::Normal)],
            medications: vec![medication()],
            ..Default::default()
        };
        assert_eq!(compute_confidence(&data), 0.65);
    }

    #[test]
    fn everything_is_capped() {
        let data = ExtractedData {
            lab_values: vec![fixtures::lab("Glucose", LabFlag::High)],
            diagnoses: vec![fixtures::diagnosis("Type 2 diabetes")],
            medications: vec![medication()],
            findings: vec![finding()],
        };
        assert_eq!(compute_confidence(&data), 0.9);
    }

    #[test]
    fn diagnoses_and_findings() {
        let data = ExtractedData {
            diagnoses: vec![fixtures::diagnosis("Benign findings")],
            findings: vec![finding()],
            ..Default::default()
        };
        assert_eq!(compute_confidence(&data), 0.75);
    }
}
