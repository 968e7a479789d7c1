use crate::models::enums::LabFlag;
use crate::models::ExtractedData;

/// Human-readable digest of an extraction. One sentence per populated
/// category, then a warning line when critical findings are present.
pub fn build_summary(data: &ExtractedData, file_name: &str) -> String {
    let mut lines = vec![format!("Analysis of {file_name}:")];

    if !data.lab_values.is_empty() {
        let abnormal = data
            .lab_values
            .iter()
            .filter(|v| v.flag != LabFlag::Normal)
            .count();
        if abnormal > 0 {
            lines.push(format!("{abnormal} abnormal lab value(s) detected."));
        } else {
            lines.push(format!(
                "All {} lab values within normal range.",
                data.lab_values.len()
            ));
        }
    }

    if !data.diagnoses.is_empty() {
        let n = data.diagnoses.len();
        let noun = if n == 1 { "diagnosis" } else { "diagnoses" };
        lines.push(format!("{n} {noun} identified."));
    }

    if !data.medications.is_empty() {
        lines.push(format!(
            "{} medication(s) mentioned.",
            data.medications.len()
        ));
    }

    if !data.findings.is_empty() {
        lines.push(format!("{} finding(s) recorded.", data.findings.len()));
    }

    let critical = data.critical_finding_count();
    if critical > 0 {
        lines.push(format!(
            "WARNING: {critical} critical finding(s) require immediate attention."
        ));
    }

    lines.join("\n")
}
