use std::sync::LazyLock;

use regex::Regex;

use super::severity::detect_severity;
use crate::models::enums::FindingSeverity;
use crate::models::Finding;

static IMPRESSION_SECTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)impression[:\s]+(.*?)(?:\n\n|$)")
        .expect("Invalid impression section regex pattern")
});

static FINDINGS_SECTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)findings[:\s]+(.*?)(?:\n\n|impression|$)")
        .expect("Invalid findings section regex pattern")
});

/// A keyword that, anywhere in the report, yields a fixed finding.
struct ImagingPattern {
    regex: Regex,
    category: &'static str,
    description: &'static str,
    severity: FindingSeverity,
}

static IMAGING_PATTERNS: LazyLock<Vec<ImagingPattern>> = LazyLock::new(|| {
    vec![
        pattern(
            r"(?i)fracture|broken|displaced",
            "Structural",
            "Fracture detected",
            FindingSeverity::High,
        ),
        pattern(
            r"(?i)normal study|no acute findings|unremarkable",
            "General",
            "Normal study with no acute findings",
            FindingSeverity::Low,
        ),
        pattern(
            r"(?i)mass|lesion|tumor",
            "Structural",
            "Mass or lesion identified",
            FindingSeverity::High,
        ),
    ]
});

fn pattern(
    regex_str: &str,
    category: &'static str,
    description: &'static str,
    severity: FindingSeverity,
) -> ImagingPattern {
    ImagingPattern {
        regex: Regex::new(regex_str).expect("Invalid imaging regex pattern"),
        category,
        description,
        severity,
    }
}

fn section_finding(section: &Regex, text: &str, category: &str) -> Option<Finding> {
    let body = section.captures(text)?.get(1)?.as_str().trim();
    if body.is_empty() {
        return None;
    }
    Some(Finding {
        category: category.to_string(),
        description: body.to_string(),
        severity: detect_severity(body),
    })
}

/// Findings for an imaging report: the impression and findings sections
/// verbatim, then one fixed finding per keyword group present.
pub fn extract_imaging_findings(text: &str) -> Vec<Finding> {
    let mut findings = Vec::new();

    findings.extend(section_finding(&IMPRESSION_SECTION, text, "Imaging Impression"));
    findings.extend(section_finding(&FINDINGS_SECTION, text, "Imaging Findings"));

    for p in IMAGING_PATTERNS.iter() {
        if p.regex.is_match(text) {
            findings.push(Finding {
                category: p.category.to_string(),
                description: p.description.to_string(),
                severity: p.severity,
            });
        }
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_impression_and_findings() {
        let text = "CHEST X-RAY\n\nFINDINGS: Lungs are clear. Heart size normal.\n\nIMPRESSION: Normal study.";
        let findings = extract_imaging_findings(text);

        let impression = &findings[0];
        assert_eq!(impression.category, "Imaging Impression");
        assert_eq!(impression.description, "Normal study.");
        assert_eq!(impression.severity, FindingSeverity::Low);

        let body = &findings[1];
        assert_eq!(body.category, "Imaging Findings");
        assert_eq!(body.description, "Lungs are clear. Heart size normal.");

        assert!(findings
            .iter()
            .any(|f| f.description == "Normal study with no acute findings"));
    }

    #[test]
    fn findings_section_stops_at_impression() {
        let text = "MRI KNEE\nFindings: Small joint effusion. Impression: Mild sprain.";
        let findings = extract_imaging_findings(text);
        let body = findings.iter().find(|f| f.category == "Imaging Findings").unwrap();
        assert_eq!(body.description, "Small joint effusion.");
        let impression = findings.iter().find(|f| f.category == "Imaging Impression").unwrap();
        assert_eq!(impression.description, "Mild sprain.");
        assert_eq!(impression.severity, FindingSeverity::Medium);
    }

    #[test]
    fn fracture_is_high_structural() {
        let text = "X-RAY LEFT WRIST\nIMPRESSION: Displaced distal radius fracture.";
        let findings = extract_imaging_findings(text);

        let impression = findings.iter().find(|f| f.category == "Imaging Impression").unwrap();
        assert_eq!(impression.severity, FindingSeverity::High);

        let fracture = findings.iter().find(|f| f.description == "Fracture detected").unwrap();
        assert_eq!(fracture.category, "Structural");
        assert_eq!(fracture.severity, FindingSeverity::High);
    }

    #[test]
    fn mass_yields_structural_finding() {
        let findings = extract_imaging_findings("CT SCAN\nA 2 cm lesion in the right lobe.");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].description, "Mass or lesion identified");
    }

    #[test]
    fn empty_section_is_skipped() {
        let findings = extract_imaging_findings("ULTRASOUND ABDOMEN\nUnremarkable.\nIMPRESSION:");
        assert!(findings.iter().all(|f| f.category != "Imaging Impression"));
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn no_sections_no_keywords() {
        assert!(extract_imaging_findings("Radiology requisition received.").is_empty());
    }
}
