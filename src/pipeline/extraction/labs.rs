//! Lab analyte recognition and flagging.
//!
//! One rule per supported analyte. Each rule takes the first value that
//! follows the analyte name, keeps the value verbatim, and flags it against
//! the analyte's limits.

use std::sync::LazyLock;

use regex::Regex;

use super::ExtractionError;
use crate::models::enums::LabFlag;
use crate::models::LabValue;

/// Upper flag limit. Some analytes flag at the limit itself.
#[derive(Debug, Clone, Copy)]
enum HighLimit {
    Above(f64),
    AtOrAbove(f64),
}

impl HighLimit {
    fn exceeded_by(self, value: f64) -> bool {
        match self {
            HighLimit::Above(limit) => value > limit,
            HighLimit::AtOrAbove(limit) => value >= limit,
        }
    }
}

struct AnalyteRule {
    name: &'static str,
    regex: Regex,
    unit: &'static str,
    reference_range: &'static str,
    low_below: Option<f64>,
    high: Option<HighLimit>,
    /// A match directly preceded by one of these words belongs to another
    /// analyte.
    excluded_qualifiers: &'static [&'static str],
}

impl AnalyteRule {
    fn flag(&self, value: f64) -> LabFlag {
        if self.low_below.is_some_and(|low| value < low) {
            LabFlag::Low
        } else if self.high.is_some_and(|high| high.exceeded_by(value)) {
            LabFlag::High
        } else {
            LabFlag::Normal
        }
    }

    fn first_value<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.regex.captures_iter(text).find_map(|caps| {
            let whole = caps.get(0)?;
            let prefix = text[..whole.start()].trim_end();
            if self
                .excluded_qualifiers
                .iter()
                .any(|q| ends_with_ignore_case(prefix, q))
            {
                return None;
            }
            caps.get(1).map(|m| m.as_str())
        })
    }
}

const NUMBER: &str = r"([0-9]+(?:\.[0-9]+)?)";

static ANALYTE_RULES: LazyLock<Vec<AnalyteRule>> = LazyLock::new(|| {
    vec![
        rule(
            "Hemoglobin",
            r"\b(?:hemoglobin|hgb|hb)\b",
            "g/dL",
            "13.5-17.5",
            Some(13.5),
            Some(HighLimit::Above(17.5)),
            &[],
        ),
        rule(
            "Glucose",
            r"\b(?:glucose|blood sugar)\b",
            "mg/dL",
            "70-100",
            Some(70.0),
            Some(HighLimit::Above(125.0)),
            &[],
        ),
        rule(
            "Total Cholesterol",
            r"\b(?:total\s+)?cholesterol\b",
            "mg/dL",
            "<200",
            None,
            Some(HighLimit::AtOrAbove(200.0)),
            &["hdl", "ldl"],
        ),
        rule(
            "HDL Cholesterol",
            r"\bhdl(?:\s+cholesterol)?\b",
            "mg/dL",
            ">40",
            Some(40.0),
            None,
            &[],
        ),
        rule(
            "LDL Cholesterol",
            r"\bldl(?:\s+cholesterol)?\b",
            "mg/dL",
            "<100",
            None,
            Some(HighLimit::AtOrAbove(100.0)),
            &[],
        ),
        rule(
            "WBC",
            r"\b(?:wbc|white blood cells?(?:\s+count)?)\b",
            "K/uL",
            "4.5-11.0",
            Some(4.5),
            Some(HighLimit::Above(11.0)),
            &[],
        ),
    ]
});

fn rule(
    name: &'static str,
    name_pattern: &str,
    unit: &'static str,
    reference_range: &'static str,
    low_below: Option<f64>,
    high: Option<HighLimit>,
    excluded_qualifiers: &'static [&'static str],
) -> AnalyteRule {
    AnalyteRule {
        name,
        regex: Regex::new(&format!(r"(?i){name_pattern}[:\s]+{NUMBER}"))
            .expect("Invalid analyte regex pattern"),
        unit,
        reference_range,
        low_below,
        high,
        excluded_qualifiers,
    }
}

pub(crate) fn ends_with_ignore_case(text: &str, suffix: &str) -> bool {
    text.len() >= suffix.len()
        && text.is_char_boundary(text.len() - suffix.len())
        && text[text.len() - suffix.len()..].eq_ignore_ascii_case(suffix)
}

/// Extract at most one value per supported analyte, in table order.
pub fn extract_lab_values(text: &str) -> Result<Vec<LabValue>, ExtractionError> {
    let mut values = Vec::new();
    for rule in ANALYTE_RULES.iter() {
        let Some(raw) = rule.first_value(text) else {
            continue;
        };
        let numeric: f64 = raw.parse().map_err(|_| ExtractionError::InvalidNumber {
            analyte: rule.name.to_string(),
            value: raw.to_string(),
        })?;
        values.push(LabValue {
            name: rule.name.to_string(),
            value: raw.to_string(),
            unit: rule.unit.to_string(),
            reference_range: rule.reference_range.to_string(),
            flag: rule.flag(numeric),
        });
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find<'a>(values: &'a [LabValue], name: &str) -> &'a LabValue {
        values
            .iter()
            .find(|v| v.name == name)
            .unwrap_or_else(|| panic!("{name} not extracted from {values:?}"))
    }

    #[test]
    fn hemoglobin_low() {
        let values = extract_lab_values("Hemoglobin: 12.0 g/dL").unwrap();
        let hgb = find(&values, "Hemoglobin");
        assert_eq!(hgb.value, "12.0");
        assert_eq!(hgb.unit, "g/dL");
        assert_eq!(hgb.reference_range, "13.5-17.5");
        assert_eq!(hgb.flag, LabFlag::Low);
    }

    #[test]
    fn hemoglobin_abbreviations() {
        assert_eq!(find(&extract_lab_values("HGB 18.2").unwrap(), "Hemoglobin").flag, LabFlag::High);
        assert_eq!(find(&extract_lab_values("Hb: 14").unwrap(), "Hemoglobin").flag, LabFlag::Normal);
    }

    #[test]
    fn hba1c_is_not_hemoglobin() {
        assert!(extract_lab_values("HbA1c: 6.1 %").unwrap().is_empty());
    }

    #[test]
    fn glucose_flags_above_125_only() {
        assert_eq!(find(&extract_lab_values("Glucose: 110").unwrap(), "Glucose").flag, LabFlag::Normal);
        assert_eq!(find(&extract_lab_values("Glucose: 126").unwrap(), "Glucose").flag, LabFlag::High);
        assert_eq!(find(&extract_lab_values("Blood sugar 65").unwrap(), "Glucose").flag, LabFlag::Low);
    }

    #[test]
    fn cholesterol_limits_are_inclusive() {
        let values = extract_lab_values("Total Cholesterol: 200\nLDL Cholesterol: 100").unwrap();
        assert_eq!(find(&values, "Total Cholesterol").flag, LabFlag::High);
        assert_eq!(find(&values, "LDL Cholesterol").flag, LabFlag::High);
    }

    #[test]
    fn hdl_line_does_not_count_as_total_cholesterol() {
        let values = extract_lab_values("HDL Cholesterol: 38").unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values[0].name, "HDL Cholesterol");
        assert_eq!(values[0].flag, LabFlag::Low);
    }

    #[test]
    fn lipid_panel_extracts_each_analyte_once() {
        let text = "LIPID PANEL\nHDL Cholesterol: 55\nLDL Cholesterol: 130\nCholesterol: 185";
        let values = extract_lab_values(text).unwrap();
        let names: Vec<&str> = values.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["Total Cholesterol", "HDL Cholesterol", "LDL Cholesterol"]);
        assert_eq!(find(&values, "Total Cholesterol").value, "185");
        assert_eq!(find(&values, "Total Cholesterol").flag, LabFlag::Normal);
        assert_eq!(find(&values, "LDL Cholesterol").flag, LabFlag::High);
    }

    #[test]
    fn wbc_variants() {
        let values = extract_lab_values("White Blood Cell Count: 12.3 K/uL").unwrap();
        assert_eq!(find(&values, "WBC").flag, LabFlag::High);
        let values = extract_lab_values("WBC: 4.2").unwrap();
        assert_eq!(find(&values, "WBC").flag, LabFlag::Low);
    }

    #[test]
    fn first_occurrence_wins() {
        let values = extract_lab_values("Glucose: 90\nRepeat glucose: 140").unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values[0].value, "90");
    }

    #[test]
    fn value_kept_verbatim() {
        let values = extract_lab_values("Glucose: 095.50").unwrap();
        assert_eq!(values[0].value, "095.50");
    }

    #[test]
    fn text_without_analytes_yields_nothing() {
        assert!(extract_lab_values("Patient seen in clinic, no labs drawn.").unwrap().is_empty());
    }

    #[test]
    fn suffix_match_ignores_case() {
        assert!(ends_with_ignore_case("Serum HDL", "hdl"));
        assert!(!ends_with_ignore_case("dl", "hdl"));
        assert!(!ends_with_ignore_case("Total", "hdl"));
    }
}
