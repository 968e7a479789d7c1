use std::sync::LazyLock;

use regex::Regex;

use super::labs::ends_with_ignore_case;
use crate::models::enums::FindingSeverity;

struct SeverityTier {
    regex: Regex,
    severity: FindingSeverity,
    /// Hits directly after "non-" or "non " do not count.
    negatable: bool,
}

impl SeverityTier {
    fn matches(&self, text: &str) -> bool {
        if !self.negatable {
            return self.regex.is_match(text);
        }
        self.regex
            .find_iter(text)
            .any(|m| !is_negated(text, m.start()))
    }
}

/// Keyword tiers, most severe first. First tier to match wins.
static SEVERITY_TIERS: LazyLock<Vec<SeverityTier>> = LazyLock::new(|| {
    vec![
        tier(
            r"(?i)critical|emergency|urgent|severe",
            FindingSeverity::Critical,
            false,
        ),
        tier(r"(?i)malignant|cancer", FindingSeverity::Critical, true),
        tier(
            r"(?i)abnormal|elevated|decreased|fracture|mass|lesion",
            FindingSeverity::High,
            false,
        ),
        tier(r"(?i)moderate|mild|borderline", FindingSeverity::Medium, false),
    ]
});

fn tier(regex_str: &str, severity: FindingSeverity, negatable: bool) -> SeverityTier {
    SeverityTier {
        regex: Regex::new(regex_str).expect("Invalid severity regex pattern"),
        severity,
        negatable,
    }
}

/// True when the keyword starting at `start` is written as "non-x" or "non x".
pub(crate) fn is_negated(text: &str, start: usize) -> bool {
    let prefix = &text[..start];
    ends_with_ignore_case(prefix, "non-") || ends_with_ignore_case(prefix, "non ")
}

/// Grade free text by its most severe keyword tier. Text with no tier
/// keyword is `Low`.
pub fn detect_severity(text: &str) -> FindingSeverity {
    SEVERITY_TIERS
        .iter()
        .find(|t| t.matches(text))
        .map(|t| t.severity)
        .unwrap_or(FindingSeverity::Low)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn critical_keywords() {
        assert_eq!(detect_severity("Urgent follow-up needed"), FindingSeverity::Critical);
        assert_eq!(detect_severity("consistent with malignant process"), FindingSeverity::Critical);
    }

    #[test]
    fn negated_malignancy_is_not_critical() {
        assert_eq!(
            detect_severity("Non-malignant appearing granuloma."),
            FindingSeverity::Low
        );
        assert_eq!(detect_severity("non cancer related change"), FindingSeverity::Low);
        assert_eq!(
            detect_severity("Non-malignant nodule, adjacent lesion"),
            FindingSeverity::High
        );
    }

    #[test]
    fn negation_only_covers_its_own_hit() {
        assert_eq!(
            detect_severity("Non-malignant cyst; separate malignant mass"),
            FindingSeverity::Critical
        );
        assert_eq!(detect_severity("non-urgent but severe"), FindingSeverity::Critical);
    }

    #[test]
    fn high_keywords() {
        assert_eq!(detect_severity("Small lesion in left lobe"), FindingSeverity::High);
        assert_eq!(detect_severity("Elevated markers"), FindingSeverity::High);
    }

    #[test]
    fn medium_keywords() {
        assert_eq!(detect_severity("Mild degenerative change"), FindingSeverity::Medium);
    }

    #[test]
    fn defaults_to_low() {
        assert_eq!(detect_severity("Lungs are clear."), FindingSeverity::Low);
        assert_eq!(detect_severity(""), FindingSeverity::Low);
    }

    #[test]
    fn most_severe_tier_wins() {
        assert_eq!(
            detect_severity("Mild abnormality, severe narrowing"),
            FindingSeverity::Critical
        );
        assert_eq!(detect_severity("Mild mass effect"), FindingSeverity::High);
    }
}
