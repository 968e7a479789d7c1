use std::sync::LazyLock;

use regex::Regex;

use crate::models::Medication;

pub const UNKNOWN: &str = "unknown";

/// Supported drug vocabulary, each optionally followed by a milligram dose
/// and a frequency.
static MEDICATION_MENTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(aspirin|acetaminophen|ibuprofen|metformin|lisinopril|atorvastatin|levothyroxine)\b(?:\s+([0-9]+(?:\.[0-9]+)?\s*mg)\b)?(?:\s+(once daily|twice daily|daily|bid|tid|qid|prn|as needed)\b)?",
    )
    .expect("Invalid medication regex pattern")
});

/// Every mention of a supported drug, in document order. Repeated mentions
/// are kept.
pub fn extract_medications(text: &str) -> Vec<Medication> {
    MEDICATION_MENTION
        .captures_iter(text)
        .filter_map(|caps| {
            let name = caps.get(1)?.as_str().to_string();
            let dosage = caps
                .get(2)
                .map_or(UNKNOWN, |m| m.as_str())
                .to_string();
            let frequency = caps
                .get(3)
                .map_or(UNKNOWN, |m| m.as_str())
                .to_string();
            Some(Medication {
                name,
                dosage,
                frequency,
            })
        })
        .collect()
}
