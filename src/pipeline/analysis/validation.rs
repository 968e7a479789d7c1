// Pre-persistence checks for analysis records. Every violated rule is
// reported, not just the first.

use chrono::{DateTime, Utc};

use crate::models::enums::CompletionStatus;
use crate::models::AnalysisRecord;

pub const SUMMARY_MIN_CHARS: usize = 10;
pub const SUMMARY_MAX_CHARS: usize = 5000;
pub const METHOD_MAX_CHARS: usize = 50;
pub const ERROR_DETAILS_MAX_CHARS: usize = 2000;

/// Validate against the current clock.
pub fn validate_record(record: &AnalysisRecord) -> Result<(), Vec<String>> {
    validate_record_at(record, Utc::now())
}

/// Validate with an explicit "now", so timestamp rules are testable.
pub fn validate_record_at(record: &AnalysisRecord, now: DateTime<Utc>) -> Result<(), Vec<String>> {
    let mut violations = Vec::new();

    if record.report_id.is_nil() {
        violations.push("report_id is required".to_string());
    }

    check_confidence(record, &mut violations);
    check_text_bounds(record, &mut violations);

    if record.analysis_timestamp > now {
        violations.push(format!(
            "analysis_timestamp {} is in the future",
            record.analysis_timestamp.to_rfc3339()
        ));
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

fn in_unit_interval(value: f64) -> bool {
    value.is_finite() && (0.0..=1.0).contains(&value)
}

fn check_confidence(record: &AnalysisRecord, violations: &mut Vec<String>) {
    if !in_unit_interval(record.confidence_score) {
        violations.push(format!(
            "confidence_score {} is outside [0, 1]",
            record.confidence_score
        ));
    }

    for diagnosis in &record.extracted_data.diagnoses {
        if !in_unit_interval(diagnosis.confidence) {
            violations.push(format!(
                "diagnosis '{}' confidence {} is outside [0, 1]",
                diagnosis.description, diagnosis.confidence
            ));
        }
    }
}

fn check_text_bounds(record: &AnalysisRecord, violations: &mut Vec<String>) {
    let summary_chars = record.summary_text.chars().count();
    if !(SUMMARY_MIN_CHARS..=SUMMARY_MAX_CHARS).contains(&summary_chars) {
        violations.push(format!(
            "summary_text length {summary_chars} is outside {SUMMARY_MIN_CHARS}-{SUMMARY_MAX_CHARS}"
        ));
    }

    let method_chars = record.method.chars().count();
    if method_chars == 0 || method_chars > METHOD_MAX_CHARS {
        violations.push(format!(
            "method length {method_chars} is outside 1-{METHOD_MAX_CHARS}"
        ));
    }

    match record.error_details() {
        Some(details) if details.chars().count() > ERROR_DETAILS_MAX_CHARS => {
            violations.push(format!(
                "error_details exceeds {ERROR_DETAILS_MAX_CHARS} characters"
            ));
        }
        Some(details)
            if details.trim().is_empty()
                && record.completion_status() == CompletionStatus::Failed =>
        {
            violations.push("failed analysis requires error_details".to_string());
        }
        _ => {}
    }
}

/// Cut `text` to at most `max_chars` characters on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
