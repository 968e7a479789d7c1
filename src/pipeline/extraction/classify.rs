use std::sync::LazyLock;

use regex::Regex;

static IMAGING_MARKERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)x-ray|ct scan|\bct\b|\bmri\b|ultrasound|imaging|radiology")
        .expect("Invalid imaging marker regex pattern")
});

static PATHOLOGY_MARKERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)pathology|biopsy|histology|cytology|specimen")
        .expect("Invalid pathology marker regex pattern")
});

/// Which rule families apply to a document. Both can be set: a biopsy
/// report may reference the guiding ultrasound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DocumentStyle {
    pub imaging: bool,
    pub pathology: bool,
}

/// Classify one document by keyword presence. No state carries over between
/// calls.
pub fn classify_document(text: &str) -> DocumentStyle {
    DocumentStyle {
        imaging: IMAGING_MARKERS.is_match(text),
        pathology: PATHOLOGY_MARKERS.is_match(text),
    }
}
