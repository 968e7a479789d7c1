use super::types::{CriticalFinding, TimelineEvent};
use crate::models::enums::CriticalSeverity;

pub const CRITICAL_THRESHOLD: f64 = 0.9;
pub const HIGH_THRESHOLD: f64 = 0.8;
pub const MODERATE_THRESHOLD: f64 = 0.7;

/// Map an analysis confidence score to a summary severity tier. Scores below
/// the moderate threshold are not highlighted.
///
/// This grades extraction certainty, not clinical severity.
pub fn severity_for_confidence(score: f64) -> Option<CriticalSeverity> {
    if score >= CRITICAL_THRESHOLD {
        Some(CriticalSeverity::Critical)
    } else if score >= HIGH_THRESHOLD {
        Some(CriticalSeverity::High)
    } else if score >= MODERATE_THRESHOLD {
        Some(CriticalSeverity::Moderate)
    } else {
        None
    }
}

/// One entry per analysed event at or above the moderate tier, in timeline
/// order.
pub fn derive_critical_findings(timeline: &[TimelineEvent]) -> Vec<CriticalFinding> {
    timeline
        .iter()
        .filter_map(|event| {
            let analysis = event.payload.analysis.as_ref()?;
            let severity = severity_for_confidence(analysis.confidence_score)?;
            Some(CriticalFinding {
                report_id: event.report_id(),
                finding: analysis.summary_text.clone(),
                severity,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers() {
        assert_eq!(severity_for_confidence(0.95), Some(CriticalSeverity::Critical));
        assert_eq!(severity_for_confidence(0.9), Some(CriticalSeverity::Critical));
        assert_eq!(severity_for_confidence(0.82), Some(CriticalSeverity::High));
        assert_eq!(severity_for_confidence(0.8), Some(CriticalSeverity::High));
        assert_eq!(severity_for_confidence(0.75), Some(CriticalSeverity::Moderate));
        assert_eq!(severity_for_confidence(0.7), Some(CriticalSeverity::Moderate));
        assert_eq!(severity_for_confidence(0.5), None);
        assert_eq!(severity_for_confidence(0.0), None);
    }
}
