//! Detection validation.
//!
//! Detectors always produce well-formed records, but documents read back
//! from a detections JSON file may not be. Before drawing, every detection
//! is checked for:
//! - Geometric validity (finite, strictly ordered boxes)
//! - Score range
//! - Vocabulary membership (unknown labels are drawn black, so only warned)

mod report;

pub use report::{IssueCode, IssueContext, Severity, ValidationIssue, ValidationReport};

use crate::labels::is_known_label;
use crate::layout::{Detection, Document};

/// Validates every detection of a document.
pub fn validate_document(document: &Document) -> ValidationReport {
    let mut report = ValidationReport::new();

    for (page, layer) in document.iter() {
        for (index, detection) in layer.iter().enumerate() {
            let context = IssueContext {
                page: page.0,
                index,
            };
            validate_detection(detection, context, &mut report);
        }
    }

    report
}

fn validate_detection(detection: &Detection, context: IssueContext, report: &mut ValidationReport) {
    let bbox = &detection.bbox;

    if !bbox.is_finite() {
        report.add(ValidationIssue::error(
            IssueCode::NonFiniteBox,
            format!("box {:?} has non-finite coordinates", bbox.to_array()),
            context.clone(),
        ));
    } else if !bbox.is_ordered() {
        report.add(ValidationIssue::error(
            IssueCode::UnorderedBox,
            format!("box {:?} must have x1 < x2 and y1 < y2", bbox.to_array()),
            context.clone(),
        ));
    }

    if !(0.0..=1.0).contains(&detection.score) {
        report.add(ValidationIssue::error(
            IssueCode::ScoreOutOfRange,
            format!("score {} is outside [0, 1]", detection.score),
            context.clone(),
        ));
    }

    if !is_known_label(&detection.label) {
        report.add(ValidationIssue::warning(
            IssueCode::UnknownLabel,
            format!("label '{}' is not in any known vocabulary", detection.label),
            context,
        ));
    }
}
