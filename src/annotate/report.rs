//! Annotation summary and text formatting.

use serde::Serialize;
use std::fmt;

/// Annotations drawn on one PDF page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PageAnnotations {
    /// Zero-based page index.
    pub page: u32,
    /// Detections drawn; each is one rectangle and one text annotation.
    pub detections: usize,
}

/// Summary of an annotation pass over a document.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AnnotationReport {
    /// Pages that had a layer, in page order.
    pub pages: Vec<PageAnnotations>,
    /// Layer keys with no corresponding PDF page.
    pub skipped_layers: Vec<u32>,
}

impl AnnotationReport {
    /// Total detections drawn across all pages.
    pub fn total_detections(&self) -> usize {
        self.pages.iter().map(|p| p.detections).sum()
    }

    /// Detections drawn on a page, 0 if the page had no layer.
    pub fn detections_on(&self, page: u32) -> usize {
        self.pages
            .iter()
            .find(|p| p.page == page)
            .map(|p| p.detections)
            .unwrap_or(0)
    }
}

impl fmt::Display for AnnotationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for page in &self.pages {
            writeln!(f, "Page {}: {} detections", page.page + 1, page.detections)?;
        }
        if !self.skipped_layers.is_empty() {
            writeln!(
                f,
                "Skipped {} layer(s) beyond the last PDF page",
                self.skipped_layers.len()
            )?;
        }
        writeln!(
            f,
            "Total detections across all pages: {}",
            self.total_detections()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_text() {
        let report = AnnotationReport {
            pages: vec![
                PageAnnotations {
                    page: 0,
                    detections: 3,
                },
                PageAnnotations {
                    page: 1,
                    detections: 0,
                },
            ],
            skipped_layers: vec![],
        };
        let text = report.to_string();
        assert!(text.contains("Page 1: 3 detections"));
        assert!(text.contains("Page 2: 0 detections"));
        assert!(text.ends_with("Total detections across all pages: 3\n"));
        assert_eq!(report.detections_on(1), 0);
        assert_eq!(report.detections_on(7), 0);
    }
}
