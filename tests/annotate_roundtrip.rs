use lopdf::{dictionary, Dictionary, Object};
use pdflayout::labels::color_for_label;
use pdflayout::layout::io_json::from_json_str;
use pdflayout::pipeline::{annotate_pdf, AnnotateRequest};
use pdflayout::PdfLayoutError;
use tempfile::TempDir;

mod common;

fn request_for(dir: &TempDir, detections_json: &str) -> AnnotateRequest {
    let input = dir.path().join("paper.pdf");
    common::write_pdf(&input, 2);

    let detections = dir.path().join("detections.json");
    std::fs::write(&detections, detections_json).expect("write detections");

    let mut request = AnnotateRequest::new(&input);
    request.detections_input = Some(detections);
    request
}

#[test]
fn draws_square_and_note_per_detection() {
    let dir = TempDir::new().expect("temp dir");
    let request = request_for(&dir, common::TWO_PAGE_DETECTIONS);

    let summary = annotate_pdf(&request).expect("annotate");
    assert_eq!(summary.total_detections(), 3);
    assert_eq!(summary.output, dir.path().join("paper_annotated.pdf"));

    let page0 = common::page_annotations(&summary.output, 0);
    let subtypes: Vec<String> = page0.iter().map(common::subtype).collect();
    assert_eq!(
        subtypes,
        vec!["Square", "Text", "Square", "Text", "Square", "Text"]
    );
    assert!(common::page_annotations(&summary.output, 1).is_empty());
}

#[test]
fn boxes_are_flipped_into_pdf_space() {
    let dir = TempDir::new().expect("temp dir");
    let request = request_for(&dir, common::TWO_PAGE_DETECTIONS);
    let summary = annotate_pdf(&request).expect("annotate");

    let page0 = common::page_annotations(&summary.output, 0);
    let table = &page0[2];
    assert_eq!(common::numbers(table, b"Rect"), vec![100.0, 592.0, 300.0, 692.0]);

    let note = &page0[3];
    let note_rect = common::numbers(note, b"Rect");
    assert_eq!(note_rect[0], 100.0);
    assert_eq!(note_rect[3], 697.0);
    assert_eq!(common::text(note, b"Contents"), "Table (0.88)");
    assert_eq!(common::text(note, b"T"), "Table");
    assert_eq!(common::text(note, b"Subj"), "Confidence: 0.876");
}

#[test]
fn colors_follow_labels() {
    let dir = TempDir::new().expect("temp dir");
    let request = request_for(
        &dir,
        r#"{"0": {"boxes": [
            {"type": "Table", "box": [10.0, 10.0, 50.0, 50.0], "score": 0.9},
            {"type": "Stamp", "box": [60.0, 10.0, 90.0, 50.0], "score": 0.9}
        ]}}"#,
    );
    let summary = annotate_pdf(&request).expect("annotate");

    let page0 = common::page_annotations(&summary.output, 0);
    let table_color = color_for_label("Table").components().map(f64::from);
    let drawn = common::numbers(&page0[0], b"C");
    for (got, want) in drawn.iter().zip(table_color) {
        assert!((got - want).abs() < 1e-3);
    }
    assert_eq!(common::numbers(&page0[2], b"C"), vec![0.0, 0.0, 0.0]);
}

#[test]
fn extra_layers_are_skipped() {
    let dir = TempDir::new().expect("temp dir");
    let request = request_for(
        &dir,
        r#"{
            "0": {"boxes": [{"type": "Text", "box": [1.0, 1.0, 9.0, 9.0], "score": 0.4}]},
            "5": {"boxes": [{"type": "Text", "box": [1.0, 1.0, 9.0, 9.0], "score": 0.4}]}
        }"#,
    );
    let summary = annotate_pdf(&request).expect("annotate");

    assert_eq!(summary.total_detections(), 1);
    assert_eq!(summary.annotations.skipped_layers, vec![5]);
}

#[test]
fn invalid_detections_leave_no_output() {
    let dir = TempDir::new().expect("temp dir");
    let request = request_for(
        &dir,
        r#"{"0": {"boxes": [{"type": "Text", "box": [50.0, 1.0, 9.0, 9.0], "score": 0.4}]}}"#,
    );

    let err = annotate_pdf(&request).unwrap_err();
    assert!(matches!(
        err,
        PdfLayoutError::ValidationFailed { error_count: 1, .. }
    ));
    assert!(!request.output.exists());
}

#[test]
fn json_sidecar_matches_drawn_document() {
    let dir = TempDir::new().expect("temp dir");
    let mut request = request_for(&dir, common::TWO_PAGE_DETECTIONS);
    let sidecar = dir.path().join("out.json");
    request.json_output = Some(sidecar.clone());

    let summary = annotate_pdf(&request).expect("annotate");
    let saved = std::fs::read_to_string(&sidecar).expect("read sidecar");
    let restored = from_json_str(&saved).expect("parse sidecar");
    assert_eq!(restored, summary.document);
}

#[test]
fn annotating_twice_appends() {
    let dir = TempDir::new().expect("temp dir");
    let first = request_for(&dir, common::TWO_PAGE_DETECTIONS);
    let summary = annotate_pdf(&first).expect("first pass");

    let mut second = first.clone();
    second.input = summary.output.clone();
    second.output = dir.path().join("twice.pdf");
    annotate_pdf(&second).expect("second pass");

    assert_eq!(common::page_annotations(&second.output, 0).len(), 12);
}

fn request_for_page(
    dir: &TempDir,
    page_entries: Dictionary,
    detections_json: &str,
) -> AnnotateRequest {
    let input = dir.path().join("page.pdf");
    common::write_pdf_with(&input, 1, page_entries);

    let detections = dir.path().join("detections.json");
    std::fs::write(&detections, detections_json).expect("write detections");

    let mut request = AnnotateRequest::new(&input);
    request.detections_input = Some(detections);
    request
}

#[test]
fn cropped_page_places_boxes_inside_crop_box() {
    let dir = TempDir::new().expect("temp dir");
    let request = request_for_page(
        &dir,
        dictionary! {
            "CropBox" => [50, 50, 562, 742].map(Object::Integer).to_vec(),
        },
        r#"{"0": {"boxes": [{"type": "Text", "box": [0.0, 0.0, 10.0, 10.0], "score": 0.7}]}}"#,
    );
    let summary = annotate_pdf(&request).expect("annotate");

    let page0 = common::page_annotations(&summary.output, 0);
    assert_eq!(common::numbers(&page0[0], b"Rect"), vec![50.0, 732.0, 60.0, 742.0]);
}

#[test]
fn rotated_page_places_boxes_as_displayed() {
    let dir = TempDir::new().expect("temp dir");
    let request = request_for_page(
        &dir,
        dictionary! { "Rotate" => Object::Integer(90) },
        r#"{"0": {"boxes": [{"type": "Table", "box": [100.0, 50.0, 300.0, 150.0], "score": 0.7}]}}"#,
    );
    let summary = annotate_pdf(&request).expect("annotate");

    let page0 = common::page_annotations(&summary.output, 0);
    assert_eq!(common::numbers(&page0[0], b"Rect"), vec![50.0, 100.0, 150.0, 300.0]);
    assert_eq!(common::numbers(&page0[1], b"Rect"), vec![45.0, 100.0, 65.0, 120.0]);
}
