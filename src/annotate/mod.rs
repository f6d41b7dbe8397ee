//! Drawing detections onto PDF pages.
//!
//! Each detection becomes two annotations on its page: a Square
//! (rectangle) stroked in the label's color, and a Text (note) annotation at
//! the box's top-left corner carrying `"<label> (<score>)"`. Annotations are
//! appended to the page's `/Annots`; page content is never rewritten.
//!
//! Detector boxes are in rendered-image pixels with a top-left origin. They
//! are scaled by [`AnnotateOptions::scale`] and mapped into PDF user space
//! through the page's [`PageFrame`]: the CropBox (clipped to the MediaBox)
//! and `/Rotate`, which is what the renderer displayed.

mod report;

pub use report::{AnnotationReport, PageAnnotations};

use lopdf::{dictionary, Object, ObjectId, Stream, StringFormat};
use tracing::{debug, warn};

use crate::error::PdfLayoutError;
use crate::labels::{color_for_label, Rgb};
use crate::layout::{BBoxXYXY, Detection, Document, PageFrame, PdfPoint, Pixel, Rotation};

/// US Letter, used when a page tree has no MediaBox at all.
const DEFAULT_MEDIA_BOX: [f64; 4] = [0.0, 0.0, 612.0, 792.0];

/// Side of the note icon rectangle, in points.
const NOTE_ICON_SIZE: f64 = 20.0;

/// Gap between the note icon and the top edge of its box, in points.
const NOTE_OFFSET: f64 = 5.0;

/// Page tree depth limit when resolving inherited attributes.
const MAX_INHERIT_DEPTH: usize = 32;

/// Options for drawing annotations.
#[derive(Clone, Debug, PartialEq)]
pub struct AnnotateOptions {
    /// Pixel -> point factor (72 / render DPI).
    pub scale: f64,
    /// Rectangle border width, in points.
    pub border_width: f64,
}

impl Default for AnnotateOptions {
    fn default() -> Self {
        Self {
            scale: 1.0,
            border_width: 2.0,
        }
    }
}

/// Draws every layer of `document` onto the matching page of `pdf`.
///
/// The layer with page key *i* goes to the *i*-th page (zero-based). Layers
/// past the last page are skipped and listed in the report.
pub fn annotate_document(
    pdf: &mut lopdf::Document,
    document: &Document,
    options: &AnnotateOptions,
) -> Result<AnnotationReport, PdfLayoutError> {
    let page_ids: Vec<ObjectId> = pdf.get_pages().into_values().collect();
    let mut report = AnnotationReport::default();

    for (key, layer) in document.iter() {
        let Some(&page_id) = page_ids.get(key.index()) else {
            warn!(
                "Skipping layer {}: the PDF has only {} page(s)",
                key,
                page_ids.len()
            );
            report.skipped_layers.push(key.0);
            continue;
        };

        let drawn = annotate_page(pdf, page_id, layer.detections(), options)?;
        debug!("Page {}: {} detections", key.0 + 1, drawn);
        report.pages.push(PageAnnotations {
            page: key.0,
            detections: drawn,
        });
    }

    Ok(report)
}

/// Draws detections onto one page and returns how many were drawn.
pub fn annotate_page(
    pdf: &mut lopdf::Document,
    page_id: ObjectId,
    detections: &[Detection],
    options: &AnnotateOptions,
) -> Result<usize, PdfLayoutError> {
    let frame = page_frame(pdf, page_id)?;

    for detection in detections {
        let color = color_for_label(&detection.label);
        let rect = detection.bbox.to_pdf_points(options.scale, &frame);
        let note_rect =
            note_anchor(&detection.bbox, options.scale).to_pdf_points(options.scale, &frame);

        let square_id = add_square_annotation(pdf, page_id, &rect, color, options.border_width);
        let note_id = add_note_annotation(pdf, page_id, &note_rect, detection, color);
        add_annotation_to_page(pdf, page_id, square_id)?;
        add_annotation_to_page(pdf, page_id, note_id)?;
    }

    Ok(detections.len())
}

/// Formats the visible note text, e.g. `"Table (0.87)"`.
pub fn note_text(detection: &Detection) -> String {
    format!("{} ({:.2})", detection.label, detection.score)
}

/// Formats the note's subject, e.g. `"Confidence: 0.873"`.
pub fn confidence_text(detection: &Detection) -> String {
    format!("Confidence: {:.3}", detection.score)
}

fn add_square_annotation(
    pdf: &mut lopdf::Document,
    page_id: ObjectId,
    rect: &BBoxXYXY<PdfPoint>,
    color: Rgb,
    border_width: f64,
) -> ObjectId {
    let appearance_id = pdf.add_object(square_appearance(rect, color, border_width));

    pdf.add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Square",
        "Rect" => real_array(&rect.to_array()),
        "C" => color_array(color),
        "Border" => vec![Object::Integer(0), Object::Integer(0), Object::Real(border_width as f32)],
        "BS" => dictionary! {
            "Type" => "Border",
            "W" => Object::Real(border_width as f32),
            "S" => "S",
        },
        "F" => Object::Integer(4),
        "P" => Object::Reference(page_id),
        "AP" => dictionary! {
            "N" => Object::Reference(appearance_id),
        },
    })
}

/// Form XObject that strokes the rectangle, for viewers that do not
/// synthesize appearances.
fn square_appearance(rect: &BBoxXYXY<PdfPoint>, color: Rgb, border_width: f64) -> Stream {
    let (w, h) = (rect.width(), rect.height());
    let inset = border_width / 2.0;
    let content = format!(
        "{} RG {} w {} {} {} {} re S",
        color,
        border_width,
        inset,
        inset,
        (w - border_width).max(0.0),
        (h - border_width).max(0.0),
    );

    Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Form",
            "BBox" => real_array(&[0.0, 0.0, w, h]),
        },
        content.into_bytes(),
    )
}

/// Note icon square in image pixels. Its top-left corner sits
/// `NOTE_OFFSET` points above the box's displayed top-left corner.
fn note_anchor(bbox: &BBoxXYXY<Pixel>, scale: f64) -> BBoxXYXY<Pixel> {
    let top = bbox.y1 - NOTE_OFFSET / scale;
    BBoxXYXY::from_xyxy(
        bbox.x1,
        top,
        bbox.x1 + NOTE_ICON_SIZE / scale,
        top + NOTE_ICON_SIZE / scale,
    )
}

fn add_note_annotation(
    pdf: &mut lopdf::Document,
    page_id: ObjectId,
    rect: &BBoxXYXY<PdfPoint>,
    detection: &Detection,
    color: Rgb,
) -> ObjectId {
    pdf.add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Text",
        "Rect" => real_array(&rect.to_array()),
        "Contents" => text_string(&note_text(detection)),
        "T" => text_string(&detection.label),
        "Subj" => text_string(&confidence_text(detection)),
        "Name" => "Comment",
        "Open" => false,
        "C" => color_array(color),
        "F" => Object::Integer(4),
        "P" => Object::Reference(page_id),
    })
}

fn add_annotation_to_page(
    pdf: &mut lopdf::Document,
    page_id: ObjectId,
    annot_id: ObjectId,
) -> Result<(), PdfLayoutError> {
    let page = pdf
        .get_dictionary(page_id)
        .map_err(|e| PdfLayoutError::processing("Failed to read page", e))?;

    // /Annots may be an indirect array shared through a reference.
    if let Ok(Object::Reference(array_id)) = page.get(b"Annots") {
        let array_id = *array_id;
        if let Ok(Object::Array(annots)) = pdf.get_object_mut(array_id) {
            annots.push(Object::Reference(annot_id));
            return Ok(());
        }
    }

    let page = pdf
        .get_object_mut(page_id)
        .and_then(Object::as_dict_mut)
        .map_err(|e| PdfLayoutError::processing("Failed to update page", e))?;

    match page.get_mut(b"Annots") {
        Ok(Object::Array(annots)) => annots.push(Object::Reference(annot_id)),
        _ => page.set("Annots", vec![Object::Reference(annot_id)]),
    }
    Ok(())
}

/// Resolves the frame a renderer displays the page in: the inherited
/// CropBox clipped to the MediaBox, and the inherited `/Rotate`.
pub fn page_frame(
    pdf: &lopdf::Document,
    page_id: ObjectId,
) -> Result<PageFrame, PdfLayoutError> {
    let media_box = page_media_box(pdf, page_id)?;
    let crop_box = match inherited(pdf, page_id, b"CropBox")? {
        Some(value) => Some(parse_rect(pdf, value).ok_or_else(|| invalid_box("CropBox", page_id))?),
        None => None,
    };
    let rotation = inherited(pdf, page_id, b"Rotate")?
        .and_then(|value| resolve(pdf, value))
        .and_then(|value| value.as_i64().ok())
        .map(Rotation::from_degrees)
        .unwrap_or_default();

    Ok(PageFrame::visible(media_box, crop_box).with_rotation(rotation))
}

/// Resolves a page's MediaBox, following /Parent for inherited values.
pub fn page_media_box(
    pdf: &lopdf::Document,
    page_id: ObjectId,
) -> Result<[f64; 4], PdfLayoutError> {
    match inherited(pdf, page_id, b"MediaBox")? {
        Some(value) => parse_rect(pdf, value).ok_or_else(|| invalid_box("MediaBox", page_id)),
        None => Ok(DEFAULT_MEDIA_BOX),
    }
}

/// Looks up an inheritable page attribute on the page or its ancestors.
fn inherited<'a>(
    pdf: &'a lopdf::Document,
    page_id: ObjectId,
    key: &[u8],
) -> Result<Option<&'a Object>, PdfLayoutError> {
    let mut node = pdf
        .get_dictionary(page_id)
        .map_err(|e| PdfLayoutError::processing("Failed to read page", e))?;

    for _ in 0..MAX_INHERIT_DEPTH {
        if let Ok(value) = node.get(key) {
            return Ok(Some(value));
        }

        match node.get(b"Parent") {
            Ok(Object::Reference(parent_id)) => match pdf.get_dictionary(*parent_id) {
                Ok(parent) => node = parent,
                Err(_) => break,
            },
            _ => break,
        }
    }

    Ok(None)
}

fn invalid_box(key: &str, page_id: ObjectId) -> PdfLayoutError {
    PdfLayoutError::processing(
        format!("Invalid {} on page {:?}", key, page_id),
        "expected four numbers",
    )
}

/// Parses a rectangle array, normalizing corner order.
fn parse_rect(pdf: &lopdf::Document, value: &Object) -> Option<[f64; 4]> {
    let value = resolve(pdf, value)?;
    let items = value.as_array().ok()?;
    if items.len() != 4 {
        return None;
    }

    let mut n = [0.0; 4];
    for (slot, item) in n.iter_mut().zip(items) {
        *slot = number(resolve(pdf, item)?)?;
    }
    Some([n[0].min(n[2]), n[1].min(n[3]), n[0].max(n[2]), n[1].max(n[3])])
}

fn resolve<'a>(pdf: &'a lopdf::Document, value: &'a Object) -> Option<&'a Object> {
    match value {
        Object::Reference(id) => pdf.get_object(*id).ok(),
        other => Some(other),
    }
}

fn number(value: &Object) -> Option<f64> {
    match value {
        Object::Integer(v) => Some(*v as f64),
        Object::Real(v) => Some(f64::from(*v)),
        _ => None,
    }
}

fn real_array(values: &[f64]) -> Object {
    Object::Array(values.iter().map(|v| Object::Real(*v as f32)).collect())
}

fn color_array(color: Rgb) -> Object {
    Object::Array(color.components().iter().map(|c| Object::Real(*c)).collect())
}

/// Encodes a PDF text string: literal for ASCII, UTF-16BE with BOM
/// otherwise.
fn text_string(text: &str) -> Object {
    if text.is_ascii() {
        return Object::String(text.as_bytes().to_vec(), StringFormat::Literal);
    }

    let mut bytes = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}
